use serde::{Deserialize, Serialize};

pub(crate) const FALLBACK_QUALITY: u32 = 360;

/// Tunable knobs for the playback controller.
///
/// Defaults reproduce the behavior of the web player this controller was
/// modeled on. The rewatch threshold and the view cooldown are policy, not
/// invariants, so they are configurable like everything else here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PlaybackPolicy {
    pub(crate) view: ViewPolicy,
    /// Stored resume times at or below this are treated as "start over".
    pub(crate) resume_threshold_secs: f64,
    pub(crate) resume_write_interval_secs: f64,
    pub(crate) resume_jump_secs: f64,
    pub(crate) stall_recovery_delay_secs: f64,
    pub(crate) controls_hide_delay_secs: f64,
    pub(crate) fallback_quality: u32,
    pub(crate) seek_step_secs: f64,
    pub(crate) volume_step: f64,
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        Self {
            view: ViewPolicy::default(),
            resume_threshold_secs: 1.0,
            resume_write_interval_secs: 1.2,
            resume_jump_secs: 2.0,
            stall_recovery_delay_secs: 2.5,
            controls_hide_delay_secs: 3.0,
            fallback_quality: FALLBACK_QUALITY,
            seek_step_secs: 5.0,
            volume_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ViewPolicy {
    pub(crate) short_video_max_secs: f64,
    pub(crate) short_min_watched_secs: f64,
    pub(crate) short_min_ratio: f64,
    pub(crate) long_min_watched_secs: f64,
    pub(crate) long_min_ratio: f64,
    pub(crate) max_sample_delta_secs: f64,
    pub(crate) max_wall_gap_secs: f64,
    pub(crate) rewatch_threshold_secs: f64,
    pub(crate) cooldown_secs: u64,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self {
            short_video_max_secs: 60.0,
            short_min_watched_secs: 15.0,
            short_min_ratio: 0.8,
            long_min_watched_secs: 30.0,
            long_min_ratio: 0.6,
            max_sample_delta_secs: 1.2,
            max_wall_gap_secs: 2.0,
            rewatch_threshold_secs: 5.0,
            cooldown_secs: 10 * 60,
        }
    }
}

impl ViewPolicy {
    pub(crate) fn cooldown_ms(&self) -> i64 {
        i64::try_from(self.cooldown_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

pub(crate) fn secs_to_ms(secs: f64) -> i64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as i64
    } else {
        0
    }
}
