use super::policy::{PlaybackPolicy, secs_to_ms};

/// Where a freshly loaded source should start.
///
/// A different video always starts from zero. Otherwise a meaningful stored
/// position wins, and the element's own clock covers in-place quality switches.
pub(crate) fn plan_resume_time(
    video_changed: bool,
    stored: Option<f64>,
    element_time: f64,
    threshold_secs: f64,
) -> f64 {
    if video_changed {
        return 0.0;
    }
    match stored {
        Some(stored) if stored.is_finite() && stored > threshold_secs => stored,
        _ if element_time.is_finite() && element_time > 0.0 => element_time,
        _ => 0.0,
    }
}

/// Whether playback should start by itself once the new source is ready.
pub(crate) fn should_auto_resume(same_video: bool, was_playing: bool, user_gesture: bool) -> bool {
    if same_video {
        was_playing || user_gesture
    } else {
        user_gesture
    }
}

/// Throttles resume-position writes while playing.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResumeThrottle {
    last_write_ms: Option<i64>,
    last_written_time: Option<f64>,
}

impl ResumeThrottle {
    pub(crate) fn should_write(&self, time: f64, now_ms: i64, policy: &PlaybackPolicy) -> bool {
        let (Some(last_ms), Some(last_time)) = (self.last_write_ms, self.last_written_time) else {
            return true;
        };
        now_ms.saturating_sub(last_ms) >= secs_to_ms(policy.resume_write_interval_secs)
            || (time - last_time).abs() >= policy.resume_jump_secs
    }

    pub(crate) fn record(&mut self, time: f64, now_ms: i64) {
        self.last_write_ms = Some(now_ms);
        self.last_written_time = Some(time);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
