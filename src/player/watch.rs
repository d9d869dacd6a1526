use super::policy::ViewPolicy;

/// Whether `watched` seconds out of `duration` count as a view.
pub(crate) fn is_view_eligible(duration: f64, watched: f64, policy: &ViewPolicy) -> bool {
    // NaN and unknown (zero) durations never qualify; live streams report infinity.
    if !(duration > 0.0) || !(watched > 0.0) {
        return false;
    }
    let ratio = watched / duration;
    if duration <= policy.short_video_max_secs {
        watched >= policy.short_min_watched_secs || ratio >= policy.short_min_ratio
    } else {
        watched >= policy.long_min_watched_secs || ratio >= policy.long_min_ratio
    }
}

pub(crate) fn cooldown_elapsed(last_sent_ms: Option<i64>, now_ms: i64, policy: &ViewPolicy) -> bool {
    match last_sent_ms {
        Some(last) => now_ms.saturating_sub(last) >= policy.cooldown_ms(),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SampleOutcome {
    Accumulated(f64),
    Rejected,
    Restarted,
}

/// Per-load accumulator of genuinely watched seconds.
#[derive(Debug, Clone, Default)]
pub(crate) struct WatchSession {
    watched_secs: f64,
    last_time: Option<f64>,
    last_wall_ms: Option<i64>,
    /// Playback has been seen past the rewatch threshold since the last reset.
    left_start: bool,
    sent_view: bool,
}

impl WatchSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn watched_secs(&self) -> f64 {
        self.watched_secs
    }

    pub(crate) fn sent_view(&self) -> bool {
        self.sent_view
    }

    pub(crate) fn mark_sent(&mut self) {
        self.sent_view = true;
    }

    /// Moves the observation point without counting anything, e.g. after a
    /// pause or a programmatic seek.
    pub(crate) fn rebase(&mut self, time: f64, wall_ms: i64) {
        self.last_time = Some(time);
        self.last_wall_ms = Some(wall_ms);
    }

    /// Feeds one playing time-update sample.
    ///
    /// Returning near the start after having watched past it resets the
    /// session, however playback got back there.
    pub(crate) fn observe(&mut self, time: f64, wall_ms: i64, policy: &ViewPolicy) -> SampleOutcome {
        let previous = self.last_time.zip(self.last_wall_ms);
        self.rebase(time, wall_ms);

        if time <= policy.rewatch_threshold_secs {
            if self.left_start && self.watched_secs > 0.0 {
                self.watched_secs = 0.0;
                self.sent_view = false;
                self.left_start = false;
                return SampleOutcome::Restarted;
            }
        } else {
            self.left_start = true;
        }

        let Some((last_time, last_wall_ms)) = previous else {
            return SampleOutcome::Rejected;
        };

        let delta = time - last_time;
        let wall_gap = (wall_ms - last_wall_ms) as f64 / 1000.0;
        if delta > 0.0 && delta <= policy.max_sample_delta_secs && wall_gap <= policy.max_wall_gap_secs {
            self.watched_secs += delta;
            SampleOutcome::Accumulated(delta)
        } else {
            SampleOutcome::Rejected
        }
    }
}
