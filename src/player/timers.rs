use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum TimerReason {
    StallRecovery,
    ControlsHide,
}

/// Deadlines keyed by reason; scheduling a reason replaces its previous
/// deadline, so at most one timer per reason is ever live.
#[derive(Debug, Clone, Default)]
pub(crate) struct TimerQueue {
    deadlines: BTreeMap<TimerReason, i64>,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, reason: TimerReason, due_ms: i64) {
        self.deadlines.insert(reason, due_ms);
    }

    pub(crate) fn cancel(&mut self, reason: TimerReason) -> bool {
        self.deadlines.remove(&reason).is_some()
    }

    pub(crate) fn is_scheduled(&self, reason: TimerReason) -> bool {
        self.deadlines.contains_key(&reason)
    }

    pub(crate) fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub(crate) fn next_due(&self) -> Option<i64> {
        self.deadlines.values().copied().min()
    }

    /// Removes and returns every reason due at `now_ms`, earliest first.
    pub(crate) fn take_due(&mut self, now_ms: i64) -> Vec<TimerReason> {
        let mut due: Vec<(i64, TimerReason)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now_ms)
            .map(|(reason, deadline)| (*deadline, *reason))
            .collect();
        due.sort();
        for (_, reason) in &due {
            self.deadlines.remove(reason);
        }
        due.into_iter().map(|(_, reason)| reason).collect()
    }
}
