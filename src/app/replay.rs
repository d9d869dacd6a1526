use anyhow::Result;
use tracing::{debug, info, warn};

use crate::http::HttpViewReporter;
use crate::player::{
    MediaEvent, PlaybackController, PlaybackPolicy, PlaybackStore, PlayerEnv, PlayerHost,
    RecordingElement, TimerReason, command_for_key,
};

use super::format::format_position;
use super::trace::{Trace, TraceAction};

/// Transcript of one replayed trace.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReplayOutcome {
    pub(crate) lines: Vec<String>,
    pub(crate) views: Vec<String>,
}

struct ReplayHost<'a> {
    reporter: Option<&'a HttpViewReporter>,
    notes: Vec<String>,
    views: Vec<String>,
}

impl PlayerHost for ReplayHost<'_> {
    fn on_view(&mut self, video_id: &str) -> Result<()> {
        self.views.push(video_id.to_string());
        self.notes.push(format!("view counted for {video_id}"));
        match self.reporter {
            Some(reporter) => reporter.report_view(video_id),
            None => Ok(()),
        }
    }

    fn on_ended(&mut self) {
        self.notes.push("ended".to_string());
    }

    fn on_next(&mut self) {
        self.notes.push("next requested".to_string());
    }

    fn on_prev(&mut self) {
        self.notes.push("previous requested".to_string());
    }

    fn on_return(&mut self) {
        self.notes.push("return to watch page".to_string());
    }

    fn on_close(&mut self) {
        self.notes.push("mini player closed".to_string());
    }
}

/// Drives a controller over a recording element through every step of
/// `trace`, with step offsets measured from `base_ms`.
pub(crate) fn replay_trace(
    trace: &Trace,
    policy: PlaybackPolicy,
    store: &mut dyn PlaybackStore,
    reporter: Option<&HttpViewReporter>,
    base_ms: i64,
) -> ReplayOutcome {
    info!(video_id = %trace.props.video_id, steps = trace.steps.len(), "replaying trace");
    if trace.skipped > 0 {
        warn!(skipped = trace.skipped, "malformed trace steps skipped");
    }

    let seek_step = policy.seek_step_secs;
    let mut controller = PlaybackController::new(RecordingElement::new(), policy);
    controller
        .element_mut()
        .deny_fullscreen(trace.fullscreen_denied);
    let mut host = ReplayHost {
        reporter,
        notes: Vec::new(),
        views: Vec::new(),
    };
    let mut lines = Vec::new();
    let mut now_ms = base_ms;

    if trace.gesture {
        controller.note_user_gesture();
    }
    {
        let mut env = PlayerEnv {
            store: &mut *store,
            host: &mut host,
            now_ms,
        };
        if !trace.visible {
            controller.set_page_visible(false, &mut env);
        }
        controller.set_props(trace.props.clone(), &mut env);
    }
    lines.push(format!(
        "[{:>7}ms] mount video={} poster={}",
        0,
        trace.props.video_id,
        trace.props.poster.as_deref().unwrap_or("-")
    ));
    flush_effects(&mut controller, &mut host, &mut lines);

    for step in &trace.steps {
        let at_ms = base_ms + step.at_ms;
        if at_ms < now_ms {
            debug!(at_ms = step.at_ms, "step out of order, running at the current time");
        }
        fire_timers_until(
            &mut controller,
            &mut *store,
            &mut host,
            at_ms,
            base_ms,
            &mut lines,
        );
        now_ms = now_ms.max(at_ms);
        lines.push(format!(
            "[{:>7}ms] {}",
            now_ms - base_ms,
            step.action.describe()
        ));

        let mut env = PlayerEnv {
            store: &mut *store,
            host: &mut host,
            now_ms,
        };
        match &step.action {
            TraceAction::Event(event) => {
                if let MediaEvent::TimeUpdate { time } | MediaEvent::Seeked { time } = event {
                    controller.element_mut().set_current_time(*time);
                }
                let token = controller.token();
                controller.handle_event(token, event.clone(), &mut env);
            }
            TraceAction::Command(command) => controller.command(*command, &mut env),
            TraceAction::Key(key) => match command_for_key(key, seek_step) {
                Some(command) => controller.command(command, &mut env),
                None => debug!(key = %key, "unbound key"),
            },
            TraceAction::Props(props) => controller.set_props(props.clone(), &mut env),
            TraceAction::Visible(visible) => controller.set_page_visible(*visible, &mut env),
        }
        flush_effects(&mut controller, &mut host, &mut lines);
    }

    if let Some(until_ms) = trace.until_ms {
        fire_timers_until(
            &mut controller,
            &mut *store,
            &mut host,
            base_ms + until_ms,
            base_ms,
            &mut lines,
        );
        now_ms = now_ms.max(base_ms + until_ms);
    }

    lines.extend(summary_lines(&controller));

    {
        let mut env = PlayerEnv {
            store: &mut *store,
            host: &mut host,
            now_ms,
        };
        controller.teardown(&mut env);
    }
    lines.push(format!("[{:>7}ms] teardown", now_ms - base_ms));
    flush_effects(&mut controller, &mut host, &mut lines);

    ReplayOutcome {
        lines,
        views: host.views,
    }
}

fn summary_lines(controller: &PlaybackController<RecordingElement>) -> Vec<String> {
    let state = controller.state();
    let element = controller.element();
    let quality = if controller.has_source() {
        state
            .quality
            .map(|quality| format!("{quality}p"))
            .unwrap_or_else(|| "-".to_string())
    } else {
        "none".to_string()
    };
    let offered = controller
        .qualities()
        .iter()
        .map(|quality| format!("{quality}p"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!(
            "final: phase={} ready={} playing={} buffering={} time={} duration={} buffered_to={} quality={quality} of [{offered}]",
            controller.phase().label(),
            state.is_ready,
            state.is_playing,
            state.is_buffering,
            format_position(state.current_time),
            format_position(state.duration),
            format_position(state.buffered_end),
        ),
        format!(
            "audio: volume={:.2} muted={} forced_muted={} audible={} (element volume={:.2} muted={})",
            state.volume,
            state.muted,
            state.forced_muted,
            !state.effectively_muted(),
            element.volume(),
            element.is_muted(),
        ),
        format!(
            "watch: watched={:.2}s view_sent={} controls={} fullscreen={} (element {})",
            controller.watched_secs(),
            controller.view_sent(),
            if controller.controls_visible() {
                "shown"
            } else {
                "hidden"
            },
            state.fullscreen_wanted,
            element.is_fullscreen(),
        ),
    ];
    if controller.is_timer_scheduled(TimerReason::StallRecovery) {
        lines.push("pending: stall recovery".to_string());
    }
    lines
}

fn fire_timers_until(
    controller: &mut PlaybackController<RecordingElement>,
    store: &mut dyn PlaybackStore,
    host: &mut ReplayHost<'_>,
    until_ms: i64,
    base_ms: i64,
    lines: &mut Vec<String>,
) {
    while let Some(due) = controller.next_timer_due()
        && due <= until_ms
    {
        lines.push(format!("[{:>7}ms] timer", due - base_ms));
        let mut env = PlayerEnv {
            store: &mut *store,
            host: &mut *host,
            now_ms: due,
        };
        controller.tick(&mut env);
        flush_effects(controller, host, lines);
    }
}

fn flush_effects(
    controller: &mut PlaybackController<RecordingElement>,
    host: &mut ReplayHost<'_>,
    lines: &mut Vec<String>,
) {
    for call in controller.element_mut().take_calls() {
        lines.push(format!("    -> {call}"));
    }
    for note in host.notes.drain(..) {
        lines.push(format!("    host: {note}"));
    }
}
