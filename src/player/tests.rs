use std::collections::BTreeMap;

use anyhow::{Result, bail};

use super::machine::PlayerPhase;
use super::media::LoadToken;
use super::policy::ViewPolicy;
use super::recording::ElementCall;
use super::resume::{ResumeThrottle, plan_resume_time, should_auto_resume};
use super::sources::{QualitySources, default_quality, normalize_quality_label, selectable_qualities};
use super::timers::TimerQueue;
use super::watch::{SampleOutcome, WatchSession, cooldown_elapsed};
use super::*;

const START_MS: i64 = 1_700_000_000_000;

#[derive(Debug, Default)]
struct TestHost {
    views: Vec<String>,
    ended: usize,
    next: usize,
    prev: usize,
    returned: usize,
    closed: usize,
    fail_views: bool,
}

impl PlayerHost for TestHost {
    fn on_view(&mut self, video_id: &str) -> Result<()> {
        self.views.push(video_id.to_string());
        if self.fail_views {
            bail!("view endpoint unavailable");
        }
        Ok(())
    }

    fn on_ended(&mut self) {
        self.ended += 1;
    }

    fn on_next(&mut self) {
        self.next += 1;
    }

    fn on_prev(&mut self) {
        self.prev += 1;
    }

    fn on_return(&mut self) {
        self.returned += 1;
    }

    fn on_close(&mut self) {
        self.closed += 1;
    }
}

struct Harness {
    player: PlaybackController<RecordingElement>,
    store: MemoryStore,
    host: TestHost,
    now_ms: i64,
}

impl Harness {
    fn new() -> Self {
        Self {
            player: PlaybackController::new(RecordingElement::new(), PlaybackPolicy::default()),
            store: MemoryStore::new(),
            host: TestHost::default(),
            now_ms: START_MS,
        }
    }

    fn with_env<R>(
        &mut self,
        f: impl FnOnce(&mut PlaybackController<RecordingElement>, &mut PlayerEnv<'_>) -> R,
    ) -> R {
        let mut env = PlayerEnv {
            store: &mut self.store,
            host: &mut self.host,
            now_ms: self.now_ms,
        };
        f(&mut self.player, &mut env)
    }

    fn mount(&mut self, props: PlayerProps) {
        self.with_env(|player, env| player.set_props(props, env));
    }

    fn event(&mut self, event: MediaEvent) {
        let token = self.player.token();
        self.event_for(token, event);
    }

    fn event_for(&mut self, token: LoadToken, event: MediaEvent) {
        self.with_env(|player, env| player.handle_event(token, event, env));
    }

    fn command(&mut self, command: PlayerCommand) {
        self.with_env(|player, env| player.command(command, env));
    }

    fn advance(&mut self, ms: i64) {
        self.now_ms += ms;
        self.with_env(|player, env| player.tick(env));
    }

    /// Start playback of a freshly mounted source with the given duration.
    fn start_playing(&mut self, duration: f64) {
        self.player.note_user_gesture();
        self.event(MediaEvent::LoadedMetadata { duration });
        self.event(MediaEvent::Playing);
    }

    /// Emits time updates every 250ms of wall clock up to `to`.
    fn play_to(&mut self, to: f64) {
        let mut time = self.player.state().current_time;
        while time + 1e-9 < to {
            time = (time + 0.25).min(to);
            self.now_ms += 250;
            self.player.element_mut().set_current_time(time);
            self.event(MediaEvent::TimeUpdate { time });
        }
    }

    fn loads(&self) -> usize {
        self.player
            .element()
            .calls()
            .iter()
            .filter(|call| matches!(call, ElementCall::Load { .. }))
            .count()
    }
}

fn props(video_id: &str, sources: &[(&str, &str)]) -> PlayerProps {
    PlayerProps {
        video_id: video_id.to_string(),
        sources: sources
            .iter()
            .map(|(label, url)| (label.to_string(), url.to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..PlayerProps::default()
    }
}

fn two_qualities(video_id: &str) -> PlayerProps {
    props(
        video_id,
        &[("360", "https://cdn.test/v/360.mp4"), ("720", "https://cdn.test/v/720.mp4")],
    )
}

#[test]
fn eligibility_follows_short_and_long_video_thresholds() {
    let policy = ViewPolicy::default();
    assert!(is_view_eligible(40.0, 16.0, &policy));
    assert!(!is_view_eligible(40.0, 10.0, &policy));
    assert!(is_view_eligible(10.0, 8.0, &policy));
    assert!(!is_view_eligible(10.0, 7.9, &policy));
    assert!(is_view_eligible(60.0, 15.0, &policy));
    assert!(is_view_eligible(120.0, 30.0, &policy));
    assert!(!is_view_eligible(120.0, 29.0, &policy));
    assert!(is_view_eligible(f64::INFINITY, 30.0, &policy));
}

#[test]
fn eligibility_rejects_unknown_duration() {
    let policy = ViewPolicy::default();
    assert!(!is_view_eligible(0.0, 40.0, &policy));
    assert!(!is_view_eligible(f64::NAN, 40.0, &policy));
}

#[test]
fn watch_session_counts_small_deltas_only() {
    let policy = ViewPolicy::default();
    let mut session = WatchSession::new();
    assert_eq!(session.observe(10.0, 0, &policy), SampleOutcome::Rejected);
    assert_eq!(session.observe(11.0, 1000, &policy), SampleOutcome::Accumulated(1.0));
    assert_eq!(session.observe(12.3, 2000, &policy), SampleOutcome::Rejected);
    assert_eq!(session.watched_secs(), 1.0);
}

#[test]
fn watch_session_ignores_samples_after_long_wall_gap() {
    let policy = ViewPolicy::default();
    let mut session = WatchSession::new();
    session.observe(10.0, 0, &policy);
    assert_eq!(session.observe(11.0, 2500, &policy), SampleOutcome::Rejected);
    assert_eq!(session.watched_secs(), 0.0);
}

#[test]
fn watch_session_resets_when_playback_returns_to_start() {
    let policy = ViewPolicy::default();
    let mut session = WatchSession::new();
    let mut wall = 0;
    let mut time = 0.0;
    session.observe(time, wall, &policy);
    while time < 20.0 {
        time += 0.5;
        wall += 500;
        session.observe(time, wall, &policy);
    }
    assert_eq!(session.watched_secs(), 20.0);

    assert_eq!(session.observe(3.0, wall + 500, &policy), SampleOutcome::Restarted);
    assert_eq!(session.watched_secs(), 0.0);
    assert!(!session.sent_view());
}

#[test]
fn watch_session_resets_after_rebasing_to_start() {
    let policy = ViewPolicy::default();
    let mut session = WatchSession::new();
    session.observe(10.0, 0, &policy);
    assert_eq!(session.observe(11.0, 1000, &policy), SampleOutcome::Accumulated(1.0));
    session.mark_sent();

    session.rebase(0.0, 5000);
    assert_eq!(session.observe(0.5, 5500, &policy), SampleOutcome::Restarted);
    assert_eq!(session.watched_secs(), 0.0);
    assert!(!session.sent_view());
    assert_eq!(session.observe(1.0, 6000, &policy), SampleOutcome::Accumulated(0.5));
}

#[test]
fn watch_session_does_not_reset_before_leaving_the_start() {
    let policy = ViewPolicy::default();
    let mut session = WatchSession::new();
    session.observe(1.0, 0, &policy);
    session.observe(2.0, 1000, &policy);
    session.observe(1.5, 1500, &policy);
    assert_eq!(session.observe(2.5, 2500, &policy), SampleOutcome::Accumulated(1.0));
    assert_eq!(session.watched_secs(), 2.0);
}

#[test]
fn cooldown_blocks_for_ten_minutes() {
    let policy = ViewPolicy::default();
    assert!(cooldown_elapsed(None, START_MS, &policy));
    assert!(!cooldown_elapsed(Some(START_MS), START_MS + 9 * 60 * 1000, &policy));
    assert!(cooldown_elapsed(Some(START_MS), START_MS + 10 * 60 * 1000, &policy));
}

#[test]
fn quality_labels_are_normalized() {
    assert_eq!(normalize_quality_label("720"), Some(720));
    assert_eq!(normalize_quality_label(" 480p "), Some(480));
    assert_eq!(normalize_quality_label("1080P"), Some(1080));
    assert_eq!(normalize_quality_label("hd"), None);
    assert_eq!(normalize_quality_label("0"), None);
}

#[test]
fn selectable_qualities_drop_labels_without_url() {
    let raw: BTreeMap<String, String> = [("360", "a"), ("720", "b"), ("480", "")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let sources = QualitySources::from_raw(&raw);
    assert_eq!(selectable_qualities(&sources, Some(&[360, 480, 720][..])), vec![360, 720]);
    assert_eq!(selectable_qualities(&sources, Some(&[1080][..])), vec![360, 720]);
    assert_eq!(selectable_qualities(&sources, None), vec![360, 720]);
}

#[test]
fn default_quality_prefers_remembered_then_initial_then_highest() {
    let raw: BTreeMap<String, String> = [("360p", "a"), ("720p", "b")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let sources = QualitySources::from_raw(&raw);
    let qualities = selectable_qualities(&sources, Some(&[360, 480, 720][..]));

    assert_eq!(default_quality(&sources, &qualities, Some(360), Some(720), 360), 360);
    assert_eq!(default_quality(&sources, &qualities, Some(1080), Some(360), 360), 360);
    assert_eq!(default_quality(&sources, &qualities, None, Some(480), 360), 720);
    assert_eq!(default_quality(&QualitySources::default(), &[], None, None, 360), 360);
}

#[test]
fn resume_plan_covers_new_video_stored_and_element_time() {
    assert_eq!(plan_resume_time(true, Some(42.0), 12.0, 1.0), 0.0);
    assert_eq!(plan_resume_time(false, Some(42.0), 12.0, 1.0), 42.0);
    assert_eq!(plan_resume_time(false, Some(0.5), 12.0, 1.0), 12.0);
    assert_eq!(plan_resume_time(false, None, 0.0, 1.0), 0.0);

    assert!(!should_auto_resume(false, true, false));
    assert!(should_auto_resume(false, false, true));
    assert!(should_auto_resume(true, true, false));
    assert!(!should_auto_resume(true, false, false));
}

#[test]
fn resume_throttle_writes_on_interval_or_jump() {
    let policy = PlaybackPolicy::default();
    let mut throttle = ResumeThrottle::default();
    assert!(throttle.should_write(10.0, 0, &policy));
    throttle.record(10.0, 0);
    assert!(!throttle.should_write(10.25, 250, &policy));
    assert!(throttle.should_write(11.2, 1200, &policy));
    assert!(throttle.should_write(13.0, 300, &policy));
}

#[test]
fn timer_queue_keeps_one_deadline_per_reason() {
    let mut timers = TimerQueue::default();
    timers.schedule(TimerReason::ControlsHide, 300);
    timers.schedule(TimerReason::StallRecovery, 100);
    timers.schedule(TimerReason::StallRecovery, 200);
    assert_eq!(timers.next_due(), Some(200));
    assert!(timers.take_due(150).is_empty());
    assert_eq!(
        timers.take_due(400),
        vec![TimerReason::StallRecovery, TimerReason::ControlsHide]
    );
    assert!(!timers.is_scheduled(TimerReason::StallRecovery));
}

#[test]
fn phase_machine_tracks_buffering_intent() {
    let buffering = PlayerPhase::Playing.on_event(&MediaEvent::Waiting);
    assert_eq!(buffering, PlayerPhase::Buffering { resume: true });
    assert_eq!(buffering.on_event(&MediaEvent::Playing), PlayerPhase::Playing);

    let paused_wait = PlayerPhase::Paused.on_event(&MediaEvent::Waiting);
    assert_eq!(paused_wait.on_event(&MediaEvent::CanPlay), PlayerPhase::Paused);
    assert_eq!(
        PlayerPhase::Loading.on_event(&MediaEvent::LoadedMetadata { duration: 10.0 }),
        PlayerPhase::Ready
    );
    assert_eq!(PlayerPhase::Idle.on_event(&MediaEvent::Playing), PlayerPhase::Idle);
    assert_eq!(PlayerPhase::Paused.on_event(&MediaEvent::Stalled), PlayerPhase::Paused);
}

#[test]
fn buffered_ranges_cover_media_end() {
    let ranges = BufferedRanges::new([(48.0, 60.0), (0.0, 10.0)]);
    assert_eq!(ranges.ranges()[0], (0.0, 10.0));
    assert!(ranges.covers(5.0, 60.0));
    assert!(!ranges.covers(9.95, 60.0));
    assert!(ranges.covers(60.0, 60.0));
    assert!(!ranges.covers(30.0, 60.0));
    assert_eq!(ranges.end_containing(50.0), 60.0);
}

#[test]
fn shortcuts_map_to_commands() {
    assert_eq!(command_for_key("k", 5.0), Some(PlayerCommand::TogglePlay));
    assert_eq!(command_for_key("ArrowLeft", 5.0), Some(PlayerCommand::SeekBy(-5.0)));
    assert_eq!(command_for_key("f", 5.0), Some(PlayerCommand::ToggleFullscreen));
    assert_eq!(command_for_key("N", 5.0), Some(PlayerCommand::Next));
    assert_eq!(command_for_key("x", 5.0), None);
}

#[test]
fn mount_picks_quality_from_available_list() {
    let mut h = Harness::new();
    let mut p = props("a", &[("360", "u360"), ("720", "u720")]);
    p.available_qualities = Some(vec![360, 480, 720]);
    p.initial_quality = Some(480);
    h.mount(p);

    assert_eq!(h.player.qualities(), &[360, 720]);
    assert_eq!(h.player.state().quality, Some(720));
    assert_eq!(
        h.player.element().calls()[0],
        ElementCall::Load {
            url: "u720".to_string(),
            token: h.player.token(),
        }
    );
    assert_eq!(h.player.phase(), PlayerPhase::Loading);
}

#[test]
fn mount_resumes_stored_position_above_threshold() {
    let mut h = Harness::new();
    h.store
        .set_resume_position("a", 42.0)
        .expect("memory store write should succeed");
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });

    assert!(h.player.element().calls().contains(&ElementCall::Seek(42.0)));
    assert!(!h.player.element().calls().contains(&ElementCall::Play));
    assert_eq!(h.player.state().current_time, 42.0);
}

#[test]
fn mount_ignores_stored_position_near_start() {
    let mut h = Harness::new();
    h.store
        .set_resume_position("a", 0.5)
        .expect("memory store write should succeed");
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });

    assert!(
        !h.player
            .element()
            .calls()
            .iter()
            .any(|call| matches!(call, ElementCall::Seek(_)))
    );
}

#[test]
fn user_gesture_enables_autoplay_for_new_video() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 30.0 });
    assert!(!h.player.element().calls().contains(&ElementCall::Play));

    h.player.note_user_gesture();
    h.mount(two_qualities("b"));
    h.event(MediaEvent::LoadedMetadata { duration: 30.0 });
    assert_eq!(h.player.element().calls().last(), Some(&ElementCall::Play));
}

#[test]
fn switching_video_resets_session_and_starts_at_zero() {
    let mut h = Harness::new();
    h.store
        .set_resume_position("b", 42.0)
        .expect("memory store write should succeed");
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(10.0);
    assert_eq!(h.player.watched_secs(), 10.0);

    h.player.element_mut().take_calls();
    h.mount(two_qualities("b"));
    h.event(MediaEvent::LoadedMetadata { duration: 90.0 });

    assert_eq!(h.player.watched_secs(), 0.0);
    assert_eq!(h.player.state().current_time, 0.0);
    let calls = h.player.element().calls();
    assert!(!calls.iter().any(|call| matches!(call, ElementCall::Seek(_))));
    assert!(calls.contains(&ElementCall::Play));
    let stored_a = h
        .store
        .resume_position("a")
        .expect("memory store read should succeed");
    assert_eq!(stored_a, Some(10.0));
}

#[test]
fn switching_from_a_video_without_source_starts_at_zero() {
    let mut h = Harness::new();
    h.store
        .set_resume_position("b", 42.0)
        .expect("memory store write should succeed");
    h.player.note_user_gesture();
    h.mount(props("a", &[("720", "  ")]));
    assert!(!h.player.has_source());

    h.mount(two_qualities("b"));
    h.event(MediaEvent::LoadedMetadata { duration: 90.0 });

    assert!(h.player.has_source());
    assert_eq!(h.player.state().current_time, 0.0);
    let calls = h.player.element().calls();
    assert!(!calls.iter().any(|call| matches!(call, ElementCall::Seek(_))));
}

#[test]
fn quality_switch_resumes_at_element_time_and_keeps_playing() {
    let mut h = Harness::new();
    let mut p = two_qualities("a");
    p.initial_quality = Some(360);
    h.mount(p);
    h.start_playing(120.0);
    h.play_to(12.0);
    let old_token = h.player.token();
    h.player.element_mut().take_calls();

    h.command(PlayerCommand::SetQuality(720));
    assert_eq!(h.player.state().quality, Some(720));
    assert_ne!(h.player.token(), old_token);
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });

    let calls = h.player.element().calls();
    assert!(matches!(&calls[0], ElementCall::Load { url, .. } if url == "https://cdn.test/v/720.mp4"));
    assert!(calls.contains(&ElementCall::Seek(12.0)));
    assert_eq!(calls.last(), Some(&ElementCall::Play));
    assert_eq!(
        h.store.preferred_quality().expect("memory store read should succeed"),
        Some(720)
    );
}

#[test]
fn stale_events_from_previous_load_are_ignored() {
    let mut h = Harness::new();
    let mut p = two_qualities("a");
    p.initial_quality = Some(360);
    h.mount(p);
    h.start_playing(120.0);
    h.play_to(12.0);
    let old_token = h.player.token();

    h.command(PlayerCommand::SetQuality(720));
    h.event_for(old_token, MediaEvent::TimeUpdate { time: 50.0 });
    h.event_for(old_token, MediaEvent::Ended);

    assert_eq!(h.player.state().current_time, 12.0);
    assert_eq!(h.host.ended, 0);
    assert_eq!(h.player.phase(), PlayerPhase::Loading);
}

#[test]
fn missing_quality_url_reresolves_default() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    assert_eq!(h.player.state().quality, Some(720));

    h.mount(props("a", &[("360", "https://cdn.test/v/360.mp4")]));
    assert_eq!(h.player.state().quality, Some(360));
    assert!(matches!(
        h.player.element().calls().iter().rev().find(|call| matches!(call, ElementCall::Load { .. })),
        Some(ElementCall::Load { url, .. }) if url == "https://cdn.test/v/360.mp4"
    ));
}

#[test]
fn autoplay_rejection_retries_muted_and_marks_forced_mute() {
    let mut h = Harness::new();
    h.player.note_user_gesture();
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 60.0 });
    h.event(MediaEvent::PlayRejected(PlayRejection::NotAllowed));

    assert!(h.player.element().is_muted());
    assert_eq!(h.player.element().calls().last(), Some(&ElementCall::Play));

    h.event(MediaEvent::Playing);
    assert!(h.player.state().forced_muted);
    assert!(!h.player.state().muted);
    assert!(h.player.state().effectively_muted());

    h.command(PlayerCommand::Pause);
    assert!(!h.player.state().forced_muted);
    assert!(!h.player.element().is_muted());
}

#[test]
fn rejected_muted_retry_leaves_player_paused() {
    let mut h = Harness::new();
    h.player.note_user_gesture();
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 60.0 });
    h.event(MediaEvent::PlayRejected(PlayRejection::NotAllowed));
    h.event(MediaEvent::PlayRejected(PlayRejection::NotAllowed));

    let plays = h
        .player
        .element()
        .calls()
        .iter()
        .filter(|call| **call == ElementCall::Play)
        .count();
    assert_eq!(plays, 2);
    assert!(!h.player.state().forced_muted);
    assert!(!h.player.element().is_muted());
    assert!(!h.player.state().is_playing);
    assert!(h.player.controls_visible());
}

#[test]
fn view_is_reported_once_when_eligible() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(40.0);
    h.play_to(14.75);
    assert!(h.host.views.is_empty());

    h.play_to(16.0);
    assert_eq!(h.host.views, vec!["a".to_string()]);
    assert!(h.player.view_sent());

    h.play_to(30.0);
    assert_eq!(h.host.views.len(), 1);
    assert_eq!(
        h.store.last_viewed_ms("a").expect("memory store read should succeed"),
        Some(START_MS + 60 * 250)
    );
}

#[test]
fn second_view_within_cooldown_is_suppressed() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(40.0);
    h.play_to(16.0);
    assert_eq!(h.host.views.len(), 1);

    h.with_env(|player, env| player.teardown(env));
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 40.0 });
    h.event(MediaEvent::Playing);
    assert_eq!(h.player.state().current_time, 16.0);
    h.play_to(32.0);
    assert_eq!(h.host.views.len(), 1);

    h.with_env(|player, env| player.teardown(env));
    h.now_ms += 11 * 60 * 1000;
    h.store
        .set_resume_position("a", 0.0)
        .expect("memory store write should succeed");
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 40.0 });
    h.event(MediaEvent::Playing);
    h.play_to(16.0);
    assert_eq!(h.host.views.len(), 2);
}

#[test]
fn rewatch_from_start_resets_accumulator() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(20.0);
    assert_eq!(h.player.watched_secs(), 20.0);

    h.now_ms += 250;
    h.event(MediaEvent::TimeUpdate { time: 3.0 });
    assert_eq!(h.player.watched_secs(), 0.0);
}

#[test]
fn seeking_to_start_while_paused_resets_accumulator() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(20.0);
    h.event(MediaEvent::Paused);

    h.command(PlayerCommand::SeekTo(0.0));
    h.event(MediaEvent::Seeked { time: 0.0 });
    h.command(PlayerCommand::Play);
    h.event(MediaEvent::Playing);
    h.play_to(3.0);

    assert_eq!(h.player.watched_secs(), 2.75);
}

#[test]
fn replay_after_end_starts_a_fresh_watch_session() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(40.0);
    h.play_to(40.0);
    assert!(h.player.view_sent());
    h.event(MediaEvent::Ended);

    h.command(PlayerCommand::Play);
    h.event(MediaEvent::Seeked { time: 0.0 });
    h.event(MediaEvent::Playing);
    h.play_to(3.0);

    assert_eq!(h.player.watched_secs(), 2.75);
    assert!(!h.player.view_sent());
    assert_eq!(h.host.views.len(), 1);
}

#[test]
fn failed_view_report_is_swallowed() {
    let mut h = Harness::new();
    h.host.fail_views = true;
    h.mount(two_qualities("a"));
    h.start_playing(40.0);
    h.play_to(20.0);

    assert_eq!(h.host.views.len(), 1);
    assert!(h.player.view_sent());
    assert!(h.player.state().is_playing);
}

#[test]
fn ended_clears_resume_and_sends_fallback_view() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(10.0);
    h.play_to(4.0);
    assert!(h.host.views.is_empty());

    h.event(MediaEvent::Ended);
    assert_eq!(h.host.ended, 1);
    assert_eq!(h.host.views, vec!["a".to_string()]);
    assert_eq!(
        h.store.resume_position("a").expect("memory store read should succeed"),
        Some(0.0)
    );
    assert_eq!(h.player.phase(), PlayerPhase::Ended);

    h.command(PlayerCommand::TogglePlay);
    let calls = h.player.element().calls();
    assert_eq!(&calls[calls.len() - 2..], &[ElementCall::Seek(0.0), ElementCall::Play]);
}

#[test]
fn pause_and_hidden_page_persist_resume_position() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(12.5);
    h.event(MediaEvent::Paused);
    assert_eq!(
        h.store.resume_position("a").expect("memory store read should succeed"),
        Some(12.5)
    );

    h.state_time(20.25);
    h.with_env(|player, env| player.set_page_visible(false, env));
    assert_eq!(
        h.store.resume_position("a").expect("memory store read should succeed"),
        Some(20.25)
    );
}

impl Harness {
    fn state_time(&mut self, time: f64) {
        self.event(MediaEvent::TimeUpdate { time });
    }
}

#[test]
fn stall_triggers_single_reload_and_reseek() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.event(MediaEvent::Progress {
        buffered: BufferedRanges::new([(0.0, 10.0)]),
    });
    h.play_to(9.95);
    h.event(MediaEvent::Waiting);
    assert!(h.player.state().is_buffering);
    assert!(h.player.is_timer_scheduled(TimerReason::StallRecovery));

    h.advance(2500);
    assert_eq!(h.loads(), 2);
    assert_eq!(h.player.phase(), PlayerPhase::Stalled { resume: true });

    h.event(MediaEvent::Waiting);
    h.advance(5000);
    assert_eq!(h.loads(), 2);

    h.player.element_mut().take_calls();
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });
    let calls = h.player.element().calls();
    assert_eq!(calls, &[ElementCall::Seek(9.95), ElementCall::Play]);

    h.event(MediaEvent::Playing);
    assert!(!h.player.is_timer_scheduled(TimerReason::StallRecovery));
    assert!(h.player.state().is_playing);
}

#[test]
fn stall_reload_keeps_forced_mute_until_a_user_command() {
    let mut h = Harness::new();
    h.player.note_user_gesture();
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });
    h.event(MediaEvent::PlayRejected(PlayRejection::NotAllowed));
    h.event(MediaEvent::Playing);
    assert!(h.player.state().forced_muted);

    h.event(MediaEvent::Progress {
        buffered: BufferedRanges::new([(0.0, 10.0)]),
    });
    h.play_to(9.95);
    h.event(MediaEvent::Waiting);
    h.advance(2500);
    assert_eq!(h.loads(), 2);

    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });
    assert_eq!(h.player.element().calls().last(), Some(&ElementCall::Play));
    assert!(h.player.state().forced_muted);
    assert!(h.player.element().is_muted());

    h.event(MediaEvent::Playing);
    assert!(h.player.state().forced_muted);
    assert!(h.player.element().is_muted());

    h.command(PlayerCommand::TogglePlay);
    assert!(!h.player.state().forced_muted);
    assert!(!h.player.element().is_muted());
}

#[test]
fn stall_that_resolves_cancels_recovery() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(5.0);
    h.event(MediaEvent::Waiting);
    h.advance(1000);
    h.event(MediaEvent::Playing);
    assert!(!h.player.is_timer_scheduled(TimerReason::StallRecovery));

    h.advance(3000);
    assert_eq!(h.loads(), 1);
}

#[test]
fn unbuffered_seek_while_paused_waits_for_data() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.event(MediaEvent::LoadedMetadata { duration: 120.0 });
    h.event(MediaEvent::Progress {
        buffered: BufferedRanges::new([(0.0, 10.0)]),
    });

    h.command(PlayerCommand::SeekTo(50.0));
    assert_eq!(h.player.element().calls().last(), Some(&ElementCall::Seek(50.0)));
    h.event(MediaEvent::Seeking { target: 50.0 });
    assert!(h.player.is_timer_scheduled(TimerReason::StallRecovery));

    h.event(MediaEvent::Progress {
        buffered: BufferedRanges::new([(0.0, 10.0), (48.0, 60.0)]),
    });
    assert!(!h.player.is_timer_scheduled(TimerReason::StallRecovery));
    h.event(MediaEvent::Seeked { time: 50.0 });
    assert_eq!(h.player.state().buffered_end, 60.0);
}

#[test]
fn missing_source_disables_controls_but_not_navigation() {
    let mut h = Harness::new();
    let mut p = props("a", &[("720", "  ")]);
    p.has_next = true;
    h.mount(p);

    assert!(!h.player.has_source());
    assert_eq!(h.player.phase(), PlayerPhase::Idle);
    h.command(PlayerCommand::Play);
    h.command(PlayerCommand::SeekTo(10.0));
    assert!(h.player.element().calls().is_empty());

    h.command(PlayerCommand::Next);
    h.command(PlayerCommand::Prev);
    assert_eq!(h.host.next, 1);
    assert_eq!(h.host.prev, 0);
}

#[test]
fn controls_hide_while_playing_and_pin_when_paused() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    assert!(h.player.controls_visible());

    h.advance(3000);
    assert!(!h.player.controls_visible());

    h.command(PlayerCommand::PointerActivity);
    assert!(h.player.controls_visible());
    h.event(MediaEvent::Paused);
    h.advance(5000);
    assert!(h.player.controls_visible());
}

#[test]
fn volume_and_mute_commands_update_element() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.command(PlayerCommand::SetVolume(0.4));
    assert_eq!(h.player.element().volume(), 0.4);

    h.command(PlayerCommand::SetVolume(0.0));
    assert!(h.player.state().muted);
    h.command(PlayerCommand::VolumeUp);
    assert!(!h.player.state().muted);
    assert!((h.player.state().volume - 0.1).abs() < 1e-9);

    h.command(PlayerCommand::ToggleMute);
    assert!(h.player.element().is_muted());
    h.command(PlayerCommand::ToggleMute);
    assert!(!h.player.element().is_muted());
}

#[test]
fn fullscreen_failures_degrade_silently() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.player.element_mut().deny_fullscreen(true);
    h.command(PlayerCommand::ToggleFullscreen);
    assert!(!h.player.state().fullscreen_wanted);

    h.player.element_mut().deny_fullscreen(false);
    h.command(PlayerCommand::ToggleFullscreen);
    assert!(h.player.state().fullscreen_wanted);
    assert!(h.player.element().is_fullscreen());
}

#[test]
fn mini_player_routes_return_and_close() {
    let mut h = Harness::new();
    let mut p = two_qualities("a");
    p.is_mini = true;
    h.mount(p);

    h.command(PlayerCommand::ToggleFullscreen);
    assert!(!h.player.state().fullscreen_wanted);
    h.command(PlayerCommand::Return);
    h.command(PlayerCommand::Close);
    assert_eq!(h.host.returned, 1);
    assert_eq!(h.host.closed, 1);
}

#[test]
fn teardown_flushes_position_and_cancels_timers() {
    let mut h = Harness::new();
    h.mount(two_qualities("a"));
    h.start_playing(120.0);
    h.play_to(7.0);
    h.event(MediaEvent::Waiting);

    h.with_env(|player, env| player.teardown(env));
    assert_eq!(h.player.next_timer_due(), None);
    assert!(!h.player.has_source());
    assert_eq!(h.player.element().calls().last(), Some(&ElementCall::Unload));
    assert_eq!(
        h.store.resume_position("a").expect("memory store read should succeed"),
        Some(7.0)
    );
}
