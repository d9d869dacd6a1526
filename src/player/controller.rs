use tracing::{debug, info, warn};

use super::commands::PlayerCommand;
use super::machine::PlayerPhase;
use super::media::{BufferedRanges, LoadToken, MediaElement, MediaEvent, PlayRejection};
use super::policy::{PlaybackPolicy, secs_to_ms};
use super::resume::{ResumeThrottle, plan_resume_time, should_auto_resume};
use super::sources::{QualitySources, default_quality, selectable_qualities};
use super::store::{PlaybackStore, PlayerHost};
use super::timers::{TimerQueue, TimerReason};
use super::watch::{SampleOutcome, WatchSession, cooldown_elapsed, is_view_eligible};
use super::{PlaybackState, PlayerProps};

/// Everything outside the controller it may touch during one call.
pub(crate) struct PlayerEnv<'a> {
    pub(crate) store: &'a mut dyn PlaybackStore,
    pub(crate) host: &'a mut dyn PlayerHost,
    pub(crate) now_ms: i64,
}

#[derive(Debug, Clone)]
struct LoadedSource {
    video_id: String,
    quality: u32,
    url: String,
}

#[derive(Debug, Clone, Copy)]
struct PendingStart {
    resume_at: f64,
    autoplay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Autoplay {
    Idle,
    Requested(LoadToken),
    RetryingMuted(LoadToken),
}

#[derive(Debug, Clone, Copy)]
struct StallEpisode {
    wanted_time: f64,
    was_playing: bool,
    recovery_attempted: bool,
}

/// Drives one [`MediaElement`] so it reflects the requested video, quality
/// and user intent, and turns its events into resume writes and view reports.
pub(crate) struct PlaybackController<E: MediaElement> {
    element: E,
    policy: PlaybackPolicy,
    props: Option<PlayerProps>,
    sources: QualitySources,
    qualities: Vec<u32>,
    state: PlaybackState,
    phase: PlayerPhase,
    buffered: BufferedRanges,
    token: LoadToken,
    loaded: Option<LoadedSource>,
    pending_start: Option<PendingStart>,
    autoplay: Autoplay,
    stall: Option<StallEpisode>,
    wanted_time: f64,
    session: WatchSession,
    resume: ResumeThrottle,
    timers: TimerQueue,
    user_gesture: bool,
    page_visible: bool,
    controls_visible: bool,
}

impl<E: MediaElement> PlaybackController<E> {
    pub(crate) fn new(element: E, policy: PlaybackPolicy) -> Self {
        Self {
            element,
            policy,
            props: None,
            sources: QualitySources::default(),
            qualities: Vec::new(),
            state: PlaybackState::default(),
            phase: PlayerPhase::Idle,
            buffered: BufferedRanges::default(),
            token: LoadToken::default(),
            loaded: None,
            pending_start: None,
            autoplay: Autoplay::Idle,
            stall: None,
            wanted_time: 0.0,
            session: WatchSession::new(),
            resume: ResumeThrottle::default(),
            timers: TimerQueue::default(),
            user_gesture: false,
            page_visible: true,
            controls_visible: true,
        }
    }

    pub(crate) fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub(crate) fn qualities(&self) -> &[u32] {
        &self.qualities
    }

    pub(crate) fn token(&self) -> LoadToken {
        self.token
    }

    pub(crate) fn has_source(&self) -> bool {
        self.loaded.is_some()
    }

    pub(crate) fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub(crate) fn watched_secs(&self) -> f64 {
        self.session.watched_secs()
    }

    pub(crate) fn view_sent(&self) -> bool {
        self.session.sent_view()
    }

    pub(crate) fn next_timer_due(&self) -> Option<i64> {
        self.timers.next_due()
    }

    pub(crate) fn is_timer_scheduled(&self, reason: TimerReason) -> bool {
        self.timers.is_scheduled(reason)
    }

    pub(crate) fn element(&self) -> &E {
        &self.element
    }

    pub(crate) fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// Records a user gesture that happened outside the player, such as the
    /// click that navigated to the watch page.
    pub(crate) fn note_user_gesture(&mut self) {
        self.user_gesture = true;
    }

    /// Applies new props. The first call mounts the player.
    pub(crate) fn set_props(&mut self, props: PlayerProps, env: &mut PlayerEnv<'_>) {
        let video_changed = self
            .props
            .as_ref()
            .is_some_and(|current| current.video_id != props.video_id);

        self.sources = QualitySources::from_raw(&props.sources);
        self.qualities = selectable_qualities(&self.sources, props.available_qualities.as_deref());
        self.props = Some(props);

        if video_changed {
            self.start_new_session();
        }

        if self.state.quality.is_none_or(|quality| !self.sources.contains(quality)) {
            let quality = self.resolve_default_quality(env);
            debug!(quality, "resolved default quality");
            self.state.quality = Some(quality);
        }

        self.sync_source(video_changed, env);
    }

    pub(crate) fn handle_event(&mut self, token: LoadToken, event: MediaEvent, env: &mut PlayerEnv<'_>) {
        if token != self.token || self.loaded.is_none() {
            debug!(event = event.name(), %token, current = %self.token, "ignoring stale media event");
            return;
        }

        let previous = self.phase;
        self.phase = self.phase.on_event(&event);
        if previous != self.phase {
            debug!(from = previous.label(), to = self.phase.label(), event = event.name(), "phase transition");
        }

        match event {
            MediaEvent::LoadedMetadata { duration } => {
                self.state.duration = duration;
                self.state.is_ready = true;
                self.apply_pending_start(env);
            }
            MediaEvent::DurationChange { duration } => self.state.duration = duration,
            MediaEvent::CanPlay => {
                self.state.is_ready = true;
                self.apply_pending_start(env);
                self.resolve_stall_if_buffered();
            }
            MediaEvent::Playing => self.on_playing(env),
            MediaEvent::Paused => {
                self.persist_resume(env, self.state.current_time);
                self.session.rebase(self.state.current_time, env.now_ms);
                self.show_controls_pinned();
            }
            MediaEvent::Waiting if previous.is_loaded() => {
                self.begin_stall(previous.wants_playback(), env);
            }
            // Browsers also fire `stalled` when an idle paused element stops fetching.
            MediaEvent::Stalled if previous.wants_playback() => self.begin_stall(true, env),
            MediaEvent::Waiting | MediaEvent::Stalled => {}
            MediaEvent::Seeking { target } => {
                self.wanted_time = target;
                self.state.current_time = target;
                if !self.buffered.covers(target, self.state.duration) {
                    self.begin_stall(previous.wants_playback(), env);
                }
            }
            MediaEvent::Seeked { time } => {
                self.state.current_time = time;
                self.state.buffered_end = self.buffered.end_containing(time);
                self.resolve_stall_if_buffered();
            }
            MediaEvent::TimeUpdate { time } => self.on_time_update(time, env),
            MediaEvent::Progress { buffered } => {
                self.buffered = buffered;
                self.state.buffered_end = self.buffered.end_containing(self.state.current_time);
                self.resolve_stall_if_buffered();
            }
            MediaEvent::Ended => self.on_ended(env),
            MediaEvent::PlayRejected(reason) => self.on_play_rejected(reason),
        }
        self.sync_flags();
    }

    pub(crate) fn command(&mut self, command: PlayerCommand, env: &mut PlayerEnv<'_>) {
        if command.needs_source() && self.loaded.is_none() {
            debug!(?command, "no playable source, command ignored");
            return;
        }
        if command.is_gesture() {
            self.user_gesture = true;
        }
        self.on_pointer_activity(env);

        match command {
            PlayerCommand::TogglePlay => {
                self.clear_forced_mute();
                if self.phase.wants_playback() {
                    self.pause();
                } else {
                    self.play();
                }
            }
            PlayerCommand::Play => {
                self.clear_forced_mute();
                self.play();
            }
            PlayerCommand::Pause => {
                self.clear_forced_mute();
                self.pause();
            }
            PlayerCommand::SeekTo(time) => self.seek_to(time),
            PlayerCommand::SeekBy(delta) => self.seek_to(self.state.current_time + delta),
            PlayerCommand::SetVolume(volume) => self.set_volume(volume),
            PlayerCommand::VolumeUp => self.set_volume(self.state.volume + self.policy.volume_step),
            PlayerCommand::VolumeDown => self.set_volume(self.state.volume - self.policy.volume_step),
            PlayerCommand::ToggleMute => {
                if self.state.forced_muted {
                    self.state.muted = false;
                    self.clear_forced_mute();
                } else {
                    self.state.muted = !self.state.muted;
                    self.element.set_muted(self.state.muted);
                }
            }
            PlayerCommand::Unmute => {
                self.state.muted = false;
                self.state.forced_muted = false;
                self.element.set_muted(false);
            }
            PlayerCommand::SetQuality(quality) => self.set_quality(quality, env),
            PlayerCommand::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerCommand::Next => {
                if self.props.as_ref().is_some_and(|props| props.has_next) {
                    env.host.on_next();
                }
            }
            PlayerCommand::Prev => {
                if self.props.as_ref().is_some_and(|props| props.has_prev) {
                    env.host.on_prev();
                }
            }
            PlayerCommand::Return => {
                if self.is_mini() {
                    env.host.on_return();
                }
            }
            PlayerCommand::Close => {
                if self.is_mini() {
                    env.host.on_close();
                }
            }
            PlayerCommand::PointerActivity => {}
        }
        self.sync_flags();
    }

    /// Fires every timer due at `env.now_ms`.
    pub(crate) fn tick(&mut self, env: &mut PlayerEnv<'_>) {
        for reason in self.timers.take_due(env.now_ms) {
            match reason {
                TimerReason::StallRecovery => self.recover_stall(env),
                TimerReason::ControlsHide => {
                    if self.phase.is_playing() {
                        self.controls_visible = false;
                    }
                }
            }
        }
        self.sync_flags();
    }

    pub(crate) fn set_page_visible(&mut self, visible: bool, env: &mut PlayerEnv<'_>) {
        if self.page_visible && !visible && self.loaded.is_some() {
            self.persist_resume(env, self.state.current_time);
        }
        self.page_visible = visible;
    }

    /// Unmount: flush the resume position and drop everything tied to the
    /// current load.
    pub(crate) fn teardown(&mut self, env: &mut PlayerEnv<'_>) {
        if self.loaded.is_some() && self.phase.is_loaded() {
            self.persist_resume(env, self.state.current_time);
        }
        self.detach_load();
        if self.loaded.take().is_some() {
            self.element.unload();
        }
        self.token = self.token.next();
        self.phase = PlayerPhase::Idle;
        self.session = WatchSession::new();
        self.resume.reset();
        self.timers.clear();
        self.state.is_ready = false;
        self.sync_flags();
    }

    fn is_mini(&self) -> bool {
        self.props.as_ref().is_some_and(|props| props.is_mini)
    }

    fn video_id(&self) -> Option<&str> {
        self.props.as_ref().map(|props| props.video_id.as_str())
    }

    fn resolve_default_quality(&self, env: &PlayerEnv<'_>) -> u32 {
        let preferred = env.store.preferred_quality().unwrap_or_else(|err| {
            warn!("failed to read preferred quality: {err:#}");
            None
        });
        let initial = self.props.as_ref().and_then(|props| props.initial_quality);
        default_quality(
            &self.sources,
            &self.qualities,
            preferred,
            initial,
            self.policy.fallback_quality,
        )
    }

    fn start_new_session(&mut self) {
        self.session = WatchSession::new();
        self.resume.reset();
        self.state.duration = 0.0;
        self.state.current_time = 0.0;
        self.state.buffered_end = 0.0;
    }

    /// Loads the URL for the selected quality unless it is already loaded.
    fn sync_source(&mut self, video_changed: bool, env: &mut PlayerEnv<'_>) {
        let Some(video_id) = self.video_id().map(str::to_string) else {
            return;
        };
        let url = self
            .state
            .quality
            .and_then(|quality| self.sources.url(quality))
            .map(str::to_string);
        let Some(url) = url else {
            self.enter_no_source(env);
            return;
        };
        let unchanged = self
            .loaded
            .as_ref()
            .is_some_and(|loaded| loaded.video_id == video_id && loaded.url == url);
        if !unchanged {
            self.load_source(video_id, url, video_changed, env);
        }
    }

    /// `video_changed` comes from the props, so it holds even when the
    /// previous video never had a playable source.
    fn load_source(
        &mut self,
        video_id: String,
        url: String,
        video_changed: bool,
        env: &mut PlayerEnv<'_>,
    ) {
        let previous = self.loaded.take();
        let element_time = self.element.current_time();
        let was_playing = self.phase.wants_playback();
        let video_changed =
            video_changed || previous.as_ref().is_some_and(|prev| prev.video_id != video_id);
        let same_video =
            !video_changed && previous.as_ref().is_some_and(|prev| prev.video_id == video_id);

        if let Some(prev) = &previous
            && self.phase.is_loaded()
        {
            self.write_resume(env, &prev.video_id, element_time);
        }
        self.detach_load();

        let stored = if video_changed {
            None
        } else {
            env.store.resume_position(&video_id).unwrap_or_else(|err| {
                warn!(video_id = %video_id, "failed to read resume position: {err:#}");
                None
            })
        };
        let resume_at = plan_resume_time(
            video_changed,
            stored,
            element_time,
            self.policy.resume_threshold_secs,
        );
        let autoplay = should_auto_resume(same_video, was_playing, self.user_gesture);

        self.token = self.token.next();
        info!(
            video_id = %video_id,
            quality = ?self.state.quality,
            token = %self.token,
            resume_at,
            autoplay,
            "loading source"
        );
        self.element.load(&url, self.token);
        self.element.set_volume(self.state.volume);
        self.element.set_muted(self.state.muted || self.state.forced_muted);

        self.loaded = Some(LoadedSource {
            video_id,
            quality: self.state.quality.unwrap_or(self.policy.fallback_quality),
            url,
        });
        self.phase = self.phase.on_load();
        self.state.is_ready = false;
        self.state.current_time = resume_at;
        self.wanted_time = resume_at;
        self.pending_start = Some(PendingStart {
            resume_at,
            autoplay,
        });
        self.resume.record(resume_at, env.now_ms);
        self.session.rebase(resume_at, env.now_ms);
        self.controls_visible = true;
    }

    /// Drops listeners-equivalent state belonging to the current load.
    fn detach_load(&mut self) {
        self.timers.cancel(TimerReason::StallRecovery);
        self.stall = None;
        self.autoplay = Autoplay::Idle;
        self.pending_start = None;
        self.buffered = BufferedRanges::default();
    }

    fn enter_no_source(&mut self, env: &mut PlayerEnv<'_>) {
        if let Some(prev) = self.loaded.take() {
            warn!(video_id = %prev.video_id, "no playable source for selected quality");
            if self.phase.is_loaded() {
                self.write_resume(env, &prev.video_id, self.state.current_time);
            }
            self.element.unload();
        }
        self.detach_load();
        self.token = self.token.next();
        self.phase = PlayerPhase::Idle;
        self.state.is_ready = false;
        self.show_controls_pinned();
    }

    fn apply_pending_start(&mut self, env: &mut PlayerEnv<'_>) {
        let Some(start) = self.pending_start.take() else {
            return;
        };
        if start.resume_at > 0.0 {
            self.element.seek(start.resume_at);
        }
        self.state.current_time = start.resume_at;
        self.session.rebase(start.resume_at, env.now_ms);
        if start.autoplay {
            self.play();
        }
    }

    /// Starts playback without counting as a user gesture; callers acting on
    /// a command clear the forced mute first.
    fn play(&mut self) {
        if self.phase == PlayerPhase::Ended {
            self.element.seek(0.0);
            self.wanted_time = 0.0;
        }
        self.autoplay = Autoplay::Requested(self.token);
        self.element.play();
    }

    fn pause(&mut self) {
        self.autoplay = Autoplay::Idle;
        self.element.pause();
    }

    fn seek_to(&mut self, time: f64) {
        self.clear_forced_mute();
        let upper = if self.state.duration > 0.0 && self.state.duration.is_finite() {
            self.state.duration
        } else {
            f64::MAX
        };
        let time = time.clamp(0.0, upper);
        self.wanted_time = time;
        if self.pending_start.is_some() {
            // Metadata is not in yet; start from the requested point instead.
            if let Some(start) = self.pending_start.as_mut() {
                start.resume_at = time;
            }
            return;
        }
        self.element.seek(time);
    }

    fn set_volume(&mut self, volume: f64) {
        self.clear_forced_mute();
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.element.set_volume(volume);
        let muted = volume <= 0.0;
        if muted != self.state.muted {
            self.state.muted = muted;
            self.element.set_muted(muted);
        }
    }

    fn set_quality(&mut self, quality: u32, env: &mut PlayerEnv<'_>) {
        self.clear_forced_mute();
        if !self.sources.contains(quality) {
            debug!(quality, "quality has no source, ignored");
            return;
        }
        if let Err(err) = env.store.set_preferred_quality(quality) {
            warn!(quality, "failed to remember preferred quality: {err:#}");
        }
        if self.loaded.as_ref().is_some_and(|loaded| loaded.quality == quality) {
            return;
        }
        self.state.quality = Some(quality);
        self.sync_source(false, env);
    }

    fn toggle_fullscreen(&mut self) {
        if self.is_mini() {
            debug!("fullscreen unavailable in mini player");
            return;
        }
        let wanted = !self.state.fullscreen_wanted;
        let result = if wanted {
            self.element.request_fullscreen()
        } else {
            self.element.exit_fullscreen()
        };
        match result {
            Ok(()) => self.state.fullscreen_wanted = wanted,
            Err(err) => debug!("fullscreen toggle failed: {err:#}"),
        }
    }

    fn clear_forced_mute(&mut self) {
        if self.state.forced_muted {
            self.state.forced_muted = false;
            self.element.set_muted(self.state.muted);
        }
    }

    fn on_playing(&mut self, env: &mut PlayerEnv<'_>) {
        if self.autoplay == Autoplay::RetryingMuted(self.token) {
            info!("autoplay succeeded muted");
            self.state.forced_muted = true;
        }
        self.autoplay = Autoplay::Idle;
        self.pending_start = None;
        self.resolve_stall();
        self.session.rebase(self.state.current_time, env.now_ms);
        self.schedule_controls_hide(env);
    }

    fn on_play_rejected(&mut self, reason: PlayRejection) {
        match (self.autoplay, reason) {
            (Autoplay::Requested(token), PlayRejection::NotAllowed) if token == self.token => {
                info!("autoplay blocked, retrying muted");
                self.autoplay = Autoplay::RetryingMuted(token);
                self.element.set_muted(true);
                self.element.play();
            }
            (Autoplay::RetryingMuted(_), reason) => {
                debug!(?reason, "muted autoplay retry rejected, staying paused");
                self.autoplay = Autoplay::Idle;
                self.element.set_muted(self.state.muted);
                self.show_controls_pinned();
            }
            (_, reason) => {
                debug!(?reason, "play request rejected");
                self.autoplay = Autoplay::Idle;
                self.show_controls_pinned();
            }
        }
    }

    fn on_time_update(&mut self, time: f64, env: &mut PlayerEnv<'_>) {
        self.state.current_time = time;
        self.state.buffered_end = self.buffered.end_containing(time);
        if self.stall.is_none() {
            self.wanted_time = time;
        }

        if !self.phase.is_playing() {
            self.session.rebase(time, env.now_ms);
            return;
        }

        if let SampleOutcome::Restarted = self.session.observe(time, env.now_ms, &self.policy.view) {
            debug!(time, "playback restarted near the beginning, watch session reset");
        }
        self.maybe_send_view(false, env);

        if self.resume.should_write(time, env.now_ms, &self.policy) {
            self.persist_resume(env, time);
        }
    }

    fn on_ended(&mut self, env: &mut PlayerEnv<'_>) {
        self.autoplay = Autoplay::Idle;
        self.resolve_stall();
        if let Some(video_id) = self.video_id().map(str::to_string) {
            self.write_resume(env, &video_id, 0.0);
        }
        self.maybe_send_view(true, env);
        self.show_controls_pinned();
        env.host.on_ended();
    }

    fn maybe_send_view(&mut self, at_end: bool, env: &mut PlayerEnv<'_>) {
        if self.session.sent_view() {
            return;
        }
        let watched = self.session.watched_secs();
        let eligible = if at_end {
            watched > 0.0
        } else {
            is_view_eligible(self.state.duration, watched, &self.policy.view)
        };
        if !eligible {
            return;
        }
        let Some(video_id) = self.video_id().map(str::to_string) else {
            return;
        };

        let last_sent = env.store.last_viewed_ms(&video_id).unwrap_or_else(|err| {
            warn!(video_id = %video_id, "failed to read last view time: {err:#}");
            None
        });
        if !cooldown_elapsed(last_sent, env.now_ms, &self.policy.view) {
            return;
        }

        self.session.mark_sent();
        if let Err(err) = env.store.set_last_viewed_ms(&video_id, env.now_ms) {
            warn!(video_id = %video_id, "failed to record view time: {err:#}");
        }
        info!(video_id = %video_id, watched, at_end, "reporting view");
        if let Err(err) = env.host.on_view(&video_id) {
            warn!(video_id = %video_id, "view report failed: {err:#}");
        }
    }

    fn begin_stall(&mut self, was_playing: bool, env: &mut PlayerEnv<'_>) {
        if self.stall.is_some() {
            return;
        }
        let wanted_time = self.wanted_time;
        debug!(wanted_time, was_playing, "stall episode started");
        self.stall = Some(StallEpisode {
            wanted_time,
            was_playing,
            recovery_attempted: false,
        });
        let due = env.now_ms + secs_to_ms(self.policy.stall_recovery_delay_secs);
        self.timers.schedule(TimerReason::StallRecovery, due);
    }

    fn resolve_stall_if_buffered(&mut self) {
        if let Some(stall) = self.stall
            && self.buffered.covers(stall.wanted_time, self.state.duration)
        {
            self.resolve_stall();
        }
    }

    fn resolve_stall(&mut self) {
        if self.stall.take().is_some() {
            debug!("stall episode resolved");
        }
        self.timers.cancel(TimerReason::StallRecovery);
    }

    fn recover_stall(&mut self, env: &mut PlayerEnv<'_>) {
        let Some(mut stall) = self.stall else {
            return;
        };
        if stall.recovery_attempted {
            return;
        }
        if self.buffered.covers(stall.wanted_time, self.state.duration) {
            self.resolve_stall();
            return;
        }
        let Some(loaded) = self.loaded.clone() else {
            return;
        };

        warn!(
            video_id = %loaded.video_id,
            wanted_time = stall.wanted_time,
            "playback stalled, reloading source"
        );
        stall.recovery_attempted = true;
        self.stall = Some(stall);
        self.autoplay = Autoplay::Idle;
        self.buffered = BufferedRanges::default();
        self.token = self.token.next();
        self.element.load(&loaded.url, self.token);
        self.element.set_volume(self.state.volume);
        self.element.set_muted(self.state.muted || self.state.forced_muted);
        self.phase = PlayerPhase::Stalled {
            resume: stall.was_playing,
        };
        self.pending_start = Some(PendingStart {
            resume_at: stall.wanted_time,
            autoplay: stall.was_playing,
        });
    }

    fn on_pointer_activity(&mut self, env: &PlayerEnv<'_>) {
        self.controls_visible = true;
        self.schedule_controls_hide(env);
    }

    fn schedule_controls_hide(&mut self, env: &PlayerEnv<'_>) {
        if self.phase.is_playing() {
            let due = env.now_ms + secs_to_ms(self.policy.controls_hide_delay_secs);
            self.timers.schedule(TimerReason::ControlsHide, due);
        }
    }

    fn show_controls_pinned(&mut self) {
        self.controls_visible = true;
        self.timers.cancel(TimerReason::ControlsHide);
    }

    fn persist_resume(&mut self, env: &mut PlayerEnv<'_>, time: f64) {
        if let Some(video_id) = self.video_id().map(str::to_string) {
            self.write_resume(env, &video_id, time);
        }
    }

    fn write_resume(&mut self, env: &mut PlayerEnv<'_>, video_id: &str, time: f64) {
        if !time.is_finite() || time < 0.0 {
            return;
        }
        if let Err(err) = env.store.set_resume_position(video_id, time) {
            warn!(video_id = %video_id, "failed to store resume position: {err:#}");
        }
        self.resume.record(time, env.now_ms);
    }

    fn sync_flags(&mut self) {
        self.state.is_playing = self.phase.is_playing();
        self.state.is_buffering = self.phase.is_buffering();
        if !self.phase.is_loaded() && self.phase != PlayerPhase::Loading {
            self.state.is_ready = false;
        }
    }
}
