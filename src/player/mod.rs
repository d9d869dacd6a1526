//! Headless playback controller for the watch page.
//!
//! The controller owns one [`MediaElement`](media::MediaElement), reconciles it with the requested
//! video/quality/sources, recovers from stalls, persists resume positions
//! through a [`PlaybackStore`] and reports views through a [`PlayerHost`].

mod commands;
mod controller;
mod machine;
mod media;
mod policy;
mod recording;
mod resume;
mod sources;
mod store;
mod timers;
mod watch;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

pub(crate) use commands::{PlayerCommand, command_for_key};
pub(crate) use controller::{PlaybackController, PlayerEnv};
pub(crate) use media::{BufferedRanges, MediaEvent, PlayRejection};
pub(crate) use policy::{PlaybackPolicy, ViewPolicy};
pub(crate) use recording::RecordingElement;
pub(crate) use store::{MemoryStore, PlaybackStore, PlayerHost};
pub(crate) use timers::TimerReason;
pub(crate) use watch::is_view_eligible;

/// What the embedding page asks the player to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlayerProps {
    pub(crate) video_id: String,
    /// Raw rendition labels (`"720"`, `"720p"`) to URLs.
    pub(crate) sources: BTreeMap<String, String>,
    pub(crate) poster: Option<String>,
    pub(crate) available_qualities: Option<Vec<u32>>,
    pub(crate) initial_quality: Option<u32>,
    pub(crate) has_next: bool,
    pub(crate) has_prev: bool,
    pub(crate) is_mini: bool,
}

/// Snapshot of the player as the controls would render it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlaybackState {
    pub(crate) is_ready: bool,
    pub(crate) is_playing: bool,
    pub(crate) is_buffering: bool,
    pub(crate) duration: f64,
    pub(crate) current_time: f64,
    pub(crate) buffered_end: f64,
    pub(crate) quality: Option<u32>,
    pub(crate) volume: f64,
    pub(crate) muted: bool,
    /// Mute imposed by autoplay policy, not chosen by the user.
    pub(crate) forced_muted: bool,
    pub(crate) fullscreen_wanted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_ready: false,
            is_playing: false,
            is_buffering: false,
            duration: 0.0,
            current_time: 0.0,
            buffered_end: 0.0,
            quality: None,
            volume: 1.0,
            muted: false,
            forced_muted: false,
            fullscreen_wanted: false,
        }
    }
}

impl PlaybackState {
    pub(crate) fn effectively_muted(&self) -> bool {
        self.muted || self.forced_muted
    }
}
