//! Playback phases and the transitions media events drive between them.

use super::media::MediaEvent;

/// Where the controller believes the element is.
///
/// `Buffering` and `Stalled` remember whether playback should continue once
/// data arrives, which the element itself does not tell us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PlayerPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Buffering {
        resume: bool,
    },
    Stalled {
        resume: bool,
    },
    Ended,
}

impl PlayerPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Buffering { .. } => "buffering",
            Self::Stalled { .. } => "stalled",
            Self::Ended => "ended",
        }
    }

    pub(crate) fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub(crate) fn is_buffering(self) -> bool {
        matches!(self, Self::Buffering { .. } | Self::Stalled { .. })
    }

    /// Playing now, or will be once buffering clears.
    pub(crate) fn wants_playback(self) -> bool {
        match self {
            Self::Playing => true,
            Self::Buffering { resume } | Self::Stalled { resume } => resume,
            _ => false,
        }
    }

    pub(crate) fn is_loaded(self) -> bool {
        !matches!(self, Self::Idle | Self::Loading)
    }

    pub(crate) fn on_load(self) -> Self {
        Self::Loading
    }

    pub(crate) fn on_event(self, event: &MediaEvent) -> Self {
        match (self, event) {
            (Self::Idle, _) => Self::Idle,

            (_, MediaEvent::Playing) => Self::Playing,
            (_, MediaEvent::Ended) => Self::Ended,

            (Self::Loading, MediaEvent::LoadedMetadata { .. } | MediaEvent::CanPlay) => Self::Ready,
            (Self::Loading, _) => Self::Loading,

            (_, MediaEvent::Paused) => Self::Paused,

            (phase, MediaEvent::Waiting) => Self::Buffering {
                resume: phase.wants_playback(),
            },
            (Self::Playing | Self::Buffering { .. }, MediaEvent::Stalled) => Self::Stalled {
                resume: self.wants_playback(),
            },

            (Self::Buffering { resume: false } | Self::Stalled { resume: false }, MediaEvent::CanPlay) => {
                Self::Paused
            }
            (Self::Buffering { resume: false } | Self::Stalled { resume: false }, MediaEvent::Seeked { .. }) => {
                Self::Paused
            }

            (Self::Ended, MediaEvent::Seeking { .. }) => Self::Paused,

            (Self::Playing | Self::Buffering { .. } | Self::Stalled { .. }, MediaEvent::PlayRejected(_)) => {
                Self::Paused
            }

            (phase, _) => phase,
        }
    }
}
