use std::fmt;

use anyhow::Result;

/// Identity of one load of one source. Events captured under an older token
/// belong to a superseded load and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct LoadToken(u64);

impl LoadToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlayRejection {
    /// Autoplay policy: playback needs a user gesture or a muted element.
    NotAllowed,
    /// The pending play was interrupted by a pause or a new load.
    Aborted,
    Other(String),
}

/// Normalized media-element notifications.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MediaEvent {
    LoadedMetadata { duration: f64 },
    DurationChange { duration: f64 },
    CanPlay,
    Playing,
    Paused,
    Waiting,
    Stalled,
    Seeking { target: f64 },
    Seeked { time: f64 },
    TimeUpdate { time: f64 },
    Progress { buffered: BufferedRanges },
    Ended,
    PlayRejected(PlayRejection),
}

impl MediaEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::LoadedMetadata { .. } => "loadedmetadata",
            Self::DurationChange { .. } => "durationchange",
            Self::CanPlay => "canplay",
            Self::Playing => "playing",
            Self::Paused => "pause",
            Self::Waiting => "waiting",
            Self::Stalled => "stalled",
            Self::Seeking { .. } => "seeking",
            Self::Seeked { .. } => "seeked",
            Self::TimeUpdate { .. } => "timeupdate",
            Self::Progress { .. } => "progress",
            Self::Ended => "ended",
            Self::PlayRejected(_) => "play-rejected",
        }
    }
}

const BUFFER_EDGE_SECS: f64 = 0.1;

/// Buffered time ranges reported by the element, sorted by start.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BufferedRanges(Vec<(f64, f64)>);

impl BufferedRanges {
    pub(crate) fn new(ranges: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut ranges: Vec<(f64, f64)> = ranges
            .into_iter()
            .filter(|(start, end)| start.is_finite() && end.is_finite() && end > start)
            .collect();
        ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self(ranges)
    }

    pub(crate) fn ranges(&self) -> &[(f64, f64)] {
        &self.0
    }

    /// Whether playback at `time` has data to go on. A range that reaches the
    /// end of the media covers everything up to that end.
    pub(crate) fn covers(&self, time: f64, duration: f64) -> bool {
        self.0.iter().any(|&(start, end)| {
            let reaches_end = duration > 0.0 && end >= duration - BUFFER_EDGE_SECS;
            time >= start - BUFFER_EDGE_SECS
                && (time < end - BUFFER_EDGE_SECS || (reaches_end && time <= end))
        })
    }

    pub(crate) fn end_containing(&self, time: f64) -> f64 {
        self.0
            .iter()
            .find(|&&(start, end)| time >= start - BUFFER_EDGE_SECS && time <= end)
            .map(|&(_, end)| end)
            .unwrap_or(time)
    }
}

/// The single playback surface the controller owns.
///
/// `play` is asynchronous: its outcome comes back later as either
/// [`MediaEvent::Playing`] or [`MediaEvent::PlayRejected`].
pub(crate) trait MediaElement {
    fn load(&mut self, url: &str, token: LoadToken);
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, time: f64);
    fn current_time(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn request_fullscreen(&mut self) -> Result<()>;
    fn exit_fullscreen(&mut self) -> Result<()>;
}
