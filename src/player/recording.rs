use std::fmt;

use anyhow::{Result, bail};

use super::media::{LoadToken, MediaElement};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElementCall {
    Load { url: String, token: LoadToken },
    Unload,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
    RequestFullscreen,
    ExitFullscreen,
}

impl fmt::Display for ElementCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { url, token } => write!(f, "load {url} ({token})"),
            Self::Unload => write!(f, "unload"),
            Self::Play => write!(f, "play"),
            Self::Pause => write!(f, "pause"),
            Self::Seek(time) => write!(f, "seek {time:.2}s"),
            Self::SetVolume(volume) => write!(f, "volume {volume:.2}"),
            Self::SetMuted(muted) => write!(f, "muted {muted}"),
            Self::RequestFullscreen => write!(f, "fullscreen on"),
            Self::ExitFullscreen => write!(f, "fullscreen off"),
        }
    }
}

/// Media element stand-in that records every call and keeps just enough
/// state (clock, mute, fullscreen) for the controller to query back.
#[derive(Debug, Default)]
pub(crate) struct RecordingElement {
    calls: Vec<ElementCall>,
    current_time: f64,
    muted: bool,
    volume: f64,
    fullscreen: bool,
    fullscreen_denied: bool,
}

impl RecordingElement {
    pub(crate) fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    pub(crate) fn deny_fullscreen(&mut self, denied: bool) {
        self.fullscreen_denied = denied;
    }

    /// Mirrors the element clock advancing on its own during playback.
    pub(crate) fn set_current_time(&mut self, time: f64) {
        self.current_time = time;
    }

    #[cfg(test)]
    pub(crate) fn calls(&self) -> &[ElementCall] {
        &self.calls
    }

    pub(crate) fn take_calls(&mut self) -> Vec<ElementCall> {
        std::mem::take(&mut self.calls)
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn volume(&self) -> f64 {
        self.volume
    }

    pub(crate) fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

impl MediaElement for RecordingElement {
    fn load(&mut self, url: &str, token: LoadToken) {
        self.current_time = 0.0;
        self.calls.push(ElementCall::Load {
            url: url.to_string(),
            token,
        });
    }

    fn unload(&mut self) {
        self.current_time = 0.0;
        self.calls.push(ElementCall::Unload);
    }

    fn play(&mut self) {
        self.calls.push(ElementCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(ElementCall::Pause);
    }

    fn seek(&mut self, time: f64) {
        self.current_time = time;
        self.calls.push(ElementCall::Seek(time));
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.calls.push(ElementCall::SetVolume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.calls.push(ElementCall::SetMuted(muted));
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        if self.fullscreen_denied {
            bail!("fullscreen request denied");
        }
        self.fullscreen = true;
        self.calls.push(ElementCall::RequestFullscreen);
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.fullscreen = false;
        self.calls.push(ElementCall::ExitFullscreen);
        Ok(())
    }
}
