/// Explicit user intents. Everything except pointer movement counts as a
/// user gesture for autoplay purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PlayerCommand {
    TogglePlay,
    Play,
    Pause,
    SeekTo(f64),
    SeekBy(f64),
    SetVolume(f64),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    Unmute,
    SetQuality(u32),
    ToggleFullscreen,
    Next,
    Prev,
    Return,
    Close,
    PointerActivity,
}

impl PlayerCommand {
    pub(crate) fn is_gesture(self) -> bool {
        !matches!(self, Self::PointerActivity)
    }

    /// Navigation works even when nothing is playable.
    pub(crate) fn needs_source(self) -> bool {
        !matches!(
            self,
            Self::Next | Self::Prev | Self::Return | Self::Close | Self::PointerActivity
        )
    }
}

/// Keyboard shortcut table of the watch page.
pub(crate) fn command_for_key(key: &str, seek_step_secs: f64) -> Option<PlayerCommand> {
    let command = match key {
        " " | "space" | "k" | "K" => PlayerCommand::TogglePlay,
        "j" | "J" | "ArrowLeft" | "left" => PlayerCommand::SeekBy(-seek_step_secs),
        "l" | "L" | "ArrowRight" | "right" => PlayerCommand::SeekBy(seek_step_secs),
        "ArrowUp" | "up" => PlayerCommand::VolumeUp,
        "ArrowDown" | "down" => PlayerCommand::VolumeDown,
        "m" | "M" => PlayerCommand::ToggleMute,
        "f" | "F" => PlayerCommand::ToggleFullscreen,
        "N" => PlayerCommand::Next,
        "P" => PlayerCommand::Prev,
        "0" | "Home" | "home" => PlayerCommand::SeekTo(0.0),
        _ => return None,
    };
    Some(command)
}
