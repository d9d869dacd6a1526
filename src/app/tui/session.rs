use std::io;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::debug;

/// Owns the terminal while the video browser runs. `leave` hands it back;
/// dropping the session without leaving restores it too.
pub(super) struct TuiSession {
    restored: bool,
}

impl TuiSession {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("could not switch the terminal to raw mode")?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("could not open the alternate screen");
        }
        Ok(Self { restored: false })
    }

    pub(super) fn leave(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        restore_terminal()
    }
}

/// Attempts both steps even if the first fails.
fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("could not leave raw mode");
    let screen = execute!(io::stdout(), LeaveAlternateScreen)
        .context("could not close the alternate screen");
    raw.and(screen)
}

impl Drop for TuiSession {
    fn drop(&mut self) {
        if !self.restored
            && let Err(err) = restore_terminal()
        {
            debug!("terminal restore on drop failed: {err:#}");
        }
    }
}
