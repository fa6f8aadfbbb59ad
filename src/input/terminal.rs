use std::io::{self, Write};
use std::os::fd::{AsFd, OwnedFd};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use nix::sys::termios::{
    tcgetattr, tcsetattr, LocalFlags, SetArg, SpecialCharacterIndices, Termios,
};

/// Puts stdin into cbreak mode and restores the previous mode on drop.
///
/// Canonical line buffering and echo are turned off; `ISIG` stays on so
/// Ctrl-C still raises SIGINT.
pub struct InputModeGuard {
    fd: OwnedFd,
    saved: Termios,
}

impl InputModeGuard {
    pub fn acquire() -> Result<Self> {
        let fd = io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .context("Failed to duplicate stdin")?;
        let saved = tcgetattr(&fd).context("Failed to read terminal attributes")?;

        let mut cbreak = saved.clone();
        cbreak
            .local_flags
            .remove(LocalFlags::ICANON | LocalFlags::ECHO);
        cbreak.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        cbreak.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        tcsetattr(&fd, SetArg::TCSANOW, &cbreak).context("Failed to set cbreak mode")?;

        Ok(Self { fd, saved })
    }
}

impl Drop for InputModeGuard {
    fn drop(&mut self) {
        if let Err(e) = tcsetattr(&self.fd, SetArg::TCSANOW, &self.saved) {
            tracing::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Hides the cursor while the dashboard runs.
///
/// On drop the cursor is shown again and output moves past the last frame,
/// which stays on screen.
pub struct CursorGuard;

impl CursorGuard {
    pub fn acquire() -> Result<Self> {
        execute!(io::stdout(), Hide).context("Failed to hide cursor")?;
        Ok(Self)
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show);
        let _ = writeln!(stdout);
        let _ = stdout.flush();
    }
}
