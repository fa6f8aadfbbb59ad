//! Credential renewal by briefly running Claude Code.
//!
//! Starting `claude` makes it refresh its OAuth token and write the new one
//! back to the credential store. The process is stopped after a fixed wait
//! so the dashboard never blocks on it indefinitely.

use std::io;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use super::{RenewalTrigger, SourceError};

/// How long the helper may run before it is asked to exit
pub const DEFAULT_RENEW_WAIT: Duration = Duration::from_secs(8);

/// How long to wait after SIGTERM before killing the helper
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Sleep granularity while waiting on the helper
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Runs `claude --print ""` to renew the stored OAuth token
pub struct ClaudeRenewal {
    program: String,
    args: Vec<String>,
    wait: Duration,
    /// Returns true when the wait should be cut short (e.g. on SIGINT)
    cancelled: Option<fn() -> bool>,
}

impl ClaudeRenewal {
    /// Create a renewal trigger that lets the helper run for `wait`
    pub fn new(wait: Duration) -> Self {
        Self {
            program: "claude".to_string(),
            args: vec!["--print".to_string(), String::new()],
            wait,
            cancelled: None,
        }
    }

    /// Run a different helper command
    pub fn with_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    /// Stop waiting early when `cancelled` returns true
    pub fn with_cancel(mut self, cancelled: fn() -> bool) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_some_and(|f| f())
    }

    /// Wait up to `limit` for the child to exit on its own
    fn wait_for_exit(&self, child: &mut Child, limit: Duration) -> io::Result<bool> {
        let start = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                return Ok(true);
            }
            if start.elapsed() >= limit || self.is_cancelled() {
                return Ok(false);
            }
            std::thread::sleep(WAIT_SLICE.min(limit.saturating_sub(start.elapsed())));
        }
    }

    /// SIGTERM, then SIGKILL if the helper ignores it
    fn stop(&self, child: &mut Child) -> io::Result<()> {
        let pid = Pid::from_raw(child.id() as i32);
        if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
            debug!("SIGTERM to renewal helper failed: {}", e);
        }

        let start = Instant::now();
        while start.elapsed() < TERMINATE_GRACE {
            if child.try_wait()?.is_some() {
                return Ok(());
            }
            std::thread::sleep(WAIT_SLICE);
        }

        warn!("Renewal helper ignored SIGTERM, killing it");
        child.kill()?;
        child.wait().map(|_| ())
    }
}

impl RenewalTrigger for ClaudeRenewal {
    fn renew(&self) -> Result<(), SourceError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => SourceError::Environment(format!(
                    "'{}' command not found. Is it installed?",
                    self.program
                )),
                _ => SourceError::Environment(format!("Cannot start '{}': {}", self.program, e)),
            })?;

        info!("Renewal: started {} (pid {})", self.program, child.id());

        let exited = self
            .wait_for_exit(&mut child, self.wait)
            .map_err(|e| SourceError::Transport(format!("Renewal helper failed: {}", e)))?;
        if !exited {
            self.stop(&mut child)
                .map_err(|e| SourceError::Transport(format!("Cannot stop renewal helper: {}", e)))?;
        }

        info!("Renewal: finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_environment_error() {
        let renewal = ClaudeRenewal::new(Duration::from_millis(10))
            .with_command("usagedash-no-such-helper", vec![]);
        let err = renewal.renew().unwrap_err();
        assert!(err.is_permanent());
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_that_exits_quickly() {
        let renewal = ClaudeRenewal::new(Duration::from_secs(5)).with_command("true", vec![]);
        let start = Instant::now();
        assert!(renewal.renew().is_ok());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_long_running_helper_is_terminated() {
        let renewal = ClaudeRenewal::new(Duration::from_millis(200))
            .with_command("sleep", vec!["30".to_string()]);
        let start = Instant::now();
        assert!(renewal.renew().is_ok());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_cuts_wait_short() {
        fn always() -> bool {
            true
        }
        let renewal = ClaudeRenewal::new(Duration::from_secs(60))
            .with_command("sleep", vec!["30".to_string()])
            .with_cancel(always);
        let start = Instant::now();
        assert!(renewal.renew().is_ok());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
