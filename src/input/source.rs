use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use super::signals;

/// Why a byte source stopped waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Byte(u8),
    TimedOut,
    Resized,
    Interrupted,
}

/// Bounded wait for the next input byte or signal
pub trait ByteSource {
    /// Block for at most `timeout`
    fn wait(&mut self, timeout: Duration) -> io::Result<Wake>;
}

/// Milliseconds for one `poll(2)` call, rounded up so short waits never spin
fn poll_millis(remaining: Duration) -> u16 {
    let millis = remaining.as_micros().div_ceil(1000);
    millis.clamp(1, u16::MAX as u128) as u16
}

fn remaining(deadline: Instant) -> Option<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    (!left.is_zero()).then_some(left)
}

/// Poll `input` (if any) together with the signal wake-up socket.
///
/// Returns whether `input` has something to read (data, hangup or error).
fn poll_with_signals(input: Option<BorrowedFd<'_>>, left: Duration) -> nix::Result<bool> {
    let wake = signals::wake_fd();
    let mut fds = Vec::with_capacity(2);
    if let Some(fd) = input {
        fds.push(PollFd::new(fd, PollFlags::POLLIN));
    }
    if let Some(fd) = wake {
        fds.push(PollFd::new(fd, PollFlags::POLLIN));
    }

    poll(&mut fds, PollTimeout::from(poll_millis(left)))?;

    let woken = wake.is_some()
        && fds
            .last()
            .and_then(|fd| fd.revents())
            .is_some_and(|r| r.contains(PollFlags::POLLIN));
    if woken {
        signals::drain_wakeups();
    }
    Ok(input.is_some() && fds[0].revents().is_some_and(|r| !r.is_empty()))
}

/// Flags set by the signal handlers, interrupt first
fn pending_signal() -> Option<Wake> {
    if signals::interrupted() {
        Some(Wake::Interrupted)
    } else if signals::take_resize() {
        Some(Wake::Resized)
    } else {
        None
    }
}

/// Reads single bytes from the controlling terminal.
///
/// Uses its own duplicate of the stdin descriptor so no userspace
/// buffering can hide bytes from `poll(2)`.
pub struct TtySource {
    input: Option<File>,
}

impl TtySource {
    pub fn from_stdin() -> io::Result<Self> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self {
            input: Some(File::from(fd)),
        })
    }

    fn read_byte(file: &mut File) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match file.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl ByteSource for TtySource {
    fn wait(&mut self, timeout: Duration) -> io::Result<Wake> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(wake) = pending_signal() {
                return Ok(wake);
            }
            let Some(left) = remaining(deadline) else {
                return Ok(Wake::TimedOut);
            };

            // after end of file only signals and the deadline are watched
            let input = self.input.as_ref().map(|f| f.as_fd());
            match poll_with_signals(input, left) {
                Ok(false) | Err(Errno::EINTR) => continue,
                Ok(true) => {}
                Err(e) => return Err(e.into()),
            }

            let Some(file) = self.input.as_mut() else {
                continue;
            };
            match Self::read_byte(file)? {
                Some(byte) => return Ok(Wake::Byte(byte)),
                None => {
                    tracing::debug!("stdin closed, input disabled");
                    self.input = None;
                }
            }
        }
    }
}

/// Wait source for non-interactive runs: never reads input and ignores resizes
#[derive(Debug, Default)]
pub struct TimerSource;

impl ByteSource for TimerSource {
    fn wait(&mut self, timeout: Duration) -> io::Result<Wake> {
        let deadline = Instant::now() + timeout;
        loop {
            if signals::interrupted() {
                return Ok(Wake::Interrupted);
            }
            let Some(left) = remaining(deadline) else {
                return Ok(Wake::TimedOut);
            };
            match poll_with_signals(None, left) {
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
