//! Process signals delivered as flags into the input wait.
//!
//! Handlers store to atomics and write one byte to a wake-up socket. Every
//! wait polls that socket alongside stdin, so a signal landing between the
//! flag check and `poll(2)` still ends the wait at once.

use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd, IntoRawFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::OnceLock;

use nix::errno::Errno;
use nix::libc::{self, c_int, c_void};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Read end of the wake-up socket
static WAKE_READ: OnceLock<UnixStream> = OnceLock::new();
/// Raw write end used by the handlers; -1 until installed
static WAKE_WRITE: AtomicI32 = AtomicI32::new(-1);

fn notify() {
    let fd = WAKE_WRITE.load(Ordering::SeqCst);
    if fd < 0 {
        return;
    }
    let saved = Errno::last_raw();
    let byte = 1u8;
    // SAFETY: write(2) is async-signal-safe and the descriptor is never closed
    unsafe {
        libc::write(fd, &byte as *const u8 as *const c_void, 1);
    }
    Errno::set_raw(saved);
}

extern "C" fn on_resize(_: c_int) {
    RESIZE_PENDING.store(true, Ordering::SeqCst);
    notify();
}

extern "C" fn on_interrupt(_: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    notify();
}

/// Create the wake-up socket once per process
fn open_wake_socket() -> io::Result<()> {
    if WAKE_READ.get().is_some() {
        return Ok(());
    }
    let (reader, writer) = UnixStream::pair()?;
    reader.set_nonblocking(true)?;
    writer.set_nonblocking(true)?;
    if WAKE_READ.set(reader).is_ok() {
        WAKE_WRITE.store(writer.into_raw_fd(), Ordering::SeqCst);
    }
    Ok(())
}

/// Install the SIGWINCH, SIGINT and SIGTERM handlers
pub fn install() -> io::Result<()> {
    open_wake_socket()?;

    let flags = SaFlags::SA_RESTART;
    let resize = SigAction::new(SigHandler::Handler(on_resize), flags, SigSet::empty());
    let interrupt = SigAction::new(SigHandler::Handler(on_interrupt), flags, SigSet::empty());

    // SAFETY: the handlers only store to atomics and call write(2)
    unsafe {
        sigaction(Signal::SIGWINCH, &resize)?;
        sigaction(Signal::SIGINT, &interrupt)?;
        sigaction(Signal::SIGTERM, &interrupt)?;
    }
    Ok(())
}

/// Descriptor that becomes readable when a signal arrives
pub fn wake_fd() -> Option<BorrowedFd<'static>> {
    WAKE_READ.get().map(|stream| stream.as_fd())
}

/// Discard pending wake-up bytes; the flags carry the actual signals
pub fn drain_wakeups() {
    let Some(mut stream) = WAKE_READ.get() else {
        return;
    };
    let mut buf = [0u8; 64];
    while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
}

/// Consume a pending resize notification
pub fn take_resize() -> bool {
    RESIZE_PENDING.swap(false, Ordering::SeqCst)
}

/// Whether SIGINT or SIGTERM has been received; stays set once raised
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Serializes tests that raise signals or wait on the wake-up socket
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
