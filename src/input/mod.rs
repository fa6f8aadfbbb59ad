//! Terminal input: signals, input mode, byte sources and key decoding.

mod decoder;
mod multiplexer;
pub mod signals;
mod source;
mod terminal;

use std::io::IsTerminal;

pub use decoder::{DecoderState, KeyDecoder};
pub use multiplexer::{Multiplexer, ESCAPE_WAIT};
pub use source::{ByteSource, TimerSource, TtySource, Wake};
pub use terminal::{CursorGuard, InputModeGuard};

/// What happened while the loop was waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The wait elapsed with no input
    Timeout,
    /// Left arrow
    NavigateLeft,
    /// Right arrow
    NavigateRight,
    /// A key that means nothing to the dashboard
    NoSignal,
    /// The terminal was resized
    Resize,
    /// SIGINT or SIGTERM
    Interrupt,
}

/// Keys are read only when both stdin and stdout are terminals
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

#[cfg(test)]
pub(crate) use multiplexer::testing;
