use std::io;
use std::time::{Duration, Instant};

use super::decoder::KeyDecoder;
use super::source::{ByteSource, TimerSource, TtySource, Wake};
use super::Signal;

/// Total time allowed for the bytes that follow an escape
pub const ESCAPE_WAIT: Duration = Duration::from_millis(50);

/// Single "what happened next" queue for timer, keys and signals
pub struct Multiplexer {
    source: Box<dyn ByteSource>,
    decoder: KeyDecoder,
}

impl Multiplexer {
    pub fn new(source: Box<dyn ByteSource>) -> Self {
        Self {
            source,
            decoder: KeyDecoder::new(),
        }
    }

    /// Read keys from the terminal when interactive, otherwise act as a timer
    pub fn for_terminal(interactive: bool) -> io::Result<Self> {
        let source: Box<dyn ByteSource> = if interactive {
            Box::new(TtySource::from_stdin()?)
        } else {
            Box::new(TimerSource)
        };
        Ok(Self::new(source))
    }

    fn from_wake(wake: Wake) -> Option<Signal> {
        match wake {
            Wake::Byte(_) => None,
            Wake::TimedOut => Some(Signal::Timeout),
            Wake::Resized => Some(Signal::Resize),
            Wake::Interrupted => Some(Signal::Interrupt),
        }
    }

    /// Wait up to `timeout` for the next signal
    pub fn next_signal(&mut self, timeout: Duration) -> io::Result<Signal> {
        self.decoder.begin();
        let first = self.source.wait(timeout)?;
        if let Some(signal) = Self::from_wake(first) {
            return Ok(signal);
        }
        if let Wake::Byte(byte) = first {
            if let Some(signal) = self.decoder.feed(byte) {
                return Ok(signal);
            }
        }

        let deadline = Instant::now() + ESCAPE_WAIT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.source.wait(left)? {
                Wake::Byte(byte) => {
                    if let Some(signal) = self.decoder.feed(byte) {
                        return Ok(signal);
                    }
                }
                Wake::TimedOut => return Ok(self.decoder.expire()),
                other => {
                    // an unfinished key sequence is dropped
                    self.decoder.expire();
                    return Ok(Self::from_wake(other).unwrap_or(Signal::NoSignal));
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;
    use pretty_assertions::assert_eq;

    fn multiplexer(wakes: Vec<Wake>) -> (Multiplexer, ScriptedSource) {
        let source = ScriptedSource::new(wakes);
        (Multiplexer::new(Box::new(source.clone())), source)
    }

    #[test]
    fn test_timeout_when_nothing_arrives() {
        let (mut mux, source) = multiplexer(vec![Wake::TimedOut]);
        let signal = mux.next_signal(Duration::from_secs(30)).unwrap();
        assert_eq!(signal, Signal::Timeout);
        assert_eq!(*source.waits.borrow(), vec![Duration::from_secs(30)]);
    }

    #[test]
    fn test_arrow_sequences() {
        let mut wakes = ScriptedSource::bytes(b"\x1b[D");
        wakes.extend(ScriptedSource::bytes(b"\x1b[C"));
        let (mut mux, _) = multiplexer(wakes);
        let timeout = Duration::from_secs(30);
        assert_eq!(mux.next_signal(timeout).unwrap(), Signal::NavigateLeft);
        assert_eq!(mux.next_signal(timeout).unwrap(), Signal::NavigateRight);
    }

    #[test]
    fn test_plain_key_is_discarded() {
        let (mut mux, source) = multiplexer(ScriptedSource::bytes(b"q"));
        assert_eq!(
            mux.next_signal(Duration::from_secs(1)).unwrap(),
            Signal::NoSignal
        );
        // no secondary wait for a non-escape byte
        assert_eq!(source.waits.borrow().len(), 1);
    }

    #[test]
    fn test_lone_escape_resolves_after_short_wait() {
        let (mut mux, source) = multiplexer(vec![Wake::Byte(0x1b), Wake::TimedOut]);
        assert_eq!(
            mux.next_signal(Duration::from_secs(30)).unwrap(),
            Signal::NoSignal
        );
        let waits = source.waits.borrow();
        assert_eq!(waits.len(), 2);
        assert!(waits[1] <= ESCAPE_WAIT);
    }

    #[test]
    fn test_signals_pass_through() {
        let (mut mux, _) = multiplexer(vec![Wake::Resized, Wake::Interrupted]);
        assert_eq!(mux.next_signal(Duration::from_secs(1)).unwrap(), Signal::Resize);
        assert_eq!(
            mux.next_signal(Duration::from_secs(1)).unwrap(),
            Signal::Interrupt
        );
    }

    #[test]
    fn test_resize_mid_sequence_wins() {
        let (mut mux, _) = multiplexer(vec![Wake::Byte(0x1b), Wake::Byte(b'['), Wake::Resized]);
        assert_eq!(mux.next_signal(Duration::from_secs(1)).unwrap(), Signal::Resize);
        // the next wait starts a fresh sequence
        assert_eq!(mux.next_signal(Duration::from_secs(1)).unwrap(), Signal::Timeout);
    }
}
