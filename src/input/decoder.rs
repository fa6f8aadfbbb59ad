use super::Signal;

const ESC: u8 = 0x1b;
const BRACKET: u8 = b'[';
const ARROW_RIGHT: u8 = b'C';
const ARROW_LEFT: u8 = b'D';

/// Progress through an `ESC [ <direction>` cursor-key sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    AwaitingEscape,
    AwaitingBracket,
    AwaitingDirection,
    Resolved(Signal),
}

/// Turns raw input bytes into navigation signals, one byte at a time
#[derive(Debug, Clone)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Idle,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Start decoding a new key
    pub fn begin(&mut self) {
        self.state = DecoderState::AwaitingEscape;
    }

    /// Feed one byte; returns the signal once the sequence is resolved
    pub fn feed(&mut self, byte: u8) -> Option<Signal> {
        let next = match (self.state, byte) {
            (DecoderState::Idle | DecoderState::AwaitingEscape, ESC) => {
                DecoderState::AwaitingBracket
            }
            (DecoderState::AwaitingBracket, BRACKET) => DecoderState::AwaitingDirection,
            (DecoderState::AwaitingDirection, ARROW_LEFT) => {
                DecoderState::Resolved(Signal::NavigateLeft)
            }
            (DecoderState::AwaitingDirection, ARROW_RIGHT) => {
                DecoderState::Resolved(Signal::NavigateRight)
            }
            (DecoderState::Resolved(signal), _) => DecoderState::Resolved(signal),
            _ => DecoderState::Resolved(Signal::NoSignal),
        };
        self.state = next;
        match next {
            DecoderState::Resolved(signal) => Some(signal),
            _ => None,
        }
    }

    /// The follow-up bytes did not arrive in time
    pub fn expire(&mut self) -> Signal {
        let signal = match self.state {
            DecoderState::Resolved(signal) => signal,
            _ => Signal::NoSignal,
        };
        self.state = DecoderState::Resolved(signal);
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Option<Signal> {
        let mut decoder = KeyDecoder::new();
        decoder.begin();
        bytes.iter().find_map(|b| decoder.feed(*b))
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(decode(b"\x1b[D"), Some(Signal::NavigateLeft));
        assert_eq!(decode(b"\x1b[C"), Some(Signal::NavigateRight));
    }

    #[test]
    fn test_other_sequences_resolve_to_no_signal() {
        assert_eq!(decode(b"q"), Some(Signal::NoSignal));
        assert_eq!(decode(b"\x1b[A"), Some(Signal::NoSignal));
        assert_eq!(decode(b"\x1bOD"), Some(Signal::NoSignal));
        assert_eq!(decode(b"\x1b\x1b"), Some(Signal::NoSignal));
    }

    #[test]
    fn test_partial_sequence_waits() {
        assert_eq!(decode(b"\x1b"), None);
        assert_eq!(decode(b"\x1b["), None);
    }

    #[test]
    fn test_state_transitions() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.state(), DecoderState::Idle);
        decoder.begin();
        assert_eq!(decoder.state(), DecoderState::AwaitingEscape);
        decoder.feed(0x1b);
        assert_eq!(decoder.state(), DecoderState::AwaitingBracket);
        decoder.feed(b'[');
        assert_eq!(decoder.state(), DecoderState::AwaitingDirection);
        decoder.feed(b'C');
        assert_eq!(
            decoder.state(),
            DecoderState::Resolved(Signal::NavigateRight)
        );
    }

    #[test]
    fn test_expire_partial_sequence() {
        let mut decoder = KeyDecoder::new();
        decoder.begin();
        decoder.feed(0x1b);
        decoder.feed(b'[');
        assert_eq!(decoder.expire(), Signal::NoSignal);
        assert_eq!(decoder.state(), DecoderState::Resolved(Signal::NoSignal));
    }

    #[test]
    fn test_begin_resets_after_resolution() {
        let mut decoder = KeyDecoder::new();
        decoder.begin();
        assert_eq!(decoder.feed(b'x'), Some(Signal::NoSignal));
        decoder.begin();
        assert_eq!(decoder.feed(0x1b), None);
    }
}
