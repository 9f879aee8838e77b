//! Minimal Telnet (RFC 854) stream handling.
//!
//! The gateway only needs a plain NVT: every option the server offers or
//! requests is refused, subnegotiations are skipped, NUL padding is dropped
//! and the remaining bytes are passed through as console text.

use std::borrow::Cow;

pub const IAC: u8 = 255;
pub const DONT: u8 = 254;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;
pub const WILL: u8 = 251;
pub const SB: u8 = 250;
pub const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Bytes recovered from one received chunk
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Console text with protocol commands removed
    pub data: Vec<u8>,
    /// Refusals to write back to the server
    pub replies: Vec<u8>,
}

/// Incremental decoder; a command split across chunks is completed on the
/// next call
#[derive(Debug, Default)]
pub struct TelnetCodec {
    state: State,
}

impl TelnetCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = State::Data;
    }

    pub fn decode(&mut self, input: &[u8]) -> Decoded {
        let mut decoded = Decoded {
            data: Vec::with_capacity(input.len()),
            replies: Vec::new(),
        };

        for &byte in input {
            self.state = match (self.state, byte) {
                (State::Data, IAC) => State::Iac,
                // NUL pads a bare CR on the wire
                (State::Data, 0) => State::Data,
                (State::Data, b) => {
                    decoded.data.push(b);
                    State::Data
                }
                (State::Iac, IAC) => {
                    decoded.data.push(IAC);
                    State::Data
                }
                (State::Iac, verb @ (WILL | WONT | DO | DONT)) => State::Negotiate(verb),
                (State::Iac, SB) => State::Sub,
                // NOP, GA and friends carry nothing for us
                (State::Iac, _) => State::Data,
                (State::Negotiate(verb), option) => {
                    match verb {
                        WILL => decoded.replies.extend_from_slice(&[IAC, DONT, option]),
                        DO => decoded.replies.extend_from_slice(&[IAC, WONT, option]),
                        _ => {}
                    }
                    State::Data
                }
                (State::Sub, IAC) => State::SubIac,
                (State::Sub, _) => State::Sub,
                (State::SubIac, SE) => State::Data,
                (State::SubIac, _) => State::Sub,
            };
        }

        decoded
    }
}

/// Double every IAC byte in outgoing data
pub fn escape(data: &[u8]) -> Cow<'_, [u8]> {
    if !data.contains(&IAC) {
        return Cow::Borrowed(data);
    }

    let mut escaped = Vec::with_capacity(data.len() + 4);
    for &byte in data {
        escaped.push(byte);
        if byte == IAC {
            escaped.push(IAC);
        }
    }
    Cow::Owned(escaped)
}
