//! Typed commands sent to the device.
//!
//! Text such as `w32ff` becomes the frame `[0x77, 0x32, 0xFF]`: the opcode is
//! the first byte on the wire and the hex payload follows verbatim, with no
//! length prefix, checksum or terminator.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed frame sent by the ping keys.
pub const PING_FRAME: [u8; 5] = [0xFF, 0x55, 0x56, 0x50, 0x05];

/// What the device is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// The opcode byte for this action (`'r'` or `'w'` in ASCII).
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Read => b'r',
            Self::Write => b'w',
        }
    }

    fn from_verb(verb: char) -> Option<Self> {
        match verb {
            'r' => Some(Self::Read),
            'w' => Some(Self::Write),
            _ => None,
        }
    }
}

/// Why a command line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not start with `r` or `w`.
    #[error("unknown command verb {0:?}, expected 'r' or 'w'")]
    UnknownVerb(String),

    /// The payload is not a whole number of hex byte pairs.
    #[error("invalid hex payload {payload:?}: {reason}")]
    InvalidHex { payload: String, reason: &'static str },
}

/// A parsed command, ready to be written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    action: Action,
    payload: Vec<u8>,
}

impl Command {
    /// Parse `r<hex>` / `w<hex>`, ignoring surrounding whitespace and case.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim().to_lowercase();
        let mut chars = text.chars();

        let action = chars
            .next()
            .and_then(Action::from_verb)
            .ok_or_else(|| ParseError::UnknownVerb(text.clone()))?;

        let hex = chars.as_str();
        let mut payload = Vec::with_capacity(1 + hex.len() / 2);
        payload.push(action.opcode());
        payload.extend(decode_hex(hex)?);

        Ok(Self { action, payload })
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// The full wire frame, opcode included as the first byte.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_string(&self.payload))
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, ParseError> {
    let invalid = |reason| ParseError::InvalidHex {
        payload: hex.to_string(),
        reason,
    };

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("non-hex character"));
    }
    if hex.len() % 2 != 0 {
        return Err(invalid("odd number of digits"));
    }

    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            // Both bytes are ASCII hex digits, checked above.
            let pair = std::str::from_utf8(pair).map_err(|_| invalid("non-hex character"))?;
            u8::from_str_radix(pair, 16).map_err(|_| invalid("non-hex character"))
        })
        .collect()
}

/// Render bytes the way the console echoes them: `[0xFF, 0x55]`.
pub fn hex_string(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| format!("0x{b:02X}")).collect();
    format!("[{}]", parts.join(", "))
}
