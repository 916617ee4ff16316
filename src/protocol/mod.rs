//! Wire protocols
//!
//! A connection speaks exactly one protocol for its whole lifetime. Both
//! protocols implement [`Codec`]: decode the next command from buffered
//! bytes, and encode a reply frame.
//!
//! - `types`: the `RespValue` reply frame and its RESP serialization
//! - `parser`: `RespParser`, the length-prefixed RESP decoder (with inline fallback)
//! - `line`: `LineCodec`, the legacy newline-delimited protocol
//!
//! ## Example
//!
//! ```
//! use fluxdb::protocol::{Codec, Protocol, Request};
//! use bytes::Bytes;
//!
//! let mut codec = Protocol::Resp.codec();
//! let data = b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n";
//! let (request, consumed) = codec.decode(data).unwrap().unwrap();
//! assert_eq!(consumed, data.len());
//! assert_eq!(
//!     request,
//!     Request::Command(vec![Bytes::from("GET"), Bytes::from("foo")])
//! );
//! ```

pub mod line;
pub mod parser;
pub mod types;

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

pub use line::LineCodec;
pub use parser::{parse_message, ParseError, ParseResult, RespParser};
pub use types::RespValue;

/// One decoded protocol unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Verb followed by its arguments. May be empty (a blank inline line).
    Command(Vec<Bytes>),
    /// A null array (`*-1\r\n`). Carries no tokens.
    Null,
}

impl Request {
    /// Returns the tokens to dispatch, or `None` when there is nothing to run.
    pub fn into_command(self) -> Option<Vec<Bytes>> {
        match self {
            Request::Command(tokens) if !tokens.is_empty() => Some(tokens),
            _ => None,
        }
    }
}

/// Decodes commands from, and encodes replies to, one connection's byte stream.
pub trait Codec: Send {
    /// Attempts to decode the next request from the front of `buf`.
    ///
    /// - `Ok(Some((request, consumed)))`: a full request used `consumed` bytes
    /// - `Ok(None)`: more bytes are needed
    /// - `Err(e)`: the stream is malformed and cannot be resynchronized
    fn decode(&mut self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>>;

    /// Appends the wire form of `reply` to `buf`.
    fn encode(&self, reply: &RespValue, buf: &mut Vec<u8>);
}

/// Selects which codec a connection uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// Length-prefixed RESP frames, inline commands tolerated.
    #[default]
    Resp,
    /// Newline-delimited, whitespace-tokenized lines.
    Line,
}

impl Protocol {
    /// Builds a fresh codec for a new connection.
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            Protocol::Resp => Box::new(RespParser::new()),
            Protocol::Line => Box::new(LineCodec::new()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Resp => write!(f, "resp"),
            Protocol::Line => write!(f, "line"),
        }
    }
}

/// Returned when a protocol name is not recognized.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("unknown protocol '{0}', expected 'resp' or 'line'")]
pub struct ProtocolNameError(String);

impl FromStr for Protocol {
    type Err = ProtocolNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resp" => Ok(Protocol::Resp),
            "line" | "legacy" => Ok(Protocol::Line),
            _ => Err(ProtocolNameError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("resp".parse::<Protocol>(), Ok(Protocol::Resp));
        assert_eq!("RESP".parse::<Protocol>(), Ok(Protocol::Resp));
        assert_eq!("line".parse::<Protocol>(), Ok(Protocol::Line));
        assert_eq!("legacy".parse::<Protocol>(), Ok(Protocol::Line));
        assert!("http".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_display_roundtrips() {
        for protocol in [Protocol::Resp, Protocol::Line] {
            assert_eq!(protocol.to_string().parse::<Protocol>(), Ok(protocol));
        }
    }

    #[test]
    fn test_into_command_skips_empty_and_null() {
        assert_eq!(Request::Null.into_command(), None);
        assert_eq!(Request::Command(vec![]).into_command(), None);
        assert_eq!(
            Request::Command(vec![Bytes::from("PING")]).into_command(),
            Some(vec![Bytes::from("PING")])
        );
    }

    #[test]
    fn test_codecs_are_interchangeable() {
        let mut resp = Protocol::Resp.codec();
        let mut line = Protocol::Line.codec();

        let (a, _) = resp.decode(b"*1\r\n$4\r\nPING\r\n").unwrap().unwrap();
        let (b, _) = line.decode(b"PING\n").unwrap().unwrap();
        assert_eq!(a, b);

        let mut out = Vec::new();
        resp.encode(&RespValue::pong(), &mut out);
        assert_eq!(out, b"+PONG\r\n");

        out.clear();
        line.encode(&RespValue::pong(), &mut out);
        assert_eq!(out, b"PONG\n");
    }
}
