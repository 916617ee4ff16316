//! RESP Command Decoder
//!
//! Decodes the commands clients send: an array of bulk strings, a bare bulk
//! string, or (for any other leading byte) an inline whitespace-separated line.
//!
//! ## How the Parser Works
//!
//! The parser looks at the bytes buffered so far and returns either:
//! - `Ok(Some((request, consumed)))` - a full request was decoded from the first `consumed` bytes
//! - `Ok(None)` - the request is not complete yet
//! - `Err(ParseError)` - the stream is malformed
//!
//! The caller appends network data to its buffer, calls `parse()`, advances the
//! buffer by `consumed` on success, reads more on `None`, and drops the
//! connection on error. There is no resynchronization after an error.

use crate::protocol::types::{prefix, RespValue, CRLF};
use crate::protocol::{Codec, Request};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while decoding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An array or bulk string header whose length is not a decimal integer
    #[error("invalid length: {0:?}")]
    InvalidLength(String),

    /// An array element that is not a bulk string
    #[error("expected bulk string in array, got type prefix {0:#04x}")]
    UnexpectedElement(u8),

    /// Protocol violation (missing CRLF, etc.)
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// A bulk string longer than the configured limit
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: i64, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single bulk string (512 MB)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Longest inline command line accepted, not counting its newline (64 KB)
pub const MAX_INLINE_SIZE: usize = 64 * 1024;

/// Upper bound on the capacity reserved up front for an array's tokens.
/// Larger arrays still decode, the vector just grows as elements arrive.
const MAX_PREALLOCATED_TOKENS: usize = 1024;

/// Length-prefixed RESP decoder.
///
/// # Example
///
/// ```
/// use fluxdb::protocol::{RespParser, Request};
/// use bytes::Bytes;
///
/// let mut parser = RespParser::new();
/// let (request, consumed) = parser.parse(b"$4\r\nPING\r\n").unwrap().unwrap();
/// assert_eq!(request, Request::Command(vec![Bytes::from("PING")]));
/// assert_eq!(consumed, 10);
/// ```
#[derive(Debug)]
pub struct RespParser {
    /// Largest bulk string accepted
    max_bulk_size: usize,
}

impl Default for RespParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RespParser {
    pub fn new() -> Self {
        Self {
            max_bulk_size: MAX_BULK_SIZE,
        }
    }

    /// Creates a parser that rejects bulk strings longer than `max` bytes.
    pub fn with_max_bulk_size(max: usize) -> Self {
        Self { max_bulk_size: max }
    }

    /// Attempts to decode one request from the front of `buf`.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        if buf.is_empty() {
            return Ok(None);
        }

        match buf[0] {
            prefix::ARRAY => self.parse_array(buf),
            prefix::BULK_STRING => Ok(self
                .parse_bulk_string(buf)?
                .map(|(token, consumed)| (Request::Command(vec![token]), consumed))),
            _ => parse_inline(buf),
        }
    }

    /// Parses an array of bulk strings: `*<count>\r\n<bulk>...`
    ///
    /// A negative count is a null array.
    fn parse_array(&mut self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        debug_assert!(buf[0] == prefix::ARRAY);

        let count_end = match find_crlf(&buf[1..]) {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let count = parse_length(&buf[1..1 + count_end])?;
        let mut consumed = 1 + count_end + 2;

        if count < 0 {
            return Ok(Some((Request::Null, consumed)));
        }

        let count = count as usize;
        let mut tokens = Vec::with_capacity(count.min(MAX_PREALLOCATED_TOKENS));

        for _ in 0..count {
            let rest = &buf[consumed..];
            if rest.is_empty() {
                return Ok(None);
            }
            if rest[0] != prefix::BULK_STRING {
                return Err(ParseError::UnexpectedElement(rest[0]));
            }

            match self.parse_bulk_string(rest)? {
                Some((token, element_consumed)) => {
                    tokens.push(token);
                    consumed += element_consumed;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((Request::Command(tokens), consumed)))
    }

    /// Parses a bulk string: `$<length>\r\n<data>\r\n`
    ///
    /// A negative length is a null bulk string and decodes to an empty token.
    fn parse_bulk_string(&mut self, buf: &[u8]) -> ParseResult<Option<(Bytes, usize)>> {
        debug_assert!(buf[0] == prefix::BULK_STRING);

        let length_end = match find_crlf(&buf[1..]) {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let length = parse_length(&buf[1..1 + length_end])?;
        let data_start = 1 + length_end + 2;

        if length < 0 {
            return Ok(Some((Bytes::new(), data_start)));
        }

        if length > self.max_bulk_size as i64 {
            return Err(ParseError::MessageTooLarge {
                size: length,
                max: self.max_bulk_size,
            });
        }

        let length = length as usize;
        let total_needed = data_start + length + 2;
        if buf.len() < total_needed {
            return Ok(None);
        }

        if &buf[data_start + length..total_needed] != CRLF {
            return Err(ParseError::ProtocolError(
                "bulk string missing trailing CRLF".to_string(),
            ));
        }

        let data = Bytes::copy_from_slice(&buf[data_start..data_start + length]);
        Ok(Some((data, total_needed)))
    }
}

impl Codec for RespParser {
    fn decode(&mut self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        self.parse(buf)
    }

    fn encode(&self, reply: &RespValue, buf: &mut Vec<u8>) {
        reply.serialize_into(buf);
    }
}

/// Parses an inline command: the whole line, leading byte included, split on
/// whitespace. The line ends at `\n`; a preceding `\r` is dropped.
fn parse_inline(buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
    Ok(split_line(buf)?.map(|(tokens, consumed)| (Request::Command(tokens), consumed)))
}

/// Splits the first `\n`-terminated line of `buf` into tokens.
///
/// Only the first [`MAX_INLINE_SIZE`] + 1 bytes are searched, so a client
/// that never sends a newline is cut off instead of growing the scan.
pub(crate) fn split_line(buf: &[u8]) -> ParseResult<Option<(Vec<Bytes>, usize)>> {
    let window = &buf[..buf.len().min(MAX_INLINE_SIZE + 1)];

    match window.iter().position(|&b| b == b'\n') {
        Some(newline) => Ok(Some((split_tokens(&buf[..newline]), newline + 1))),
        None if buf.len() > MAX_INLINE_SIZE => Err(ParseError::MessageTooLarge {
            size: buf.len() as i64,
            max: MAX_INLINE_SIZE,
        }),
        None => Ok(None),
    }
}

/// Splits a line into whitespace-separated tokens.
fn split_tokens(line: &[u8]) -> Vec<Bytes> {
    line.split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .map(Bytes::copy_from_slice)
        .collect()
}

fn parse_length(line: &[u8]) -> ParseResult<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| ParseError::InvalidLength(String::from_utf8_lossy(line).into_owned()))
}

/// Returns the position of the first `\r\n` in `buf`, if any.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == CRLF)
}

/// Decodes a single request from bytes with a fresh parser.
pub fn parse_message(buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
    RespParser::new().parse(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(tokens: &[&str]) -> Request {
        Request::Command(tokens.iter().map(|t| Bytes::from(t.to_string())).collect())
    }

    #[test]
    fn test_parse_array_command() {
        let input = b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n";
        let (request, consumed) = parse_message(input).unwrap().unwrap();
        assert_eq!(request, command(&["SET", "foo", "bar"]));
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_parse_leaves_following_bytes() {
        let input = b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n";
        let (_, consumed) = parse_message(input).unwrap().unwrap();
        assert_eq!(consumed, 14);
    }

    #[test]
    fn test_parse_empty_array() {
        let (request, consumed) = parse_message(b"*0\r\n").unwrap().unwrap();
        assert_eq!(request, Request::Command(vec![]));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_parse_null_array() {
        let (request, consumed) = parse_message(b"*-1\r\n").unwrap().unwrap();
        assert_eq!(request, Request::Null);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_null_bulk_in_array_is_empty_token() {
        let input = b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$-1\r\n";
        let (request, _) = parse_message(input).unwrap().unwrap();
        assert_eq!(request, command(&["SET", "key", ""]));
    }

    #[test]
    fn test_parse_bare_bulk_string() {
        let (request, consumed) = parse_message(b"$4\r\nPING\r\n").unwrap().unwrap();
        assert_eq!(request, command(&["PING"]));
        assert_eq!(consumed, 10);
    }

    #[test]
    fn test_parse_empty_bulk_string() {
        let (request, consumed) = parse_message(b"$0\r\n\r\n").unwrap().unwrap();
        assert_eq!(request, command(&[""]));
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_binary_safe_bulk_string() {
        let input = b"*2\r\n$3\r\nGET\r\n$5\r\nhel\x00o\r\n";
        let (request, _) = parse_message(input).unwrap().unwrap();
        assert_eq!(
            request,
            Request::Command(vec![Bytes::from("GET"), Bytes::from(&b"hel\x00o"[..])])
        );
    }

    #[test]
    fn test_bulk_string_may_contain_crlf() {
        let input = b"*2\r\n$4\r\nECHO\r\n$4\r\na\r\nb\r\n";
        let (request, _) = parse_message(input).unwrap().unwrap();
        assert_eq!(request, command(&["ECHO", "a\r\nb"]));
    }

    #[test]
    fn test_parse_inline_command() {
        let (request, consumed) = parse_message(b"SET foo bar\r\n").unwrap().unwrap();
        assert_eq!(request, command(&["SET", "foo", "bar"]));
        assert_eq!(consumed, 13);
    }

    #[test]
    fn test_parse_inline_tolerates_bare_newline_and_extra_spaces() {
        let (request, consumed) = parse_message(b"  get   foo \n").unwrap().unwrap();
        assert_eq!(request, command(&["get", "foo"]));
        assert_eq!(consumed, 13);
    }

    #[test]
    fn test_parse_inline_keeps_leading_byte() {
        // Only '*' and '$' are framed; anything else starts an inline command
        let (request, _) = parse_message(b"+PING\r\n").unwrap().unwrap();
        assert_eq!(request, command(&["+PING"]));
    }

    #[test]
    fn test_parse_blank_inline_line() {
        let (request, consumed) = parse_message(b"\r\n").unwrap().unwrap();
        assert_eq!(request, Request::Command(vec![]));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_incomplete_inputs() {
        let cases: &[&[u8]] = &[
            b"",
            b"*",
            b"*2",
            b"*2\r",
            b"*2\r\n",
            b"*2\r\n$3\r\nGET\r\n",
            b"*2\r\n$3\r\nGET\r\n$3",
            b"*2\r\n$3\r\nGET\r\n$3\r\nfo",
            b"*2\r\n$3\r\nGET\r\n$3\r\nfoo",
            b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r",
            b"$5\r\nhe",
            b"PING",
        ];

        for input in cases {
            assert_eq!(
                parse_message(input),
                Ok(None),
                "expected incomplete for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_invalid_array_length() {
        let result = parse_message(b"*abc\r\n");
        assert_eq!(result, Err(ParseError::InvalidLength("abc".to_string())));
    }

    #[test]
    fn test_invalid_bulk_length() {
        let result = parse_message(b"*1\r\n$x1\r\nPING\r\n");
        assert!(matches!(result, Err(ParseError::InvalidLength(_))));
    }

    #[test]
    fn test_array_element_must_be_bulk_string() {
        let result = parse_message(b"*2\r\n$3\r\nGET\r\n:1\r\n");
        assert_eq!(result, Err(ParseError::UnexpectedElement(b':')));

        let result = parse_message(b"*1\r\n+PING\r\n");
        assert_eq!(result, Err(ParseError::UnexpectedElement(b'+')));
    }

    #[test]
    fn test_bulk_string_missing_trailing_crlf() {
        let result = parse_message(b"$3\r\nfooXY");
        assert!(matches!(result, Err(ParseError::ProtocolError(_))));
    }

    #[test]
    fn test_bulk_string_too_large() {
        let mut parser = RespParser::with_max_bulk_size(4);
        let result = parser.parse(b"$5\r\nhello\r\n");
        assert_eq!(result, Err(ParseError::MessageTooLarge { size: 5, max: 4 }));

        // The limit is checked before the body arrives
        let mut parser = RespParser::new();
        let result = parser.parse(b"*1\r\n$99999999999\r\n");
        assert!(matches!(result, Err(ParseError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_inline_line_too_long() {
        let mut input = b"SET key ".to_vec();
        input.resize(MAX_INLINE_SIZE + 1, b'x');
        assert!(matches!(
            parse_message(&input),
            Err(ParseError::MessageTooLarge { max: MAX_INLINE_SIZE, .. })
        ));

        // Right at the limit the line is still waiting for its newline
        input.truncate(MAX_INLINE_SIZE);
        assert_eq!(parse_message(&input), Ok(None));
        input.push(b'\n');
        let (request, consumed) = parse_message(&input).unwrap().unwrap();
        assert_eq!(consumed, MAX_INLINE_SIZE + 1);
        assert!(matches!(request, Request::Command(tokens) if tokens.len() == 3));
    }

    #[test]
    fn test_huge_array_count_does_not_preallocate() {
        // Incomplete rather than an allocation of the claimed size
        assert_eq!(parse_message(b"*4000000000\r\n"), Ok(None));
    }

    #[test]
    fn test_roundtrip() {
        let tokens = vec![
            Bytes::from("SET"),
            Bytes::from("key"),
            Bytes::from("multi word value"),
        ];
        let frame = RespValue::array(tokens.iter().cloned().map(RespValue::BulkString).collect());

        let serialized = frame.serialize();
        let (request, consumed) = parse_message(&serialized).unwrap().unwrap();
        assert_eq!(request, Request::Command(tokens));
        assert_eq!(consumed, serialized.len());
    }

    #[test]
    fn test_codec_encodes_resp() {
        let codec = RespParser::new();
        let mut buf = Vec::new();
        codec.encode(&RespValue::integer(1), &mut buf);
        codec.encode(&RespValue::Null, &mut buf);
        assert_eq!(buf, b":1\r\n$-1\r\n");
    }
}
