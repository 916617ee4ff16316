//! Legacy line protocol
//!
//! One command per `\n`-terminated line, tokens separated by whitespace, no
//! type prefixes and no length framing. Replies are a single line ending in
//! `\n`:
//!
//! | Reply        | Line                            |
//! |--------------|---------------------------------|
//! | simple/error | the text                        |
//! | integer      | decimal digits                  |
//! | bulk string  | the raw bytes, breaks as spaces |
//! | absent value | `nil`                           |
//! | array        | elements separated by a space   |
//!
//! Line breaks inside a reply are written as spaces. Values containing
//! whitespace cannot be sent over this protocol, and a line longer than
//! [`MAX_INLINE_SIZE`](crate::protocol::parser::MAX_INLINE_SIZE) ends the
//! connection.

use crate::protocol::parser::split_line;
use crate::protocol::{Codec, ParseResult, Request, RespValue};

/// Marker written for an absent value.
const NIL: &[u8] = b"nil";

#[derive(Debug, Default)]
pub struct LineCodec;

impl LineCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for LineCodec {
    fn decode(&mut self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        Ok(split_line(buf)?.map(|(tokens, consumed)| (Request::Command(tokens), consumed)))
    }

    fn encode(&self, reply: &RespValue, buf: &mut Vec<u8>) {
        write_inline(reply, buf);
        buf.push(b'\n');
    }
}

fn write_inline(reply: &RespValue, buf: &mut Vec<u8>) {
    match reply {
        RespValue::SimpleString(s) | RespValue::Error(s) => write_flattened(s.as_bytes(), buf),
        RespValue::Integer(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        RespValue::BulkString(data) => write_flattened(data, buf),
        RespValue::Null => buf.extend_from_slice(NIL),
        RespValue::Array(values) => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_inline(value, buf);
            }
        }
    }
}

/// Copies `text` with every line break (`\r\n`, `\n` or a lone `\r`)
/// turned into one space, so a reply never spans more than one line.
fn write_flattened(text: &[u8], buf: &mut Vec<u8>) {
    let mut bytes = text.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        match b {
            b'\r' if bytes.peek() == Some(&b'\n') => {}
            b'\r' | b'\n' => buf.push(b' '),
            _ => buf.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parser::MAX_INLINE_SIZE;
    use crate::protocol::ParseError;
    use bytes::Bytes;

    fn encode(reply: RespValue) -> Vec<u8> {
        let mut buf = Vec::new();
        LineCodec::new().encode(&reply, &mut buf);
        buf
    }

    #[test]
    fn test_decode_line() {
        let mut codec = LineCodec::new();
        let (request, consumed) = codec.decode(b"SET foo bar\nGET foo\n").unwrap().unwrap();
        assert_eq!(
            request,
            Request::Command(vec![
                Bytes::from("SET"),
                Bytes::from("foo"),
                Bytes::from("bar")
            ])
        );
        assert_eq!(consumed, 12);
    }

    #[test]
    fn test_decode_strips_carriage_return() {
        let mut codec = LineCodec::new();
        let (request, consumed) = codec.decode(b"GET foo\r\n").unwrap().unwrap();
        assert_eq!(
            request,
            Request::Command(vec![Bytes::from("GET"), Bytes::from("foo")])
        );
        assert_eq!(consumed, 9);
    }

    #[test]
    fn test_decode_does_not_interpret_prefixes() {
        let mut codec = LineCodec::new();
        let (request, _) = codec.decode(b"*1\n").unwrap().unwrap();
        assert_eq!(request, Request::Command(vec![Bytes::from("*1")]));
    }

    #[test]
    fn test_decode_incomplete_and_blank() {
        let mut codec = LineCodec::new();
        assert_eq!(codec.decode(b"GET fo").unwrap(), None);

        let (request, consumed) = codec.decode(b"\n").unwrap().unwrap();
        assert_eq!(request, Request::Command(vec![]));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_encode_replies() {
        assert_eq!(encode(RespValue::ok()), b"OK\n");
        assert_eq!(
            encode(RespValue::error("ERR unknown command 'foo'")),
            b"ERR unknown command 'foo'\n"
        );
        assert_eq!(encode(RespValue::integer(2)), b"2\n");
        assert_eq!(encode(RespValue::bulk_string(Bytes::from("bar"))), b"bar\n");
        assert_eq!(encode(RespValue::Null), b"nil\n");
    }

    #[test]
    fn test_encode_array_on_one_line() {
        let reply = RespValue::array(vec![
            RespValue::bulk_string(Bytes::from("port")),
            RespValue::bulk_string(Bytes::from("6379")),
        ]);
        assert_eq!(encode(reply), b"port 6379\n");
        assert_eq!(encode(RespValue::array(vec![])), b"\n");
    }

    #[test]
    fn test_encode_multiline_text_as_one_line() {
        let reply = RespValue::bulk_string(Bytes::from("first\r\nsecond\nthird\rfourth"));
        let line = encode(reply);
        assert_eq!(line, b"first second third fourth\n");

        let reply = RespValue::error("ERR one\r\ntwo");
        assert_eq!(encode(reply), b"ERR one two\n");
    }

    #[test]
    fn test_decode_line_too_long() {
        let mut codec = LineCodec::new();
        let input = vec![b'a'; MAX_INLINE_SIZE + 1];
        assert!(matches!(
            codec.decode(&input),
            Err(ParseError::MessageTooLarge { .. })
        ));
    }
}
