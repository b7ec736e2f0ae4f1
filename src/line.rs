//! Line-based codec for tokio.
//!
//! Splits an inbound byte stream into protocol lines and frames outbound
//! lines with `\r\n`. Decoding is lossy: invalid byte sequences become
//! U+FFFD instead of failing the connection.

use bytes::{Buf, BufMut, BytesMut};
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Error, Result};

/// Line-based codec that handles `\n`-terminated messages.
///
/// Lines are unbounded by default; see [`LineCodec::with_max_len`].
#[derive(Clone, Debug)]
pub struct LineCodec {
    encoding: &'static Encoding,
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: Option<usize>,
}

impl LineCodec {
    /// Create a new codec with the specified encoding.
    ///
    /// # Arguments
    /// * `label` - Encoding label (e.g., "utf-8", "iso-8859-1")
    pub fn new(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
        Ok(Self {
            encoding,
            next_index: 0,
            max_len: None,
        })
    }

    /// Create a new codec that rejects lines longer than `max_len` bytes.
    pub fn with_max_len(label: &str, max_len: usize) -> Result<Self> {
        let mut codec = Self::new(label)?;
        codec.max_len = Some(max_len);
        Ok(codec)
    }

    /// Name of the encoding in use.
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    /// Truncate outgoing data at its first line break.
    ///
    /// A single outbound line must never carry a second command.
    pub fn sanitize(line: &str) -> &str {
        match line.find(|c| c == '\r' || c == '\n') {
            Some(pos) => &line[..pos],
            None => line,
        }
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        match self.max_len {
            Some(limit) if actual > limit => Err(Error::LineTooLong { actual, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self {
            encoding: encoding::UTF_8,
            next_index: 0,
            max_len: None,
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for newline starting from where we left off
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            self.next_index = src.len();
            self.check_len(src.len())?;
            return Ok(None);
        };

        let newline = self.next_index + offset;
        self.next_index = 0;
        self.check_len(newline)?;

        let mut line = src.split_to(newline);
        src.advance(1);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        let (text, had_errors) = self.encoding.decode_without_bom_handling(&line);
        if had_errors {
            tracing::debug!("replaced malformed {} sequences in line", self.encoding.name());
        }
        Ok(Some(text.into_owned()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                if !src.is_empty() {
                    tracing::debug!(bytes = src.len(), "discarding unterminated line at end of stream");
                    src.clear();
                }
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = Error;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<()> {
        let line = Self::sanitize(line.as_ref());
        let (bytes, _enc, _had_errors) = self.encoding.encode(line);
        dst.reserve(bytes.len() + 2);
        dst.extend_from_slice(&bytes);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_newline() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("A\nB\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["A", "B"]);
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::from("PING :");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, None);
        assert_eq!(&buf[..], b"PING :");
    }

    #[test]
    fn test_decode_across_chunks() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("LINE1\r\nLI");
        assert_eq!(decode_all(&mut codec, &mut buf), ["LINE1"]);

        buf.extend_from_slice(b"NE2\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["LINE2"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_split_crlf() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("PING :x\r");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_decode_lossy() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from(&b"caf\xe9 ok\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("caf\u{fffd} ok".to_string()));
    }

    #[test]
    fn test_decode_latin1() {
        let mut codec = LineCodec::new("iso-8859-1").unwrap();
        let mut buf = BytesMut::from(&b"caf\xe9\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("café".to_string()));
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len("utf-8", 10).unwrap();
        let mut buf = BytesMut::from("this is way too long\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(Error::LineTooLong { limit: 10, .. })));
    }

    #[test]
    fn test_decode_unbounded_by_default() {
        let mut codec = LineCodec::default();
        let long = "x".repeat(20_000);
        let mut buf = BytesMut::from(format!("{}\r\n", long).as_str());
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(long));
    }

    #[test]
    fn test_decode_eof_drops_partial() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("DONE\r\nPART");
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("DONE".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_unknown_encoding() {
        assert!(matches!(
            LineCodec::new("klingon"),
            Err(Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_encode() {
        let mut codec = LineCodec::new("utf-8").unwrap();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test", &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }

    #[test]
    fn test_encode_truncates_newline() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::new();

        codec
            .encode("PRIVMSG #test :hello\r\nQUIT :pwned", &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #test :hello\r\n");
    }
}
