//! Wire framing for the append-only file.
//!
//! A frame is `*<argc>\r\n` followed by `argc` arguments, each encoded as
//! `$<len>\r\n<len bytes>\r\n`. The first byte of a frame must be `*` and the
//! first byte of every argument header must be `$`; anything else means the
//! log is corrupt. A zero-length argument is legal and decodes to empty.

use std::io::{BufRead, ErrorKind, Read};

use crate::error::aof::AofError;

/// Command name of an insert frame (argc = 4: command, namespace, key, value).
pub const INSERT_COMMAND: &[u8] = b"INSERT";

/// Command name of a remove frame (argc = 3: command, namespace, key).
pub const REMOVE_COMMAND: &[u8] = b"REMOVE";

/// Arguments above this length are treated as log corruption rather than
/// allocated.
const MAX_ARGUMENT_LEN: usize = 64 * 1024 * 1024;

/// Longest frame header or argument header line the reader will accept.
const MAX_HEADER_LEN: usize = 32;

/// Encodes an `INSERT namespace key value` frame. An absent value is encoded
/// as the zero-length argument.
pub fn encode_insert(namespace: &str, key: &[u8], value: &[u8]) -> Vec<u8> {
    encode_frame(&[INSERT_COMMAND, namespace.as_bytes(), key, value])
}

/// Encodes a `REMOVE namespace key` frame.
pub fn encode_remove(namespace: &str, key: &[u8]) -> Vec<u8> {
    encode_frame(&[REMOVE_COMMAND, namespace.as_bytes(), key])
}

fn encode_frame(args: &[&[u8]]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        frame.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        frame.extend_from_slice(arg);
        frame.extend_from_slice(b"\r\n");
    }
    frame
}

/// Sequential frame decoder over any buffered byte source.
///
/// `read_frame` yields one argument vector per frame and `Ok(None)` at a clean
/// end of input; end of input inside a frame is a format error, since the log
/// can no longer be trusted past that point.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    offset: u64,
}

impl<R> FrameReader<R> {
    /// Creates a decoder starting at offset zero of `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Byte offset just past the last successfully consumed data.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: BufRead> FrameReader<R> {
    /// Reads the next frame, or `None` at a clean end of input.
    pub fn read_frame(&mut self) -> Result<Option<Vec<Vec<u8>>>, AofError> {
        let Some(sentinel) = self.read_byte()? else {
            return Ok(None);
        };
        if sentinel != b'*' {
            return Err(self.format_error(format!(
                "expected frame sentinel '*', found {:?}",
                char::from(sentinel)
            )));
        }
        let argc = self.read_length()?;
        if argc == 0 {
            return Err(self.format_error("frame declares zero arguments".to_string()));
        }

        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            args.push(self.read_argument()?);
        }
        Ok(Some(args))
    }

    fn read_argument(&mut self) -> Result<Vec<u8>, AofError> {
        match self.read_byte()? {
            Some(b'$') => {}
            Some(other) => {
                return Err(self.format_error(format!(
                    "expected argument sentinel '$', found {:?}",
                    char::from(other)
                )))
            }
            None => return Err(self.truncation_error()),
        }

        let len = self.read_length()?;
        if len > MAX_ARGUMENT_LEN {
            return Err(self.format_error(format!("argument length {len} exceeds limit")));
        }

        let mut arg = vec![0u8; len];
        self.reader.read_exact(&mut arg).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                self.truncation_error()
            } else {
                AofError::Io(err)
            }
        })?;
        self.offset += len as u64;
        self.expect_crlf()?;
        Ok(arg)
    }

    /// Reads an ASCII decimal integer terminated by `\r\n`.
    fn read_length(&mut self) -> Result<usize, AofError> {
        let mut line = Vec::new();
        let mut limited = (&mut self.reader).take(MAX_HEADER_LEN as u64);
        let consumed = limited.read_until(b'\n', &mut line)?;
        self.offset += consumed as u64;

        let Some(digits) = line.strip_suffix(b"\r\n") else {
            return Err(self.format_error("header not terminated by CRLF".to_string()));
        };
        let text = std::str::from_utf8(digits)
            .map_err(|_| self.format_error("non-ASCII header length".to_string()))?;
        text.parse::<usize>()
            .map_err(|_| self.format_error(format!("invalid header length `{text}`")))
    }

    fn expect_crlf(&mut self) -> Result<(), AofError> {
        let mut separator = [0u8; 2];
        self.reader.read_exact(&mut separator).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                self.truncation_error()
            } else {
                AofError::Io(err)
            }
        })?;
        self.offset += 2;
        if &separator != b"\r\n" {
            return Err(self.format_error("argument not terminated by CRLF".to_string()));
        }
        Ok(())
    }

    /// Reads one byte; `None` means end of input.
    fn read_byte(&mut self) -> Result<Option<u8>, AofError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(AofError::Io(err)),
            }
        }
    }

    fn format_error(&self, message: String) -> AofError {
        AofError::Format {
            offset: self.offset,
            message,
        }
    }

    fn truncation_error(&self) -> AofError {
        self.format_error("unexpected end of file inside frame".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_case::test_case;

    fn read_all(bytes: &[u8]) -> Result<Vec<Vec<Vec<u8>>>, AofError> {
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let mut frames = Vec::new();
        while let Some(frame) = reader.read_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    #[test]
    fn test_encode_insert_exact_bytes() {
        let frame = encode_insert("ns", b"key", b"value");
        assert_eq!(
            frame,
            b"*4\r\n$6\r\nINSERT\r\n$2\r\nns\r\n$3\r\nkey\r\n$5\r\nvalue\r\n"
        );
    }

    #[test]
    fn test_encode_remove_exact_bytes() {
        let frame = encode_remove("ns", b"key");
        assert_eq!(frame, b"*3\r\n$6\r\nREMOVE\r\n$2\r\nns\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn test_round_trip_multiple_frames() {
        let mut log = encode_insert("words", b"foo", b"bar");
        log.extend_from_slice(&encode_remove("words", b"foo"));
        log.extend_from_slice(&encode_insert("words", "中文".as_bytes(), b""));

        let frames = read_all(&log).expect("log should decode");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0][0], INSERT_COMMAND);
        assert_eq!(frames[0][3], b"bar");
        assert_eq!(frames[1][0], REMOVE_COMMAND);
        assert_eq!(frames[1].len(), 3);
        assert_eq!(frames[2][2], "中文".as_bytes());
    }

    #[test]
    fn test_zero_length_argument_decodes_empty() {
        let frames = read_all(&encode_insert("ns", b"k", b"")).expect("decode");
        assert_eq!(frames[0][3], Vec::<u8>::new());
    }

    #[test]
    fn test_empty_input_yields_no_frames() {
        assert!(read_all(b"").expect("empty log is valid").is_empty());
    }

    #[test_case(b"X3\r\n$6\r\nREMOVE\r\n" ; "bad frame sentinel")]
    #[test_case(b"*2\r\n#3\r\nfoo\r\n$1\r\nx\r\n" ; "bad argument sentinel")]
    #[test_case(b"*one\r\n" ; "non numeric argc")]
    #[test_case(b"*1\r\n$abc\r\nxyz\r\n" ; "non numeric length")]
    #[test_case(b"*1\r\n$5\r\nab" ; "truncated argument body")]
    #[test_case(b"*1\r\n$3\r\nabcXY" ; "missing argument terminator")]
    #[test_case(b"*0\r\n" ; "zero argument frame")]
    fn test_malformed_input_is_format_error(input: &[u8]) {
        match read_all(input) {
            Err(AofError::Format { .. }) => {}
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_offset_points_into_log() {
        let mut log = encode_insert("ns", b"k", b"v");
        let good = log.len() as u64;
        log.extend_from_slice(b"Xgarbage");

        let mut reader = FrameReader::new(Cursor::new(log));
        assert!(reader.read_frame().expect("first frame decodes").is_some());
        match reader.read_frame() {
            Err(AofError::Format { offset, .. }) => assert_eq!(offset, good + 1),
            other => panic!("expected format error, got {other:?}"),
        }
    }
}
