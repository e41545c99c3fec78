//! Line framing and record decode for the serial input.

use thiserror::Error;

use crate::types::Snapshot;

/// Size of the device's line buffer. The agent never emits a longer record.
pub const MAX_RECORD_BYTES: usize = 1536;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("record longer than {MAX_RECORD_BYTES} bytes")]
    Overflow,
}

/// Decode one record (without its terminator).
pub fn decode_record(line: &[u8]) -> Result<Snapshot, DecodeError> {
    serde_json::from_slice(line).map_err(|e| DecodeError::MalformedRecord(e.to_string()))
}

/// Accumulates bytes until `\n`, bounded by [`MAX_RECORD_BYTES`].
///
/// An overlong line is thrown away up to and including its terminator, so
/// the next line starts clean.
#[derive(Debug)]
pub struct LineReader {
    buf: Vec<u8>,
    overflowed: bool,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_RECORD_BYTES),
            overflowed: false,
        }
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Feed one byte. Returns a decode result once a non-empty line completes.
    pub fn feed(&mut self, byte: u8) -> Option<Result<Snapshot, DecodeError>> {
        if byte == b'\n' {
            let result = if self.overflowed {
                Some(Err(DecodeError::Overflow))
            } else {
                let line = self.buf.strip_suffix(b"\r").unwrap_or(&self.buf[..]);
                if line.iter().all(u8::is_ascii_whitespace) {
                    None
                } else {
                    Some(decode_record(line))
                }
            };
            self.buf.clear();
            self.overflowed = false;
            return result;
        }
        if self.overflowed {
            return None;
        }
        if self.buf.len() >= MAX_RECORD_BYTES {
            self.overflowed = true;
            self.buf.clear();
            return None;
        }
        self.buf.push(byte);
        None
    }
}
