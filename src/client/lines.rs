//! Chunk-to-line splitting for event streams.
//!
//! The body of a response arrives in arbitrary byte chunks. Two stages turn it
//! into lines:
//!
//! 1. [`Utf8ChunkDecoder`] decodes bytes to text, carrying a multi-byte
//!    sequence that was cut by a chunk boundary over to the next chunk.
//! 2. [`LineSplitter`] splits the text on `\n`, `\r\n` or a bare `\r`,
//!    buffering partial lines until their terminator arrives.
//!
//! Both stages are per connection: a reconnect starts from fresh instances.
//!
//! # Examples
//!
//! ```
//! use sse_client::client::LineSplitter;
//!
//! let mut splitter = LineSplitter::new();
//! assert_eq!(splitter.feed("data: a\r"), vec!["data: a"]);
//! // The `\n` completing `\r\n` does not produce an extra empty line.
//! assert_eq!(splitter.feed("\n\ndata"), vec![""]);
//! assert_eq!(splitter.pending(), "data");
//! ```

use crate::error::Result;
use bytes::BytesMut;
use std::str::Utf8Error;

const BOM: char = '\u{FEFF}';

/// Incremental line splitter.
#[derive(Debug, Default)]
pub struct LineSplitter {
    /// Unterminated tail of the text seen so far
    buffer: String,
    /// The previous chunk ended in `\r`; a leading `\n` belongs to it
    skip_lf: bool,
    /// Some text has been seen (the BOM check is done)
    started: bool,
}

impl LineSplitter {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a text chunk and return every line it completes.
    ///
    /// Returned lines do not include their terminator.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        let mut rest = chunk;
        if !self.started {
            self.started = true;
            rest = rest.strip_prefix(BOM).unwrap_or(rest);
        }
        if std::mem::take(&mut self.skip_lf) {
            rest = rest.strip_prefix('\n').unwrap_or(rest);
        }

        let mut lines = Vec::new();
        while let Some(pos) = rest.find(['\r', '\n']) {
            self.buffer.push_str(&rest[..pos]);
            lines.push(std::mem::take(&mut self.buffer));

            let after = &rest[pos + 1..];
            rest = if rest.as_bytes()[pos] == b'\r' {
                match after.strip_prefix('\n') {
                    Some(tail) => tail,
                    None => {
                        self.skip_lf = after.is_empty();
                        after
                    }
                }
            } else {
                after
            };
        }
        self.buffer.push_str(rest);

        lines
    }

    /// Unterminated text waiting for its line break.
    ///
    /// When the stream ends this text is dropped: a line without terminator
    /// carries no meaning in an event stream.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

/// Incremental UTF-8 decoder for body chunks.
///
/// An invalid sequence poisons the decoder: the text before it is still
/// returned, everything after it is discarded, and every later call fails.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    carry: BytesMut,
    invalid: Option<Utf8Error>,
}

impl Utf8ChunkDecoder {
    /// Create a decoder with nothing carried over.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, holding back an incomplete trailing sequence.
    ///
    /// A chunk containing an invalid sequence yields its valid prefix; the
    /// error is reported by [`check`](Self::check) and by the next call.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Decode`](crate::SseError::Decode) once the decoder
    /// has seen bytes that are not valid UTF-8.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String> {
        self.check()?;
        self.carry.extend_from_slice(chunk);

        let valid = match std::str::from_utf8(&self.carry) {
            Ok(_) => self.carry.len(),
            Err(e) => {
                if e.error_len().is_some() {
                    self.invalid = Some(e);
                }
                e.valid_up_to()
            }
        };

        let head = self.carry.split_to(valid);
        if self.invalid.is_some() {
            self.carry.clear();
        }
        Ok(std::str::from_utf8(&head)?.to_owned())
    }

    /// Fail if an invalid sequence has been seen.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Decode`](crate::SseError::Decode) for the first
    /// invalid sequence.
    pub fn check(&self) -> Result<()> {
        match self.invalid {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
