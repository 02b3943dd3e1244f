//! The incremental buffer manager and scan cursor.
//!
//! [`ScanBuffer`] guarantees the grammar rules always see either a valid
//! next character or a reliable end-of-stream signal, without holding the
//! whole document in memory: it performs bounded reads from the byte
//! source on demand, appends decoded text to a sliding window, and drops
//! the consumed prefix at field/comment/record boundaries.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encoding::{SNIFF_LEN, StreamDecoder, TextEncoding, sniff};
use crate::error::ParserError;

/// Bytes per bounded read of the source.
const CHUNK_SIZE: usize = 512;

/// Refill when fewer decoded bytes than this remain unread. Large enough to
/// examine a delimiter, a doubled quote, and one lookahead character even
/// when every one of them is a four-byte scalar.
const LOOKAHEAD_MARGIN: usize = 16;

pub(crate) struct ScanBuffer<R> {
    source: R,
    decoder: Option<StreamDecoder>,
    explicit: Option<TextEncoding>,
    /// Decoded sliding window. `cursor..` is unread.
    text: String,
    /// Byte offset of the next unread character; always a char boundary.
    cursor: usize,
    /// The source returned a zero-length read.
    exhausted: bool,
    /// Total bytes consumed from the source, observable cross-thread.
    bytes_read: Arc<AtomicU64>,
}

impl<R: Read> ScanBuffer<R> {
    pub(crate) fn new(source: R, explicit: Option<TextEncoding>) -> Self {
        Self {
            source,
            decoder: None,
            explicit,
            text: String::new(),
            cursor: 0,
            exhausted: false,
            bytes_read: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn bytes_read_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.bytes_read)
    }

    /// Fixes the session's encoding. Runs exactly once, before any
    /// character-level scanning: either adopts the explicit encoding, or
    /// reads the sniff prefix, detects a marker, and decodes the remainder
    /// of the prefix past it.
    pub(crate) fn prepare(&mut self) -> Result<(), ParserError> {
        if let Some(encoding) = self.explicit {
            self.decoder = Some(StreamDecoder::new(encoding));
            return Ok(());
        }

        let mut prefix = [0u8; SNIFF_LEN];
        let mut len = 0;
        while len < SNIFF_LEN && !self.exhausted {
            let n = self.read_source(&mut prefix[len..])?;
            if n == 0 {
                self.exhausted = true;
            }
            len += n;
        }

        let (encoding, marker_len) = sniff(&prefix[..len]);
        let mut decoder = StreamDecoder::new(encoding);
        decoder.decode(&prefix[marker_len..len], &mut self.text);
        if self.exhausted {
            decoder.finish(&mut self.text);
        }
        self.decoder = Some(decoder);
        Ok(())
    }

    /// One bounded read, retrying on `Interrupted`.
    fn read_source(&mut self, buf: &mut [u8]) -> Result<usize, ParserError> {
        loop {
            match self.source.read(buf) {
                Ok(n) => {
                    self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
                    return Ok(n);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Tops the window up to the lookahead margin. One bounded read per
    /// pass; a zero-length read marks exhaustion and flushes the decoder.
    fn fill(&mut self) -> Result<(), ParserError> {
        while !self.exhausted && self.text.len() - self.cursor < LOOKAHEAD_MARGIN {
            let mut chunk = [0u8; CHUNK_SIZE];
            let n = self.read_source(&mut chunk)?;
            let Some(decoder) = self.decoder.as_mut() else {
                break;
            };
            if n == 0 {
                self.exhausted = true;
                decoder.finish(&mut self.text);
            } else {
                decoder.decode(&chunk[..n], &mut self.text);
            }
        }
        Ok(())
    }

    /// The next unread character, or `None` at end-of-stream.
    pub(crate) fn peek(&mut self) -> Result<Option<char>, ParserError> {
        self.fill()?;
        Ok(self.text[self.cursor..].chars().next())
    }

    /// The character after the next one.
    pub(crate) fn peek_second(&mut self) -> Result<Option<char>, ParserError> {
        self.fill()?;
        Ok(self.text[self.cursor..].chars().nth(1))
    }

    /// Consumes and returns the next character.
    pub(crate) fn bump(&mut self) -> Result<Option<char>, ParserError> {
        self.fill()?;
        let next = self.text[self.cursor..].chars().next();
        if let Some(c) = next {
            self.cursor += c.len_utf8();
        }
        Ok(next)
    }

    /// Current cursor offset, for later [`Self::slice_from`]. Valid until
    /// the next [`Self::trim_consumed`].
    pub(crate) fn mark(&self) -> usize {
        self.cursor
    }

    /// The consumed range since `mark`.
    pub(crate) fn slice_from(&self, mark: usize) -> &str {
        &self.text[mark..self.cursor]
    }

    /// Bulk fast path: consumes characters matching `predicate` and appends
    /// them to `dst`, refilling as needed, until a non-matching character
    /// or end-of-stream.
    pub(crate) fn copy_while<F>(&mut self, dst: &mut String, predicate: F) -> Result<(), ParserError>
    where
        F: Fn(char) -> bool,
    {
        loop {
            self.fill()?;
            let rest = &self.text[self.cursor..];
            if rest.is_empty() {
                return Ok(());
            }
            let mut matched = 0;
            for c in rest.chars() {
                if !predicate(c) {
                    break;
                }
                matched += c.len_utf8();
            }
            dst.push_str(&rest[..matched]);
            self.cursor += matched;
            if matched < rest.len() {
                return Ok(());
            }
        }
    }

    /// Like [`Self::copy_while`] but discards the matched characters,
    /// advancing the cursor only. Raw ranges over the skipped text stay
    /// addressable through [`Self::slice_from`].
    pub(crate) fn skip_while<F>(&mut self, predicate: F) -> Result<(), ParserError>
    where
        F: Fn(char) -> bool,
    {
        loop {
            self.fill()?;
            let rest = &self.text[self.cursor..];
            if rest.is_empty() {
                return Ok(());
            }
            let mut matched = 0;
            for c in rest.chars() {
                if !predicate(c) {
                    break;
                }
                matched += c.len_utf8();
            }
            self.cursor += matched;
            if matched < rest.len() {
                return Ok(());
            }
        }
    }

    /// Drops the consumed prefix of the window and resets the cursor,
    /// bounding memory to roughly one chunk plus the longest in-flight
    /// field. Invalidates outstanding marks.
    pub(crate) fn trim_consumed(&mut self) {
        if self.cursor > 0 {
            self.text.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}
