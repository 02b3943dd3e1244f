//! The streaming CSV parser implementation.
//!
//! [`Parser`] drives the byte source through the scan buffer and runs the
//! record/field/comment grammar over the decoded characters, reporting each
//! unit to an [`EventSink`] as soon as it is recognized. The whole parse
//! runs to completion (or error, or cancellation) in one blocking call on
//! the caller's thread.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::buffer::ScanBuffer;
use crate::error::{FormatError, ParserError};
use crate::event::EventSink;
use crate::options::ParserOptions;

const QUOTE: char = '"';
const BACKSLASH: char = '\\';
const COMMENT_MARKER: char = '#';
const EQUAL_SIGN: char = '=';

fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_field_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn trim_in_place(s: &mut String) {
    let end = s.trim_end_matches(is_field_whitespace).len();
    s.truncate(end);
    let start = s.len() - s.trim_start_matches(is_field_whitespace).len();
    s.drain(..start);
}

/// Why the grammar stopped early. Latched errors and cancellation both
/// unwind the rule stack; only errors reach the sink.
enum Halt {
    Canceled,
    Failed(ParserError),
}

impl From<ParserError> for Halt {
    fn from(error: ParserError) -> Self {
        Self::Failed(error)
    }
}

impl From<FormatError> for Halt {
    fn from(error: FormatError) -> Self {
        Self::Failed(ParserError::InvalidFormat(error))
    }
}

type Step<T> = Result<T, Halt>;

/// Cooperative cancellation for an in-flight parse.
///
/// Cloneable and sendable; the parser checks the flag between grammar
/// steps. Cancellation stops event emission without retracting events
/// already delivered, and is not an error: `parse` returns `Ok(())`.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Requests that the parse stop at the next grammar step.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Read-only view of parse progress, safe to poll from another thread.
#[derive(Debug, Clone)]
pub struct Progress {
    bytes: Arc<AtomicU64>,
}

impl Progress {
    /// Total bytes consumed from the byte source so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// The streaming CSV parser.
///
/// A parser owns its byte source exclusively; dropping the parser (which
/// [`Self::parse`] does on every exit path) closes the source.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
///
/// use csvmodem::{EventSink, Parser, ParserOptions};
///
/// #[derive(Default)]
/// struct Fields(Vec<String>);
///
/// impl EventSink for Fields {
///     fn on_field(&mut self, text: &str, _index: usize) {
///         self.0.push(text.to_string());
///     }
/// }
///
/// let parser = Parser::new(Cursor::new("a,b\n1,2"), ',', ParserOptions::default());
/// let mut fields = Fields::default();
/// parser.parse(&mut fields).unwrap();
/// assert_eq!(fields.0, ["a", "b", "1", "2"]);
/// ```
pub struct Parser<R> {
    input: ScanBuffer<R>,
    delimiter: char,
    options: ParserOptions,
    /// Scratch accumulator for the sanitized rendition of the field or
    /// comment currently being scanned. Reused across fields.
    sanitized: String,
    /// 1-based record counter. Increments once per record; newlines inside
    /// quoted fields do not advance it.
    record: u64,
    /// 0-based index of the next field within the current record.
    field_index: usize,
    canceled: Arc<AtomicBool>,
}

impl<R: Read> Parser<R> {
    /// Creates a parser over `source` with the given single-character
    /// `delimiter`.
    ///
    /// The delimiter must not be the quote character or a line terminator;
    /// that misconfiguration is reported by [`Self::parse`] as
    /// [`ParserError::InvalidDelimiter`] before any scanning happens.
    pub fn new(source: R, delimiter: char, options: ParserOptions) -> Self {
        Self {
            input: ScanBuffer::new(source, options.encoding),
            delimiter,
            options,
            sanitized: String::new(),
            record: 0,
            field_index: 0,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that can cancel this parse, including from another thread
    /// or from inside an [`EventSink`] callback.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.canceled),
        }
    }

    /// A handle reporting bytes consumed from the source, for monitoring.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            bytes: self.input.bytes_read_handle(),
        }
    }

    /// Runs the parse to completion, reporting every unit to `sink`.
    ///
    /// Exactly one terminal notification is delivered: `on_document_end`
    /// on success, or `on_error` on failure (which is also returned).
    /// Cancellation delivers neither and returns `Ok(())`. The parser and
    /// its byte source are consumed on every path.
    ///
    /// # Errors
    ///
    /// The first latched [`ParserError`]; scanning never resumes past it.
    pub fn parse<S: EventSink>(mut self, sink: &mut S) -> Result<(), ParserError> {
        sink.on_document_start();
        match self.run(sink) {
            Ok(()) => {
                sink.on_document_end();
                Ok(())
            }
            Err(Halt::Canceled) => Ok(()),
            Err(Halt::Failed(error)) => {
                sink.on_error(&error);
                Err(error)
            }
        }
    }

    fn run<S: EventSink>(&mut self, sink: &mut S) -> Step<()> {
        if self.delimiter == QUOTE || is_line_break(self.delimiter) {
            return Err(ParserError::InvalidDelimiter(self.delimiter).into());
        }
        self.input.prepare()?;
        loop {
            self.check_canceled()?;
            if self.input.peek()?.is_none() {
                break;
            }
            self.parse_record(sink)?;
        }
        Ok(())
    }

    fn check_canceled(&self) -> Step<()> {
        if self.canceled.load(Ordering::Relaxed) {
            Err(Halt::Canceled)
        } else {
            Ok(())
        }
    }

    /// One record: any comments preceding it, then begin-line, fields
    /// separated by the delimiter, end-line, and the trailing terminator
    /// run.
    fn parse_record<S: EventSink>(&mut self, sink: &mut S) -> Step<()> {
        if self.options.recognize_comments {
            while self.input.peek()? == Some(COMMENT_MARKER) {
                self.parse_comment(sink)?;
            }
        }

        if self.input.peek()?.is_some() {
            self.record += 1;
            self.field_index = 0;
            sink.on_line_start(self.record);
            loop {
                self.check_canceled()?;
                self.parse_field(sink)?;
                if !self.parse_delimiter()? {
                    break;
                }
            }
            sink.on_line_end(self.record);
        }

        self.parse_terminator_run()
    }

    /// One field, always attempted: an empty line still yields one empty
    /// field. Emits the raw slice or the sanitized accumulator depending
    /// on the sanitize option.
    fn parse_field<S: EventSink>(&mut self, sink: &mut S) -> Step<()> {
        self.input.trim_consumed();
        self.sanitized.clear();
        let mut raw_start = self.input.mark();

        self.skip_field_whitespace()?;
        let equal_quoted = self.options.recognize_leading_equal_sign
            && self.input.peek()? == Some(EQUAL_SIGN)
            && self.input.peek_second()? == Some(QUOTE);
        match self.input.peek()? {
            Some(QUOTE) => self.parse_escaped_field()?,
            Some(EQUAL_SIGN) if equal_quoted => {
                // The equal sign is consumed and excluded from the field.
                self.input.bump()?;
                raw_start = self.input.mark();
                self.sanitized.clear();
                self.parse_escaped_field()?;
            }
            _ => {
                self.parse_unescaped_field()?;
                if self.options.trim_whitespace {
                    trim_in_place(&mut self.sanitized);
                }
            }
        }
        self.skip_field_whitespace()?;

        let text = if self.options.sanitize_fields {
            self.sanitized.as_str()
        } else {
            let raw = self.input.slice_from(raw_start);
            if self.options.trim_whitespace {
                raw.trim_matches(is_field_whitespace)
            } else {
                raw
            }
        };
        sink.on_field(text, self.field_index);
        self.field_index += 1;
        Ok(())
    }

    /// Skips space/tab around a field body. A whitespace character equal
    /// to the delimiter is never skipped. When not trimming, the skipped
    /// characters still land in the sanitized accumulator so sanitizing
    /// alone preserves the raw spacing.
    fn skip_field_whitespace(&mut self) -> Step<()> {
        let delimiter = self.delimiter;
        if self.options.trim_whitespace {
            self.input
                .skip_while(|c| is_field_whitespace(c) && c != delimiter)?;
        } else {
            self.input.copy_while(&mut self.sanitized, |c| {
                is_field_whitespace(c) && c != delimiter
            })?;
        }
        Ok(())
    }

    /// A quoted field body, after the cursor has reached the opening
    /// quote. Delimiters and line terminators are ordinary content here; a
    /// doubled quote is one literal quote; a lone quote closes the field.
    fn parse_escaped_field(&mut self) -> Step<()> {
        self.input.bump()?; // opening quote
        loop {
            match self.input.peek()? {
                None => break,
                Some(BACKSLASH) if self.options.backslash_escapes => {
                    self.input.bump()?;
                    if let Some(escaped) = self.input.bump()? {
                        self.sanitized.push(escaped);
                    }
                }
                Some(QUOTE) => {
                    if self.input.peek_second()? == Some(QUOTE) {
                        self.sanitized.push(QUOTE);
                        self.input.bump()?;
                        self.input.bump()?;
                    } else {
                        break;
                    }
                }
                Some(_) => {
                    let escapes = self.options.backslash_escapes;
                    self.input.copy_while(&mut self.sanitized, |c| {
                        c != QUOTE && !(escapes && c == BACKSLASH)
                    })?;
                }
            }
        }
        if self.input.bump()? == Some(QUOTE) {
            Ok(())
        } else {
            Err(FormatError::UnterminatedQuote {
                record: self.record,
            }
            .into())
        }
    }

    /// An unquoted field body: everything up to the delimiter, a line
    /// terminator, or end-of-stream. Always succeeds.
    fn parse_unescaped_field(&mut self) -> Step<()> {
        loop {
            match self.input.peek()? {
                None => return Ok(()),
                Some(BACKSLASH) if self.options.backslash_escapes => {
                    self.input.bump()?;
                    if let Some(escaped) = self.input.bump()? {
                        self.sanitized.push(escaped);
                    }
                }
                Some(c) if c == self.delimiter || is_line_break(c) => return Ok(()),
                Some(_) => {
                    let delimiter = self.delimiter;
                    let escapes = self.options.backslash_escapes;
                    self.input.copy_while(&mut self.sanitized, |c| {
                        c != delimiter && !is_line_break(c) && !(escapes && c == BACKSLASH)
                    })?;
                }
            }
        }
    }

    /// After a field: the delimiter continues the record, a line
    /// terminator or end-of-stream completes it, anything else is a format
    /// error.
    fn parse_delimiter(&mut self) -> Step<bool> {
        match self.input.peek()? {
            Some(c) if c == self.delimiter => {
                self.input.bump()?;
                Ok(true)
            }
            None => Ok(false),
            Some(c) if is_line_break(c) => Ok(false),
            Some(found) => Err(FormatError::UnexpectedCharacter {
                record: self.record,
                found,
            }
            .into()),
        }
    }

    /// A comment: the marker, then the raw span up to an unescaped line
    /// terminator or end-of-stream. Backslash escapes (when enabled) only
    /// keep a terminator from ending the comment; the span is reported
    /// verbatim.
    fn parse_comment<S: EventSink>(&mut self, sink: &mut S) -> Step<()> {
        self.input.trim_consumed();
        self.input.bump()?; // the marker
        let start = self.input.mark();
        loop {
            match self.input.peek()? {
                None => break,
                Some(BACKSLASH) if self.options.backslash_escapes => {
                    self.input.bump()?;
                    self.input.bump()?;
                }
                Some(c) if is_line_break(c) => break,
                Some(_) => {
                    let escapes = self.options.backslash_escapes;
                    self.input
                        .skip_while(|c| !is_line_break(c) && !(escapes && c == BACKSLASH))?;
                }
            }
        }
        sink.on_comment(self.input.slice_from(start));
        self.input.trim_consumed();
        self.parse_terminator_run()
    }

    /// Consumes a run of line terminators (CR, LF, or CRLF as a unit) and
    /// reclaims the window behind them.
    fn parse_terminator_run(&mut self) -> Step<()> {
        self.input.skip_while(is_line_break)?;
        self.input.trim_consumed();
        Ok(())
    }
}
