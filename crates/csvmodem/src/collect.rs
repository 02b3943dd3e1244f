//! Bulk-result convenience surface.
//!
//! These functions wire an accumulating [`EventSink`] to the core parser
//! and convert a latched error into a returned one. They add no parsing
//! logic of their own, and they never hand back a partial result: any
//! error discards everything accumulated so far.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::mem;
use std::path::Path;

use crate::encoding::TextEncoding;
use crate::error::ParserError;
use crate::event::EventSink;
use crate::options::ParserOptions;
use crate::parser::{CancelHandle, Parser};

/// Collects records as an array of arrays.
#[derive(Debug, Default)]
struct RecordSink {
    records: Vec<Vec<String>>,
    current: Vec<String>,
}

impl EventSink for RecordSink {
    fn on_field(&mut self, text: &str, _index: usize) {
        self.current.push(text.to_owned());
    }

    fn on_line_end(&mut self, _line: u64) {
        self.records.push(mem::take(&mut self.current));
    }
}

/// Collects records as header-keyed maps, canceling on a field-count
/// mismatch.
struct KeyedSink {
    header: Option<Vec<String>>,
    current: Vec<String>,
    rows: Vec<BTreeMap<String, String>>,
    cancel: CancelHandle,
    mismatch: Option<ParserError>,
}

impl KeyedSink {
    fn new(cancel: CancelHandle) -> Self {
        Self {
            header: None,
            current: Vec::new(),
            rows: Vec::new(),
            cancel,
            mismatch: None,
        }
    }
}

impl EventSink for KeyedSink {
    fn on_field(&mut self, text: &str, _index: usize) {
        self.current.push(text.to_owned());
    }

    fn on_line_end(&mut self, line: u64) {
        let fields = mem::take(&mut self.current);
        match &self.header {
            None => self.header = Some(fields),
            Some(header) if header.len() != fields.len() => {
                self.mismatch = Some(ParserError::IncorrectFieldCount {
                    record: line,
                    expected: header.len(),
                    found: fields.len(),
                });
                self.cancel.cancel();
            }
            Some(header) => {
                self.rows
                    .push(header.iter().cloned().zip(fields).collect());
            }
        }
    }
}

/// Parses the whole stream into records of field strings.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
///
/// use csvmodem::{ParserOptions, parse_records};
///
/// let records = parse_records(Cursor::new(",,"), ',', ParserOptions::default()).unwrap();
/// assert_eq!(records, vec![vec![String::new(), String::new(), String::new()]]);
/// ```
///
/// # Errors
///
/// The latched [`ParserError`]; no partial records are returned.
pub fn parse_records<R: Read>(
    source: R,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<Vec<String>>, ParserError> {
    let parser = Parser::new(source, delimiter, options);
    let mut sink = RecordSink::default();
    parser.parse(&mut sink)?;
    Ok(sink.records)
}

/// Parses a fixed string. The input is already decoded, so encoding
/// sniffing is skipped.
///
/// # Errors
///
/// The latched [`ParserError`]; no partial records are returned.
pub fn parse_records_from_str(
    input: &str,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<Vec<String>>, ParserError> {
    let options = ParserOptions {
        encoding: Some(TextEncoding::Utf8),
        ..options
    };
    parse_records(Cursor::new(input.as_bytes()), delimiter, options)
}

/// Opens and parses a file.
///
/// # Errors
///
/// The latched [`ParserError`], or [`ParserError::Io`] if the file cannot
/// be opened.
pub fn parse_records_from_path<P: AsRef<Path>>(
    path: P,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<Vec<String>>, ParserError> {
    parse_records(File::open(path)?, delimiter, options)
}

/// Parses the whole stream into header-keyed records.
///
/// The first record supplies the keys; every subsequent record must have
/// the same field count. A mismatch cancels the parse and yields
/// [`ParserError::IncorrectFieldCount`].
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
///
/// use csvmodem::{ParserOptions, parse_keyed_records};
///
/// let rows =
///     parse_keyed_records(Cursor::new("a,b\n1,2"), ',', ParserOptions::default()).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["a"], "1");
/// assert_eq!(rows[0]["b"], "2");
/// ```
///
/// # Errors
///
/// The latched [`ParserError`]; no partial rows are returned.
pub fn parse_keyed_records<R: Read>(
    source: R,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<BTreeMap<String, String>>, ParserError> {
    let parser = Parser::new(source, delimiter, options);
    let mut sink = KeyedSink::new(parser.cancel_handle());
    parser.parse(&mut sink)?;
    if let Some(error) = sink.mismatch {
        return Err(error);
    }
    Ok(sink.rows)
}

/// Keyed variant of [`parse_records_from_str`].
///
/// # Errors
///
/// The latched [`ParserError`]; no partial rows are returned.
pub fn parse_keyed_records_from_str(
    input: &str,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<BTreeMap<String, String>>, ParserError> {
    let options = ParserOptions {
        encoding: Some(TextEncoding::Utf8),
        ..options
    };
    parse_keyed_records(Cursor::new(input.as_bytes()), delimiter, options)
}

/// Keyed variant of [`parse_records_from_path`].
///
/// # Errors
///
/// The latched [`ParserError`], or [`ParserError::Io`] if the file cannot
/// be opened.
pub fn parse_keyed_records_from_path<P: AsRef<Path>>(
    path: P,
    delimiter: char,
    options: ParserOptions,
) -> Result<Vec<BTreeMap<String, String>>, ParserError> {
    parse_keyed_records(File::open(path)?, delimiter, options)
}
