use std::io;

use thiserror::Error;

/// Any error reported by a parse.
///
/// At most one error is reported per parse session: the parser latches the
/// first failure, stops scanning, and delivers it through
/// [`EventSink::on_error`](crate::EventSink::on_error) before
/// [`Parser::parse`](crate::Parser::parse) returns it.
#[derive(Error, Debug)]
pub enum ParserError {
    /// The configured delimiter collides with the quote character or a line
    /// terminator. Detected at parse start.
    #[error("invalid delimiter {0:?}")]
    InvalidDelimiter(char),

    /// The input violated the grammar.
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] FormatError),

    /// A record's field count differs from the header record's. Produced by
    /// the keyed collector, never by the scanner itself.
    #[error("record {record}: expected {expected} fields, found {found}")]
    IncorrectFieldCount {
        /// 1-based record that mismatched.
        record: u64,
        /// Field count of the header record.
        expected: usize,
        /// Field count actually seen.
        found: usize,
    },

    /// The byte source failed to read.
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Grammar violations latched by the scanner.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// A field was followed by a character that is neither the delimiter, a
    /// line terminator, nor end-of-stream.
    #[error("record {record}: unexpected character {found:?} after field")]
    UnexpectedCharacter {
        /// 1-based record being scanned.
        record: u64,
        /// The offending character.
        found: char,
    },

    /// End-of-stream inside a quoted field, before its closing quote.
    #[error("record {record}: unterminated quoted field")]
    UnterminatedQuote {
        /// 1-based record being scanned.
        record: u64,
    },
}
