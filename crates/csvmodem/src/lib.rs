//! A streaming, incremental CSV parser.
//!
//! csvmodem converts a byte stream of unknown encoding into a sequence of
//! records and fields, reporting each unit through an [`EventSink`] as it
//! is discovered instead of materializing the whole document in memory.
//! The encoding is detected once from the leading bytes (byte-order marks,
//! then a best-effort UTF-8 probe with a single-byte fallback), the input
//! is decoded chunk by chunk, and a character-level grammar recognizes
//! fields, quoted and escaped content, comments, and record boundaries.
//!
//! For callers that just want the data, the bulk functions collect the
//! event stream into ordinary result shapes:
//!
//! ```rust
//! use csvmodem::{ParserOptions, parse_records_from_str};
//!
//! let records = parse_records_from_str("field1,field2\nfield3,field4", ',', ParserOptions::default())
//!     .unwrap();
//! assert_eq!(
//!     records,
//!     vec![
//!         vec!["field1".to_string(), "field2".to_string()],
//!         vec!["field3".to_string(), "field4".to_string()],
//!     ]
//! );
//! ```
//!
//! Streaming consumers implement [`EventSink`] and drive a [`Parser`]
//! directly; see the [`Parser`] docs for an example.

mod buffer;
mod collect;
mod encoding;
mod error;
mod event;
mod options;
mod parser;

#[cfg(test)]
mod tests;

pub use collect::{
    parse_keyed_records, parse_keyed_records_from_path, parse_keyed_records_from_str,
    parse_records, parse_records_from_path, parse_records_from_str,
};
pub use encoding::TextEncoding;
pub use error::{FormatError, ParserError};
pub use event::EventSink;
pub use options::ParserOptions;
pub use parser::{CancelHandle, Parser, Progress};
