#![allow(clippy::struct_excessive_bools)]

use crate::encoding::TextEncoding;

/// Configuration options for the streaming CSV parser.
///
/// Each flag toggles one independent recognition behavior; the delimiter
/// itself is passed to [`Parser::new`](crate::Parser::new) separately.
///
/// # Examples
///
/// ```rust
/// use csvmodem::ParserOptions;
///
/// let options = ParserOptions {
///     sanitize_fields: true,
///     trim_whitespace: true,
///     ..Default::default()
/// };
/// ```
///
/// # Default
///
/// All flags default to `false`; `encoding` defaults to `None` (sniff).
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserOptions {
    /// Whether a backslash escapes the character after it.
    ///
    /// When `true`, a backslash inside a field (quoted or not) or a comment
    /// removes any special meaning from the following character, so `\"`
    /// inside a quoted field is a literal quote and `\,` in an unquoted
    /// field is a literal delimiter.
    ///
    /// # Default
    ///
    /// `false`
    pub backslash_escapes: bool,

    /// Whether fields are reported in sanitized form.
    ///
    /// A sanitized field has its surrounding quotes removed, doubled quotes
    /// collapsed to one, and backslash escapes resolved. When `false`,
    /// fields are reported as the verbatim slice of the input, quotes and
    /// escapes included.
    ///
    /// # Default
    ///
    /// `false`
    pub sanitize_fields: bool,

    /// Whether a `#` at the start of a record begins a comment.
    ///
    /// A comment runs to the next unescaped line terminator and is reported
    /// through [`EventSink::on_comment`](crate::EventSink::on_comment)
    /// instead of producing a record. When `false`, `#` is ordinary field
    /// text.
    ///
    /// # Default
    ///
    /// `false`
    pub recognize_comments: bool,

    /// Whether leading and trailing whitespace is stripped from fields.
    ///
    /// Recognized whitespace is space and tab. Whitespace inside a field is
    /// never touched.
    ///
    /// # Default
    ///
    /// `false`
    pub trim_whitespace: bool,

    /// Whether `="…"` is read as a quoted field.
    ///
    /// Some spreadsheet exports prefix quoted fields with an equal sign to
    /// force text interpretation. When `true`, an equal sign immediately
    /// followed by a quote is consumed and excluded from the field.
    ///
    /// # Default
    ///
    /// `false`
    pub recognize_leading_equal_sign: bool,

    /// Text encoding of the input, if known.
    ///
    /// Supplying an encoding skips sniffing entirely: no byte-order mark is
    /// looked for or stripped, and decoding starts at the first byte.
    ///
    /// # Default
    ///
    /// `None`, detect the encoding from the first bytes of the stream.
    pub encoding: Option<TextEncoding>,
}
