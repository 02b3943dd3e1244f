use crate::error::ParserError;

/// Observer for the parser's lifecycle notifications.
///
/// All calls are synchronous, on the caller's thread, in document order:
/// `on_document_start`, then per record `on_line_start`, one `on_field` per
/// field, `on_line_end`, interleaved with `on_comment` between records when
/// comment recognition is enabled; terminated by exactly one of
/// `on_document_end` or `on_error`. Cancellation produces neither
/// terminator.
///
/// Every method has a no-op default body, so implementations override only
/// the notifications they care about:
///
/// ```rust
/// use csvmodem::EventSink;
///
/// #[derive(Default)]
/// struct FieldCounter(usize);
///
/// impl EventSink for FieldCounter {
///     fn on_field(&mut self, _text: &str, _index: usize) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait EventSink {
    /// The parse session has begun. Always the first call.
    fn on_document_start(&mut self) {}

    /// A record begins. `line` is 1-based and increments once per record;
    /// physical newlines inside quoted fields do not advance it.
    fn on_line_start(&mut self, _line: u64) {}

    /// One field of the current record. `index` is 0-based within the
    /// record. The text is valid only for the duration of the call.
    fn on_field(&mut self, _text: &str, _index: usize) {}

    /// The record begun by the matching `on_line_start` is complete.
    fn on_line_end(&mut self, _line: u64) {}

    /// A comment, without its leading marker. Never consumes a field slot.
    fn on_comment(&mut self, _text: &str) {}

    /// The whole input parsed successfully. Terminal.
    fn on_document_end(&mut self) {}

    /// The parse failed; no field or line events follow. Terminal.
    fn on_error(&mut self, _error: &ParserError) {}
}
