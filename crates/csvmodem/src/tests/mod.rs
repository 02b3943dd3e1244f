mod option_flags;

use std::io::{self, Cursor, Read};

use crate::{EventSink, Parser, ParserError, ParserOptions};

/// One recorded sink notification, for asserting on exact event order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    DocumentStart,
    LineStart(u64),
    Field { text: String, index: usize },
    LineEnd(u64),
    Comment(String),
    DocumentEnd,
    Error(String),
}

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) events: Vec<Event>,
}

impl EventSink for Recorder {
    fn on_document_start(&mut self) {
        self.events.push(Event::DocumentStart);
    }

    fn on_line_start(&mut self, line: u64) {
        self.events.push(Event::LineStart(line));
    }

    fn on_field(&mut self, text: &str, index: usize) {
        self.events.push(Event::Field {
            text: text.to_string(),
            index,
        });
    }

    fn on_line_end(&mut self, line: u64) {
        self.events.push(Event::LineEnd(line));
    }

    fn on_comment(&mut self, text: &str) {
        self.events.push(Event::Comment(text.to_string()));
    }

    fn on_document_end(&mut self) {
        self.events.push(Event::DocumentEnd);
    }

    fn on_error(&mut self, error: &ParserError) {
        self.events.push(Event::Error(error.to_string()));
    }
}

/// Parses `input` from an in-memory byte source (full sniffing path) and
/// records every event, ignoring the returned result.
pub(crate) fn record_events(input: &str, delimiter: char, options: ParserOptions) -> Vec<Event> {
    record_events_from(Cursor::new(input.as_bytes().to_vec()), delimiter, options)
}

pub(crate) fn record_events_from<R: Read>(
    source: R,
    delimiter: char,
    options: ParserOptions,
) -> Vec<Event> {
    let parser = Parser::new(source, delimiter, options);
    let mut recorder = Recorder::default();
    let _ = parser.parse(&mut recorder);
    recorder.events
}

/// A byte source that hands out at most `step` bytes per read, to exercise
/// refill and sequences split across chunk boundaries.
pub(crate) struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl TrickleReader {
    pub(crate) fn new(data: impl Into<Vec<u8>>, step: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            step: step.max(1),
        }
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
