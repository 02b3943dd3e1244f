#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use csvmodem::{ParserOptions, parse_records};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    backslash_escapes: bool,
    sanitize_fields: bool,
    recognize_comments: bool,
    trim_whitespace: bool,
    recognize_leading_equal_sign: bool,
    delimiter: char,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let options = ParserOptions {
        backslash_escapes: input.backslash_escapes,
        sanitize_fields: input.sanitize_fields,
        recognize_comments: input.recognize_comments,
        trim_whitespace: input.trim_whitespace,
        recognize_leading_equal_sign: input.recognize_leading_equal_sign,
        encoding: None,
    };
    // Arbitrary bytes and options must never panic; errors are fine.
    let _ = parse_records(Cursor::new(input.data), input.delimiter, options);
});
