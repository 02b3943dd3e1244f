use rstest::rstest;

use crate::{ParserOptions, parse_records_from_str};

fn options(sanitize: bool, trim: bool) -> ParserOptions {
    ParserOptions {
        sanitize_fields: sanitize,
        trim_whitespace: trim,
        ..Default::default()
    }
}

#[rstest]
#[case(false, false, " a ")]
#[case(false, true, "a")]
#[case(true, false, " a ")]
#[case(true, true, "a")]
fn unquoted_whitespace_matrix(#[case] sanitize: bool, #[case] trim: bool, #[case] expected: &str) {
    let records = parse_records_from_str(" a ,x", ',', options(sanitize, trim)).unwrap();
    assert_eq!(records[0][0], expected);
}

#[rstest]
#[case(false, false, " \"a\" ")]
#[case(false, true, "\"a\"")]
#[case(true, false, " a ")]
#[case(true, true, "a")]
fn quoted_whitespace_matrix(#[case] sanitize: bool, #[case] trim: bool, #[case] expected: &str) {
    // Whitespace skipped around the quotes still lands in the sanitized
    // accumulator unless trimming is on.
    let records = parse_records_from_str(" \"a\" ,x", ',', options(sanitize, trim)).unwrap();
    assert_eq!(records[0][0], expected);
}

#[test]
fn interior_whitespace_survives_trimming() {
    let records = parse_records_from_str("a\tb ,c", ',', options(false, true)).unwrap();
    assert_eq!(records[0], ["a\tb", "c"]);
}

#[test]
fn backslash_escapes_a_delimiter() {
    let escaping = ParserOptions {
        backslash_escapes: true,
        sanitize_fields: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("a\\,b,c", ',', escaping).unwrap(),
        vec![vec!["a,b", "c"]]
    );

    // Raw emission keeps the backslash.
    let raw = ParserOptions {
        backslash_escapes: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("a\\,b,c", ',', raw).unwrap(),
        vec![vec!["a\\,b", "c"]]
    );

    // Without the flag, the backslash is ordinary text and the delimiter
    // splits.
    assert_eq!(
        parse_records_from_str("a\\,b,c", ',', ParserOptions::default()).unwrap(),
        vec![vec!["a\\", "b", "c"]]
    );
}

#[test]
fn backslash_escapes_a_quote_inside_a_quoted_field() {
    let options = ParserOptions {
        backslash_escapes: true,
        sanitize_fields: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("\"a\\\"b\"", ',', options).unwrap(),
        vec![vec!["a\"b"]]
    );
}

#[test]
fn escaped_line_break_stays_in_an_unquoted_field() {
    let options = ParserOptions {
        backslash_escapes: true,
        sanitize_fields: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("a\\\nb", ',', options).unwrap(),
        vec![vec!["a\nb"]]
    );
}

#[test]
fn leading_equal_sign_is_excluded_when_recognized() {
    let recognized = ParserOptions {
        recognize_leading_equal_sign: true,
        sanitize_fields: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("=\"a\",b", ',', recognized).unwrap(),
        vec![vec!["a", "b"]]
    );

    // Raw emission starts after the equal sign.
    let raw = ParserOptions {
        recognize_leading_equal_sign: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("=\"a\",b", ',', raw).unwrap(),
        vec![vec!["\"a\"", "b"]]
    );

    // Disabled, the equal sign is field text and the quote never opens a
    // quoted field.
    assert_eq!(
        parse_records_from_str("=\"a\",b", ',', ParserOptions::default()).unwrap(),
        vec![vec!["=\"a\"", "b"]]
    );
}

#[test]
fn equal_sign_without_a_quote_is_ordinary_text() {
    let options = ParserOptions {
        recognize_leading_equal_sign: true,
        ..Default::default()
    };
    assert_eq!(
        parse_records_from_str("=a,b", ',', options).unwrap(),
        vec![vec!["=a", "b"]]
    );
}

#[test]
fn whitespace_equal_to_the_delimiter_is_never_skipped() {
    let records = parse_records_from_str("a  b", ' ', options(false, true)).unwrap();
    assert_eq!(records[0], ["a", "", "b"]);
}

#[test]
fn tab_delimiter_with_space_padding() {
    let records = parse_records_from_str("a\t b", '\t', options(false, true)).unwrap();
    assert_eq!(records[0], ["a", "b"]);
}
