// SPDX-License-Identifier: Apache-2.0

// Error reporting through the public API

use picotree::{from_slice, parse, ParseError, Reader, SyntaxError};

fn syntax(kind: SyntaxError) -> Result<picotree::Value, ParseError> {
    Err(ParseError::Syntax(kind))
}

#[test]
fn test_malformed_json_missing_quotes() {
    assert_eq!(
        from_slice(br#"{name: "value"}"#),
        syntax(SyntaxError::KeyMustBeString)
    );
}

#[test]
fn test_malformed_json_unterminated_string() {
    assert_eq!(
        from_slice(br#"{"unterminated": "missing quote}"#),
        syntax(SyntaxError::UnexpectedEndOfInput)
    );
}

#[test]
fn test_malformed_json_unmatched_brackets() {
    assert_eq!(
        from_slice(br#"{"array": [1, 2, 3}"#),
        syntax(SyntaxError::UnexpectedByte(b'}'))
    );
    assert_eq!(
        from_slice(br#"[{"a": 1]"#),
        syntax(SyntaxError::UnexpectedByte(b']'))
    );
}

#[test]
fn test_malformed_json_missing_colon() {
    assert_eq!(
        from_slice(br#"{"a" "b"}"#),
        syntax(SyntaxError::UnexpectedByte(b'"'))
    );
}

#[test]
fn test_malformed_numbers() {
    assert_eq!(from_slice(b"-"), syntax(SyntaxError::ExpectedDigit));
    assert_eq!(from_slice(b"1."), syntax(SyntaxError::ExpectedDigit));
    assert_eq!(from_slice(b"[1e]"), syntax(SyntaxError::ExpectedDigit));
    assert_eq!(from_slice(b"+1"), syntax(SyntaxError::UnexpectedByte(b'+')));
    assert_eq!(from_slice(b".5"), syntax(SyntaxError::UnexpectedByte(b'.')));
    assert_eq!(from_slice(b"012"), syntax(SyntaxError::TrailingContent));
}

#[test]
fn test_invalid_escapes() {
    assert_eq!(from_slice(br#""\a""#), syntax(SyntaxError::InvalidEscape));
    assert_eq!(from_slice(br#""\'""#), syntax(SyntaxError::InvalidEscape));
    assert_eq!(from_slice(br#""\uZZZZ""#), syntax(SyntaxError::InvalidUnicodeHex));
}

#[test]
fn test_raw_control_characters() {
    assert_eq!(from_slice(b"\"a\nb\""), syntax(SyntaxError::ControlCharacter));
    assert_eq!(from_slice(b"\"\x00\""), syntax(SyntaxError::ControlCharacter));
    assert_eq!(from_slice(b"\"\x1f\""), syntax(SyntaxError::ControlCharacter));
    // DEL is not a control character for JSON
    assert!(from_slice(b"\"\x7f\"").is_ok());
}

#[test]
fn test_empty_and_whitespace_only_input() {
    assert_eq!(from_slice(b""), syntax(SyntaxError::UnexpectedEndOfInput));
    assert_eq!(from_slice(b" \n\t"), syntax(SyntaxError::UnexpectedEndOfInput));
}

#[test]
fn test_unsupported_literals() {
    assert_eq!(from_slice(b"NaN"), syntax(SyntaxError::UnexpectedByte(b'N')));
    assert_eq!(
        from_slice(b"Infinity"),
        syntax(SyntaxError::UnexpectedByte(b'I'))
    );
    assert_eq!(
        from_slice(b"[1, // comment\n 2]"),
        syntax(SyntaxError::UnexpectedByte(b'/'))
    );
}

/// Delivers `data` one byte per read, then fails instead of reporting EOF.
struct BrokenPipe {
    data: &'static [u8],
}

impl Reader for BrokenPipe {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.data.split_first() {
            Some((&byte, rest)) => {
                buf[0] = byte;
                self.data = rest;
                Ok(1)
            }
            None => Err("connection reset"),
        }
    }
}

#[test]
fn test_read_error_mid_stream() {
    let result = parse(BrokenPipe {
        data: br#"{"key": ["partial", "#,
    });
    assert_eq!(result, Err(ParseError::ReadError));
}

#[test]
fn test_read_error_after_complete_value() {
    // The source must report a clean end after the root value
    assert_eq!(
        parse(BrokenPipe { data: b"[1, 2]" }),
        Err(ParseError::ReadError)
    );
}

#[test]
fn test_error_display() {
    assert_eq!(
        ParseError::Syntax(SyntaxError::UnexpectedByte(b'x')).to_string(),
        "syntax error: unexpected byte 'x'"
    );
    assert_eq!(ParseError::OutOfMemory.to_string(), "OutOfMemory");
}
