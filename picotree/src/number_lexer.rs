// SPDX-License-Identifier: Apache-2.0

use crate::allocator::Allocator;
use crate::byte_source::{ByteSource, Reader};
use crate::grow_buffer::GrowBuffer;
use crate::parse_error::{ParseError, SyntaxError};

/// Lex one JSON number starting at the lookahead and convert it to `f64`.
///
/// The exact lexeme is copied into a scratch buffer and handed to Rust's
/// correctly rounded `f64` parser. Literals beyond the `f64` range saturate
/// to infinity and tiny ones round to zero, so the result is never NaN.
///
/// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
pub(crate) fn lex_number<R: Reader, A: Allocator + ?Sized>(
    source: &mut ByteSource<'_, R>,
    allocator: &mut A,
) -> Result<f64, ParseError> {
    let mut lexeme = GrowBuffer::new(allocator)?;
    let result = match copy_lexeme(source, allocator, &mut lexeme) {
        Ok(()) => convert(lexeme.as_slice()),
        Err(err) => Err(err),
    };
    lexeme.release(allocator);
    result
}

fn copy_lexeme<R: Reader, A: Allocator + ?Sized>(
    source: &mut ByteSource<'_, R>,
    allocator: &mut A,
    lexeme: &mut GrowBuffer<u8>,
) -> Result<(), ParseError> {
    // Sign
    if source.current() == Some(b'-') {
        take_into(source, allocator, lexeme)?;
    }
    // Integer part: a single zero, or digits without a leading zero
    if source.current() == Some(b'0') {
        take_into(source, allocator, lexeme)?;
    } else {
        require_digits(source, allocator, lexeme)?;
    }
    // Fraction
    if source.current() == Some(b'.') {
        take_into(source, allocator, lexeme)?;
        require_digits(source, allocator, lexeme)?;
    }
    // Exponent
    if matches!(source.current(), Some(b'e' | b'E')) {
        take_into(source, allocator, lexeme)?;
        if matches!(source.current(), Some(b'+' | b'-')) {
            take_into(source, allocator, lexeme)?;
        }
        require_digits(source, allocator, lexeme)?;
    }
    Ok(())
}

fn take_into<R: Reader, A: Allocator + ?Sized>(
    source: &mut ByteSource<'_, R>,
    allocator: &mut A,
    lexeme: &mut GrowBuffer<u8>,
) -> Result<(), ParseError> {
    if let Some(byte) = source.current() {
        lexeme.push(allocator, byte)?;
        source.advance()?;
    }
    Ok(())
}

fn require_digits<R: Reader, A: Allocator + ?Sized>(
    source: &mut ByteSource<'_, R>,
    allocator: &mut A,
    lexeme: &mut GrowBuffer<u8>,
) -> Result<(), ParseError> {
    if !matches!(source.current(), Some(b'0'..=b'9')) {
        return Err(SyntaxError::ExpectedDigit.into());
    }
    while matches!(source.current(), Some(b'0'..=b'9')) {
        take_into(source, allocator, lexeme)?;
    }
    Ok(())
}

fn convert(lexeme: &[u8]) -> Result<f64, ParseError> {
    core::str::from_utf8(lexeme)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or(ParseError::Syntax(SyntaxError::InvalidNumber))
}
