// SPDX-License-Identifier: Apache-2.0

use crate::allocator::AllocError;

/// Errors that can occur while building a value tree.
///
/// A failed parse never hands back a partial tree: by the time one of these
/// is returned, everything the parser had attached has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The allocator refused a request.
    OutOfMemory,
    /// The input is not valid JSON.
    Syntax(SyntaxError),
    /// Values were nested deeper than the configured maximum.
    TooMuchNesting,
    /// The reader reported a failure mid-stream.
    ReadError,
}

/// The grammar violation behind a [`ParseError::Syntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// Input ended while a value was still expected.
    UnexpectedEndOfInput,
    /// A byte that cannot start or continue the current token.
    UnexpectedByte(u8),
    /// An object member did not start with a quoted key.
    KeyMustBeString,
    /// A backslash was followed by an unknown escape character.
    InvalidEscape,
    /// A `\u` escape contained a non-hex digit.
    InvalidUnicodeHex,
    /// A raw control character (below U+0020) inside a string.
    ControlCharacter,
    /// Malformed UTF-8 under [`UnicodePolicy::Reject`](crate::UnicodePolicy::Reject).
    InvalidUtf8,
    /// An unpaired `\u` surrogate under [`UnicodePolicy::Reject`](crate::UnicodePolicy::Reject).
    UnpairedSurrogate,
    /// A number is missing a required digit.
    ExpectedDigit,
    /// A lexically valid number could not be converted.
    InvalidNumber,
    /// Non-whitespace content after the root value.
    TrailingContent,
}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError::Syntax(err)
    }
}

impl From<AllocError> for ParseError {
    fn from(_: AllocError) -> Self {
        ParseError::OutOfMemory
    }
}

impl core::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SyntaxError::UnexpectedByte(b) if b.is_ascii_graphic() => {
                write!(f, "unexpected byte '{}'", *b as char)
            }
            SyntaxError::UnexpectedByte(b) => write!(f, "unexpected byte 0x{b:02X}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::Syntax(e) => write!(f, "syntax error: {e}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl core::error::Error for SyntaxError {}

impl core::error::Error for ParseError {}
