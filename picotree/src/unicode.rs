// SPDX-License-Identifier: Apache-2.0

//! Codepoint decoding for string contents: raw UTF-8 and `\uXXXX` escapes.

use crate::allocator::Allocator;
use crate::byte_source::{ByteSource, Reader};
use crate::grow_buffer::GrowBuffer;
use crate::parse_error::{ParseError, SyntaxError};

/// U+FFFD REPLACEMENT CHARACTER
pub(crate) const REPLACEMENT: u32 = 0xFFFD;

/// What to do with input that does not decode to a Unicode scalar value.
///
/// One policy governs a whole parse: malformed, truncated or overlong UTF-8,
/// UTF-8 encoded surrogates, values above U+10FFFF, and `\u` surrogate
/// halves without a partner are all treated the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodePolicy {
    /// Substitute U+FFFD for every malformed unit and keep going.
    #[default]
    Replace,
    /// Fail the parse with a syntax error.
    Reject,
}

/// Outcome of decoding one raw UTF-8 sequence
#[derive(Debug, PartialEq)]
pub(crate) enum Utf8Char {
    Scalar(u32),
    Malformed,
}

/// Check if a codepoint is a high surrogate (0xD800-0xDBFF)
pub(crate) fn is_high_surrogate(codepoint: u32) -> bool {
    (0xD800..=0xDBFF).contains(&codepoint)
}

/// Check if a codepoint is a low surrogate (0xDC00-0xDFFF)
pub(crate) fn is_low_surrogate(codepoint: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&codepoint)
}

/// Combine a high and low surrogate into a scalar of U+10000 or above
pub(crate) fn combine_surrogate_pair(high: u32, low: u32) -> u32 {
    0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF)
}

/// The value (0-15) of a hex digit
pub(crate) fn hex_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'f' => Some(u32::from(byte - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(byte - b'A') + 10),
        _ => None,
    }
}

/// The byte a simple (non-`u`) escape stands for
pub(crate) fn simple_escape(escape_char: u8) -> Option<u8> {
    match escape_char {
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        b'/' => Some(b'/'),
        b'b' => Some(0x08),
        b'f' => Some(0x0C),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        _ => None,
    }
}

/// Decode one UTF-8 sequence whose lead byte has already been consumed.
///
/// Continuation bytes are consumed only while they match `10xxxxxx`; the
/// byte that breaks a sequence is left as the lookahead for the caller.
pub(crate) fn decode_utf8<R: Reader>(
    lead: u8,
    source: &mut ByteSource<'_, R>,
) -> Result<Utf8Char, ParseError> {
    let (continuations, initial, minimum) = match lead {
        0x00..=0x7F => return Ok(Utf8Char::Scalar(u32::from(lead))),
        0xC0..=0xDF => (1, u32::from(lead & 0x1F), 0x80),
        0xE0..=0xEF => (2, u32::from(lead & 0x0F), 0x800),
        0xF0..=0xF7 => (3, u32::from(lead & 0x07), 0x10000),
        // Stray continuation byte, or a lead for a 5+ byte sequence
        _ => return Ok(Utf8Char::Malformed),
    };
    let mut codepoint = initial;
    for _ in 0..continuations {
        match source.current() {
            Some(byte) if byte & 0xC0 == 0x80 => {
                codepoint = (codepoint << 6) | u32::from(byte & 0x3F);
                source.advance()?;
            }
            _ => return Ok(Utf8Char::Malformed),
        }
    }
    if codepoint < minimum {
        // Overlong encoding
        return Ok(Utf8Char::Malformed);
    }
    Ok(Utf8Char::Scalar(codepoint))
}

/// Decoding state for a single string literal.
///
/// Owns the output buffer and the pending high surrogate slot; the parser
/// feeds it codepoints and escapes and finally takes the bytes.
pub(crate) struct StringDecoder {
    policy: UnicodePolicy,
    bytes: GrowBuffer<u8>,
    /// High surrogate from a `\u` escape, waiting for its low half
    pending_high: Option<u32>,
}

impl StringDecoder {
    pub fn new<A: Allocator + ?Sized>(
        policy: UnicodePolicy,
        allocator: &mut A,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            policy,
            bytes: GrowBuffer::new(allocator)?,
            pending_high: None,
        })
    }

    /// Push a raw byte that is known to be a complete ASCII character.
    pub fn push_ascii<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        byte: u8,
    ) -> Result<(), ParseError> {
        self.flush_pending(allocator)?;
        self.bytes.push(allocator, byte)
    }

    /// Push a decoded raw UTF-8 character.
    pub fn push_utf8<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        decoded: Utf8Char,
    ) -> Result<(), ParseError> {
        self.flush_pending(allocator)?;
        match decoded {
            Utf8Char::Scalar(codepoint) => self.push_codepoint(allocator, codepoint),
            Utf8Char::Malformed => self.invalid(allocator, SyntaxError::InvalidUtf8),
        }
    }

    /// Apply one `\uXXXX` escape, pairing surrogate halves.
    pub fn push_escape<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        unit: u32,
    ) -> Result<(), ParseError> {
        if is_high_surrogate(unit) {
            self.flush_pending(allocator)?;
            self.pending_high = Some(unit);
            Ok(())
        } else if is_low_surrogate(unit) {
            match self.pending_high.take() {
                Some(high) => {
                    self.push_codepoint(allocator, combine_surrogate_pair(high, unit))
                }
                None => self.invalid(allocator, SyntaxError::UnpairedSurrogate),
            }
        } else {
            self.flush_pending(allocator)?;
            self.push_codepoint(allocator, unit)
        }
    }

    /// Resolve any pending surrogate and hand out the decoded bytes.
    pub fn finish<A: Allocator + ?Sized>(
        mut self,
        allocator: &mut A,
    ) -> Result<alloc::vec::Vec<u8>, ParseError> {
        if let Err(err) = self.flush_pending(allocator) {
            self.bytes.release(allocator);
            return Err(err);
        }
        self.bytes.finish(allocator)
    }

    pub fn release<A: Allocator + ?Sized>(self, allocator: &mut A) {
        self.bytes.release(allocator);
    }

    /// A high surrogate that is not followed by a low one is unpaired.
    fn flush_pending<A: Allocator + ?Sized>(&mut self, allocator: &mut A) -> Result<(), ParseError> {
        if self.pending_high.take().is_some() {
            self.invalid(allocator, SyntaxError::UnpairedSurrogate)?;
        }
        Ok(())
    }

    fn invalid<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        kind: SyntaxError,
    ) -> Result<(), ParseError> {
        match self.policy {
            UnicodePolicy::Replace => self.encode(allocator, REPLACEMENT),
            UnicodePolicy::Reject => Err(kind.into()),
        }
    }

    fn push_codepoint<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        codepoint: u32,
    ) -> Result<(), ParseError> {
        // Surrogates cannot be encoded and anything above U+10FFFF is not Unicode
        if char::from_u32(codepoint).is_none() {
            return self.invalid(allocator, SyntaxError::InvalidUtf8);
        }
        self.encode(allocator, codepoint)
    }

    fn encode<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        codepoint: u32,
    ) -> Result<(), ParseError> {
        let ch = char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
        let mut utf8 = [0u8; 4];
        for &byte in ch.encode_utf8(&mut utf8).as_bytes() {
            self.bytes.push(allocator, byte)?;
        }
        Ok(())
    }
}
