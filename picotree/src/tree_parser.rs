// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;

use bstr::BString;

use crate::allocator::{Allocator, Global};
use crate::byte_source::{ByteSource, Reader};
use crate::grow_buffer::{release_finished, GrowBuffer, Release};
use crate::number_lexer::lex_number;
use crate::options::ParseOptions;
use crate::parse_error::{ParseError, SyntaxError};
use crate::unicode::{decode_utf8, hex_value, simple_escape, StringDecoder};
use crate::value::{Member, Value};

/// A recursive-descent parser that builds a complete [`Value`] tree.
///
/// The parser pulls bytes from a [`Reader`] through a caller-owned window,
/// and submits every buffer it grows to an [`Allocator`]. It either returns
/// the whole tree or fails; on failure everything it had built has already
/// been released.
///
/// # Example
///
/// ```rust
/// use picotree::{ChunkReader, MemoryLimit, TreeParser};
///
/// let mut window = [0u8; 64];
/// let mut limit = MemoryLimit::new(4096);
/// let value = TreeParser::with_allocator(
///     ChunkReader::full_slice(br#"{"rulers": [80, 100]}"#),
///     &mut window,
///     &mut limit,
/// )
/// .parse()
/// .unwrap();
/// assert_eq!(value.get("rulers").and_then(|r| r.as_array()).map(|r| r.len()), Some(2));
/// picotree::free(&mut limit, value);
/// assert_eq!(limit.in_use(), 0);
/// ```
pub struct TreeParser<'b, R: Reader, A: Allocator = Global> {
    source: ByteSource<'b, R>,
    allocator: A,
    options: ParseOptions,
    depth: usize,
}

impl<'b, R: Reader> TreeParser<'b, R, Global> {
    /// Create a parser that allocates through [`Global`].
    ///
    /// `window` is the scratch space the reader fills. An empty window
    /// still works, one byte per read.
    pub fn new(reader: R, window: &'b mut [u8]) -> Self {
        Self::with_allocator(reader, window, Global)
    }
}

impl<'b, R: Reader, A: Allocator> TreeParser<'b, R, A> {
    /// Create a parser that submits every allocation to `allocator`.
    pub fn with_allocator(reader: R, window: &'b mut [u8], allocator: A) -> Self {
        Self {
            source: ByteSource::new(reader, window),
            allocator,
            options: ParseOptions::default(),
            depth: 0,
        }
    }

    /// Replace the default [`ParseOptions`].
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse exactly one JSON value followed by optional whitespace.
    pub fn parse(mut self) -> Result<Value, ParseError> {
        let result = self.parse_document();
        if let Err(err) = &result {
            log::debug!(
                "TreeParser: parse failed at offset {}: {}",
                self.source.offset(),
                err
            );
        }
        result
    }

    fn parse_document(&mut self) -> Result<Value, ParseError> {
        self.source.advance()?;
        let root = self.parse_value()?;
        if self.source.current().is_some() {
            root.release(&mut self.allocator);
            return Err(SyntaxError::TrailingContent.into());
        }
        Ok(root)
    }

    /// Parse a value with its surrounding whitespace, tracking depth.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.depth = self.depth.saturating_add(1);
        let result = if self.depth >= self.options.max_depth {
            Err(ParseError::TooMuchNesting)
        } else {
            self.parse_value_inner()
        };
        self.depth = self.depth.saturating_sub(1);
        result
    }

    fn parse_value_inner(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace()?;
        let value = match self.source.current() {
            Some(b'-' | b'0'..=b'9') => {
                Value::Number(lex_number(&mut self.source, &mut self.allocator)?)
            }
            Some(b't') => self.parse_literal(b"true", Value::Boolean(true))?,
            Some(b'f') => self.parse_literal(b"false", Value::Boolean(false))?,
            Some(b'n') => self.parse_literal(b"null", Value::Null)?,
            Some(b'"') => {
                self.source.advance()?;
                Value::String(self.parse_string()?)
            }
            Some(b'[') => {
                self.source.advance()?;
                Value::Array(self.parse_array()?)
            }
            Some(b'{') => {
                self.source.advance()?;
                Value::Object(self.parse_object()?)
            }
            _ => return Err(self.unexpected()),
        };
        if let Err(err) = self.skip_whitespace() {
            value.release(&mut self.allocator);
            return Err(err);
        }
        Ok(value)
    }

    fn parse_literal(&mut self, literal: &[u8], value: Value) -> Result<Value, ParseError> {
        for &expected in literal {
            self.require(expected)?;
        }
        Ok(value)
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, ParseError> {
        log::trace!("TreeParser: array start at depth {}", self.depth);
        let mut items = GrowBuffer::new(&mut self.allocator)?;
        if let Err(err) = self.parse_elements(&mut items) {
            items.release(&mut self.allocator);
            return Err(err);
        }
        items.finish(&mut self.allocator)
    }

    fn parse_elements(&mut self, items: &mut GrowBuffer<Value>) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        if self.source.current() != Some(b']') {
            loop {
                let value = self.parse_value()?;
                items.push(&mut self.allocator, value)?;
                if !self.eat(b',')? {
                    break;
                }
            }
        }
        self.require(b']')
    }

    fn parse_object(&mut self) -> Result<Vec<Member>, ParseError> {
        log::trace!("TreeParser: object start at depth {}", self.depth);
        let mut members = GrowBuffer::new(&mut self.allocator)?;
        if let Err(err) = self.parse_members(&mut members) {
            members.release(&mut self.allocator);
            return Err(err);
        }
        members.finish(&mut self.allocator)
    }

    fn parse_members(&mut self, members: &mut GrowBuffer<Member>) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        if self.source.current() != Some(b'}') {
            loop {
                let member = self.parse_member()?;
                members.push(&mut self.allocator, member)?;
                if !self.eat(b',')? {
                    break;
                }
            }
        }
        self.require(b'}')
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        self.skip_whitespace()?;
        match self.source.current() {
            Some(b'"') => self.source.advance()?,
            None => return Err(SyntaxError::UnexpectedEndOfInput.into()),
            Some(_) => return Err(SyntaxError::KeyMustBeString.into()),
        }
        let key = self.parse_string()?;
        let value = match self.parse_member_value() {
            Ok(value) => value,
            Err(err) => {
                release_finished::<u8, A>(&mut self.allocator, key.len());
                return Err(err);
            }
        };
        Ok(Member { key, value })
    }

    fn parse_member_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace()?;
        self.require(b':')?;
        self.parse_value()
    }

    /// Parse string contents after the opening quote, through the closing one.
    fn parse_string(&mut self) -> Result<BString, ParseError> {
        let mut decoder = StringDecoder::new(self.options.unicode, &mut self.allocator)?;
        if let Err(err) = self.decode_string(&mut decoder) {
            decoder.release(&mut self.allocator);
            return Err(err);
        }
        decoder.finish(&mut self.allocator).map(BString::from)
    }

    fn decode_string(&mut self, decoder: &mut StringDecoder) -> Result<(), ParseError> {
        loop {
            let byte = self.take()?;
            match byte {
                b'"' => return Ok(()),
                b'\\' => match self.take()? {
                    b'u' => {
                        let unit = self.read_hex_unit()?;
                        decoder.push_escape(&mut self.allocator, unit)?;
                    }
                    escape => {
                        let byte = simple_escape(escape).ok_or(SyntaxError::InvalidEscape)?;
                        decoder.push_ascii(&mut self.allocator, byte)?;
                    }
                },
                0x00..=0x1F => return Err(SyntaxError::ControlCharacter.into()),
                0x20..=0x7F => decoder.push_ascii(&mut self.allocator, byte)?,
                lead => {
                    let decoded = decode_utf8(lead, &mut self.source)?;
                    decoder.push_utf8(&mut self.allocator, decoded)?;
                }
            }
        }
    }

    /// Read the four hex digits of a `\u` escape.
    fn read_hex_unit(&mut self) -> Result<u32, ParseError> {
        let mut unit = 0u32;
        for _ in 0..4 {
            let digit = hex_value(self.take()?).ok_or(SyntaxError::InvalidUnicodeHex)?;
            unit = (unit << 4) | digit;
        }
        Ok(unit)
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while matches!(self.source.current(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.source.advance()?;
        }
        Ok(())
    }

    /// Consume the lookahead, which must exist.
    fn take(&mut self) -> Result<u8, ParseError> {
        let byte = self
            .source
            .current()
            .ok_or(SyntaxError::UnexpectedEndOfInput)?;
        self.source.advance()?;
        Ok(byte)
    }

    /// Consume `expected` if it is the lookahead.
    fn eat(&mut self, expected: u8) -> Result<bool, ParseError> {
        if self.source.current() == Some(expected) {
            self.source.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn require(&mut self, expected: u8) -> Result<(), ParseError> {
        if self.eat(expected)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.source.current() {
            Some(byte) => SyntaxError::UnexpectedByte(byte).into(),
            None => SyntaxError::UnexpectedEndOfInput.into(),
        }
    }
}
