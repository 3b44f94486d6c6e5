// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! A streaming JSON parser that builds a complete value tree.
//!
//! Input is pulled through a [`Reader`] into a small caller-owned window, so
//! documents of any size can be parsed without holding them in memory. Every
//! buffer the parser grows is submitted to an [`Allocator`] first; a refused
//! request ends the parse with [`ParseError::OutOfMemory`] after everything
//! built so far has been handed back.
//!
//! ```rust
//! use picotree::{from_slice, Value};
//!
//! let config = from_slice(br#"{"name": "demo", "tags": ["a", "b"], "debug": false}"#).unwrap();
//! assert_eq!(config.get("name").and_then(Value::as_str), Some("demo"));
//! assert_eq!(config.get("debug").and_then(Value::as_bool), Some(false));
//! ```
//!
//! Parsing under a memory budget:
//!
//! ```rust
//! use picotree::{parse_in, ChunkReader, MemoryLimit, ParseError};
//!
//! let mut budget = MemoryLimit::new(16);
//! let result = parse_in(&mut budget, ChunkReader::full_slice(br#"["a", "b", "c"]"#));
//! assert_eq!(result, Err(ParseError::OutOfMemory));
//! assert_eq!(budget.in_use(), 0);
//! ```

extern crate alloc;

mod allocator;
pub use allocator::{AllocError, Allocator, Global, MemoryLimit};

mod byte_source;
pub use byte_source::Reader;

mod chunk_reader;
pub use chunk_reader::ChunkReader;

mod grow_buffer;

#[cfg(feature = "std")]
mod io_reader;
#[cfg(feature = "std")]
pub use io_reader::IoReader;

mod number_lexer;

mod options;
pub use options::{ParseOptions, MAX_DEPTH};

mod parse_error;
pub use parse_error::{ParseError, SyntaxError};

mod tree_parser;
pub use tree_parser::TreeParser;

mod unicode;
pub use unicode::UnicodePolicy;

mod value;
pub use value::{Member, Value};

use grow_buffer::Release;

/// Size of the input window used by the convenience functions
pub const DEFAULT_WINDOW: usize = 256;

/// Parse one document from `reader` with default options.
pub fn parse<R: Reader>(reader: R) -> Result<Value, ParseError> {
    parse_with_options(reader, ParseOptions::default())
}

/// Parse one document, submitting every allocation to `allocator`.
///
/// On failure `allocator` has been told about the release of everything the
/// parse allocated. On success the tree stays accounted until it is given
/// back with [`free`].
pub fn parse_in<A: Allocator, R: Reader>(allocator: A, reader: R) -> Result<Value, ParseError> {
    let mut window = [0u8; DEFAULT_WINDOW];
    TreeParser::with_allocator(reader, &mut window, allocator).parse()
}

/// Parse one document with explicit [`ParseOptions`].
pub fn parse_with_options<R: Reader>(
    reader: R,
    options: ParseOptions,
) -> Result<Value, ParseError> {
    let mut window = [0u8; DEFAULT_WINDOW];
    TreeParser::new(reader, &mut window)
        .with_options(options)
        .parse()
}

/// Parse a document held entirely in memory.
pub fn from_slice(input: &[u8]) -> Result<Value, ParseError> {
    parse(ChunkReader::full_slice(input))
}

/// Give a tree built by [`parse_in`] back to the allocator that accounted it.
///
/// Strings, arrays and objects are released bottom-up, each at the exact
/// size it was finished at.
pub fn free<A: Allocator + ?Sized>(allocator: &mut A, value: Value) {
    value.release(allocator);
}
