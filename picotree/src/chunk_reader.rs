// SPDX-License-Identifier: Apache-2.0

//! A convenience Reader implementation for in-memory input.
//!
//! [`ChunkReader`] serves a byte slice either as fast as the parser's window
//! allows or in fixed-size chunks. For real I/O, implement [`Reader`] for
//! your source, or enable the `std` feature and use
//! `IoReader` around any `std::io::Read`.
//!
//! # Examples
//!
//! ```rust
//! use picotree::{parse, ChunkReader};
//!
//! let json = br#"{"name": "Alice", "age": 30}"#;
//! let value = parse(ChunkReader::full_slice(json)).unwrap();
//! assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Reader;

/// A [`Reader`] that reads from a byte slice, optionally in fixed-size chunks.
///
/// 1.  **Full Slice Reading**: [`ChunkReader::full_slice()`] hands out as much
///     as each refill can hold.
///
/// 2.  **Chunked Reading**: [`ChunkReader::new()`] caps every `read()` to a
///     chunk size, which simulates packets or short file reads and stresses
///     the parser's refill logic.
///
/// # Example: Chunked Reading
///
/// ```rust
/// use picotree::{parse, ChunkReader, Value};
///
/// // One byte per refill
/// let value = parse(ChunkReader::new(b"[true, null]", 1)).unwrap();
/// assert_eq!(value, Value::Array(vec![Value::Boolean(true), Value::Null]));
/// ```
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader that returns at most `chunk_size` bytes per `read()`.
    ///
    /// A `chunk_size` of 0 is treated as 1.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1), // Ensure at least 1 byte per read
        }
    }

    /// Create a reader limited only by the size of the caller's buffer.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }
}

impl Reader for ChunkReader<'_> {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.remaining();
        let to_copy = remaining.len().min(buf.len()).min(self.chunk_size);
        if let (Some(dest), Some(src)) = (buf.get_mut(..to_copy), remaining.get(..to_copy)) {
            dest.copy_from_slice(src);
        }
        self.pos = self.pos.saturating_add(to_copy);
        Ok(to_copy)
    }
}
