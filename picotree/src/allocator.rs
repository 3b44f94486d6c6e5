// SPDX-License-Identifier: Apache-2.0

//! Memory policy for the buffers a parse creates.
//!
//! Every string, array and object the parser builds is backed by a buffer
//! whose size changes are first submitted to an [`Allocator`]. The allocator
//! sees one operation family, expressed in bytes:
//!
//! - `resize(0, n)` allocates `n` bytes,
//! - `resize(old, new)` grows or shrinks an existing allocation,
//! - `resize(old, 0)` releases it. Releases always succeed.
//!
//! A refused request aborts the parse with
//! [`ParseError::OutOfMemory`](crate::ParseError::OutOfMemory).
//!
//! # Examples
//!
//! ```rust
//! use picotree::{parse_in, ChunkReader, MemoryLimit, ParseError};
//!
//! let mut limit = MemoryLimit::new(16);
//! let result = parse_in(&mut limit, ChunkReader::full_slice(br#""a string longer than sixteen bytes""#));
//! assert_eq!(result, Err(ParseError::OutOfMemory));
//! assert_eq!(limit.in_use(), 0);
//! ```

/// An allocator refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("allocation refused")
    }
}

impl core::error::Error for AllocError {}

/// The memory policy consulted before every buffer size change.
pub trait Allocator {
    /// Move an allocation from `old` bytes to `new` bytes.
    ///
    /// `old == 0` requests a fresh allocation and `new == 0` releases one;
    /// the return value of a release is ignored.
    fn resize(&mut self, old: usize, new: usize) -> Result<(), AllocError>;
}

impl<A: Allocator + ?Sized> Allocator for &mut A {
    fn resize(&mut self, old: usize, new: usize) -> Result<(), AllocError> {
        (**self).resize(old, new)
    }
}

/// Grants every request. Storage comes from the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl Allocator for Global {
    fn resize(&mut self, _old: usize, _new: usize) -> Result<(), AllocError> {
        Ok(())
    }
}

/// Caps the number of bytes held live at once.
///
/// Useful when parsing untrusted input: a document whose tree would exceed
/// the budget fails with `OutOfMemory` instead of growing without bound.
#[derive(Debug, Clone)]
pub struct MemoryLimit {
    limit: usize,
    in_use: usize,
    peak: usize,
}

impl MemoryLimit {
    /// Create a budget of `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            in_use: 0,
            peak: 0,
        }
    }

    /// Bytes currently granted and not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// The highest value `in_use` has reached.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// The configured budget.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Allocator for MemoryLimit {
    fn resize(&mut self, old: usize, new: usize) -> Result<(), AllocError> {
        let next = self.in_use.saturating_sub(old).saturating_add(new);
        if new > old && next > self.limit {
            log::debug!(
                "MemoryLimit: refusing {} -> {} bytes ({} of {} in use)",
                old,
                new,
                self.in_use,
                self.limit
            );
            return Err(AllocError);
        }
        self.in_use = next;
        self.peak = self.peak.max(next);
        Ok(())
    }
}
