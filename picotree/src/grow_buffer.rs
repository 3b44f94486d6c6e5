// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;

use crate::allocator::Allocator;
use crate::parse_error::ParseError;

/// Starting capacity for strings, arrays and objects
pub(crate) const INITIAL_CAPACITY: usize = 8;

/// Items that hand their own allocations back to an [`Allocator`].
pub(crate) trait Release {
    fn release<A: Allocator + ?Sized>(self, allocator: &mut A);
}

impl Release for u8 {
    fn release<A: Allocator + ?Sized>(self, _allocator: &mut A) {}
}

/// Report the release of a finished buffer holding `len` items of `T`.
///
/// Finished buffers are accounted at exactly their length, and an empty one
/// owns no allocation at all.
pub(crate) fn release_finished<T, A: Allocator + ?Sized>(allocator: &mut A, len: usize) {
    if len != 0 {
        let _ = allocator.resize(len.saturating_mul(core::mem::size_of::<T>()), 0);
    }
}

/// A doubling buffer used for string bytes, array elements and object members.
///
/// Every capacity change is submitted to the allocator first and then made
/// with a fallible reservation, so neither a refused request nor a failing
/// host allocation can abort the process.
///
/// The buffer does not release itself on drop: callers either [`finish`]
/// it or [`release`] it, which keeps the allocator's books balanced.
///
/// [`finish`]: GrowBuffer::finish
/// [`release`]: GrowBuffer::release
pub(crate) struct GrowBuffer<T> {
    items: Vec<T>,
    /// Capacity in items, as last granted by the allocator
    capacity: usize,
}

impl<T: Release> GrowBuffer<T> {
    /// Allocate a buffer with [`INITIAL_CAPACITY`] slots.
    pub fn new<A: Allocator + ?Sized>(allocator: &mut A) -> Result<Self, ParseError> {
        let mut buffer = Self {
            items: Vec::new(),
            capacity: 0,
        };
        buffer.reserve(allocator, INITIAL_CAPACITY)?;
        Ok(buffer)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Append an item, doubling the capacity when it is exhausted.
    ///
    /// If the buffer cannot grow, `item` is released before the error is
    /// returned, so ownership never dangles between the caller and the buffer.
    pub fn push<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        item: T,
    ) -> Result<(), ParseError> {
        if self.items.len() == self.capacity {
            let grown = match self.capacity.checked_mul(2) {
                Some(grown) => grown,
                None => {
                    item.release(allocator);
                    return Err(ParseError::OutOfMemory);
                }
            };
            if let Err(err) = self.reserve(allocator, grown) {
                item.release(allocator);
                return Err(err);
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Shrink to exactly the logical length and hand out the contents.
    ///
    /// An empty buffer gives its allocation back and yields an unallocated
    /// `Vec`. On failure the whole buffer, contents included, is released.
    pub fn finish<A: Allocator + ?Sized>(
        mut self,
        allocator: &mut A,
    ) -> Result<Vec<T>, ParseError> {
        let len = self.items.len();
        if len == 0 {
            self.release(allocator);
            return Ok(Vec::new());
        }
        let (old, new) = match (bytes_for::<T>(self.capacity), bytes_for::<T>(len)) {
            (Some(old), Some(new)) => (old, new),
            _ => {
                self.release(allocator);
                return Err(ParseError::OutOfMemory);
            }
        };
        if old != new {
            if let Err(err) = allocator.resize(old, new) {
                self.release(allocator);
                return Err(err.into());
            }
            if let Err(err) = self.shrink_exact() {
                let _ = allocator.resize(new, old);
                self.release(allocator);
                return Err(err);
            }
        }
        Ok(self.items)
    }

    /// Release every item and then the buffer's own allocation.
    pub fn release<A: Allocator + ?Sized>(self, allocator: &mut A) {
        let capacity = self.capacity;
        for item in self.items {
            item.release(allocator);
        }
        if let Some(bytes) = bytes_for::<T>(capacity).filter(|&bytes| bytes != 0) {
            let _ = allocator.resize(bytes, 0);
        }
    }

    /// Move the items into an allocation of exactly their length.
    ///
    /// `Vec::shrink_to_fit` aborts if the host cannot reallocate, so the
    /// exact allocation is reserved fallibly and the items are moved over.
    fn shrink_exact(&mut self) -> Result<(), ParseError> {
        let mut exact = Vec::new();
        exact
            .try_reserve_exact(self.items.len())
            .map_err(|_| ParseError::OutOfMemory)?;
        exact.append(&mut self.items);
        self.items = exact;
        Ok(())
    }

    fn reserve<A: Allocator + ?Sized>(
        &mut self,
        allocator: &mut A,
        capacity: usize,
    ) -> Result<(), ParseError> {
        // Reject growth whose byte size would overflow instead of wrapping
        let old = bytes_for::<T>(self.capacity).ok_or(ParseError::OutOfMemory)?;
        let new = bytes_for::<T>(capacity).ok_or(ParseError::OutOfMemory)?;
        allocator.resize(old, new)?;
        let additional = capacity.saturating_sub(self.items.len());
        if self.items.try_reserve_exact(additional).is_err() {
            let _ = allocator.resize(new, old);
            return Err(ParseError::OutOfMemory);
        }
        self.capacity = capacity;
        Ok(())
    }
}

fn bytes_for<T>(count: usize) -> Option<usize> {
    count.checked_mul(core::mem::size_of::<T>())
}
