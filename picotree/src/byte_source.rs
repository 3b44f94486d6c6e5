// SPDX-License-Identifier: Apache-2.0

use crate::parse_error::ParseError;

/// Trait for input sources that supply bytes to the parser on request.
pub trait Reader {
    /// The error type returned by read operations
    type Error;

    /// Read data into the provided buffer.
    /// Returns the number of bytes read, or an error.
    ///
    /// # Contract
    /// - A return value of 0 **MUST** indicate true end of stream
    /// - Implementations **MUST NOT** return 0 unless no more data will ever be available
    /// - Returning 0 followed by non-zero reads in subsequent calls violates this contract
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Error = R::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

/// One-byte lookahead cursor over a [`Reader`].
///
/// The reader is only asked for more data once every byte of the window has
/// been consumed. End of stream is sticky: after the reader reports it, the
/// cursor stays at `None` and never calls the reader again.
pub(crate) struct ByteSource<'b, R: Reader> {
    reader: R,
    /// Caller-owned scratch window the reader fills
    window: &'b mut [u8],
    /// Stands in for an empty caller window
    spare: [u8; 1],
    /// Next unread position in `window`
    pos: usize,
    /// End of valid data in `window`
    end: usize,
    current: Option<u8>,
    at_eof: bool,
    /// Total bytes consumed, for diagnostics
    offset: usize,
}

impl<'b, R: Reader> ByteSource<'b, R> {
    /// Wrap a reader. Nothing is read until the first [`advance`](Self::advance).
    ///
    /// An empty window falls back to reading one byte at a time.
    pub fn new(reader: R, window: &'b mut [u8]) -> Self {
        if window.is_empty() {
            log::debug!("ByteSource: empty window, reading one byte at a time");
        }
        Self {
            reader,
            window,
            spare: [0],
            pos: 0,
            end: 0,
            current: None,
            at_eof: false,
            offset: 0,
        }
    }

    /// The lookahead byte, or `None` at end of stream.
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the lookahead to the next byte, refilling the window if needed.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        if self.at_eof {
            return Ok(());
        }
        if self.current.is_some() {
            self.offset = self.offset.saturating_add(1);
        }
        if self.pos >= self.end && !self.refill()? {
            self.current = None;
            self.at_eof = true;
            return Ok(());
        }
        let filled = if self.window.is_empty() {
            &self.spare[..]
        } else {
            &self.window[..]
        };
        self.current = filled.get(self.pos).copied();
        self.pos = self.pos.saturating_add(1);
        Ok(())
    }

    /// Returns `false` once the reader reports end of stream.
    fn refill(&mut self) -> Result<bool, ParseError> {
        let buf: &mut [u8] = if self.window.is_empty() {
            &mut self.spare
        } else {
            &mut *self.window
        };
        let capacity = buf.len();
        match self.reader.read(buf) {
            Ok(0) => {
                log::trace!("ByteSource: end of stream after {} bytes", self.offset);
                Ok(false)
            }
            Ok(n) => {
                self.pos = 0;
                self.end = n.min(capacity);
                log::trace!("ByteSource: refilled {} bytes", self.end);
                Ok(true)
            }
            Err(_) => {
                log::debug!("ByteSource: reader failed at offset {}", self.offset);
                Err(ParseError::ReadError)
            }
        }
    }
}
