// SPDX-License-Identifier: Apache-2.0

use std::io::{ErrorKind, Read};

use crate::Reader;

/// A [`Reader`] over any [`std::io::Read`], such as a `File` or `TcpStream`.
///
/// Interrupted reads are retried. Any other I/O error ends the parse with
/// [`ParseError::ReadError`](crate::ParseError::ReadError).
///
/// # Examples
///
/// ```rust
/// use picotree::{parse, IoReader};
///
/// let input = std::io::Cursor::new(b"[1, 2, 3]".to_vec());
/// let value = parse(IoReader::new(input)).unwrap();
/// assert_eq!(value.as_array().map(|items| items.len()), Some(3));
/// ```
#[derive(Debug)]
pub struct IoReader<T> {
    inner: T,
}

impl<T: Read> IoReader<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Reader for IoReader<T> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}
