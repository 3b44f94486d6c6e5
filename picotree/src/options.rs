// SPDX-License-Identifier: Apache-2.0

use crate::unicode::UnicodePolicy;

/// The default nesting limit
pub const MAX_DEPTH: usize = 1024;

/// Configuration for a single parse.
///
/// # Examples
///
/// ```rust
/// use picotree::{parse_with_options, ChunkReader, ParseOptions, UnicodePolicy};
///
/// let options = ParseOptions {
///     unicode: UnicodePolicy::Reject,
///     ..Default::default()
/// };
/// assert!(parse_with_options(ChunkReader::full_slice(br#""\uD800""#), options).is_err());
/// ```
///
/// # Default
///
/// [`UnicodePolicy::Replace`] and a depth limit of [`MAX_DEPTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// How malformed UTF-8 and unpaired surrogates are handled.
    pub unicode: UnicodePolicy,

    /// Nesting limit. Every value counts one level, so a document with
    /// `max_depth` nested arrays is rejected and one with `max_depth - 1`
    /// is accepted.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unicode: UnicodePolicy::default(),
            max_depth: MAX_DEPTH,
        }
    }
}
