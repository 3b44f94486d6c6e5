// SPDX-License-Identifier: Apache-2.0

//! The value tree produced by a parse.

use alloc::vec::Vec;

use bstr::BString;

use crate::allocator::Allocator;
use crate::grow_buffer::{release_finished, Release};

/// A JSON value as defined by [RFC 8259].
///
/// Every subtree is exclusively owned by its parent. Dropping a `Value`
/// frees its memory; [`free`](crate::free) additionally reports each buffer
/// back to the [`Allocator`] the tree was built with.
///
/// An empty array, object or string never holds a backing allocation.
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` or `false`
    Boolean(bool),
    /// Any JSON number, converted to the nearest `f64`
    Number(f64),
    /// Decoded string bytes. May contain NUL bytes.
    String(BString),
    /// Array elements in document order
    Array(Vec<Value>),
    /// Object members in document order, duplicates included
    Object(Vec<Member>),
}

/// A key/value pair inside an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: BString,
    pub value: Value,
}

impl Member {
    pub fn new(key: impl Into<BString>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl Value {
    /// Returns `true` if the value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The raw decoded bytes of a string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// A string value as `&str`, if its bytes are valid UTF-8.
    ///
    /// Under [`UnicodePolicy::Replace`](crate::UnicodePolicy::Replace) and
    /// [`UnicodePolicy::Reject`](crate::UnicodePolicy::Reject) alike, parsed
    /// strings always are.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes()
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[Member]> {
        match self {
            Value::Object(members) => Some(members.as_slice()),
            _ => None,
        }
    }

    /// The first member of an object with the given key.
    ///
    /// Objects keep duplicate keys; use [`get_all`](Value::get_all) to see
    /// every occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// let value = picotree::from_slice(br#"{"a": 1, "a": 2}"#).unwrap();
    /// assert_eq!(value.get("a").and_then(|v| v.as_f64()), Some(1.0));
    /// assert_eq!(value.get_all("a").count(), 2);
    /// ```
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|member| member.key.as_slice() == key.as_bytes())
            .map(|member| &member.value)
    }

    /// Every member value of an object with the given key, in document order.
    ///
    /// The iterator borrows `key`, but the values it yields only borrow `self`.
    pub fn get_all<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a Value> + use<'a, 'k> {
        self.as_object()
            .unwrap_or(&[])
            .iter()
            .filter(move |member| member.key.as_slice() == key.as_bytes())
            .map(|member| &member.value)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<Member>> for Value {
    fn from(v: Vec<Member>) -> Self {
        Value::Object(v)
    }
}

impl Release for Value {
    fn release<A: Allocator + ?Sized>(self, allocator: &mut A) {
        match self {
            Value::String(bytes) => release_finished::<u8, A>(allocator, bytes.len()),
            Value::Array(items) => {
                let len = items.len();
                for item in items {
                    item.release(allocator);
                }
                release_finished::<Value, A>(allocator, len);
            }
            Value::Object(members) => {
                let len = members.len();
                for member in members {
                    member.release(allocator);
                }
                release_finished::<Member, A>(allocator, len);
            }
            Value::Null | Value::Boolean(_) | Value::Number(_) => {}
        }
    }
}

impl Release for Member {
    fn release<A: Allocator + ?Sized>(self, allocator: &mut A) {
        release_finished::<u8, A>(allocator, self.key.len());
        self.value.release(allocator);
    }
}
