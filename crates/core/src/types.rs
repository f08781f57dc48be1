//! Core types for Tally
//!
//! - [`Key`]: opaque identifier of a single mutable value in the store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single mutable scalar in the store
///
/// Keys have no internal structure; two keys are equal when their text is
/// equal.
///
/// # Examples
///
/// ```
/// use tally_core::Key;
///
/// let a = Key::new("counter3");
/// let b: Key = "counter3".into();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a key from any string-like value
    pub fn new(name: impl Into<String>) -> Self {
        Key(name.into())
    }

    /// Borrow the key text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
