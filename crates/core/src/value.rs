//! Value types for Tally
//!
//! The store holds scalar values the way a Redis-like store holds strings:
//! anything can be stored, and a string whose text is a decimal `i64` can be
//! used wherever an integer is expected.
//!
//! ## Equality Rules
//!
//! - Different variants are NEVER equal, even when they read the same:
//!   `Int(1) != String("1")`
//! - Integer coercion happens only through [`Value::to_int`]

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value held under a single key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),

    /// UTF-8 encoded string
    String(String),
}

impl Value {
    /// Returns the type name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::String(_) => "String",
        }
    }

    /// Try to get as i64 without coercion
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as an integer counter
    ///
    /// `Int` is returned as is. `String` is parsed as a decimal `i64`
    /// (surrounding whitespace is not accepted). Anything else fails with
    /// [`Error::WrongType`].
    pub fn to_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::String(s) => s.parse::<i64>().map_err(|_| Error::WrongType {
                expected: "Int",
                actual: "String",
            }),
        }
    }

    /// Read an optional stored value as a counter; absent counts as zero
    pub fn counter(value: Option<&Value>) -> Result<i64> {
        value.map_or(Ok(0), Value::to_int)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
