//! # Parameter Values
//!
//! A parameter value is either a string or a 64-bit integer. JSON and YAML
//! inputs map onto these two shapes directly; floats, booleans, nulls and
//! nested values are rejected at deserialization.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free-form text, optionally constrained by an allow-list or length.
    String,
    /// Signed 64-bit integer, optionally constrained by a range.
    Integer,
}

impl ValueKind {
    /// Returns the snake_case identifier used in catalogs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parameter value as supplied by a user or decoded from an identity.
///
/// `Integer` is listed first so that untagged deserialization prefers it for
/// numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// An integer value.
    Integer(i64),
    /// A text value.
    Text(String),
}

impl ParameterValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The kind this value carries.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Text(_) => ValueKind::String,
        }
    }

    /// Canonical text form: integers in plain decimal, text unchanged.
    ///
    /// This is the form that goes onto the wire and into audit records.
    pub fn canonical_text(&self) -> Cow<'_, str> {
        match self {
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

/// Parse `text` as an integer only if it is already in canonical decimal form.
///
/// `"2024"` and `"-7"` parse; `"02024"`, `"+7"`, `" 7"` and `"7.0"` do not, so
/// that every accepted integer has exactly one textual representation.
pub fn parse_canonical_integer(text: &str) -> Option<i64> {
    let n: i64 = text.parse().ok()?;
    if n.to_string() == text {
        Some(n)
    } else {
        None
    }
}
