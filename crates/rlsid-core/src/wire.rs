//! # Identity Wire Format
//!
//! The reporting engine accepts a single string as the RLS identity of an
//! embed request. This module is the only place where typed parameter values
//! become that string and back.
//!
//! ```text
//! v1:  West|Sales|2024          fields joined by `|`, `|` forbidden in fields
//! v2:  Notes%7Cdraft|Sales|2024 `%` -> `%25`, `|` -> `%7C` inside every field
//! ```
//!
//! ## Security Invariant
//!
//! Unpacking is fail-closed: a field count different from the schema length,
//! an empty field, an identity over [`MAX_IDENTITY_LEN`] bytes, or a malformed
//! escape all yield `None`. There is no "partial" decode and no default.
//!
//! The separator, the escaping rules, and the positional order are one
//! versioned contract. The [`WireVersion`] travels with the schema and inside
//! every signed credential.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::ValidatedParameters;
use crate::schema::ParameterSchema;
use crate::value::{parse_canonical_integer, ParameterValue, ValueKind};

/// The reserved field separator.
pub const SEPARATOR: char = '|';

/// Escape introducer used by [`WireVersion::V2`].
const ESCAPE: char = '%';

/// Maximum length of an encoded identity, in bytes.
pub const MAX_IDENTITY_LEN: usize = 256;

/// Version of the positional wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireVersion {
    /// Raw join. Fields must never contain the separator.
    #[default]
    V1,
    /// Percent-escaped join. Fields may contain the separator.
    V2,
}

impl WireVersion {
    /// Returns the version identifier (`"v1"`, `"v2"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque packed identity string.
///
/// Produced on the encoder side by [`crate::encode()`]; wrapped from the wire
/// on the trusted side by [`EncodedIdentity::from_wire()`], which performs no
/// checks. All checking happens in [`decode_identity()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedIdentity(String);

impl EncodedIdentity {
    /// Wrap a string received from the wire.
    pub fn from_wire(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The packed string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the packed string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the packed string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Packing failure. Validation normally prevents all of these except `TooLong`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A field is empty, or there are no fields.
    #[error("field #{position} is empty")]
    EmptyField {
        /// Zero-based field position.
        position: usize,
    },

    /// A v1 field contains the separator.
    #[error("field #{position} contains the separator")]
    SeparatorInField {
        /// Zero-based field position.
        position: usize,
    },

    /// The packed identity exceeds [`MAX_IDENTITY_LEN`].
    #[error("identity is {actual} bytes, the limit is {max}")]
    TooLong {
        /// Limit in bytes.
        max: usize,
        /// Packed length in bytes.
        actual: usize,
    },
}

/// Join fields with the separator according to `version`.
pub fn pack<I, S>(fields: I, version: WireVersion) -> Result<EncodedIdentity, WireError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    let mut count = 0;
    for (position, field) in fields.into_iter().enumerate() {
        let field = field.as_ref();
        if field.is_empty() {
            return Err(WireError::EmptyField { position });
        }
        if position > 0 {
            out.push(SEPARATOR);
        }
        match version {
            WireVersion::V1 => {
                if field.contains(SEPARATOR) {
                    return Err(WireError::SeparatorInField { position });
                }
                out.push_str(field);
            }
            WireVersion::V2 => escape_into(field, &mut out),
        }
        count += 1;
    }
    if count == 0 {
        return Err(WireError::EmptyField { position: 0 });
    }
    if out.len() > MAX_IDENTITY_LEN {
        return Err(WireError::TooLong {
            max: MAX_IDENTITY_LEN,
            actual: out.len(),
        });
    }
    Ok(EncodedIdentity(out))
}

/// Split an identity into exactly `expected_fields` fields, or fail closed.
pub fn unpack(
    identity: &EncodedIdentity,
    expected_fields: usize,
    version: WireVersion,
) -> Option<Vec<String>> {
    let raw = identity.as_str();
    if raw.len() > MAX_IDENTITY_LEN {
        return None;
    }
    let fields: Vec<&str> = raw.split(SEPARATOR).collect();
    if fields.len() != expected_fields {
        return None;
    }
    fields
        .into_iter()
        .map(|field| {
            if field.is_empty() {
                return None;
            }
            match version {
                WireVersion::V1 => Some(field.to_string()),
                WireVersion::V2 => unescape(field),
            }
        })
        .collect()
}

/// Pack validated values in schema order.
pub fn encode_identity(
    values: &ValidatedParameters,
    version: WireVersion,
) -> Result<EncodedIdentity, WireError> {
    pack(values.iter().map(ParameterValue::canonical_text), version)
}

/// Decode an identity back into typed values in schema order.
///
/// Returns `None` (deny) when the field count differs from the schema length,
/// when any field is empty or badly escaped, or when an integer position does
/// not hold a canonical integer. String positions are not re-validated.
pub fn decode_identity(
    identity: &EncodedIdentity,
    schema: &ParameterSchema,
) -> Option<ValidatedParameters> {
    let fields = unpack(identity, schema.len(), schema.wire())?;
    let values = fields
        .into_iter()
        .zip(schema.parameters())
        .map(|(field, decl)| match decl.kind {
            ValueKind::Integer => parse_canonical_integer(&field).map(ParameterValue::Integer),
            ValueKind::String => Some(ParameterValue::Text(field)),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(ValidatedParameters::new(values))
}

fn escape_into(field: &str, out: &mut String) {
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("%25"),
            SEPARATOR => out.push_str("%7C"),
            other => out.push(other),
        }
    }
}

fn unescape(field: &str) -> Option<String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        let hi = chars.next()?;
        let lo = chars.next()?;
        match (hi, lo) {
            ('2', '5') => out.push(ESCAPE),
            ('7', 'C') => out.push(SEPARATOR),
            _ => return None,
        }
    }
    Some(out)
}
