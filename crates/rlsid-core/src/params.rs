//! # Parameter Sets
//!
//! [`ParameterSet`] is the untrusted input: ordered `(name, value)` pairs
//! exactly as the caller supplied them, duplicates included.
//! [`ValidatedParameters`] is the trusted output of validation or of
//! identity decoding: one typed value per schema position.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::ParameterValue;

/// Ordered, unvalidated `(name, value)` pairs.
///
/// Deserializing a JSON or YAML mapping keeps document order and keeps
/// repeated keys, so that `{"Region": "West", "Region": "East"}` reaches
/// validation as two entries and is rejected there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an entry.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Entries in supplied order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries were supplied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value supplied under `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl<N, V> FromIterator<(N, V)> for ParameterSet
where
    N: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ParameterSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to string or integer values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, ParameterValue>()? {
                    entries.push((name, value));
                }
                Ok(ParameterSet { entries })
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Typed parameter values in schema order.
///
/// Only produced by [`crate::validate()`] and by
/// [`crate::wire::decode_identity()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedParameters {
    values: Vec<ParameterValue>,
}

impl ValidatedParameters {
    pub(crate) fn new(values: Vec<ParameterValue>) -> Self {
        Self { values }
    }

    /// Values in schema order.
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    /// Number of values (equal to the schema length).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at schema position `index`.
    pub fn get(&self, index: usize) -> Option<&ParameterValue> {
        self.values.get(index)
    }

    /// Values in schema order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterValue> {
        self.values.iter()
    }
}
