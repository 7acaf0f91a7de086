//! # Parameter Schema
//!
//! The ordered, typed declaration of the parameters a report accepts.
//! Position in the schema is position on the wire, so the order of
//! declarations is part of the encoder/evaluator contract.
//!
//! A schema is only constructed through [`ParameterSchema::new()`] (or by
//! deserialization, which routes through it). Construction performs every
//! structural check up front, so the encoder and evaluator can rely on a
//! schema being internally consistent.
//!
//! ## Fingerprint
//!
//! Every schema carries a SHA-256 fingerprint over its canonical JSON form
//! (version, wire format and declarations). Embed credentials bind to the
//! fingerprint; a credential issued against one schema is never evaluated
//! against another.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::SchemaError;
use crate::validate::check_text;
use crate::value::{parse_canonical_integer, ValueKind};
use crate::wire::{WireVersion, SEPARATOR};

/// Comparison applied between a row cell and the decoded parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Same type and same value. Strings compare case-sensitively.
    #[default]
    Eq,
    /// Integer cell strictly less than the parameter.
    Lt,
    /// Integer cell less than or equal to the parameter.
    Le,
    /// Integer cell strictly greater than the parameter.
    Gt,
    /// Integer cell greater than or equal to the parameter.
    Ge,
    /// List cell containing the parameter's canonical text.
    Member,
}

impl Operator {
    /// Returns the snake_case identifier used in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Member => "member",
        }
    }

    /// True for the integer-only ordering operators.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value constraint checked by the encoder after the type check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Any well-formed value of the declared type.
    #[default]
    Unconstrained,
    /// The canonical text of the value must be one of `values`.
    OneOf {
        /// Permitted values, in canonical text form.
        values: Vec<String>,
    },
    /// Inclusive integer range.
    IntRange {
        /// Smallest permitted value.
        min: i64,
        /// Largest permitted value.
        max: i64,
    },
    /// Maximum text length in characters.
    Text {
        /// Maximum number of characters.
        max_len: usize,
    },
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDecl {
    /// Parameter name as supplied by callers.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub kind: ValueKind,
    /// Dataset column compared against. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Row comparison.
    #[serde(default, skip_serializing_if = "is_default")]
    pub operator: Operator,
    /// Value constraint.
    #[serde(default, skip_serializing_if = "is_default")]
    pub constraint: Constraint,
    /// Whether values may contain the separator (wire format v2 only).
    #[serde(default, skip_serializing_if = "is_default")]
    pub free_text: bool,
}

impl ParameterDecl {
    fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            column: None,
            operator: Operator::Eq,
            constraint: Constraint::Unconstrained,
            free_text: false,
        }
    }

    /// Declare a string parameter compared with `eq`.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::String)
    }

    /// Declare an integer parameter compared with `eq`.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Integer)
    }

    /// Set the comparison operator.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Set the value constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Compare against `column` instead of the column named like the parameter.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Allow the separator inside values.
    pub fn free_text(mut self) -> Self {
        self.free_text = true;
        self
    }

    /// The dataset column this parameter is compared against.
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    fn check(&self, position: usize, wire: WireVersion) -> Result<(), SchemaError> {
        if self.name.is_empty()
            || self.name.contains(SEPARATOR)
            || self.name.chars().any(char::is_control)
        {
            return Err(SchemaError::InvalidName { position });
        }
        if matches!(&self.column, Some(column) if column.trim().is_empty()) {
            return Err(SchemaError::InvalidColumn(self.name.clone()));
        }
        if self.operator.is_ordering() && self.kind != ValueKind::Integer {
            return Err(SchemaError::OperatorTypeMismatch {
                name: self.name.clone(),
                operator: self.operator,
                kind: self.kind,
            });
        }
        if self.free_text {
            if self.kind != ValueKind::String {
                return Err(self.invalid_constraint("free_text applies to string parameters"));
            }
            if wire != WireVersion::V2 {
                return Err(SchemaError::FreeTextRequiresEscaping(self.name.clone()));
            }
        }

        match &self.constraint {
            Constraint::Unconstrained => Ok(()),
            Constraint::IntRange { min, max } => {
                if self.kind != ValueKind::Integer {
                    return Err(self.invalid_constraint("int_range applies to integer parameters"));
                }
                if min > max {
                    return Err(self.invalid_constraint("int_range min exceeds max"));
                }
                Ok(())
            }
            Constraint::Text { max_len } => {
                if self.kind != ValueKind::String {
                    return Err(self.invalid_constraint("text applies to string parameters"));
                }
                if *max_len == 0 {
                    return Err(self.invalid_constraint("text max_len must be positive"));
                }
                Ok(())
            }
            Constraint::OneOf { values } => {
                if values.is_empty() {
                    return Err(self.invalid_constraint("one_of needs at least one value"));
                }
                for (index, value) in values.iter().enumerate() {
                    let well_formed = check_text(&self.name, value, self.free_text).is_ok()
                        && (self.kind != ValueKind::Integer
                            || parse_canonical_integer(value).is_some());
                    if !well_formed {
                        return Err(self.invalid_constraint(&format!(
                            "one_of entry #{index} would itself be rejected"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn invalid_constraint(&self, reason: &str) -> SchemaError {
        SchemaError::InvalidConstraint {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Serialized shape of a schema, as it appears in catalogs and is fingerprinted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    wire: WireVersion,
    parameters: Vec<ParameterDecl>,
}

fn default_version() -> u32 {
    1
}

/// An ordered, validated parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema", into = "RawSchema")]
pub struct ParameterSchema {
    version: u32,
    wire: WireVersion,
    parameters: Vec<ParameterDecl>,
    fingerprint: ContentDigest,
}

impl ParameterSchema {
    /// Build a version 1 schema from ordered declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema is empty, a name is invalid or
    /// repeated, or a declaration is inconsistent with its type or with the
    /// wire format.
    pub fn new(parameters: Vec<ParameterDecl>, wire: WireVersion) -> Result<Self, SchemaError> {
        Self::build(default_version(), wire, parameters)
    }

    /// Return the same schema under a different version number.
    pub fn with_version(self, version: u32) -> Result<Self, SchemaError> {
        Self::build(version, self.wire, self.parameters)
    }

    fn build(
        version: u32,
        wire: WireVersion,
        parameters: Vec<ParameterDecl>,
    ) -> Result<Self, SchemaError> {
        if parameters.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (position, decl) in parameters.iter().enumerate() {
            decl.check(position, wire)?;
            if parameters[..position].iter().any(|d| d.name == decl.name) {
                return Err(SchemaError::DuplicateName(decl.name.clone()));
            }
        }

        let raw = RawSchema {
            version,
            wire,
            parameters,
        };
        let fingerprint = sha256_digest(&CanonicalBytes::new(&raw)?);
        Ok(Self {
            version: raw.version,
            wire: raw.wire,
            parameters: raw.parameters,
            fingerprint,
        })
    }

    /// Number of declared parameters (and of fields in an encoded identity).
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Always false for a constructed schema.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Declarations in wire order.
    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.parameters
    }

    /// Wire format version.
    pub fn wire(&self) -> WireVersion {
        self.wire
    }

    /// Schema version number.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Position of the parameter called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|d| d.name == name)
    }

    /// SHA-256 over the canonical schema.
    pub fn fingerprint(&self) -> &ContentDigest {
        &self.fingerprint
    }
}

impl TryFrom<RawSchema> for ParameterSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Self::build(raw.version, raw.wire, raw.parameters)
    }
}

impl From<ParameterSchema> for RawSchema {
    fn from(schema: ParameterSchema) -> Self {
        Self {
            version: schema.version,
            wire: schema.wire,
            parameters: schema.parameters,
        }
    }
}
