//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout rlsid. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Encoder errors fall into exactly two caller-visible kinds,
//!   [`EncodeError::InvalidParameter`] and [`EncodeError::ParameterNotAllowed`].
//!   Each carries the rule that failed and, for declared parameters, the
//!   declared name. Rejected raw values and undeclared names are never part
//!   of the message.
//! - Schema errors are operator-facing (catalog authoring) and may name
//!   anything in the schema.
//! - There is no evaluator error type: the trusted side fails closed.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Operator;
use crate::value::ValueKind;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation error for string newtypes such as [`crate::ReportId`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Report identifier is empty, too long, or has characters outside `[A-Za-z0-9_-]`.
    #[error("invalid report id: must be 1-64 characters of [A-Za-z0-9_-]")]
    InvalidReportId,
}

/// A parameter schema failed its structural checks.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema declares no parameters.
    #[error("schema must declare at least one parameter")]
    Empty,

    /// A parameter name is empty or contains reserved or control characters.
    #[error("parameter #{position} has an invalid name")]
    InvalidName {
        /// Zero-based position in the schema.
        position: usize,
    },

    /// A parameter name is declared twice.
    #[error("parameter `{0}` is declared more than once")]
    DuplicateName(String),

    /// A column mapping is empty.
    #[error("parameter `{0}` maps to an empty column name")]
    InvalidColumn(String),

    /// An ordering operator was declared on a non-integer parameter.
    #[error("operator `{operator}` cannot be used with {kind} parameter `{name}`")]
    OperatorTypeMismatch {
        /// Parameter name.
        name: String,
        /// Declared operator.
        operator: Operator,
        /// Declared value kind.
        kind: ValueKind,
    },

    /// A constraint does not fit the parameter's type or is self-inconsistent.
    #[error("invalid constraint on parameter `{name}`: {reason}")]
    InvalidConstraint {
        /// Parameter name.
        name: String,
        /// Why the constraint was rejected.
        reason: String,
    },

    /// `free_text` requires a wire format that escapes the separator.
    #[error("parameter `{0}` is free text, which requires wire format v2")]
    FreeTextRequiresEscaping(String),

    /// The schema could not be fingerprinted.
    #[error("schema fingerprint failed: {0}")]
    Fingerprint(#[from] CanonicalizationError),
}

/// Encoder-side rejection of a `ParameterSet`.
///
/// The two variants correspond to the two error kinds exposed to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Names do not match the schema, or a value could corrupt positional decoding.
    #[error("invalid parameter: {0}")]
    InvalidParameter(InvalidParameter),

    /// A well-formed value failed its type or allow-list constraint.
    #[error("parameter not allowed: {0}")]
    ParameterNotAllowed(NotAllowed),
}

impl EncodeError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::ParameterNotAllowed(_) => "PARAMETER_NOT_ALLOWED",
        }
    }

    /// Short rule identifier, suitable as a metric label.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::InvalidParameter(inner) => inner.rule(),
            Self::ParameterNotAllowed(inner) => inner.rule(),
        }
    }
}

impl From<InvalidParameter> for EncodeError {
    fn from(err: InvalidParameter) -> Self {
        Self::InvalidParameter(err)
    }
}

impl From<NotAllowed> for EncodeError {
    fn from(err: NotAllowed) -> Self {
        Self::ParameterNotAllowed(err)
    }
}

/// Structural rejection reasons (`InvalidParameter`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidParameter {
    /// Names not declared in the schema were supplied.
    #[error("{count} undeclared parameter name(s) supplied")]
    Unknown {
        /// Number of undeclared entries.
        count: usize,
    },

    /// A declared parameter was not supplied.
    #[error("`{name}` is missing")]
    Missing {
        /// Declared parameter name.
        name: String,
    },

    /// A declared parameter was supplied more than once.
    #[error("`{name}` was supplied more than once")]
    Duplicate {
        /// Declared parameter name.
        name: String,
    },

    /// The value is empty.
    #[error("`{name}` is empty")]
    Empty {
        /// Declared parameter name.
        name: String,
    },

    /// The value contains the reserved separator.
    #[error("`{name}` contains the reserved separator")]
    ContainsSeparator {
        /// Declared parameter name.
        name: String,
    },

    /// The value contains control characters.
    #[error("`{name}` contains control characters")]
    ControlCharacter {
        /// Declared parameter name.
        name: String,
    },

    /// The packed identity exceeds the wire limit.
    #[error("encoded identity is {actual} bytes, the limit is {max}")]
    IdentityTooLong {
        /// Maximum permitted length in bytes.
        max: usize,
        /// Actual packed length in bytes.
        actual: usize,
    },
}

impl InvalidParameter {
    fn rule(&self) -> &'static str {
        match self {
            Self::Unknown { .. } => "unknown",
            Self::Missing { .. } => "missing",
            Self::Duplicate { .. } => "duplicate",
            Self::Empty { .. } => "empty",
            Self::ContainsSeparator { .. } => "separator",
            Self::ControlCharacter { .. } => "control_character",
            Self::IdentityTooLong { .. } => "identity_too_long",
        }
    }
}

/// Constraint rejection reasons (`ParameterNotAllowed`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotAllowed {
    /// The value does not have the declared type.
    #[error("`{name}` must be {expected}")]
    TypeMismatch {
        /// Declared parameter name.
        name: String,
        /// Declared value kind.
        expected: ValueKind,
    },

    /// The value is not a member of the declared allow-list.
    #[error("`{name}` is not one of the permitted values")]
    NotInAllowList {
        /// Declared parameter name.
        name: String,
    },

    /// The integer is outside the declared range.
    #[error("`{name}` is outside the permitted range")]
    OutOfRange {
        /// Declared parameter name.
        name: String,
    },

    /// The text exceeds the declared maximum length.
    #[error("`{name}` exceeds {max_len} characters")]
    TooLong {
        /// Declared parameter name.
        name: String,
        /// Declared maximum length in characters.
        max_len: usize,
    },
}

impl NotAllowed {
    fn rule(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type",
            Self::NotInAllowList { .. } => "allow_list",
            Self::OutOfRange { .. } => "range",
            Self::TooLong { .. } => "max_len",
        }
    }
}

/// Error loading a report catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid YAML or a schema failed validation.
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Two reports share an id.
    #[error("report `{0}` is defined more than once")]
    DuplicateReport(String),

    /// The catalog defines no reports.
    #[error("catalog defines no reports")]
    Empty,
}
