//! # rlsid-core — Parameter Schemas and the Identity Wire Contract
//!
//! This crate is the leaf of the rlsid workspace. It defines the typed
//! model that both sides of the row-level-security contract agree on:
//!
//! - [`ParameterSchema`]: the ordered, typed declaration of the parameters
//!   a report accepts, how each one is validated, and how it is compared
//!   against dataset rows.
//! - [`ParameterSet`]: the untrusted `(name, value)` pairs a user submits.
//! - [`validate()`] / [`encode()`]: the server-side gate that turns a
//!   `ParameterSet` into [`ValidatedParameters`] and then into an
//!   [`EncodedIdentity`].
//! - [`wire`]: the separator-joined string format. It is only a
//!   serialization boundary; nothing above this crate handles raw
//!   identity strings.
//! - [`DataRow`] / [`ReportCatalog`]: the row model and the YAML catalog of
//!   reports.
//! - [`CanonicalBytes`] / [`ContentDigest`]: the only path to digests, used
//!   for schema fingerprints, audit digests and credential signing input.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rlsid-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Error messages never contain user-supplied parameter values.

pub mod canonical;
pub mod catalog;
pub mod digest;
pub mod error;
pub mod params;
pub mod row;
pub mod schema;
pub mod validate;
pub mod value;
pub mod wire;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use catalog::{ReportCatalog, ReportDefinition, ReportId};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{
    CanonicalizationError, CatalogError, EncodeError, InvalidParameter, NotAllowed, SchemaError,
    ValidationError,
};
pub use params::{ParameterSet, ValidatedParameters};
pub use row::{CellValue, DataRow};
pub use schema::{Constraint, Operator, ParameterDecl, ParameterSchema};
pub use validate::{encode, encode_validated, validate};
pub use value::{ParameterValue, ValueKind};
pub use wire::{EncodedIdentity, WireVersion, MAX_IDENTITY_LEN, SEPARATOR};
