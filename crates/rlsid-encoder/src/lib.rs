//! # rlsid-encoder — The Untrusted-Input Side
//!
//! - [`IdentityEncoder`] validates a parameter set against a report's schema,
//!   packs the [`EncodedIdentity`](rlsid_core::EncodedIdentity) and audits
//!   the accepted set.
//! - [`audit`] defines the [`AuditSink`] trait and its in-memory, `tracing`
//!   and JSON-lines implementations.
//! - [`CredentialIssuer`] signs the identity into a short-lived embed
//!   credential.

pub mod audit;
pub mod encoder;
pub mod error;
pub mod issuer;

pub use audit::{
    AcceptedParameter, AuditRecord, AuditSink, FanoutAuditSink, JsonlFileAuditSink,
    MemoryAuditTrail, TracingAuditSink,
};
pub use encoder::IdentityEncoder;
pub use error::{AuditError, IssuerError};
pub use issuer::{CredentialIssuer, DEFAULT_TTL_SECS, MAX_TTL_SECS, MIN_TTL_SECS};
