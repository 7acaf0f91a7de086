//! Errors raised by the audit sinks and the credential issuer.

use rlsid_core::CanonicalizationError;
use rlsid_crypto::CryptoError;
use thiserror::Error;

/// An audit record could not be persisted.
///
/// Never surfaced to the caller of the encoder; see
/// [`crate::IdentityEncoder::audit_failures()`].
#[derive(Error, Debug)]
pub enum AuditError {
    /// Writing to the sink's backing store failed.
    #[error("audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("audit serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record could not be digested.
    #[error("audit canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The sink refused the record.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Credential issuance failure.
#[derive(Error, Debug)]
pub enum IssuerError {
    /// The configured lifetime is outside the permitted window.
    #[error("credential lifetime must be between {min} and {max} seconds, got {got}")]
    InvalidTtl {
        /// Shortest permitted lifetime.
        min: i64,
        /// Longest permitted lifetime.
        max: i64,
        /// Configured lifetime.
        got: i64,
    },

    /// Signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
