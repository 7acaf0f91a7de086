//! # Cryptographic Error Types
//!
//! Structured errors for key handling and credential signing in
//! `rlsid-crypto`.

use rlsid_core::CanonicalizationError;
use thiserror::Error;

/// Errors from key handling, signing and verification.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid Ed25519 signature length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid Ed25519 seed length.
    #[error("invalid Ed25519 seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// The claims could not be canonicalized for signing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
