//! # rlsid-crypto — Keys and Signed Embed Credentials
//!
//! - **Ed25519** signing and verification over
//!   [`CanonicalBytes`](rlsid_core::CanonicalBytes).
//! - **Embed credentials**: [`IdentityClaims`] binding an encoded identity
//!   to a report, a schema fingerprint, a wire version and an expiry, signed
//!   into a [`SignedCredential`].

pub mod credential;
pub mod ed25519;
pub mod error;

pub use credential::{IdentityClaims, SignedCredential};
pub use ed25519::{bytes_to_hex, Ed25519Signature, SigningKey, VerifyingKey};
pub use error::CryptoError;
