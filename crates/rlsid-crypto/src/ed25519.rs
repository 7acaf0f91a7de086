//! # Ed25519 Signing and Verification
//!
//! Ed25519 keys for embed credentials.
//!
//! ## Security Invariant
//!
//! Signing and verification take [`CanonicalBytes`], so the signed payload
//! is always the JCS form of the claims. Private key bytes never appear in
//! `Debug` output and are zeroized when exported.

use std::fmt;

use ed25519_dalek::Signer;
use rand_core::CryptoRngCore;
use rlsid_core::CanonicalBytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Lowercase hex encoding.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode hex (either case) into exactly `N` bytes.
pub fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], CryptoError> {
    let hex = hex.trim();
    if hex.len() != N * 2 {
        return Err(CryptoError::HexDecode(format!(
            "expected {} hex characters, got {}",
            N * 2,
            hex.len()
        )));
    }
    if !hex.is_ascii() {
        return Err(CryptoError::HexDecode("non-ASCII input".to_string()));
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| CryptoError::HexDecode(format!("position {}: {e}", i * 2)))?;
    }
    Ok(out)
}

/// An Ed25519 signature (64 bytes), serialized as hex.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Build from a byte slice, which must be 64 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Parse a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        hex_to_array::<64>(hex).map(Self)
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", self.to_hex())
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// An Ed25519 signing (private) key.
pub struct SigningKey {
    inner: ed25519_dalek::SigningKey,
}

impl SigningKey {
    /// Generate a fresh key from a cryptographic RNG.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::generate(rng),
        }
    }

    /// Derive a key from a 32-byte seed.
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Derive a key from a 64-character hex seed.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(CryptoError::InvalidSeedLength(hex.len() / 2));
        }
        let seed = Zeroizing::new(hex_to_array::<32>(hex)?);
        Ok(Self::from_bytes(&seed))
    }

    /// Export the seed. The buffer is wiped on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.inner.to_bytes())
    }

    /// Export the seed as hex. The buffer is wiped on drop.
    pub fn to_hex(&self) -> Zeroizing<String> {
        let seed = self.to_bytes();
        Zeroizing::new(bytes_to_hex(&seed[..]))
    }

    /// The matching verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.inner.sign(data.as_bytes()).to_bytes())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key().to_hex())
            .field("seed", &"<redacted>")
            .finish()
    }
}

/// An Ed25519 verifying (public) key.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: ed25519_dalek::VerifyingKey,
}

impl VerifyingKey {
    /// Parse 32 public key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Parse a 64-character hex public key.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&hex_to_array::<32>(hex)?)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.inner.as_bytes()
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(self.as_bytes())
    }

    /// Verify `signature` over canonical bytes (strict verification).
    pub fn verify(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        self.inner
            .verify_strict(data.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.to_hex())
    }
}
