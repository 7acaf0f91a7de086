//! # Content Digest
//!
//! SHA-256 digests computed from [`CanonicalBytes`]. Used for schema
//! fingerprints (the versioned wire contract between encoder and evaluator)
//! and for the identity digest in audit records.
//!
//! Digests render and serialize as `sha256:<64 lowercase hex chars>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

const PREFIX: &str = "sha256:";

/// A SHA-256 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as lowercase hex, without the algorithm prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| format!("digest must start with `{PREFIX}`"))?;
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err("digest must have 64 hex characters".to_string());
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|e| format!("invalid hex at position {}: {e}", i * 2))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, so every digest in the workspace is taken
/// over the canonical form.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_for_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn display_has_prefix() {
        let cb = CanonicalBytes::new(&"x").unwrap();
        let s = sha256_digest(&cb).to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn parse_roundtrip() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let d = sha256_digest(&cb);
        let parsed: ContentDigest = d.to_string().parse().unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("".parse::<ContentDigest>().is_err());
        assert!("sha256:abcd".parse::<ContentDigest>().is_err());
        assert!(format!("md5:{}", "0".repeat(64)).parse::<ContentDigest>().is_err());
        assert!(format!("sha256:{}", "g".repeat(64)).parse::<ContentDigest>().is_err());
    }

    #[test]
    fn serde_as_prefixed_string() {
        let cb = CanonicalBytes::new(&serde_json::json!([1, 2])).unwrap();
        let d = sha256_digest(&cb);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{d}\""));
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn different_inputs_differ() {
        let a = sha256_digest(&CanonicalBytes::new(&"West|Sales|2024").unwrap());
        let b = sha256_digest(&CanonicalBytes::new(&"East|Sales|2024").unwrap());
        assert_ne!(a, b);
    }
}
