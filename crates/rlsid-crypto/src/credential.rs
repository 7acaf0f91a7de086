//! # Embed Credentials
//!
//! A signed, short-lived claims object that carries an [`EncodedIdentity`]
//! from the issuing backend to the trusted render boundary.
//!
//! The claims bind the identity to one report, one schema fingerprint and
//! one wire version, so an identity cannot be replayed against a different
//! report or a re-ordered schema. The signature covers the JCS canonical
//! bytes of the claims; the signature field itself is not part of the
//! signing input.

use rlsid_core::{CanonicalBytes, ContentDigest, EncodedIdentity, ReportId, WireVersion};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ed25519::{Ed25519Signature, SigningKey, VerifyingKey};
use crate::error::CryptoError;

/// The signed claims of an embed credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityClaims {
    /// Unique credential id (UUID v4).
    pub credential_id: Uuid,
    /// Report the identity is valid for.
    pub report_id: ReportId,
    /// The packed RLS identity.
    pub identity: EncodedIdentity,
    /// Wire format the identity was packed with.
    pub wire: WireVersion,
    /// Fingerprint of the schema the identity was validated against.
    pub schema_fingerprint: ContentDigest,
    /// Issue time, UTC unix seconds.
    pub issued_at: i64,
    /// Expiry time, UTC unix seconds. The credential is invalid at and after this instant.
    pub expires_at: i64,
}

impl IdentityClaims {
    /// Canonical signing input.
    pub fn signing_input(&self) -> Result<CanonicalBytes, CryptoError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// True once `now` (unix seconds) has reached `expires_at`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Claims plus an Ed25519 signature over their canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedCredential {
    pub claims: IdentityClaims,
    pub signature: Ed25519Signature,
}

impl SignedCredential {
    /// Sign `claims` with `key`.
    pub fn issue(claims: IdentityClaims, key: &SigningKey) -> Result<Self, CryptoError> {
        let signature = key.sign(&claims.signing_input()?);
        Ok(Self { claims, signature })
    }

    /// Check the signature and return the claims.
    ///
    /// Expiry and report binding are not checked here; the caller owns the
    /// clock and knows which report is being rendered.
    pub fn verify(&self, key: &VerifyingKey) -> Result<&IdentityClaims, CryptoError> {
        key.verify(&self.claims.signing_input()?, &self.signature)?;
        Ok(&self.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlsid_core::{sha256_digest, ParameterDecl, ParameterSchema};

    fn claims() -> IdentityClaims {
        let schema = ParameterSchema::new(
            vec![
                ParameterDecl::string("Region"),
                ParameterDecl::string("Department"),
                ParameterDecl::integer("Year"),
            ],
            WireVersion::V1,
        )
        .unwrap();
        IdentityClaims {
            credential_id: Uuid::new_v4(),
            report_id: ReportId::new("regional-sales").unwrap(),
            identity: EncodedIdentity::from_wire("West|Sales|2024"),
            wire: WireVersion::V1,
            schema_fingerprint: *schema.fingerprint(),
            issued_at: 1_700_000_000,
            expires_at: 1_700_003_600,
        }
    }

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[42u8; 32])
    }

    #[test]
    fn issue_then_verify() {
        let credential = SignedCredential::issue(claims(), &key()).unwrap();
        let verified = credential.verify(&key().verifying_key()).unwrap();
        assert_eq!(verified.identity.as_str(), "West|Sales|2024");
    }

    #[test]
    fn tampered_identity_fails() {
        let mut credential = SignedCredential::issue(claims(), &key()).unwrap();
        credential.claims.identity = EncodedIdentity::from_wire("East|Sales|2024");
        assert!(matches!(
            credential.verify(&key().verifying_key()),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn tampered_expiry_fails() {
        let mut credential = SignedCredential::issue(claims(), &key()).unwrap();
        credential.claims.expires_at += 86_400;
        assert!(credential.verify(&key().verifying_key()).is_err());
    }

    #[test]
    fn tampered_fingerprint_fails() {
        let mut credential = SignedCredential::issue(claims(), &key()).unwrap();
        credential.claims.schema_fingerprint =
            sha256_digest(&CanonicalBytes::new(&"other schema").unwrap());
        assert!(credential.verify(&key().verifying_key()).is_err());
    }

    #[test]
    fn json_roundtrip_still_verifies() {
        let credential = SignedCredential::issue(claims(), &key()).unwrap();
        let json = serde_json::to_string(&credential).unwrap();
        let parsed: SignedCredential = serde_json::from_str(&json).unwrap();
        assert!(parsed.verify(&key().verifying_key()).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let credential = SignedCredential::issue(claims(), &key()).unwrap();
        let mut value = serde_json::to_value(&credential).unwrap();
        value["claims"]["admin"] = serde_json::json!(true);
        assert!(serde_json::from_value::<SignedCredential>(value).is_err());
    }

    #[test]
    fn expiry_boundary() {
        let c = claims();
        assert!(!c.is_expired_at(c.expires_at - 1));
        assert!(c.is_expired_at(c.expires_at));
    }
}
