//! # Credential Issuer
//!
//! Wraps an encoded identity into a signed, short-lived
//! [`SignedCredential`] bound to the report and its schema fingerprint.

use rlsid_core::{EncodedIdentity, ReportDefinition};
use rlsid_crypto::{IdentityClaims, SignedCredential, SigningKey, VerifyingKey};
use uuid::Uuid;

use crate::error::IssuerError;

/// Shortest permitted credential lifetime, in seconds.
pub const MIN_TTL_SECS: i64 = 60;
/// Longest permitted credential lifetime, in seconds.
pub const MAX_TTL_SECS: i64 = 2 * 60 * 60;
/// Default credential lifetime, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// Signs embed credentials with the service key.
#[derive(Debug)]
pub struct CredentialIssuer {
    key: SigningKey,
    ttl_secs: i64,
}

impl CredentialIssuer {
    /// # Errors
    ///
    /// [`IssuerError::InvalidTtl`] if `ttl_secs` is outside
    /// `MIN_TTL_SECS..=MAX_TTL_SECS`.
    pub fn new(key: SigningKey, ttl_secs: i64) -> Result<Self, IssuerError> {
        if !(MIN_TTL_SECS..=MAX_TTL_SECS).contains(&ttl_secs) {
            return Err(IssuerError::InvalidTtl {
                min: MIN_TTL_SECS,
                max: MAX_TTL_SECS,
                got: ttl_secs,
            });
        }
        Ok(Self { key, ttl_secs })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Key the render boundary verifies credentials with.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Issue a credential for `identity`, valid from `now` (unix seconds).
    pub fn issue(
        &self,
        report: &ReportDefinition,
        identity: EncodedIdentity,
        now: i64,
    ) -> Result<SignedCredential, IssuerError> {
        let claims = IdentityClaims {
            credential_id: Uuid::new_v4(),
            report_id: report.id.clone(),
            identity,
            wire: report.schema.wire(),
            schema_fingerprint: *report.schema.fingerprint(),
            issued_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
        };
        let credential = SignedCredential::issue(claims, &self.key)?;
        tracing::debug!(
            credential_id = %credential.claims.credential_id,
            report_id = %report.id,
            expires_at = credential.claims.expires_at,
            "embed credential issued"
        );
        Ok(credential)
    }
}
