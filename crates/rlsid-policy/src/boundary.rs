//! # Trusted Render Boundary
//!
//! The point where an embed credential is turned into visible rows.
//!
//! Checks, in order: signature, expiry, report binding, wire version,
//! schema fingerprint, identity decoding. Any failure degrades to "no rows".
//! Callers see the same empty result whatever the cause; the reason is only
//! logged at `debug` level.

use std::fmt;
use std::sync::Arc;

use rlsid_core::{DataRow, ReportCatalog, ReportDefinition};
use rlsid_crypto::{SignedCredential, VerifyingKey};

use crate::evaluator::RowPredicate;

/// Why a credential was refused. Internal diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Signature does not verify under the service key.
    BadSignature,
    /// `now` is at or past `expires_at`.
    Expired,
    /// The rendered report is not in the catalog.
    UnknownReport,
    /// The credential was issued for a different report.
    ReportMismatch,
    /// The credential's wire version differs from the schema's.
    WireMismatch,
    /// The schema changed since the credential was issued.
    FingerprintMismatch,
    /// The identity does not decode against the schema.
    Undecodable,
}

impl DenyReason {
    /// Stable snake_case label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::UnknownReport => "unknown_report",
            Self::ReportMismatch => "report_mismatch",
            Self::WireMismatch => "wire_mismatch",
            Self::FingerprintMismatch => "fingerprint_mismatch",
            Self::Undecodable => "undecodable",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows a render request may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Visible rows, in dataset order. Empty on any failure.
    pub rows: Vec<DataRow>,
    /// True when the credential was refused outright.
    pub denied: bool,
}

impl RenderOutcome {
    fn denied() -> Self {
        Self {
            rows: Vec::new(),
            denied: true,
        }
    }
}

/// Verifies credentials and filters report rows.
#[derive(Debug, Clone)]
pub struct RenderBoundary {
    verifying_key: VerifyingKey,
    catalog: Arc<ReportCatalog>,
}

impl RenderBoundary {
    /// Trust credentials signed by the key behind `verifying_key`.
    pub fn new(verifying_key: VerifyingKey, catalog: Arc<ReportCatalog>) -> Self {
        Self {
            verifying_key,
            catalog,
        }
    }

    /// Filter `rows` of `report_id` for the holder of `credential` at `now`
    /// (unix seconds).
    pub fn render(
        &self,
        report_id: &str,
        credential: &SignedCredential,
        rows: &[DataRow],
        now: i64,
    ) -> RenderOutcome {
        match self.authorize(report_id, credential, now) {
            Ok((_, predicate)) => RenderOutcome {
                rows: predicate.filter(rows),
                denied: false,
            },
            Err(reason) => {
                tracing::debug!(
                    report_id,
                    credential_id = %credential.claims.credential_id,
                    reason = %reason,
                    "render denied"
                );
                RenderOutcome::denied()
            }
        }
    }

    /// Filter the catalog's preview rows of `report_id`.
    pub fn render_preview(
        &self,
        report_id: &str,
        credential: &SignedCredential,
        now: i64,
    ) -> RenderOutcome {
        match self.catalog.get(report_id) {
            Some(report) => self.render(report_id, credential, &report.rows, now),
            None => {
                tracing::debug!(report_id, reason = %DenyReason::UnknownReport, "render denied");
                RenderOutcome::denied()
            }
        }
    }

    /// Run every credential check and compile the identity.
    pub fn authorize(
        &self,
        report_id: &str,
        credential: &SignedCredential,
        now: i64,
    ) -> Result<(&ReportDefinition, RowPredicate), DenyReason> {
        let claims = credential
            .verify(&self.verifying_key)
            .map_err(|_| DenyReason::BadSignature)?;
        if claims.is_expired_at(now) {
            return Err(DenyReason::Expired);
        }
        let report = self
            .catalog
            .get(report_id)
            .ok_or(DenyReason::UnknownReport)?;
        if claims.report_id != report.id {
            return Err(DenyReason::ReportMismatch);
        }
        if claims.wire != report.schema.wire() {
            return Err(DenyReason::WireMismatch);
        }
        if &claims.schema_fingerprint != report.schema.fingerprint() {
            return Err(DenyReason::FingerprintMismatch);
        }
        let predicate = RowPredicate::compile(&claims.identity, &report.schema);
        if predicate.is_deny_all() {
            return Err(DenyReason::Undecodable);
        }
        Ok((report, predicate))
    }
}
