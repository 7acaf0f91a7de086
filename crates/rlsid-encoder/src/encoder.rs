//! # Identity Encoder
//!
//! The untrusted-input side of the identity contract. Validates a
//! caller-supplied [`ParameterSet`] against a report's schema, packs it into
//! an [`EncodedIdentity`] and records the accepted set in the audit trail.
//!
//! ## Audit Failure Policy
//!
//! A sink failure never fails the request. It is logged at `error` level
//! and counted; the count is exported as a metric by the API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rlsid_core::{
    encode_validated, validate, EncodeError, EncodedIdentity, ParameterSet, ReportDefinition,
    ValidatedParameters,
};

use crate::audit::{AuditRecord, AuditSink};

/// Validates, encodes and audits parameter sets.
pub struct IdentityEncoder {
    sink: Arc<dyn AuditSink>,
    audit_failures: AtomicU64,
}

impl IdentityEncoder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            audit_failures: AtomicU64::new(0),
        }
    }

    /// Encode `params` for `report` on behalf of `subject`.
    ///
    /// # Errors
    ///
    /// Returns the [`EncodeError`] produced by validation or packing. Nothing
    /// is audited for a rejected set.
    pub fn encode(
        &self,
        report: &ReportDefinition,
        params: &ParameterSet,
        subject: Option<&str>,
    ) -> Result<EncodedIdentity, EncodeError> {
        let result = validate(params, &report.schema)
            .and_then(|validated| {
                encode_validated(&validated, &report.schema).map(|identity| (validated, identity))
            });
        let (validated, identity) = match result {
            Ok(pair) => pair,
            Err(err) => {
                tracing::debug!(
                    report_id = %report.id,
                    kind = err.kind(),
                    rule = err.rule(),
                    "parameter set rejected"
                );
                return Err(err);
            }
        };

        self.audit(report, subject, &validated, &identity);
        Ok(identity)
    }

    /// Number of audit records that could not be written.
    pub fn audit_failures(&self) -> u64 {
        self.audit_failures.load(Ordering::Relaxed)
    }

    fn audit(
        &self,
        report: &ReportDefinition,
        subject: Option<&str>,
        validated: &ValidatedParameters,
        identity: &EncodedIdentity,
    ) {
        let outcome = AuditRecord::new(&report.id, subject, &report.schema, validated, identity)
            .and_then(|record| self.sink.record(&record));
        if let Err(e) = outcome {
            self.audit_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                report_id = %report.id,
                error = %e,
                "audit sink failed; identity issued without an audit record"
            );
        }
    }
}

impl std::fmt::Debug for IdentityEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityEncoder")
            .field("audit_failures", &self.audit_failures())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditTrail;
    use crate::error::AuditError;
    use rlsid_core::{ParameterDecl, ParameterSchema, ReportId, WireVersion};

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn record(&self, _: &AuditRecord) -> Result<(), AuditError> {
            Err(AuditError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    fn report() -> ReportDefinition {
        ReportDefinition {
            id: ReportId::new("regional-sales").unwrap(),
            title: None,
            schema: ParameterSchema::new(
                vec![
                    ParameterDecl::string("Region"),
                    ParameterDecl::string("Department"),
                    ParameterDecl::integer("Year"),
                ],
                WireVersion::V1,
            )
            .unwrap(),
            rows: vec![],
        }
    }

    fn west_sales() -> ParameterSet {
        ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales")
            .with("Year", 2024)
    }

    #[test]
    fn encodes_and_audits() {
        let trail = Arc::new(MemoryAuditTrail::default());
        let encoder = IdentityEncoder::new(trail.clone());
        let identity = encoder
            .encode(&report(), &west_sales(), Some("alice"))
            .unwrap();
        assert_eq!(identity.as_str(), "West|Sales|2024");

        let records = trail.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject.as_deref(), Some("alice"));
        assert_eq!(records[0].report_id.as_str(), "regional-sales");
        assert_eq!(encoder.audit_failures(), 0);
    }

    #[test]
    fn rejected_sets_are_not_audited() {
        let trail = Arc::new(MemoryAuditTrail::default());
        let encoder = IdentityEncoder::new(trail.clone());
        let params = ParameterSet::new()
            .with("Region", "West|East")
            .with("Department", "Sales")
            .with("Year", 2024);
        let err = encoder.encode(&report(), &params, None).unwrap_err();
        assert_eq!(err.kind(), "INVALID_PARAMETER");
        assert!(trail.is_empty());
    }

    #[test]
    fn audit_failure_does_not_block_encoding() {
        let encoder = IdentityEncoder::new(Arc::new(BrokenSink));
        let identity = encoder.encode(&report(), &west_sales(), None).unwrap();
        assert_eq!(identity.as_str(), "West|Sales|2024");
        assert_eq!(encoder.audit_failures(), 1);

        encoder.encode(&report(), &west_sales(), None).unwrap();
        assert_eq!(encoder.audit_failures(), 2);
    }
}
