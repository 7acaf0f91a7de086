//! # Audit Trail of Accepted Parameter Sets
//!
//! Every parameter set the encoder accepts produces one [`AuditRecord`]:
//! who asked, for which report, which values were accepted, and the digest
//! of the identity that was issued. Rejected input is never recorded here.
//!
//! Records go to an [`AuditSink`]. Three sinks are provided:
//!
//! - [`MemoryAuditTrail`]: bounded, trims the oldest 10% when full.
//! - [`TracingAuditSink`]: one `tracing` event per record on target
//!   `rlsid::audit`.
//! - [`JsonlFileAuditSink`]: appends one JSON object per line.
//!
//! [`FanoutAuditSink`] combines several sinks.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rlsid_core::{
    sha256_digest, CanonicalBytes, ContentDigest, EncodedIdentity, ParameterSchema, ReportId,
    ValidatedParameters,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuditError;

/// One accepted parameter, in canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedParameter {
    pub name: String,
    pub value: String,
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record id.
    pub record_id: Uuid,
    /// Report the identity was issued for.
    pub report_id: ReportId,
    /// Authenticated caller, if known.
    pub subject: Option<String>,
    /// Accepted values in schema order.
    pub parameters: Vec<AcceptedParameter>,
    /// SHA-256 of the canonical encoded identity.
    pub identity_digest: ContentDigest,
    /// Fingerprint of the schema the values were validated against.
    pub schema_fingerprint: ContentDigest,
    /// When the parameter set was accepted.
    pub accepted_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record for an accepted parameter set.
    pub fn new(
        report_id: &ReportId,
        subject: Option<&str>,
        schema: &ParameterSchema,
        validated: &ValidatedParameters,
        identity: &EncodedIdentity,
    ) -> Result<Self, AuditError> {
        let parameters = schema
            .parameters()
            .iter()
            .zip(validated.iter())
            .map(|(decl, value)| AcceptedParameter {
                name: decl.name.clone(),
                value: value.canonical_text().into_owned(),
            })
            .collect();
        Ok(Self {
            record_id: Uuid::new_v4(),
            report_id: report_id.clone(),
            subject: subject.map(str::to_string),
            parameters,
            identity_digest: sha256_digest(&CanonicalBytes::new(identity)?),
            schema_fingerprint: *schema.fingerprint(),
            accepted_at: Utc::now(),
        })
    }

    /// Content digest of the whole record.
    pub fn digest(&self) -> Result<ContentDigest, AuditError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }
}

/// Destination for audit records.
///
/// Implementations must not block for long; the encoder calls `record`
/// synchronously on the request path.
pub trait AuditSink: Send + Sync {
    /// Persist one record.
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Bounded in-memory trail.
///
/// When the trail exceeds its capacity the oldest 10% of records are
/// dropped.
pub struct MemoryAuditTrail {
    records: Mutex<Vec<AuditRecord>>,
    max_records: usize,
}

impl MemoryAuditTrail {
    /// Default capacity.
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_records: max_records.max(1),
        }
    }

    /// Snapshot of all retained records, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Retained records for one report.
    pub fn records_for_report(&self, report_id: &str) -> Vec<AuditRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.report_id.as_str() == report_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Default for MemoryAuditTrail {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl AuditSink for MemoryAuditTrail {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut records = self.records.lock();
        records.push(record.clone());
        if records.len() > self.max_records {
            let trim_count = (self.max_records / 10).max(1);
            records.drain(..trim_count);
        }
        Ok(())
    }
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let parameters = serde_json::to_string(&record.parameters)?;
        tracing::info!(
            target: "rlsid::audit",
            record_id = %record.record_id,
            report_id = %record.report_id,
            subject = record.subject.as_deref().unwrap_or("-"),
            identity_digest = %record.identity_digest,
            schema_fingerprint = %record.schema_fingerprint,
            parameters = %parameters,
            "parameter set accepted"
        );
        Ok(())
    }
}

/// Appends records to a file, one JSON object per line.
pub struct JsonlFileAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlFileAuditSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for JsonlFileAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlFileAuditSink")
            .field("path", &self.path)
            .finish()
    }
}

impl AuditSink for JsonlFileAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

/// Forwards every record to each inner sink.
///
/// All sinks are attempted; the first failure is returned.
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for FanoutAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(record) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
