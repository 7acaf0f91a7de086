//! # Service Bootstrap
//!
//! Turns an [`AppConfig`] into a ready [`AppState`]:
//!
//! 1. Load and validate the report catalog. Any invalid schema aborts startup.
//! 2. Load the signing key from `RLSID_SIGNING_KEY_HEX`, or generate an
//!    ephemeral one with a warning.
//! 3. Open the JSON-lines audit file when `RLSID_AUDIT_LOG` is set.

use std::sync::Arc;

use rand_core::OsRng;
use rlsid_core::{CatalogError, ReportCatalog};
use rlsid_crypto::{CryptoError, SigningKey};
use rlsid_encoder::{AuditError, AuditSink, IssuerError, JsonlFileAuditSink};

use crate::config::AppConfig;
use crate::state::AppState;

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("report catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("RLSID_SIGNING_KEY_HEX: {0}")]
    SigningKey(#[from] CryptoError),

    #[error("audit log: {0}")]
    AuditLog(#[from] AuditError),

    #[error("credential issuer: {0}")]
    Issuer(#[from] IssuerError),
}

/// Build the application state described by `config`.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let catalog = ReportCatalog::load(&config.catalog_path)?;
    for report in catalog.iter() {
        tracing::info!(
            report_id = %report.id,
            parameters = report.schema.len(),
            wire = %report.schema.wire(),
            fingerprint = %report.schema.fingerprint(),
            "report loaded"
        );
    }

    let (signing_key, ephemeral) = match config.signing_key_hex.as_ref() {
        Some(hex) => (SigningKey::from_hex(hex.trim())?, false),
        None => {
            tracing::warn!(
                "RLSID_SIGNING_KEY_HEX not set; generated an ephemeral signing key. \
                 Embed credentials will not survive a restart."
            );
            (SigningKey::generate(&mut OsRng), true)
        }
    };

    let mut extra_sinks: Vec<Arc<dyn AuditSink>> = Vec::new();
    if let Some(path) = config.audit_log.as_ref() {
        let sink = JsonlFileAuditSink::open(path)?;
        tracing::info!(path = %sink.path().display(), "audit log opened");
        extra_sinks.push(Arc::new(sink));
    }

    let state = AppState::new(config, catalog, signing_key, extra_sinks)?
        .with_ephemeral_key(ephemeral);
    tracing::info!(
        reports = state.catalog.len(),
        verifying_key = %state.issuer.verifying_key().to_hex(),
        ttl_secs = state.issuer.ttl_secs(),
        "rlsid bootstrap complete"
    );
    Ok(state)
}
