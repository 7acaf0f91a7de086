//! # Application State
//!
//! Shared, cheaply cloneable handles to the catalog, the encoder, the
//! credential issuer and the render boundary. Nothing here is mutated by
//! request handlers except the audit trail and the metric counters.

use std::sync::Arc;

use rlsid_core::ReportCatalog;
use rlsid_crypto::SigningKey;
use rlsid_encoder::{
    AuditSink, CredentialIssuer, FanoutAuditSink, IdentityEncoder, IssuerError, MemoryAuditTrail,
    TracingAuditSink,
};
use rlsid_policy::RenderBoundary;

use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ReportCatalog>,
    pub encoder: Arc<IdentityEncoder>,
    pub issuer: Arc<CredentialIssuer>,
    pub boundary: Arc<RenderBoundary>,
    /// Recent accepted parameter sets, also fed to every other sink.
    pub audit_trail: Arc<MemoryAuditTrail>,
    pub metrics: ApiMetrics,
    /// True when the signing key was generated at startup.
    pub key_ephemeral: bool,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("reports", &self.catalog.len())
            .field("audit_records", &self.audit_trail.len())
            .field("key_ephemeral", &self.key_ephemeral)
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Wire up the service from an already loaded catalog and key.
    ///
    /// Accepted parameter sets are written to the in-memory trail, the
    /// `tracing` audit target and every sink in `extra_sinks`.
    pub fn new(
        config: AppConfig,
        catalog: ReportCatalog,
        signing_key: SigningKey,
        extra_sinks: Vec<Arc<dyn AuditSink>>,
    ) -> Result<Self, IssuerError> {
        let catalog = Arc::new(catalog);
        let audit_trail = Arc::new(MemoryAuditTrail::default());

        let trail_sink: Arc<dyn AuditSink> = audit_trail.clone();
        let mut sinks: Vec<Arc<dyn AuditSink>> = vec![trail_sink, Arc::new(TracingAuditSink)];
        sinks.extend(extra_sinks);
        let encoder = IdentityEncoder::new(Arc::new(FanoutAuditSink::new(sinks)));

        let issuer = CredentialIssuer::new(signing_key, config.token_ttl_secs)?;
        let boundary = RenderBoundary::new(issuer.verifying_key(), catalog.clone());

        Ok(Self {
            catalog,
            encoder: Arc::new(encoder),
            issuer: Arc::new(issuer),
            boundary: Arc::new(boundary),
            audit_trail,
            metrics: ApiMetrics::new(),
            key_ephemeral: false,
            config,
        })
    }

    pub fn with_ephemeral_key(mut self, ephemeral: bool) -> Self {
        self.key_ephemeral = ephemeral;
        self
    }
}
