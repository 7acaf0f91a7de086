//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain counters (credentials issued, parameter rejections,
//! render requests and denials) are incremented by the handlers. The audit
//! failure counter follows the encoder's own running total and is synced
//! after every encode; the remaining audit gauges are refreshed on each
//! `/metrics` scrape.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    embed_tokens_issued_total: IntCounter,
    parameter_rejections_total: IntCounterVec,
    render_requests_total: IntCounter,
    render_denied_total: IntCounter,
    audit_sink_failures_total: IntCounter,
    // Encoder failure total already folded into the counter.
    audit_failures_synced: AtomicU64,

    // Refreshed on scrape.
    audit_trail_entries: IntGauge,
    signing_key_ephemeral: IntGauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: &C) {
    registry
        .register(Box::new(collector.clone()))
        .expect("metric can be registered");
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("rlsid_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "rlsid_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("rlsid_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let embed_tokens_issued_total = IntCounter::new(
            "rlsid_embed_tokens_issued_total",
            "Embed credentials issued",
        )
        .expect("metric can be created");

        let parameter_rejections_total = IntCounterVec::new(
            Opts::new(
                "rlsid_parameter_rejections_total",
                "Parameter sets rejected by the encoder, by error kind",
            ),
            &["kind"],
        )
        .expect("metric can be created");

        let render_requests_total = IntCounter::new(
            "rlsid_render_requests_total",
            "Render requests received",
        )
        .expect("metric can be created");

        let render_denied_total = IntCounter::new(
            "rlsid_render_denied_total",
            "Render requests whose credential was refused",
        )
        .expect("metric can be created");

        let audit_sink_failures_total = IntCounter::new(
            "rlsid_audit_sink_failures_total",
            "Audit records that could not be written",
        )
        .expect("metric can be created");

        let audit_trail_entries = IntGauge::new(
            "rlsid_audit_trail_entries",
            "Records retained in the in-memory audit trail",
        )
        .expect("metric can be created");

        let signing_key_ephemeral = IntGauge::new(
            "rlsid_signing_key_ephemeral",
            "Whether the credential signing key is ephemeral (1=ephemeral, 0=configured)",
        )
        .expect("metric can be created");

        register(&registry, &http_requests_total);
        register(&registry, &http_request_duration_seconds);
        register(&registry, &http_errors_total);
        register(&registry, &embed_tokens_issued_total);
        register(&registry, &parameter_rejections_total);
        register(&registry, &render_requests_total);
        register(&registry, &render_denied_total);
        register(&registry, &audit_sink_failures_total);
        register(&registry, &audit_trail_entries);
        register(&registry, &signing_key_ephemeral);

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                embed_tokens_issued_total,
                parameter_rejections_total,
                render_requests_total,
                render_denied_total,
                audit_sink_failures_total,
                audit_failures_synced: AtomicU64::new(0),
                audit_trail_entries,
                signing_key_ephemeral,
            }),
        }
    }

    /// Total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        sum_counters(&self.inner.http_requests_total)
    }

    /// Total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        sum_counters(&self.inner.http_errors_total)
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    pub fn record_token_issued(&self) {
        self.inner.embed_tokens_issued_total.inc();
    }

    pub fn tokens_issued(&self) -> u64 {
        self.inner.embed_tokens_issued_total.get()
    }

    /// Count an encoder rejection under its error kind.
    pub fn record_rejection(&self, kind: &str) {
        self.inner
            .parameter_rejections_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn rejections(&self, kind: &str) -> u64 {
        self.inner
            .parameter_rejections_total
            .with_label_values(&[kind])
            .get()
    }

    /// Count a render request and, if the credential was refused, a denial.
    pub fn record_render(&self, denied: bool) {
        self.inner.render_requests_total.inc();
        if denied {
            self.inner.render_denied_total.inc();
        }
    }

    pub fn renders(&self) -> u64 {
        self.inner.render_requests_total.get()
    }

    pub fn renders_denied(&self) -> u64 {
        self.inner.render_denied_total.get()
    }

    /// Advance the audit failure counter to the encoder's running total.
    /// A total at or below what was already recorded is ignored.
    pub fn sync_audit_failures(&self, encoder_total: u64) {
        let previous = self
            .inner
            .audit_failures_synced
            .fetch_max(encoder_total, Ordering::Relaxed);
        if encoder_total > previous {
            self.inner
                .audit_sink_failures_total
                .inc_by(encoder_total - previous);
        }
    }

    pub fn audit_sink_failures(&self) -> u64 {
        self.inner.audit_sink_failures_total.get()
    }

    /// Refresh the scrape-time gauges and catch the failure counter up.
    pub fn set_audit_state(&self, sink_failures: u64, trail_entries: usize, key_ephemeral: bool) {
        self.sync_audit_failures(sink_failures);
        self.inner
            .audit_trail_entries
            .set(i64::try_from(trail_entries).unwrap_or(i64::MAX));
        self.inner
            .signing_key_ephemeral
            .set(i64::from(key_ephemeral));
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counters(vec: &IntCounterVec) -> u64 {
    vec.collect()
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

/// Normalize a request path for use as a metric label.
///
/// The segment after `reports` is a caller-chosen report id; it is replaced
/// with `{report_id}` to bound label cardinality.
fn normalize_path(path: &str) -> String {
    let mut previous = "";
    path.split('/')
        .map(|segment| {
            let label = if previous == "reports" && !segment.is_empty() {
                "{report_id}"
            } else {
                segment
            };
            previous = segment;
            label
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}
