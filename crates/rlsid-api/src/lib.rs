//! # rlsid-api — Axum Service for Embedded Report Access
//!
//! Management routes issue embed credentials for validated parameter sets;
//! the render route turns a credential into the rows its holder may see.
//!
//! ## API Surface
//!
//! | Path | Module | Auth |
//! |---|---|---|
//! | `/health/*` | this module | none |
//! | `/metrics` | this module | none |
//! | `/openapi.json` | [`openapi`] | bearer |
//! | `/v1/reports`, `/v1/reports/:id/schema` | [`routes::reports`] | bearer |
//! | `/v1/reports/:id/embed-token` | [`routes::embed`] | bearer |
//! | `/v1/reports/:id/render` | [`routes::render`] | embed credential |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! The render route skips `AuthMiddleware`.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics_on = state.config.metrics_enabled;

    let management = Router::new()
        .merge(routes::reports::router())
        .merge(routes::embed::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    let mut api = Router::new()
        .merge(management)
        .merge(routes::render::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(axum::Extension(state.metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        unauthenticated =
            unauthenticated.route("/metrics", axum::routing::get(prometheus_metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics: Prometheus scrape endpoint.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.set_audit_state(
        state.encoder.audit_failures(),
        state.audit_trail.len(),
        state.key_ephemeral,
    );

    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once at least one report is loaded.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.catalog.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "catalog empty")
    } else {
        (StatusCode::OK, "ready")
    }
}
