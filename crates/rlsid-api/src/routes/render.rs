//! # Render Endpoint
//!
//! `POST /v1/reports/:report_id/render` answers `200 { "rows": [...] }` for
//! every request. A malformed body, a bad signature, an expired or
//! cross-report credential and an undecodable identity all produce the same
//! empty row list.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use rlsid_core::DataRow;
use rlsid_crypto::SignedCredential;
use rlsid_policy::RenderOutcome;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Credential as returned by the embed-token endpoint.
    #[schema(value_type = Object)]
    pub credential: SignedCredential,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenderResponse {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<DataRow>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/reports/:report_id/render", post(render_report))
}

/// POST /v1/reports/:report_id/render: Rows visible to the credential holder.
#[utoipa::path(
    post,
    path = "/v1/reports/{report_id}/render",
    params(("report_id" = String, Path, description = "Report identifier")),
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Visible rows; empty on any credential failure", body = RenderResponse),
    ),
    tag = "render"
)]
pub(crate) async fn render_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    body: Result<Json<RenderRequest>, JsonRejection>,
) -> Json<RenderResponse> {
    let outcome = match body {
        Ok(Json(req)) => {
            state
                .boundary
                .render_preview(&report_id, &req.credential, Utc::now().timestamp())
        }
        Err(rejection) => {
            tracing::debug!(
                report_id = %report_id,
                reason = "malformed_request",
                detail = %rejection.body_text(),
                "render denied"
            );
            RenderOutcome {
                rows: Vec::new(),
                denied: true,
            }
        }
    };
    state.metrics.record_render(outcome.denied);
    Json(RenderResponse { rows: outcome.rows })
}
