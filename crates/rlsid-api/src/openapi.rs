//! # OpenAPI Specification Assembly
//!
//! Served at `/openapi.json` behind the bearer middleware.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rlsid API",
        version = "0.1.0",
        description = "Parameter-to-RLS identity encoding: report catalog, embed credential issuance and fail-closed row rendering.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::reports::list_reports,
        crate::routes::reports::report_schema,
        crate::routes::embed::issue_embed_token,
        crate::routes::render::render_report,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::reports::ParameterSummary,
        crate::routes::reports::ReportSummary,
        crate::routes::reports::ReportListResponse,
        crate::routes::reports::ParameterDetail,
        crate::routes::reports::SchemaResponse,
        crate::routes::embed::EmbedTokenRequest,
        crate::routes::embed::EmbedTokenResponse,
        crate::routes::render::RenderRequest,
        crate::routes::render::RenderResponse,
    )),
    tags(
        (name = "reports", description = "Report catalog"),
        (name = "embed", description = "Embed credential issuance"),
        (name = "render", description = "Fail-closed row rendering"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
