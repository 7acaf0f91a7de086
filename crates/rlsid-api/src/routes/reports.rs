//! # Report Catalog Routes
//!
//! Read-only view of the loaded catalog: which reports exist and which
//! parameters each one declares. Preview rows are never listed here.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use rlsid_core::{Constraint, ParameterDecl, ReportDefinition};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// One declared parameter, in wire order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParameterSummary {
    pub name: String,
    /// `string` or `integer`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Catalog entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub parameters: Vec<ParameterSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<ReportSummary>,
}

/// Full declaration of one parameter.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParameterDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Dataset column the parameter filters on.
    pub column: String,
    /// Row comparison: `eq`, `lt`, `le`, `gt`, `ge` or `member`.
    pub operator: String,
    #[schema(value_type = Object)]
    pub constraint: Constraint,
    pub free_text: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SchemaResponse {
    pub report_id: String,
    pub version: u32,
    /// Wire format version, `v1` or `v2`.
    pub wire: String,
    /// `sha256:<hex>` over the canonical schema.
    pub fingerprint: String,
    pub parameters: Vec<ParameterDetail>,
}

impl From<&ReportDefinition> for ReportSummary {
    fn from(report: &ReportDefinition) -> Self {
        Self {
            id: report.id.to_string(),
            title: report.title.clone(),
            parameters: report
                .schema
                .parameters()
                .iter()
                .map(|decl| ParameterSummary {
                    name: decl.name.clone(),
                    kind: decl.kind.as_str().to_string(),
                })
                .collect(),
        }
    }
}

impl From<&ParameterDecl> for ParameterDetail {
    fn from(decl: &ParameterDecl) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind.as_str().to_string(),
            column: decl.column().to_string(),
            operator: decl.operator.as_str().to_string(),
            constraint: decl.constraint.clone(),
            free_text: decl.free_text,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/reports", get(list_reports))
        .route("/v1/reports/:report_id/schema", get(report_schema))
}

/// GET /v1/reports: List reports and their parameters.
#[utoipa::path(
    get,
    path = "/v1/reports",
    responses(
        (status = 200, description = "Loaded reports", body = ReportListResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    tag = "reports"
)]
pub(crate) async fn list_reports(State(state): State<AppState>) -> Json<ReportListResponse> {
    Json(ReportListResponse {
        reports: state.catalog.iter().map(ReportSummary::from).collect(),
    })
}

/// GET /v1/reports/:report_id/schema: Declared parameters of one report.
#[utoipa::path(
    get,
    path = "/v1/reports/{report_id}/schema",
    params(("report_id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Parameter schema", body = SchemaResponse),
        (status = 404, description = "Unknown report", body = crate::error::ErrorBody),
    ),
    tag = "reports"
)]
pub(crate) async fn report_schema(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Json<SchemaResponse>, AppError> {
    let report = state
        .catalog
        .get(&report_id)
        .ok_or_else(|| AppError::NotFound("report not found".into()))?;
    Ok(Json(SchemaResponse {
        report_id: report.id.to_string(),
        version: report.schema.version(),
        wire: report.schema.wire().as_str().to_string(),
        fingerprint: report.schema.fingerprint().to_string(),
        parameters: report
            .schema
            .parameters()
            .iter()
            .map(ParameterDetail::from)
            .collect(),
    }))
}
