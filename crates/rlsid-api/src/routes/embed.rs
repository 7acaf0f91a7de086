//! # Embed Credential Issuance
//!
//! `POST /v1/reports/:report_id/embed-token` is the untrusted-input
//! boundary. The parameter set is validated and encoded by the
//! [`IdentityEncoder`](rlsid_encoder::IdentityEncoder); only an accepted set
//! is audited and signed into a credential. A rejected set produces a `422`
//! naming the parameter and rule, never the value.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rlsid_core::ParameterSet;
use rlsid_crypto::SignedCredential;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Upper bound on supplied entries, declared or not.
const MAX_SUPPLIED_PARAMETERS: usize = 64;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmbedTokenRequest {
    /// Parameter name to value. Integers may be given as JSON numbers.
    #[schema(value_type = Object)]
    pub parameters: ParameterSet,
}

impl Validate for EmbedTokenRequest {
    fn validate(&self) -> Result<(), String> {
        if self.parameters.len() > MAX_SUPPLIED_PARAMETERS {
            return Err(format!(
                "at most {MAX_SUPPLIED_PARAMETERS} parameters may be supplied"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmbedTokenResponse {
    /// Signed claims to hand to the render endpoint unchanged.
    #[schema(value_type = Object)]
    pub credential: SignedCredential,
    pub expires_at: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/reports/:report_id/embed-token", post(issue_embed_token))
}

/// POST /v1/reports/:report_id/embed-token: Encode a parameter set and sign it.
#[utoipa::path(
    post,
    path = "/v1/reports/{report_id}/embed-token",
    params(("report_id" = String, Path, description = "Report identifier")),
    request_body = EmbedTokenRequest,
    responses(
        (status = 200, description = "Embed credential issued", body = EmbedTokenResponse),
        (status = 404, description = "Unknown report", body = crate::error::ErrorBody),
        (status = 422, description = "INVALID_PARAMETER or PARAMETER_NOT_ALLOWED", body = crate::error::ErrorBody),
    ),
    tag = "embed"
)]
pub(crate) async fn issue_embed_token(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(report_id): Path<String>,
    body: Result<Json<EmbedTokenRequest>, JsonRejection>,
) -> Result<Json<EmbedTokenResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let report = state
        .catalog
        .get(&report_id)
        .ok_or_else(|| AppError::NotFound("report not found".into()))?;

    let encoded = state
        .encoder
        .encode(report, &req.parameters, Some(&caller.subject));
    state
        .metrics
        .sync_audit_failures(state.encoder.audit_failures());
    let identity = encoded.map_err(|err| {
        state.metrics.record_rejection(err.kind());
        AppError::from(err)
    })?;

    let credential = state
        .issuer
        .issue(report, identity, Utc::now().timestamp())?;
    let expires_at = DateTime::<Utc>::from_timestamp(credential.claims.expires_at, 0)
        .ok_or_else(|| AppError::Internal("credential expiry out of range".into()))?;
    state.metrics.record_token_issued();

    Ok(Json(EmbedTokenResponse {
        credential,
        expires_at,
    }))
}
