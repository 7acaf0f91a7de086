//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Encoder rejections keep their two machine-readable kinds
//! (`INVALID_PARAMETER`, `PARAMETER_NOT_ALLOWED`). Internal error details
//! are logged and never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rlsid_core::EncodeError;
use rlsid_encoder::IssuerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_PARAMETER").
    pub code: String,
    /// Human-readable error message. Never contains a rejected value.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request passed parsing but failed a shape rule (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Structural parameter rejection (422).
    #[error("{0}")]
    InvalidParameter(String),

    /// Constraint parameter rejection (422).
    #[error("{0}")]
    ParameterNotAllowed(String),

    /// Authentication failure (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::InvalidParameter(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PARAMETER"),
            Self::ParameterNotAllowed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PARAMETER_NOT_ALLOWED")
            }
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::InvalidParameter(inner) => Self::InvalidParameter(inner.to_string()),
            EncodeError::ParameterNotAllowed(inner) => {
                Self::ParameterNotAllowed(inner.to_string())
            }
        }
    }
}

impl From<IssuerError> for AppError {
    fn from(err: IssuerError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rlsid_core::{InvalidParameter, NotAllowed, ValueKind};

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                AppError::InvalidParameter("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_PARAMETER",
            ),
            (
                AppError::ParameterNotAllowed("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARAMETER_NOT_ALLOWED",
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[test]
    fn encode_errors_keep_their_kind() {
        let invalid: AppError = EncodeError::from(InvalidParameter::ContainsSeparator {
            name: "Region".into(),
        })
        .into();
        assert!(matches!(invalid, AppError::InvalidParameter(_)));

        let not_allowed: AppError = EncodeError::from(NotAllowed::TypeMismatch {
            name: "Year".into(),
            expected: ValueKind::Integer,
        })
        .into();
        assert!(matches!(not_allowed, AppError::ParameterNotAllowed(_)));
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let response = AppError::Internal("signing key unavailable".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("signing key"));
    }
}
