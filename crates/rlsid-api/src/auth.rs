//! # Authentication Middleware
//!
//! Bearer tokens for the management routes (catalog listing, schema lookup,
//! embed credential issuance):
//!
//! ```text
//! Bearer {subject}:{secret}
//! Bearer {secret}              (subject "anonymous")
//! ```
//!
//! The subject is recorded in the audit trail for every accepted parameter
//! set. The render route is not behind this middleware; it is authenticated
//! by the signed embed credential in its body.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// Subject used when the token carries no subject or auth is disabled.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

const MAX_SUBJECT_LEN: usize = 128;

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: String,
}

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self {
            subject: ANONYMOUS_SUBJECT.to_string(),
        }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{subject}:{secret}` or `{secret}`.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    if constant_time_token_eq(provided, expected_secret) {
        return Ok(CallerIdentity::anonymous());
    }
    let Some((subject, secret)) = provided.split_once(':') else {
        return Err("invalid bearer token".into());
    };
    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }
    if subject.is_empty() {
        return Ok(CallerIdentity::anonymous());
    }
    if subject.chars().count() > MAX_SUBJECT_LEN || subject.chars().any(char::is_control) {
        return Err("invalid subject".into());
    }
    Ok(CallerIdentity {
        subject: subject.to_string(),
    })
}

/// Validate the `Authorization` header and inject a [`CallerIdentity`].
///
/// When `AuthConfig.token` is `None`, every request is accepted as the
/// anonymous subject.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header.and_then(|v| v.strip_prefix("Bearer ")) {
                Some(provided) => match parse_bearer_token(provided, expected) {
                    Ok(identity) => {
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(msg) => {
                        tracing::warn!(reason = %msg, "authentication failed");
                        unauthorized_response(&msg)
                    }
                },
                None if auth_header.is_some() => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            request.extensions_mut().insert(CallerIdentity::anonymous());
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
