//! # Request Extraction
//!
//! Maps JSON body rejections to [`AppError::BadRequest`] and runs the
//! [`Validate`] shape rules of request DTOs.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Shape rules a request DTO checks beyond what serde enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
