pub mod applications;
pub mod error;
pub mod health;
pub mod services;

use axum::{extract::rejection::JsonRejection, Json};
use formdesk_core::service::ValidationError;
use serde_json::Value;

pub use error::AppError;

/// Unwraps a JSON body, turning an unreadable one into a validation error.
fn json_payload(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ValidationError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        let mut errors = ValidationError::new();
        errors.add("_schema", rejection.body_text());
        errors
    })
}
