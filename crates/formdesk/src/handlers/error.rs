use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use formdesk_core::service::ValidationError;
use formdesk_core::storage::{repository_error_to_status_code, RepositoryError};
use serde_json::json;

use crate::auth::AuthError;

/// Handler error. Wraps any error and picks the status and JSON body from
/// the typed error inside.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(validation) = self.0.downcast_ref::<ValidationError>() {
            tracing::warn!(errors = ?validation.errors, "Rejected invalid payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "code": "VALIDATION_ERROR",
                    "message": validation.to_string(),
                    "errors": validation.errors,
                })),
            )
                .into_response();
        }

        if let Some(auth) = self.0.downcast_ref::<AuthError>() {
            return auth.clone().into_response();
        }

        let status_code = if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            if repo_error.is_malformed_record() {
                tracing::error!(
                    malformed_record = true,
                    error = %repo_error,
                    "Stored record could not be decoded"
                );
            } else if !matches!(repo_error, RepositoryError::NotFound { .. }) {
                tracing::error!(error = %repo_error, "Repository operation failed");
            }
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            tracing::error!(error = %self.0, "Unhandled error");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let message = match status_code {
            StatusCode::NOT_FOUND => self.0.to_string(),
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable".to_string(),
            _ => "Internal Server Error".to_string(),
        };
        let code = status_code
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_uppercase()
            .replace(' ', "_");

        (status_code, Json(json!({ "code": code, "message": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
