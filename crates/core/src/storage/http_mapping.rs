//! Pure functions for mapping repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `Transaction`, `Write`, `QueryFailed`, `MalformedRecord` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use formdesk_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Service",
///     id: "SVC1".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::Transaction(_) => 500,
        RepositoryError::Write(_) => 500,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::MalformedRecord(_) => 500,
    }
}
