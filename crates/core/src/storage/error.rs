use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// The atomic multi-item write was rejected as a whole.
    #[error("Transaction failed: {0}")]
    Transaction(String),
    /// A single-item write was rejected.
    #[error("Write failed: {0}")]
    Write(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// A stored item does not decode into its entity.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl RepositoryError {
    /// True for stored data that does not decode, as opposed to backend failures.
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, RepositoryError::MalformedRecord(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
