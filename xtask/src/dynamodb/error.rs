use thiserror::Error;

pub type Result<T> = std::result::Result<T, DynamodbError>;

/// Failures of the table provisioning commands.
#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Table '{table_name}' did not become active in time")]
    TableActivationTimeout { table_name: String },
}
