//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `formdesk_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::CancellationReason;
use formdesk_core::storage::RepositoryError;

/// Requests that never got an answer from DynamoDB.
fn connection_failure<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::TimeoutError(_) => Some(map_connection_error("DynamoDB request timed out")),
        SdkError::DispatchFailure(_) => {
            Some(map_connection_error("Could not reach DynamoDB endpoint"))
        }
        _ => None,
    }
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    if let Some(err) = connection_failure(&err) {
        return err;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(err) = connection_failure(&err) {
        return err;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        QueryError::InternalServerError(_) => {
            RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
///
/// Every failure is a `Write` error, including a rejected key condition.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    entity_type: &'static str,
    id: &str,
) -> RepositoryError {
    if let Some(err) = connection_failure(&err) {
        return err;
    }
    let reason = match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => {
            format!("{} {} already exists", entity_type, id)
        }
        PutItemError::ResourceNotFoundException(_) => "Table not found".to_string(),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            "Throughput exceeded, please retry".to_string()
        }
        PutItemError::RequestLimitExceeded(_) => {
            "Request limit exceeded, please retry".to_string()
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            "Item collection size limit exceeded".to_string()
        }
        PutItemError::TransactionConflictException(_) => {
            "Transaction conflict, please retry".to_string()
        }
        PutItemError::InternalServerError(_) => "DynamoDB internal server error".to_string(),
        err => format!("PutItem failed: {:?}", err),
    };
    RepositoryError::Write(reason)
}

/// Map a TransactWriteItems SDK error to RepositoryError.
///
/// Every failure is a `Transaction` error; nothing was written.
pub fn map_transact_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
) -> RepositoryError {
    if let Some(err) = connection_failure(&err) {
        return err;
    }
    RepositoryError::Transaction(transact_write_reason(err.into_service_error()))
}

/// Describes a failed transaction, keeping DynamoDB's own message.
fn transact_write_reason(err: TransactWriteItemsError) -> String {
    let (summary, message) = match &err {
        TransactWriteItemsError::TransactionCanceledException(e) => (
            format!(
                "Transaction cancelled: [{}]",
                cancellation_codes(e.cancellation_reasons())
            ),
            e.message(),
        ),
        TransactWriteItemsError::TransactionInProgressException(e) => (
            "Transaction in progress, please retry".to_string(),
            e.message(),
        ),
        TransactWriteItemsError::IdempotentParameterMismatchException(e) => (
            "Idempotency token reused with different parameters".to_string(),
            e.message(),
        ),
        TransactWriteItemsError::ResourceNotFoundException(e) => {
            ("Table not found".to_string(), e.message())
        }
        TransactWriteItemsError::ProvisionedThroughputExceededException(e) => (
            "Throughput exceeded, please retry".to_string(),
            e.message(),
        ),
        TransactWriteItemsError::RequestLimitExceeded(e) => (
            "Request limit exceeded, please retry".to_string(),
            e.message(),
        ),
        TransactWriteItemsError::InternalServerError(e) => {
            ("DynamoDB internal server error".to_string(), e.message())
        }
        err => return format!("TransactWriteItems failed: {:?}", err),
    };
    match message {
        Some(message) => format!("{}: {}", summary, message),
        None => summary,
    }
}

/// Joins the per-item cancellation codes, one slot per transaction item.
fn cancellation_codes(reasons: &[CancellationReason]) -> String {
    reasons
        .iter()
        .map(|reason| reason.code().unwrap_or("None"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a generic connection/config error to RepositoryError.
pub fn map_connection_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::ConnectionFailed(err.to_string())
}
