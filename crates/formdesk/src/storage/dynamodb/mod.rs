//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the repository traits
//! using `aws-sdk-dynamodb`. All entities share one table; see
//! `formdesk_core::storage::keys` for the key layout.

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbRepository;
