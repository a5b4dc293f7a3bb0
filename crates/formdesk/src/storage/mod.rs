//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `formdesk_core::storage`.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB storage backend using `aws-sdk-dynamodb`
//!
//! The in-memory backend is always compiled and is selected at runtime with
//! `--storage memory`.
//!
//! # Examples
//!
//! Build without DynamoDB:
//! ```bash
//! cargo build -p formdesk --no-default-features
//! ```

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbRepository;
pub use inmemory::InMemoryRepository;
