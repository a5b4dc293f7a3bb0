//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the repository traits
//! that keeps every entity in a single ordered map wrapped in `Arc<RwLock<_>>`.
//! Used by the router tests and for local runs without DynamoDB.
//!
//! # Example
//!
//! ```rust,ignore
//! use formdesk::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
