//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Every collaborator is injected: the repositories, the id
//! generator and the token verifier.

use std::sync::Arc;

use axum::extract::FromRef;

use formdesk_core::service::{IdGenerator, TimestampIdGenerator};
use formdesk_core::storage::{ApplicationRepository, ServiceRepository};

use crate::{auth::JwtVerifier, config::Config, storage::InMemoryRepository};

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// DynamoDB single table.
    Dynamodb,
    /// Process-local map, lost on exit.
    Memory,
}

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects for database access.
#[derive(Clone)]
pub struct AppState {
    pub service_repo: Arc<dyn ServiceRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub ids: Arc<dyn IdGenerator>,
    pub verifier: Arc<JwtVerifier>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    /// Creates a new AppState from explicit collaborators.
    pub fn build(
        service_repo: Arc<dyn ServiceRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        ids: Arc<dyn IdGenerator>,
        verifier: JwtVerifier,
    ) -> Self {
        Self {
            service_repo,
            application_repo,
            ids,
            verifier: Arc::new(verifier),
        }
    }

    /// Creates AppState backed by an in-memory repository.
    pub fn in_memory(ids: Arc<dyn IdGenerator>, verifier: JwtVerifier) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        Self::build(repo.clone(), repo, ids, verifier)
    }

    /// Creates AppState for the selected backend.
    pub async fn new(config: &Config, backend: StorageBackend) -> Result<Self, anyhow::Error> {
        if config.jwt_secret_key.is_empty() {
            tracing::warn!("JWT_SECRET_KEY is empty; tokens signed with an empty key will verify");
        }
        let verifier = JwtVerifier::new(&config.jwt_secret_key, &config.jwt_algorithm)?;
        let ids: Arc<dyn IdGenerator> = Arc::new(TimestampIdGenerator::new());

        let state = match backend {
            #[cfg(feature = "dynamodb")]
            StorageBackend::Dynamodb => {
                let repo = Arc::new(crate::storage::DynamoDbRepository::from_config(config).await);
                Self::build(repo.clone(), repo, ids, verifier)
            }
            #[cfg(not(feature = "dynamodb"))]
            StorageBackend::Dynamodb => {
                anyhow::bail!("formdesk was built without the `dynamodb` feature")
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on exit");
                Self::in_memory(ids, verifier)
            }
        };

        Ok(state)
    }
}

// ============================================================================
// Test support
// ============================================================================
