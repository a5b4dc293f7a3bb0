//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use formdesk_core::service::{
    Application, Entity, EntityType, Form, Service, ServiceListing, ServiceSummary,
};
use formdesk_core::storage::{
    keys, ApplicationRepository, RepositoryError, Result, SecondaryIndex, ServiceRepository,
    TableKey,
};

/// In-memory storage backend.
///
/// Mirrors the single-table layout: one map keyed by primary key, with index
/// queries answered by scanning each entity's derived index keys.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    items: Arc<RwLock<BTreeMap<TableKey, Entity>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Entities in `index` under partition `pk` whose sort key starts with
    /// `sk_prefix`, ordered by index sort key.
    async fn query_index(
        &self,
        index: SecondaryIndex,
        pk: &str,
        sk_prefix: &str,
        entity_type: EntityType,
    ) -> Vec<Entity> {
        let items = self.items.read().await;

        let mut matches: Vec<(String, Entity)> = items
            .values()
            .filter(|entity| entity.entity_type() == entity_type)
            .filter_map(|entity| {
                let keys = keys::entity_keys(entity);
                let key = keys.index(index)?;
                (key.pk == pk && key.sk.starts_with(sk_prefix))
                    .then(|| (key.sk.clone(), entity.clone()))
            })
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0));
        matches.into_iter().map(|(_, entity)| entity).collect()
    }

    async fn query_applications(&self, index: SecondaryIndex, pk: &str) -> Vec<Application> {
        self.query_index(index, pk, keys::APPLICATION_PREFIX, EntityType::Application)
            .await
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::Application(application) => Some(application),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ServiceRepository for InMemoryRepository {
    async fn create_service_with_form(&self, service: &Service, form: &Form) -> Result<()> {
        let service = Entity::Service(service.clone());
        let form = Entity::Form(form.clone());
        let service_key = keys::entity_keys(&service).primary;
        let form_key = keys::entity_keys(&form).primary;

        let mut items = self.items.write().await;
        // Same per-item cancellation codes DynamoDB reports.
        let codes: Vec<&str> = [&service_key, &form_key]
            .into_iter()
            .map(|key| {
                if items.contains_key(key) {
                    "ConditionalCheckFailed"
                } else {
                    "None"
                }
            })
            .collect();

        if codes.iter().any(|code| *code != "None") {
            return Err(RepositoryError::Transaction(format!(
                "Transaction cancelled: [{}]",
                codes.join(", ")
            )));
        }

        items.insert(service_key, service);
        items.insert(form_key, form);
        Ok(())
    }

    async fn get_service(&self, service_id: &str) -> Result<Option<Service>> {
        let items = self.items.read().await;
        match items.get(&keys::service_key(service_id)) {
            Some(Entity::Service(service)) => Ok(Some(service.clone())),
            Some(other) => Err(RepositoryError::MalformedRecord(format!(
                "Expected SERVICE at {}, found {}",
                service_id,
                other.entity_type()
            ))),
            None => Ok(None),
        }
    }

    async fn get_form_for_service(&self, service_id: &str) -> Result<Option<Form>> {
        let form = self
            .query_index(
                SecondaryIndex::Gsi1,
                &keys::service_forms_pk(service_id),
                keys::FORM_PREFIX,
                EntityType::Form,
            )
            .await
            .into_iter()
            .find_map(|entity| match entity {
                Entity::Form(form) => Some(form),
                _ => None,
            });

        Ok(form)
    }

    async fn list_services_by_company(&self, company_id: &str) -> Result<ServiceListing> {
        let services = self
            .query_index(
                SecondaryIndex::Gsi1,
                &keys::company_services_pk(company_id),
                keys::SERVICE_PREFIX,
                EntityType::Service,
            )
            .await
            .iter()
            .filter_map(|entity| match entity {
                Entity::Service(service) => Some(ServiceSummary::from(service)),
                _ => None,
            })
            .collect();

        Ok(ServiceListing::new(services))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryRepository {
    async fn create_application(&self, application: &Application) -> Result<()> {
        let entity = Entity::Application(application.clone());
        let key = keys::entity_keys(&entity).primary;

        let mut items = self.items.write().await;
        if items.contains_key(&key) {
            return Err(RepositoryError::Write(format!(
                "Application {} already exists",
                application.id
            )));
        }
        items.insert(key, entity);
        Ok(())
    }

    async fn list_applications_by_user(&self, user_id: &str) -> Result<Vec<Application>> {
        Ok(self
            .query_applications(SecondaryIndex::Gsi1, &keys::user_applications_pk(user_id))
            .await)
    }

    async fn list_applications_by_company(&self, company_id: &str) -> Result<Vec<Application>> {
        Ok(self
            .query_applications(SecondaryIndex::Gsi2, &keys::company_applications_pk(company_id))
            .await)
    }

    async fn list_applications_by_service(&self, service_id: &str) -> Result<Vec<Application>> {
        Ok(self
            .query_applications(SecondaryIndex::Gsi3, &keys::service_applications_pk(service_id))
            .await)
    }
}
