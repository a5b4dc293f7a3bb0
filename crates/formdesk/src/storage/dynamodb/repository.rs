//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `formdesk_core::storage` using DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::get_item::builders::GetItemFluentBuilder;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;

use formdesk_core::service::{Application, Entity, EntityType, Form, Service, ServiceListing};
use formdesk_core::storage::{
    keys, ApplicationRepository, RepositoryError, Result, SecondaryIndex, ServiceRepository,
};

use super::conversions::{
    application_to_item, form_to_item, item_to_entity, item_to_service, item_to_service_summary,
    service_to_item, Item, ENTITY_TYPE,
};
use super::error::{
    map_get_item_error, map_put_item_error, map_query_error, map_transact_write_error,
};
use crate::config::Config;

/// Attributes returned by the company services listing.
const SERVICE_SUMMARY_PROJECTION: &str = "#name, #description, #createdAt, #PK";

/// Rejects a write whose primary key is already taken.
const NEW_ITEM_CONDITION: &str = "attribute_not_exists(PK)";

/// One secondary index query: a partition, a sort key prefix, and the entity
/// type to keep.
struct IndexQuery<'a> {
    index: SecondaryIndex,
    pk: String,
    sk_prefix: &'a str,
    entity_type: EntityType,
    projection: Option<&'a str>,
}

/// DynamoDB-based repository implementation.
///
/// Holds a cloned SDK client; the client itself is stateless and shared.
#[derive(Debug, Clone)]
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a repository from the application configuration.
    ///
    /// Uses the AWS SDK default credential chain. Region, endpoint and
    /// operation timeout come from `config` when set.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).timeout_config(
            aws_config::timeout::TimeoutConfig::builder()
                .operation_timeout(config.dynamodb_operation_timeout())
                .build(),
        );
        if let Some(region) = &config.aws_region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.aws_endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        tracing::info!(
            table = %config.table_name,
            endpoint = ?config.aws_endpoint_url,
            "Connecting to DynamoDB"
        );

        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }

    /// Strongly consistent read of a service item, visible as soon as the
    /// creating transaction commits.
    fn service_read(&self, service_id: &str) -> GetItemFluentBuilder {
        let key = keys::service_key(service_id);
        self.client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(key.pk))
            .key("SK", AttributeValue::S(key.sk))
            .consistent_read(true)
    }

    fn conditional_put(&self, item: Item) -> Result<TransactWriteItem> {
        let put = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(NEW_ITEM_CONDITION)
            .build()
            .map_err(|e| RepositoryError::Transaction(format!("Invalid transaction item: {}", e)))?;

        Ok(TransactWriteItem::builder().put(put).build())
    }

    /// Runs an index query, following pagination until exhausted.
    async fn query_index(&self, query: IndexQuery<'_>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(query.index.name())
                .key_condition_expression("#pk = :pk AND begins_with(#sk, :sk)")
                .filter_expression("#entityType = :entityType")
                .expression_attribute_names("#pk", query.index.pk_attribute())
                .expression_attribute_names("#sk", query.index.sk_attribute())
                .expression_attribute_names("#entityType", ENTITY_TYPE)
                .expression_attribute_values(":pk", AttributeValue::S(query.pk.clone()))
                .expression_attribute_values(":sk", AttributeValue::S(query.sk_prefix.to_string()))
                .expression_attribute_values(
                    ":entityType",
                    AttributeValue::S(query.entity_type.as_str().to_string()),
                )
                .set_exclusive_start_key(start_key.take());

            if let Some(projection) = query.projection {
                request = request
                    .projection_expression(projection)
                    .expression_attribute_names("#name", "name")
                    .expression_attribute_names("#description", "description")
                    .expression_attribute_names("#createdAt", "createdAt")
                    .expression_attribute_names("#PK", "PK");
            }

            let output = request.send().await.map_err(map_query_error)?;
            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Runs an index query and decodes every item into an entity.
    async fn query_entities(&self, query: IndexQuery<'_>) -> Result<Vec<Entity>> {
        let items = self.query_index(query).await?;
        items.iter().map(item_to_entity).collect()
    }

    async fn query_applications(
        &self,
        index: SecondaryIndex,
        pk: String,
    ) -> Result<Vec<Application>> {
        let entities = self
            .query_entities(IndexQuery {
                index,
                pk,
                sk_prefix: keys::APPLICATION_PREFIX,
                entity_type: EntityType::Application,
                projection: None,
            })
            .await?;

        Ok(entities
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::Application(application) => Some(application),
                _ => None,
            })
            .collect())
    }
}

// ============================================================================
// ServiceRepository implementation
// ============================================================================

#[async_trait]
impl ServiceRepository for DynamoDbRepository {
    async fn create_service_with_form(&self, service: &Service, form: &Form) -> Result<()> {
        let service_put = self.conditional_put(service_to_item(service))?;
        let form_put = self.conditional_put(form_to_item(form))?;

        self.client
            .transact_write_items()
            .transact_items(service_put)
            .transact_items(form_put)
            .send()
            .await
            .map_err(|e| {
                let err = map_transact_write_error(e);
                tracing::error!(
                    service_id = %service.id,
                    form_id = %form.id,
                    error = %err,
                    "Service and form transaction failed"
                );
                err
            })?;

        tracing::info!(
            service_id = %service.id,
            form_id = %form.id,
            company_id = %service.company_id,
            fields = form.fields.len(),
            "Created service with form"
        );
        Ok(())
    }

    async fn get_service(&self, service_id: &str) -> Result<Option<Service>> {
        let result = self
            .service_read(service_id)
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(item_to_service(&item)?)),
            None => Ok(None),
        }
    }

    async fn get_form_for_service(&self, service_id: &str) -> Result<Option<Form>> {
        let entities = self
            .query_entities(IndexQuery {
                index: SecondaryIndex::Gsi1,
                pk: keys::service_forms_pk(service_id),
                sk_prefix: keys::FORM_PREFIX,
                entity_type: EntityType::Form,
                projection: None,
            })
            .await?;

        Ok(entities.into_iter().find_map(|entity| match entity {
            Entity::Form(form) => Some(form),
            _ => None,
        }))
    }

    async fn list_services_by_company(&self, company_id: &str) -> Result<ServiceListing> {
        let items = self
            .query_index(IndexQuery {
                index: SecondaryIndex::Gsi1,
                pk: keys::company_services_pk(company_id),
                sk_prefix: keys::SERVICE_PREFIX,
                entity_type: EntityType::Service,
                projection: Some(SERVICE_SUMMARY_PROJECTION),
            })
            .await?;

        let services = items
            .iter()
            .map(item_to_service_summary)
            .collect::<Result<Vec<_>>>()?;

        Ok(ServiceListing::new(services))
    }
}

// ============================================================================
// ApplicationRepository implementation
// ============================================================================

#[async_trait]
impl ApplicationRepository for DynamoDbRepository {
    async fn create_application(&self, application: &Application) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(application_to_item(application)))
            .condition_expression(NEW_ITEM_CONDITION)
            .send()
            .await
            .map_err(|e| {
                let err = map_put_item_error(e, "Application", &application.id);
                tracing::error!(
                    application_id = %application.id,
                    error = %err,
                    "Application write failed"
                );
                err
            })?;

        tracing::info!(
            application_id = %application.id,
            service_id = %application.service_id,
            form_id = %application.form_id,
            "Created application"
        );
        Ok(())
    }

    async fn list_applications_by_user(&self, user_id: &str) -> Result<Vec<Application>> {
        self.query_applications(SecondaryIndex::Gsi1, keys::user_applications_pk(user_id))
            .await
    }

    async fn list_applications_by_company(&self, company_id: &str) -> Result<Vec<Application>> {
        self.query_applications(SecondaryIndex::Gsi2, keys::company_applications_pk(company_id))
            .await
    }

    async fn list_applications_by_service(&self, service_id: &str) -> Result<Vec<Application>> {
        self.query_applications(SecondaryIndex::Gsi3, keys::service_applications_pk(service_id))
            .await
    }
}
