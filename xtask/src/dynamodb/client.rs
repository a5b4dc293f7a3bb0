//! AWS SDK client setup and table inspection.

use aws_sdk_dynamodb::error::ProvideErrorMetadata;
use aws_sdk_dynamodb::types::{IndexStatus, TableStatus};
use aws_sdk_dynamodb::Client;

use super::error::{DynamodbError, Result};
use super::planning::{GsiState, ResourceStatus, TableState};

/// Where the commands connect to.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// Custom endpoint URL, e.g. DynamoDB Local.
    pub endpoint_url: Option<String>,
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "ap-northeast-2".to_string()),
        }
    }
}

impl AwsConfig {
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

pub async fn create_client(config: &AwsConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    Client::new(&loader.load().await)
}

/// Current table state, or `None` when the table does not exist.
pub async fn get_table_state(client: &Client, table_name: &str) -> Result<Option<TableState>> {
    let response = match client.describe_table().table_name(table_name).send().await {
        Ok(response) => response,
        Err(err) => {
            let service_error = err.into_service_error();
            if service_error.is_resource_not_found_exception() {
                return Ok(None);
            }
            return Err(DynamodbError::AwsSdk(
                service_error
                    .message()
                    .map(String::from)
                    .unwrap_or_else(|| service_error.to_string()),
            ));
        }
    };

    let Some(table) = response.table() else {
        return Ok(None);
    };

    let gsis = table
        .global_secondary_indexes()
        .iter()
        .map(|gsi| GsiState {
            name: gsi.index_name().unwrap_or_default().to_string(),
            status: index_status(gsi.index_status()),
        })
        .collect();

    Ok(Some(TableState {
        status: table_status(table.table_status()),
        gsis,
    }))
}

fn table_status(status: Option<&TableStatus>) -> ResourceStatus {
    match status {
        Some(TableStatus::Creating) => ResourceStatus::Creating,
        Some(TableStatus::Updating) => ResourceStatus::Updating,
        Some(TableStatus::Deleting) => ResourceStatus::Deleting,
        _ => ResourceStatus::Active,
    }
}

fn index_status(status: Option<&IndexStatus>) -> ResourceStatus {
    match status {
        Some(IndexStatus::Creating) => ResourceStatus::Creating,
        Some(IndexStatus::Updating) => ResourceStatus::Updating,
        Some(IndexStatus::Deleting) => ResourceStatus::Deleting,
        _ => ResourceStatus::Active,
    }
}
