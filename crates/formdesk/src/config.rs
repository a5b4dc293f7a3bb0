use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding every entity (default: "service")
    pub table_name: String,
    /// Override for the DynamoDB endpoint, e.g. DynamoDB Local
    pub aws_endpoint_url: Option<String>,
    /// AWS region; the SDK default chain applies when unset
    pub aws_region: Option<String>,
    /// Per-operation timeout for DynamoDB calls in seconds (default: 5)
    pub dynamodb_operation_timeout_seconds: u64,
    /// Whole-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
    /// Shared secret used to verify bearer tokens
    pub jwt_secret_key: String,
    /// Token signing algorithm name (default: "HS256")
    pub jwt_algorithm: String,
    /// Allowed CORS origins; `*` allows any (default: "*")
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "service")
    /// - `AWS_ENDPOINT_URL` - DynamoDB endpoint override (optional)
    /// - `AWS_REGION` - AWS region (optional)
    /// - `DYNAMODB_OPERATION_TIMEOUT_SECONDS` - DynamoDB operation timeout (default: 5)
    /// - `REQUEST_TIMEOUT_SECONDS` - HTTP request timeout (default: 10)
    /// - `JWT_SECRET_KEY` - Token verification secret (default: empty)
    /// - `JWT_ALGORITHM` - Token algorithm (default: "HS256")
    /// - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: "*")
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DYNAMODB_TABLE_NAME").unwrap_or_else(|_| "service".to_string()),
            aws_endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),
            aws_region: non_empty_var("AWS_REGION"),
            dynamodb_operation_timeout_seconds: env::var("DYNAMODB_OPERATION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            jwt_secret_key: env::var("JWT_SECRET_KEY").unwrap_or_default(),
            jwt_algorithm: env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
        }
    }

    /// Get the DynamoDB operation timeout as a Duration.
    pub fn dynamodb_operation_timeout(&self) -> Duration {
        Duration::from_secs(self.dynamodb_operation_timeout_seconds)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            table_name: "service".to_string(),
            aws_endpoint_url: None,
            aws_region: None,
            dynamodb_operation_timeout_seconds: 3,
            request_timeout_seconds: 20,
            jwt_secret_key: "secret".to_string(),
            jwt_algorithm: "HS256".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }

    #[test]
    fn test_timeout_conversion() {
        let config = config();

        assert_eq!(config.dynamodb_operation_timeout(), Duration::from_secs(3));
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("DYNAMODB_TABLE_NAME");
        env::remove_var("DYNAMODB_OPERATION_TIMEOUT_SECONDS");
        env::remove_var("REQUEST_TIMEOUT_SECONDS");
        env::remove_var("JWT_ALGORITHM");
        env::remove_var("CORS_ALLOWED_ORIGINS");

        let config = Config::from_env();

        assert_eq!(config.table_name, "service");
        assert_eq!(config.dynamodb_operation_timeout_seconds, 5);
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.jwt_algorithm, "HS256");
        assert_eq!(config.cors_allowed_origins, vec!["*"]);
    }
}
