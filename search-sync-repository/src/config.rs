//! Configuration types for the service and document clients.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::errors::SearchServiceError;

/// REST API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "2020-06-30";

/// Per-request timeout applied by the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the search service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Service endpoint, e.g. `https://my-service.search.windows.net`.
    pub endpoint: Url,
    /// Admin or query API key sent in the `api-key` header.
    pub api_key: String,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Create a config for the given endpoint and key with default settings.
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, SearchServiceError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SearchServiceError::connection(format!("Invalid endpoint: {}", e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(SearchServiceError::connection(format!(
                "Invalid endpoint: {} cannot carry a path",
                endpoint
            )));
        }

        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// The key never shows up in logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Configuration for the DocumentIndexClient.
#[derive(Debug, Clone)]
pub struct DocumentBatchConfig {
    /// Maximum number of actions allowed in a single batch.
    /// The service itself rejects batches above 1000 actions.
    pub max_batch_size: Option<usize>,
}

impl Default for DocumentBatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl DocumentBatchConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::new("https://demo.search.windows.net", "secret").unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_service_config_rejects_bad_endpoint() {
        assert!(ServiceConfig::new("not a url", "secret").is_err());
        assert!(ServiceConfig::new("mailto:someone@example.com", "secret").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ServiceConfig::new("https://demo.search.windows.net", "super-secret").unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
