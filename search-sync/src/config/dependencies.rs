//! Dependency initialization and wiring for the command-line front end.

use std::sync::Arc;

use tracing::info;

use crate::{AppError, Settings};
use search_sync_pipeline::{IndexerRunner, QueryFacade, RunnerConfig, SyncWorkflow};
use search_sync_repository::{
    DocumentIndexClient, ProvisioningClient, RestSearchClient, SearchServiceClient, ServiceConfig,
};

/// Container for the service client and the components built on it.
pub struct Dependencies {
    service: Arc<dyn SearchServiceClient>,
    settings: Settings,
}

impl Dependencies {
    /// Connect to the configured search service.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - The service is reachable and accepts the key
    /// * `Err(AppError)` - If the endpoint is invalid, unreachable, or the
    ///   key is rejected
    pub async fn new(settings: Settings) -> Result<Self, AppError> {
        let mut config = ServiceConfig::new(&settings.endpoint, settings.api_key.clone())
            .map_err(|e| AppError::config(format!("Invalid search service endpoint: {}", e)))?;
        if let Some(version) = &settings.api_version {
            config = config.with_api_version(version.clone());
        }

        info!(
            endpoint = %config.endpoint,
            api_version = %config.api_version,
            "Initializing dependencies"
        );

        let client = RestSearchClient::new(config)?;

        let healthy = client.health_check().await?;
        if !healthy {
            return Err(AppError::config(
                "Search service rejected the API key; check SEARCH_SERVICE_API_KEY",
            ));
        }

        info!("Search service connection verified");

        Ok(Self::with_service(Arc::new(client), settings))
    }

    /// Wire the components around an existing service client.
    pub fn with_service(service: Arc<dyn SearchServiceClient>, settings: Settings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn provisioning(&self) -> ProvisioningClient {
        ProvisioningClient::new(self.service.clone())
    }

    pub fn runner(&self) -> IndexerRunner {
        let config = RunnerConfig::default()
            .with_poll_interval(self.settings.poll_interval)
            .with_timeout(self.settings.timeout);
        IndexerRunner::with_config(self.service.clone(), config)
    }

    pub fn workflow(&self) -> SyncWorkflow {
        SyncWorkflow::new(self.provisioning(), self.runner())
    }

    pub fn documents(&self) -> DocumentIndexClient {
        DocumentIndexClient::new(self.service.clone())
    }

    pub fn query(&self, index: &str) -> QueryFacade {
        QueryFacade::new(self.service.clone(), index).with_suggester(self.settings.suggester_name.clone())
    }
}
