//! REST client implementation.
//!
//! This module provides the concrete implementation of `SearchServiceClient`
//! over the service's HTTPS/JSON API.

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::json;
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::errors::SearchServiceError;
use crate::interfaces::SearchServiceClient;
use crate::rest::response::{error_for_status, json_body};
use search_sync_shared::{
    AutocompleteRequest, Completion, DataSourceConnection, DocumentAction, IndexSchema, Indexer,
    IndexerStatus, IndexingResult, SearchRequest, SearchResults, SuggestRequest, Suggestion,
    ValueList,
};

/// REST client for the search service.
///
/// # Example
///
/// ```ignore
/// let config = ServiceConfig::new("https://demo.search.windows.net", api_key)?;
/// let client = RestSearchClient::new(config)?;
///
/// client.run_indexer("usgs-indexer").await?;
/// let status = client.indexer_status("usgs-indexer").await?;
/// ```
pub struct RestSearchClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl RestSearchClient {
    /// Create a new client for the configured endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(RestSearchClient)` - A new client instance
    /// * `Err(SearchServiceError)` - If the HTTP client cannot be built
    pub fn new(config: ServiceConfig) -> Result<Self, SearchServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchServiceError::connection(e.to_string()))?;

        info!(
            endpoint = %config.endpoint,
            api_version = %config.api_version,
            "Created search service client"
        );

        Ok(Self { http, config })
    }

    /// Build the URL for a resource path, with the api-version query parameter.
    fn url(&self, segments: &[&str]) -> Result<Url, SearchServiceError> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| SearchServiceError::connection("Endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, SearchServiceError> {
        let url = self.url(segments)?;
        Ok(self
            .http
            .request(method, url)
            .header("api-key", &self.config.api_key)
            .header("client-request-id", Uuid::new_v4().to_string()))
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(
        &self,
        builder: RequestBuilder,
        segments: &[&str],
    ) -> Result<Response, SearchServiceError> {
        let resource = segments.join("/");
        let response = builder
            .send()
            .await
            .map_err(|e| SearchServiceError::connection(e.to_string()))?;

        debug!(resource = %resource, status = %response.status(), "Search service responded");
        error_for_status(response, &resource).await
    }

    /// POST with no body, as used by the indexer action endpoints.
    async fn post_action(&self, segments: &[&str]) -> Result<(), SearchServiceError> {
        let builder = self
            .request(Method::POST, segments)?
            .header(CONTENT_LENGTH, 0);
        self.send(builder, segments).await?;
        Ok(())
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), SearchServiceError> {
        let builder = self.request(Method::DELETE, segments)?;
        self.send(builder, segments).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchServiceClient for RestSearchClient {
    #[instrument(skip(self, schema), fields(index = %schema.name))]
    async fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchServiceError> {
        let segments = ["indexes"];
        let builder = self.request(Method::POST, &segments)?.json(schema);
        self.send(builder, &segments).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), SearchServiceError> {
        self.delete(&["indexes", name]).await
    }

    #[instrument(skip(self, data_source), fields(data_source = %data_source.name))]
    async fn create_or_update_data_source(
        &self,
        data_source: &DataSourceConnection,
    ) -> Result<(), SearchServiceError> {
        let segments = ["datasources", data_source.name.as_str()];
        let builder = self.request(Method::PUT, &segments)?.json(data_source);
        self.send(builder, &segments).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_data_source(&self, name: &str) -> Result<(), SearchServiceError> {
        self.delete(&["datasources", name]).await
    }

    #[instrument(skip(self, indexer), fields(indexer = %indexer.name))]
    async fn create_or_update_indexer(&self, indexer: &Indexer) -> Result<(), SearchServiceError> {
        let segments = ["indexers", indexer.name.as_str()];
        let builder = self.request(Method::PUT, &segments)?.json(indexer);
        self.send(builder, &segments).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        self.delete(&["indexers", name]).await
    }

    #[instrument(skip(self))]
    async fn reset_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        self.post_action(&["indexers", name, "reset"]).await
    }

    #[instrument(skip(self))]
    async fn run_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        self.post_action(&["indexers", name, "run"]).await
    }

    #[instrument(skip(self))]
    async fn indexer_status(&self, name: &str) -> Result<IndexerStatus, SearchServiceError> {
        let segments = ["indexers", name, "status"];
        let builder = self.request(Method::GET, &segments)?;
        let response = self.send(builder, &segments).await?;
        json_body(response).await
    }

    #[instrument(skip(self, request), fields(search = %request.search))]
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResults, SearchServiceError> {
        let segments = ["indexes", index, "docs", "search"];
        let builder = self.request(Method::POST, &segments)?.json(request);
        let response = self.send(builder, &segments).await?;
        json_body(response).await
    }

    #[instrument(skip(self, request), fields(search = %request.search))]
    async fn suggest(
        &self,
        index: &str,
        request: &SuggestRequest,
    ) -> Result<Vec<Suggestion>, SearchServiceError> {
        let segments = ["indexes", index, "docs", "suggest"];
        let builder = self.request(Method::POST, &segments)?.json(request);
        let response = self.send(builder, &segments).await?;
        let list: ValueList<Suggestion> = json_body(response).await?;
        Ok(list.value)
    }

    #[instrument(skip(self, request), fields(search = %request.search))]
    async fn autocomplete(
        &self,
        index: &str,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Completion>, SearchServiceError> {
        let segments = ["indexes", index, "docs", "autocomplete"];
        let builder = self.request(Method::POST, &segments)?.json(request);
        let response = self.send(builder, &segments).await?;
        let list: ValueList<Completion> = json_body(response).await?;
        Ok(list.value)
    }

    #[instrument(skip(self, actions), fields(action_count = actions.len()))]
    async fn index_documents(
        &self,
        index: &str,
        actions: &[DocumentAction],
    ) -> Result<Vec<IndexingResult>, SearchServiceError> {
        let segments = ["indexes", index, "docs", "index"];
        let builder = self
            .request(Method::POST, &segments)?
            .json(&json!({ "value": actions }));
        let response = self.send(builder, &segments).await?;
        let list: ValueList<IndexingResult> = json_body(response).await?;
        Ok(list.value)
    }

    async fn health_check(&self) -> Result<bool, SearchServiceError> {
        let segments = ["servicestats"];
        let builder = self.request(Method::GET, &segments)?;
        match self.send(builder, &segments).await {
            Ok(_) => Ok(true),
            Err(SearchServiceError::RequestError { status, .. }) if status == 401 || status == 403 => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
