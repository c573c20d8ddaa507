//! Search service client trait definition.
//!
//! This module defines the abstract interface for the remote search service,
//! allowing the provisioning, run-control, and query layers to be exercised
//! against a REST backend or an in-memory fake.

use async_trait::async_trait;

use crate::errors::SearchServiceError;
use search_sync_shared::{
    AutocompleteRequest, Completion, DataSourceConnection, DocumentAction, IndexSchema, Indexer,
    IndexerStatus, IndexingResult, SearchRequest, SearchResults, SuggestRequest, Suggestion,
};

/// Abstract interface for search service operations.
///
/// Implementations are constructed explicitly and passed to the components
/// that need them; nothing in the workspace holds a process-wide client.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// A missing resource is always reported as [`SearchServiceError::NotFound`]
/// and throttling as [`SearchServiceError::RateLimited`], so callers can
/// branch on those without inspecting status codes.
#[async_trait]
pub trait SearchServiceClient: Send + Sync {
    /// Create an index from the given schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchServiceError::Conflict)` - If an index with that name exists
    async fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchServiceError>;

    /// Delete an index and all of its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was deleted
    /// * `Err(SearchServiceError::NotFound)` - If there was no such index
    async fn delete_index(&self, name: &str) -> Result<(), SearchServiceError>;

    /// Create a data source connection, or replace the one with the same name.
    async fn create_or_update_data_source(
        &self,
        data_source: &DataSourceConnection,
    ) -> Result<(), SearchServiceError>;

    /// Delete a data source connection.
    async fn delete_data_source(&self, name: &str) -> Result<(), SearchServiceError>;

    /// Create an indexer, or replace the one with the same name.
    async fn create_or_update_indexer(&self, indexer: &Indexer) -> Result<(), SearchServiceError>;

    /// Delete an indexer.
    async fn delete_indexer(&self, name: &str) -> Result<(), SearchServiceError>;

    /// Clear the indexer's change-tracking state so the next run starts over.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the indexer was reset
    /// * `Err(SearchServiceError::NotFound)` - If there was no such indexer
    async fn reset_indexer(&self, name: &str) -> Result<(), SearchServiceError>;

    /// Ask the service to start an indexer run now.
    ///
    /// The call returns as soon as the run is accepted; use
    /// [`indexer_status`](Self::indexer_status) to follow it.
    async fn run_indexer(&self, name: &str) -> Result<(), SearchServiceError>;

    /// Fetch the current status and last execution result of an indexer.
    async fn indexer_status(&self, name: &str) -> Result<IndexerStatus, SearchServiceError>;

    /// Execute a full-text search against an index.
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResults, SearchServiceError>;

    /// Fetch suggestions for a partial term.
    async fn suggest(
        &self,
        index: &str,
        request: &SuggestRequest,
    ) -> Result<Vec<Suggestion>, SearchServiceError>;

    /// Fetch term completions for a partial term.
    async fn autocomplete(
        &self,
        index: &str,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Completion>, SearchServiceError>;

    /// Apply a batch of document actions.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<IndexingResult>)` - One result per action; individual
    ///   documents may still have failed
    /// * `Err(SearchServiceError)` - If the batch as a whole was rejected
    async fn index_documents(
        &self,
        index: &str,
        actions: &[DocumentAction],
    ) -> Result<Vec<IndexingResult>, SearchServiceError>;

    /// Check if the service is reachable and the credentials are accepted.
    async fn health_check(&self) -> Result<bool, SearchServiceError>;
}
