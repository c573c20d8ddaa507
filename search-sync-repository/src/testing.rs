//! In-memory search service for tests.
//!
//! Keeps created resources in maps, records every call, and lets a test
//! script indexer status sequences and inject failures per operation.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::SearchServiceError;
use crate::interfaces::SearchServiceClient;
use search_sync_shared::{
    AutocompleteRequest, Completion, DataSourceConnection, DocumentAction, IndexSchema, Indexer,
    IndexerExecutionResult, IndexerExecutionStatus, IndexerStatus, IndexingResult, SearchRequest,
    SearchResults, SuggestRequest, Suggestion,
};

/// Status with no last result, i.e. a run that has not reported yet.
pub fn status_in_progress() -> IndexerStatus {
    status_never_run()
}

/// Status of an indexer that has no execution history.
pub fn status_never_run() -> IndexerStatus {
    IndexerStatus {
        status: "running".to_string(),
        last_result: None,
        execution_history: vec![],
    }
}

pub fn status_success(items_processed: u64) -> IndexerStatus {
    status_with(IndexerExecutionStatus::Success, None, items_processed)
}

pub fn status_reset() -> IndexerStatus {
    status_with(IndexerExecutionStatus::Reset, None, 0)
}

pub fn status_failed(error_message: &str) -> IndexerStatus {
    status_with(
        IndexerExecutionStatus::TransientFailure,
        Some(error_message.to_string()),
        0,
    )
}

fn status_with(
    status: IndexerExecutionStatus,
    error_message: Option<String>,
    items_processed: u64,
) -> IndexerStatus {
    IndexerStatus {
        status: "running".to_string(),
        last_result: Some(IndexerExecutionResult {
            status,
            error_message,
            start_time: None,
            end_time: None,
            items_processed,
            items_failed: 0,
        }),
        execution_history: vec![],
    }
}

#[derive(Default)]
struct State {
    indexes: BTreeMap<String, IndexSchema>,
    data_sources: BTreeMap<String, DataSourceConnection>,
    indexers: BTreeMap<String, Indexer>,
    calls: Vec<String>,
    status_script: HashMap<String, VecDeque<Result<IndexerStatus, SearchServiceError>>>,
    previous_status: HashMap<String, IndexerStatus>,
    requested_runs: HashSet<String>,
    run_script: HashMap<String, VecDeque<Result<(), SearchServiceError>>>,
    failures: HashMap<String, SearchServiceError>,
    suggestions: Vec<Suggestion>,
    completions: Vec<Completion>,
    search_results: SearchResults,
    last_suggest: Option<SuggestRequest>,
    last_autocomplete: Option<AutocompleteRequest>,
    last_search: Option<SearchRequest>,
    documents: Vec<DocumentAction>,
}

impl State {
    /// Record the call and return an injected failure for it, if any.
    ///
    /// Failures are looked up first as `op:name`, then as `op`.
    fn enter(&mut self, op: &str, name: &str) -> Result<(), SearchServiceError> {
        let call = format!("{}:{}", op, name);
        let failure = self
            .failures
            .get(&call)
            .or_else(|| self.failures.get(op))
            .cloned();
        self.calls.push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// A [`SearchServiceClient`] that never leaves the process.
#[derive(Default)]
pub struct InMemorySearchService {
    state: Mutex<State>,
}

impl InMemorySearchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call matching `key` fail with `err`.
    ///
    /// `key` is either an operation (`"run_indexer"`) or an operation and a
    /// resource name (`"run_indexer:usgs-indexer"`).
    pub async fn fail(&self, key: &str, err: SearchServiceError) {
        self.state.lock().await.failures.insert(key.to_string(), err);
    }

    /// Queue the responses of successive status polls for an indexer.
    ///
    /// The script starts with the first status read after a run request; the
    /// last entry keeps being returned once the queue is drained.
    pub async fn script_status<I>(&self, indexer: &str, statuses: I)
    where
        I: IntoIterator<Item = Result<IndexerStatus, SearchServiceError>>,
    {
        self.state
            .lock()
            .await
            .status_script
            .insert(indexer.to_string(), statuses.into_iter().collect());
    }

    /// Status reported before any run is requested, e.g. the result of an
    /// earlier execution. Defaults to no history.
    pub async fn seed_previous_status(&self, indexer: &str, status: IndexerStatus) {
        self.state
            .lock()
            .await
            .previous_status
            .insert(indexer.to_string(), status);
    }

    /// Queue the responses of successive run requests for an indexer.
    ///
    /// Once drained, run requests fall back to the default behaviour.
    pub async fn script_runs<I>(&self, indexer: &str, runs: I)
    where
        I: IntoIterator<Item = Result<(), SearchServiceError>>,
    {
        self.state
            .lock()
            .await
            .run_script
            .insert(indexer.to_string(), runs.into_iter().collect());
    }

    pub async fn set_suggestions(&self, suggestions: Vec<Suggestion>) {
        self.state.lock().await.suggestions = suggestions;
    }

    pub async fn set_completions(&self, completions: Vec<Completion>) {
        self.state.lock().await.completions = completions;
    }

    pub async fn set_search_results(&self, results: SearchResults) {
        self.state.lock().await.search_results = results;
    }

    /// Pre-create an index without recording a call.
    pub async fn seed_index(&self, schema: IndexSchema) {
        self.state
            .lock()
            .await
            .indexes
            .insert(schema.name.clone(), schema);
    }

    pub async fn seed_data_source(&self, data_source: DataSourceConnection) {
        self.state
            .lock()
            .await
            .data_sources
            .insert(data_source.name.clone(), data_source);
    }

    pub async fn seed_indexer(&self, indexer: Indexer) {
        self.state
            .lock()
            .await
            .indexers
            .insert(indexer.name.clone(), indexer);
    }

    /// Every call so far, as `op:name`.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls to `op` on any resource.
    pub async fn call_count(&self, op: &str) -> usize {
        let prefix = format!("{}:", op);
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    pub async fn index(&self, name: &str) -> Option<IndexSchema> {
        self.state.lock().await.indexes.get(name).cloned()
    }

    pub async fn data_source(&self, name: &str) -> Option<DataSourceConnection> {
        self.state.lock().await.data_sources.get(name).cloned()
    }

    pub async fn indexer(&self, name: &str) -> Option<Indexer> {
        self.state.lock().await.indexers.get(name).cloned()
    }

    pub async fn last_suggest(&self) -> Option<SuggestRequest> {
        self.state.lock().await.last_suggest.clone()
    }

    pub async fn last_autocomplete(&self) -> Option<AutocompleteRequest> {
        self.state.lock().await.last_autocomplete.clone()
    }

    pub async fn last_search(&self) -> Option<SearchRequest> {
        self.state.lock().await.last_search.clone()
    }

    pub async fn documents(&self) -> Vec<DocumentAction> {
        self.state.lock().await.documents.clone()
    }
}

#[async_trait]
impl SearchServiceClient for InMemorySearchService {
    async fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("create_index", &schema.name)?;
        if state.indexes.contains_key(&schema.name) {
            return Err(SearchServiceError::conflict(
                format!("indexes/{}", schema.name),
                format!("Cannot create index '{}' because it already exists", schema.name),
            ));
        }
        state.indexes.insert(schema.name.clone(), schema.clone());
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("delete_index", name)?;
        state
            .indexes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SearchServiceError::not_found(format!("indexes/{}", name)))
    }

    async fn create_or_update_data_source(
        &self,
        data_source: &DataSourceConnection,
    ) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("create_or_update_data_source", &data_source.name)?;
        state
            .data_sources
            .insert(data_source.name.clone(), data_source.clone());
        Ok(())
    }

    async fn delete_data_source(&self, name: &str) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("delete_data_source", name)?;
        state
            .data_sources
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SearchServiceError::not_found(format!("datasources/{}", name)))
    }

    async fn create_or_update_indexer(&self, indexer: &Indexer) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("create_or_update_indexer", &indexer.name)?;
        if !state.data_sources.contains_key(&indexer.data_source_name) {
            return Err(SearchServiceError::request(
                400,
                format!("Data source '{}' does not exist", indexer.data_source_name),
            ));
        }
        if !state.indexes.contains_key(&indexer.target_index_name) {
            return Err(SearchServiceError::request(
                400,
                format!("Index '{}' does not exist", indexer.target_index_name),
            ));
        }
        state.indexers.insert(indexer.name.clone(), indexer.clone());
        Ok(())
    }

    async fn delete_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("delete_indexer", name)?;
        state
            .indexers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SearchServiceError::not_found(format!("indexers/{}", name)))
    }

    async fn reset_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("reset_indexer", name)?;
        if state.indexers.contains_key(name) {
            Ok(())
        } else {
            Err(SearchServiceError::not_found(format!("indexers/{}/reset", name)))
        }
    }

    async fn run_indexer(&self, name: &str) -> Result<(), SearchServiceError> {
        let mut state = self.state.lock().await;
        let entered = state.enter("run_indexer", name);
        state.requested_runs.insert(name.to_string());
        entered?;
        if let Some(scripted) = state.run_script.get_mut(name).and_then(VecDeque::pop_front) {
            return scripted;
        }
        if state.indexers.contains_key(name) {
            Ok(())
        } else {
            Err(SearchServiceError::not_found(format!("indexers/{}/run", name)))
        }
    }

    async fn indexer_status(&self, name: &str) -> Result<IndexerStatus, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("indexer_status", name)?;
        if !state.requested_runs.contains(name) {
            if let Some(previous) = state.previous_status.get(name) {
                return Ok(previous.clone());
            }
            if state.indexers.contains_key(name) {
                return Ok(status_never_run());
            }
        }
        if let Some(script) = state.status_script.get_mut(name) {
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            if let Some(next) = next {
                return next;
            }
        }
        if state.indexers.contains_key(name) {
            Ok(status_success(0))
        } else {
            Err(SearchServiceError::not_found(format!("indexers/{}/status", name)))
        }
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResults, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("search", index)?;
        state.last_search = Some(request.clone());
        Ok(state.search_results.clone())
    }

    async fn suggest(
        &self,
        index: &str,
        request: &SuggestRequest,
    ) -> Result<Vec<Suggestion>, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("suggest", index)?;
        state.last_suggest = Some(request.clone());
        Ok(state.suggestions.clone())
    }

    async fn autocomplete(
        &self,
        index: &str,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Completion>, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("autocomplete", index)?;
        state.last_autocomplete = Some(request.clone());
        Ok(state.completions.clone())
    }

    async fn index_documents(
        &self,
        index: &str,
        actions: &[DocumentAction],
    ) -> Result<Vec<IndexingResult>, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("index_documents", index)?;
        let key_field = state
            .indexes
            .get(index)
            .and_then(|schema| schema.key_fields().next().map(|f| f.name.clone()))
            .ok_or_else(|| SearchServiceError::not_found(format!("indexes/{}", index)))?;

        let results = actions
            .iter()
            .map(|action| match action.key(&key_field) {
                Some(key) => IndexingResult {
                    key: key.to_string(),
                    status: true,
                    error_message: None,
                    status_code: 200,
                },
                None => IndexingResult {
                    key: String::new(),
                    status: false,
                    error_message: Some(format!("Document has no '{}' key", key_field)),
                    status_code: 400,
                },
            })
            .collect();
        state.documents.extend(actions.iter().cloned());
        Ok(results)
    }

    async fn health_check(&self) -> Result<bool, SearchServiceError> {
        let mut state = self.state.lock().await;
        state.enter("health_check", "servicestats")?;
        Ok(true)
    }
}
