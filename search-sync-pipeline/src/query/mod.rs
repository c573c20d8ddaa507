//! Query facade.
//!
//! Thin wrappers over the document query endpoints that fix the request
//! options used by the front ends and project the responses into plain
//! lists.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::QueryError;
use search_sync_repository::SearchServiceClient;
use search_sync_shared::query::{facet_expression, group_filter};
use search_sync_shared::{
    AutocompleteMode, AutocompleteRequest, FacetCount, SearchMode, SearchRequest, SearchResults,
    SuggestRequest,
};

/// Most suggestions or completions returned for one term.
pub const MAX_SUGGESTIONS: u32 = 5;

/// Most distinct values requested for a facet.
pub const MAX_FACET_VALUES: u32 = 500;

/// Longest term accepted by suggest and autocomplete.
pub const MAX_TERM_LENGTH: usize = 100;

pub const HIGHLIGHT_PRE_TAG: &str = "<b>";
pub const HIGHLIGHT_POST_TAG: &str = "</b>";

pub const DEFAULT_SUGGESTER: &str = "sg";

/// Collection field holding the groups allowed to see a document.
pub const DEFAULT_GROUP_FIELD: &str = "groupIds";

/// Optional knobs for full-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub top: Option<u32>,
    pub filter: Option<String>,
}

/// Query entry point bound to a single index.
pub struct QueryFacade {
    service: Arc<dyn SearchServiceClient>,
    index: String,
    suggester: String,
    group_field: String,
}

fn validate_term(term: &str) -> Result<&str, QueryError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(QueryError::invalid_query("Search term is empty"));
    }
    if term.chars().count() > MAX_TERM_LENGTH {
        return Err(QueryError::invalid_query(format!(
            "Search term is longer than {} characters",
            MAX_TERM_LENGTH
        )));
    }
    Ok(term)
}

impl QueryFacade {
    pub fn new(service: Arc<dyn SearchServiceClient>, index: impl Into<String>) -> Self {
        Self {
            service,
            index: index.into(),
            suggester: DEFAULT_SUGGESTER.to_string(),
            group_field: DEFAULT_GROUP_FIELD.to_string(),
        }
    }

    pub fn with_suggester(mut self, suggester: impl Into<String>) -> Self {
        self.suggester = suggester.into();
        self
    }

    pub fn with_group_field(mut self, group_field: impl Into<String>) -> Self {
        self.group_field = group_field.into();
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Suggestion texts for a partial term, at most [`MAX_SUGGESTIONS`].
    ///
    /// With `highlight` the matched part of each text is wrapped in
    /// `<b>`/`</b>`.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn suggest(
        &self,
        term: &str,
        fuzzy: bool,
        highlight: bool,
    ) -> Result<Vec<String>, QueryError> {
        let term = validate_term(term)?;
        let (pre, post) = if highlight {
            (
                Some(HIGHLIGHT_PRE_TAG.to_string()),
                Some(HIGHLIGHT_POST_TAG.to_string()),
            )
        } else {
            (None, None)
        };

        let request = SuggestRequest {
            search: term.to_string(),
            suggester_name: self.suggester.clone(),
            fuzzy,
            top: MAX_SUGGESTIONS,
            highlight_pre_tag: pre,
            highlight_post_tag: post,
            filter: None,
        };

        let suggestions = self.service.suggest(&self.index, &request).await?;
        debug!(returned = suggestions.len(), "Suggest response");

        Ok(suggestions
            .into_iter()
            .take(MAX_SUGGESTIONS as usize)
            .map(|s| s.text)
            .collect())
    }

    /// Completions for a partial term, exact matches only.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn autocomplete(&self, term: &str) -> Result<Vec<String>, QueryError> {
        let term = validate_term(term)?;
        let request = AutocompleteRequest {
            search: term.to_string(),
            suggester_name: self.suggester.clone(),
            autocomplete_mode: AutocompleteMode::OneTermWithContext,
            fuzzy: false,
            top: MAX_SUGGESTIONS,
            filter: None,
        };

        let completions = self.service.autocomplete(&self.index, &request).await?;
        debug!(returned = completions.len(), "Autocomplete response");

        Ok(completions
            .into_iter()
            .take(MAX_SUGGESTIONS as usize)
            .map(|c| c.text)
            .collect())
    }

    /// Distinct values of `field` with their document counts, as returned
    /// by the service.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn facet_counts(&self, field: &str) -> Result<Vec<FacetCount>, QueryError> {
        if field.trim().is_empty() {
            return Err(QueryError::invalid_query("Facet field is empty"));
        }

        let request = SearchRequest::match_all()
            .with_top(0)
            .with_facet(facet_expression(field, MAX_FACET_VALUES));

        let mut results = self.service.search(&self.index, &request).await?;
        let mut counts = results
            .facets
            .remove(field)
            .ok_or_else(|| QueryError::MissingFacet(field.to_string()))?;
        counts.truncate(MAX_FACET_VALUES as usize);
        Ok(counts)
    }

    /// Full-text search where every term must match.
    ///
    /// An empty `text` matches every document.
    #[instrument(skip(self, options), fields(index = %self.index))]
    pub async fn search(
        &self,
        text: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults, QueryError> {
        let text = text.trim();
        let base = if text.is_empty() {
            SearchRequest::match_all()
        } else {
            SearchRequest::new(text)
        };
        let mut request = base.with_mode(SearchMode::All);
        request.top = options.top;
        request.filter = options.filter.clone();

        self.execute(request).await
    }

    /// Search restricted to documents visible to any of `groups`.
    #[instrument(skip(self, groups, options), fields(index = %self.index, groups = groups.len()))]
    pub async fn search_for_groups<S: AsRef<str>>(
        &self,
        text: &str,
        groups: &[S],
        options: &SearchOptions,
    ) -> Result<SearchResults, QueryError> {
        if groups.is_empty() {
            return Err(QueryError::invalid_query(
                "At least one group is required for a trimmed search",
            ));
        }

        let trimming = group_filter(&self.group_field, groups);
        let filter = match &options.filter {
            Some(existing) => format!("({}) and {}", existing, trimming),
            None => trimming,
        };

        let options = SearchOptions {
            top: options.top,
            filter: Some(filter),
        };
        self.search(text, &options).await
    }

    async fn execute(&self, request: SearchRequest) -> Result<SearchResults, QueryError> {
        let top = request.top;
        let mut results = self.service.search(&self.index, &request).await?;
        if let Some(top) = top {
            results.value.truncate(top as usize);
        }
        debug!(returned = results.value.len(), count = ?results.count, "Search response");
        Ok(results)
    }
}
