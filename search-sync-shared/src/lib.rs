//! # Search Sync Shared
//!
//! Resource definitions shared by every crate in the workspace: index
//! schemas, data source connections, indexers and their status, document
//! actions, and query request/response shapes.

pub mod data_source;
pub mod document;
pub mod indexer;
pub mod query;
pub mod schema;

pub use data_source::{ChangeDetectionPolicy, DataSourceConnection, DataSourceKind};
pub use document::{DocumentAction, DocumentActionKind, IndexingResult};
pub use indexer::{
    Indexer, IndexerExecutionResult, IndexerExecutionStatus, IndexerRunStatus, IndexerStatus,
    IndexingSchedule,
};
pub use query::{
    AutocompleteMode, AutocompleteRequest, Completion, FacetCount, SearchMode, SearchRequest,
    SearchResults, SuggestRequest, Suggestion, ValueList,
};
pub use schema::{FieldDefinition, FieldType, IndexSchema, Suggester};
