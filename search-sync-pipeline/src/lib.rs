//! # Search Sync Pipeline
//!
//! This crate drives the remote search service through a full sync:
//! provisioning an index with its data sources and indexers, running the
//! indexers to completion, and querying the result.
//!
//! ## Architecture
//!
//! 1. **Runner**: Starts an indexer run and polls it until it finishes
//! 2. **Workflow**: Provisions resources and runs every indexer of a plan
//! 3. **Query**: Suggest, autocomplete, facet and search requests

pub mod errors;
pub mod query;
pub mod runner;
pub mod workflow;

pub use errors::{QueryError, SyncError};
pub use query::{QueryFacade, SearchOptions};
pub use runner::{IndexerRunner, RunOutcome, RunnerConfig};
pub use workflow::{SourceOutcome, SourcePlan, SourceReport, SyncPlan, SyncReport, SyncWorkflow};
