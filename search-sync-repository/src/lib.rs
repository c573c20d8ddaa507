//! # Search Sync Repository
//!
//! This crate provides the boundary to the remote search service: the
//! `SearchServiceClient` trait, its REST implementation, and the clients
//! built on top of it for provisioning resources and uploading documents.

pub mod config;
pub mod documents;
pub mod errors;
pub mod interfaces;
pub mod provisioning;
pub mod rest;
pub mod types;
pub mod validate;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{DocumentBatchConfig, ServiceConfig};
pub use documents::DocumentIndexClient;
pub use errors::{DocumentError, ProvisioningError, SearchServiceError};
pub use interfaces::SearchServiceClient;
pub use provisioning::{ProvisioningClient, TeardownPlan};
pub use rest::RestSearchClient;
pub use types::{BatchOperationResult, BatchOperationSummary};
