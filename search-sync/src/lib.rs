//! # Search Sync
//!
//! Command-line front end for the search sync toolkit.
//!
//! This crate provides the configuration loading, dependency wiring and
//! sample resource definitions behind the `search-sync` binary.

pub mod config;
pub mod samples;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur while configuring or running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required setting is unset, empty, or still holds its placeholder.
    #[error("Configuration missing: set {0} (in the environment or .env)")]
    ConfigurationMissing(String),

    /// A setting is present but unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Search service error: {0}")]
    Service(#[from] search_sync_repository::SearchServiceError),

    #[error("Provisioning error: {0}")]
    Provisioning(#[from] search_sync_repository::ProvisioningError),

    #[error("Document error: {0}")]
    Document(#[from] search_sync_repository::DocumentError),

    #[error("Sync error: {0}")]
    Sync(#[from] search_sync_pipeline::SyncError),

    #[error("Query error: {0}")]
    Query(#[from] search_sync_pipeline::QueryError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn missing(setting: &str) -> Self {
        Self::ConfigurationMissing(setting.to_string())
    }

    /// Whether the error was raised before any remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationMissing(_) | Self::ConfigError(_))
    }
}
