//! Sync workflow.
//!
//! Provisions an index with one or more data sources and indexers feeding
//! it, then runs each indexer to completion.
//!
//! ## Steps
//!
//! 1. Tear down the indexers, data sources and index named in the plan
//! 2. Recreate the index; a failure here aborts the workflow
//! 3. Provision each data source and its indexer; a failure skips that source
//! 4. Run each provisioned indexer and record the outcome

use std::collections::HashSet;

use tracing::{error, info, instrument, warn};

use crate::errors::SyncError;
use crate::runner::IndexerRunner;
use search_sync_repository::{ProvisioningClient, ProvisioningError, TeardownPlan};
use search_sync_shared::{DataSourceConnection, IndexSchema, Indexer};

/// A data source and the indexer that reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlan {
    pub data_source: DataSourceConnection,
    pub indexer: Indexer,
}

/// Everything needed to build and fill one index.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    pub schema: IndexSchema,
    pub sources: Vec<SourcePlan>,
    /// Delete existing resources before provisioning. On by default.
    pub teardown: bool,
}

impl SyncPlan {
    pub fn new(schema: IndexSchema) -> Self {
        Self {
            schema,
            sources: Vec::new(),
            teardown: true,
        }
    }

    pub fn with_source(mut self, data_source: DataSourceConnection, indexer: Indexer) -> Self {
        self.sources.push(SourcePlan {
            data_source,
            indexer,
        });
        self
    }

    pub fn without_teardown(mut self) -> Self {
        self.teardown = false;
        self
    }

    /// Check that every indexer reads from its own data source and writes
    /// to the plan's index.
    pub fn validate(&self) -> Result<(), ProvisioningError> {
        if self.sources.is_empty() {
            return Err(ProvisioningError::validation(format!(
                "Sync plan for index '{}' has no sources",
                self.schema.name
            )));
        }

        let mut indexers = HashSet::new();
        for source in &self.sources {
            let indexer = &source.indexer;
            if indexer.data_source_name != source.data_source.name {
                return Err(ProvisioningError::validation(format!(
                    "Indexer '{}' reads from '{}' but is paired with data source '{}'",
                    indexer.name, indexer.data_source_name, source.data_source.name
                )));
            }
            if indexer.target_index_name != self.schema.name {
                return Err(ProvisioningError::validation(format!(
                    "Indexer '{}' targets index '{}' instead of '{}'",
                    indexer.name, indexer.target_index_name, self.schema.name
                )));
            }
            if !indexers.insert(indexer.name.as_str()) {
                return Err(ProvisioningError::validation(format!(
                    "Indexer '{}' appears more than once",
                    indexer.name
                )));
            }
        }
        Ok(())
    }

    pub fn teardown_plan(&self) -> TeardownPlan {
        TeardownPlan {
            indexers: self.sources.iter().map(|s| s.indexer.name.clone()).collect(),
            data_sources: self
                .sources
                .iter()
                .map(|s| s.data_source.name.clone())
                .collect(),
            index: Some(self.schema.name.clone()),
        }
    }
}

/// What happened to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Synced { item_count: u64 },
    Failed { message: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub indexer: String,
    pub data_source: String,
    pub outcome: SourceOutcome,
}

/// Result of a workflow run, one entry per source in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub index: String,
    pub sources: Vec<SourceReport>,
}

impl SyncReport {
    /// Whether every source synced.
    pub fn is_success(&self) -> bool {
        self.sources
            .iter()
            .all(|s| matches!(s.outcome, SourceOutcome::Synced { .. }))
    }

    pub fn total_items(&self) -> u64 {
        self.sources
            .iter()
            .map(|s| match s.outcome {
                SourceOutcome::Synced { item_count } => item_count,
                _ => 0,
            })
            .sum()
    }
}

/// Drives a [`SyncPlan`] through provisioning and indexer runs.
pub struct SyncWorkflow {
    provisioning: ProvisioningClient,
    runner: IndexerRunner,
}

impl SyncWorkflow {
    pub fn new(provisioning: ProvisioningClient, runner: IndexerRunner) -> Self {
        Self {
            provisioning,
            runner,
        }
    }

    pub fn runner(&self) -> &IndexerRunner {
        &self.runner
    }

    /// Run the plan.
    ///
    /// Returns an error only when nothing could be synced at all: an invalid
    /// plan, a failed teardown, a failed index, or a cancelled run. Failures
    /// confined to one source are reported in the [`SyncReport`].
    #[instrument(skip(self, plan), fields(index = %plan.schema.name, sources = plan.sources.len()))]
    pub async fn run(&self, plan: &SyncPlan) -> Result<SyncReport, SyncError> {
        plan.validate()?;

        if plan.teardown {
            info!("Deleting existing resources");
            self.provisioning.teardown(&plan.teardown_plan()).await?;
        }

        info!("Creating index");
        self.provisioning.ensure_index(&plan.schema).await?;

        let mut pending = Vec::with_capacity(plan.sources.len());
        for source in &plan.sources {
            let provisioned = self.provision_source(source).await;
            pending.push((source, provisioned));
        }

        let mut reports = Vec::with_capacity(pending.len());
        for (source, provisioned) in pending {
            let outcome = match provisioned {
                Err(e) => SourceOutcome::Skipped {
                    reason: e.to_string(),
                },
                Ok(()) => self.run_source(source).await?,
            };
            reports.push(SourceReport {
                indexer: source.indexer.name.clone(),
                data_source: source.data_source.name.clone(),
                outcome,
            });
        }

        let report = SyncReport {
            index: plan.schema.name.clone(),
            sources: reports,
        };
        info!(
            success = report.is_success(),
            total_items = report.total_items(),
            "Sync finished"
        );
        Ok(report)
    }

    async fn provision_source(&self, source: &SourcePlan) -> Result<(), ProvisioningError> {
        let result = async {
            self.provisioning
                .ensure_data_source(&source.data_source)
                .await?;
            self.provisioning.ensure_indexer(&source.indexer).await
        }
        .await;

        if let Err(e) = &result {
            warn!(
                indexer = %source.indexer.name,
                data_source = %source.data_source.name,
                error = %e,
                "Skipping source"
            );
        }
        result
    }

    /// Run one indexer. Only cancellation escapes as an error.
    async fn run_source(&self, source: &SourcePlan) -> Result<SourceOutcome, SyncError> {
        match self.runner.run_and_await(&source.indexer.name).await {
            Ok(outcome) => Ok(SourceOutcome::Synced {
                item_count: outcome.item_count,
            }),
            Err(e @ SyncError::Cancelled { .. }) => Err(e),
            Err(e) => {
                error!(indexer = %source.indexer.name, error = %e, "Indexer did not sync");
                let message = match e {
                    SyncError::RunFailed { message, .. } => message,
                    other => other.to_string(),
                };
                Ok(SourceOutcome::Failed { message })
            }
        }
    }
}
