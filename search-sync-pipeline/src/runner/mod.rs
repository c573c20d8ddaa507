//! Indexer run controller.
//!
//! Starts a remote indexer run and follows it by polling the status endpoint
//! until the run reaches a terminal state, the deadline passes, or a
//! shutdown is requested.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SyncError;
use search_sync_repository::{SearchServiceClient, SearchServiceError};
use search_sync_shared::{IndexerExecutionResult, IndexerRunStatus};

/// Configuration for the run controller.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Delay between two status polls.
    pub poll_interval: Duration,
    /// Upper bound for the run request plus all polling.
    pub timeout: Duration,
    /// Run requests sent before giving up on a rate-limited service.
    pub max_run_attempts: u32,
    /// First retry delay for a rate-limited run request, doubled after each
    /// attempt. A `Retry-After` hint from the service takes precedence.
    pub initial_backoff: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10 * 60),
            max_run_attempts: 4,
            initial_backoff: Duration::from_secs(2),
        }
    }
}

impl RunnerConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_run_attempts(mut self, max_run_attempts: u32) -> Self {
        self.max_run_attempts = max_run_attempts;
        self
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub indexer: String,
    /// Items processed by the run, as reported by the service.
    pub item_count: u64,
    /// Status polls issued, including the one that saw the terminal state.
    pub polls: u32,
}

/// Runs indexers to completion.
///
/// A single runner can be shared between sequential runs; `shutdown` cancels
/// whichever run is in flight.
pub struct IndexerRunner {
    service: Arc<dyn SearchServiceClient>,
    config: RunnerConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl IndexerRunner {
    /// Create a new runner with default configuration.
    pub fn new(service: Arc<dyn SearchServiceClient>) -> Self {
        Self::with_config(service, RunnerConfig::default())
    }

    pub fn with_config(service: Arc<dyn SearchServiceClient>, config: RunnerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            service,
            config,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Cancel the run in flight, if any.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// A sender that cancels runs when signalled, for use from another task.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Start `indexer` and wait for the run to finish.
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` - The run succeeded
    /// * `Err(SyncError::RunFailed)` - The run ended in any other terminal state
    /// * `Err(SyncError::Timeout)` - The run did not finish within `timeout`
    /// * `Err(SyncError::Cancelled)` - `shutdown` was called during the run
    /// * `Err(SyncError::Service)` - A run request or status poll failed
    #[instrument(skip(self))]
    pub async fn run_and_await(&self, indexer: &str) -> Result<RunOutcome, SyncError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let run = async {
            let previous = self.previous_result(indexer).await?;
            self.request_run(indexer).await?;
            self.poll_until_terminal(indexer, previous.as_ref()).await
        };

        tokio::select! {
            result = tokio::time::timeout(self.config.timeout, run) => match result {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(indexer, timeout = ?self.config.timeout, "Indexer run timed out");
                    Err(SyncError::timeout(indexer, self.config.timeout))
                }
            },
            _ = shutdown_rx.recv() => {
                info!(indexer, "Indexer run cancelled");
                Err(SyncError::cancelled(indexer))
            }
        }
    }

    /// Last execution result the service holds before the run is requested.
    ///
    /// Until the new execution reports, polls keep returning this result; it
    /// must not be mistaken for the outcome of the run.
    async fn previous_result(
        &self,
        indexer: &str,
    ) -> Result<Option<IndexerExecutionResult>, SyncError> {
        match self.service.indexer_status(indexer).await {
            Ok(status) => Ok(status.last_result),
            Err(e) if e.is_rate_limited() => {
                warn!(indexer, "Status read before run rate limited");
                Ok(None)
            }
            Err(e) => {
                error!(indexer, error = %e, "Failed to read indexer status");
                Err(SyncError::service(indexer, e))
            }
        }
    }

    /// Ask the service to start the run.
    ///
    /// A throttled request is retried with backoff. When every attempt is
    /// throttled the run may still have been started by the schedule, so
    /// polling goes ahead. A conflict means a run is already in progress.
    async fn request_run(&self, indexer: &str) -> Result<(), SyncError> {
        let attempts = self.config.max_run_attempts.max(1);
        let mut backoff = self.config.initial_backoff;

        for attempt in 1..=attempts {
            match self.service.run_indexer(indexer).await {
                Ok(()) => {
                    info!(indexer, attempt, "Indexer run requested");
                    return Ok(());
                }
                Err(SearchServiceError::RateLimited {
                    retry_after,
                    message,
                }) => {
                    if attempt == attempts {
                        warn!(
                            indexer,
                            attempts,
                            message = %message,
                            "Run request still rate limited, polling anyway"
                        );
                        return Ok(());
                    }
                    let delay = retry_after.unwrap_or(backoff);
                    warn!(
                        indexer,
                        attempt,
                        delay = ?delay,
                        message = %message,
                        "Run request rate limited, retrying"
                    );
                    sleep(delay).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) if e.is_conflict() => {
                    info!(indexer, "Indexer is already running");
                    return Ok(());
                }
                Err(e) => {
                    error!(indexer, error = %e, "Failed to run indexer");
                    return Err(SyncError::service(indexer, e));
                }
            }
        }

        Ok(())
    }

    async fn poll_until_terminal(
        &self,
        indexer: &str,
        previous: Option<&IndexerExecutionResult>,
    ) -> Result<RunOutcome, SyncError> {
        let mut polls = 0u32;

        loop {
            polls += 1;
            match self.service.indexer_status(indexer).await {
                Ok(status) => match status.run_status_since(previous) {
                    IndexerRunStatus::Success { item_count } => {
                        info!(indexer, item_count, polls, "Synchronized {} rows", item_count);
                        return Ok(RunOutcome {
                            indexer: indexer.to_string(),
                            item_count,
                            polls,
                        });
                    }
                    IndexerRunStatus::Failed { error_message } => {
                        error!(indexer, polls, error = %error_message, "Indexer run failed");
                        return Err(SyncError::run_failed(indexer, error_message));
                    }
                    IndexerRunStatus::InProgress => {
                        debug!(indexer, polls, "Indexer run in progress");
                    }
                },
                Err(e) if e.is_rate_limited() => {
                    warn!(indexer, polls, "Status poll rate limited");
                }
                Err(e) => return Err(SyncError::service(indexer, e)),
            }

            sleep(self.config.poll_interval).await;
        }
    }
}
