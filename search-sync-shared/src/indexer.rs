//! Indexer definitions and execution status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recurring schedule for an indexer, expressed as an ISO-8601 duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingSchedule {
    pub interval: String,
}

impl IndexingSchedule {
    /// The shortest interval the service accepts.
    pub const MIN_INTERVAL_MINUTES: u32 = 5;

    pub fn every_minutes(minutes: u32) -> Self {
        Self {
            interval: format!("PT{}M", minutes),
        }
    }

    /// Interval in minutes, if it is in the `PT<n>M` / `PT<n>H` form.
    pub fn minutes(&self) -> Option<u32> {
        let rest = self.interval.strip_prefix("PT")?;
        if let Some(m) = rest.strip_suffix('M') {
            return m.parse().ok();
        }
        if let Some(h) = rest.strip_suffix('H') {
            return h.parse::<u32>().ok().and_then(|h| h.checked_mul(60));
        }
        None
    }
}

/// A remote job that copies documents from a data source into an index.
///
/// The change-tracking checkpoint lives on the service; nothing here records
/// how far a previous run got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indexer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_source_name: String,
    pub target_index_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<IndexingSchedule>,
}

impl Indexer {
    pub fn new(
        name: impl Into<String>,
        data_source_name: impl Into<String>,
        target_index_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            data_source_name: data_source_name.into(),
            target_index_name: target_index_name.into(),
            schedule: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schedule(mut self, schedule: IndexingSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

/// Status of a single indexer execution as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexerExecutionStatus {
    InProgress,
    Success,
    TransientFailure,
    Reset,
    #[serde(other)]
    Unknown,
}

/// Outcome of the most recent (or a historical) indexer execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerExecutionResult {
    pub status: IndexerExecutionStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub items_failed: u64,
}

/// Response of the indexer status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    /// Overall indexer health (`running`, `error`, `unknown`).
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_result: Option<IndexerExecutionResult>,
    #[serde(default)]
    pub execution_history: Vec<IndexerExecutionResult>,
}

/// Client-side view of where an indexer run stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerRunStatus {
    InProgress,
    Success { item_count: u64 },
    Failed { error_message: String },
}

impl IndexerRunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IndexerRunStatus::InProgress)
    }
}

impl IndexerStatus {
    /// Collapse the service status into the three states the run controller
    /// cares about.
    ///
    /// No last result yet means the run has not started, and a reset only
    /// clears the change-tracking state; both count as in progress. Any status
    /// other than in-progress or success is a failure.
    pub fn run_status(&self) -> IndexerRunStatus {
        let Some(last) = &self.last_result else {
            return IndexerRunStatus::InProgress;
        };

        match last.status {
            IndexerExecutionStatus::InProgress | IndexerExecutionStatus::Reset => {
                IndexerRunStatus::InProgress
            }
            IndexerExecutionStatus::Success => IndexerRunStatus::Success {
                item_count: last.items_processed,
            },
            status => IndexerRunStatus::Failed {
                error_message: last.error_message.clone().unwrap_or_else(|| {
                    format!("indexer execution ended with status {:?}", status)
                }),
            },
        }
    }

    /// Like [`run_status`](Self::run_status), but a last result equal to
    /// `previous` belongs to an earlier execution and counts as in progress.
    pub fn run_status_since(&self, previous: Option<&IndexerExecutionResult>) -> IndexerRunStatus {
        match (&self.last_result, previous) {
            (Some(last), Some(previous)) if last == previous => IndexerRunStatus::InProgress,
            _ => self.run_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indexer_wire_shape() {
        let indexer = Indexer::new("usgs-indexer", "usgs-datasource", "geonames")
            .with_description("USGS data indexer");
        let value = serde_json::to_value(&indexer).unwrap();

        assert_eq!(value["dataSourceName"], "usgs-datasource");
        assert_eq!(value["targetIndexName"], "geonames");
        assert_eq!(value["description"], "USGS data indexer");
        assert!(value.get("schedule").is_none());
    }

    #[test]
    fn test_schedule_minutes() {
        assert_eq!(IndexingSchedule::every_minutes(30).minutes(), Some(30));
        let hourly = IndexingSchedule {
            interval: "PT2H".to_string(),
        };
        assert_eq!(hourly.minutes(), Some(120));
        let odd = IndexingSchedule {
            interval: "P1D".to_string(),
        };
        assert_eq!(odd.minutes(), None);
    }

    #[test]
    fn test_status_parses_service_payload() {
        let payload = json!({
            "status": "running",
            "lastResult": {
                "status": "success",
                "errorMessage": null,
                "startTime": "2024-03-01T10:00:00Z",
                "endTime": "2024-03-01T10:00:05Z",
                "itemsProcessed": 42,
                "itemsFailed": 0
            },
            "executionHistory": []
        });

        let status: IndexerStatus = serde_json::from_value(payload).unwrap();
        assert_eq!(
            status.run_status(),
            IndexerRunStatus::Success { item_count: 42 }
        );
        assert!(status.last_result.unwrap().end_time.is_some());
    }

    #[test]
    fn test_missing_last_result_is_in_progress() {
        let status: IndexerStatus = serde_json::from_value(json!({ "status": "running" })).unwrap();
        assert_eq!(status.run_status(), IndexerRunStatus::InProgress);
        assert!(!status.run_status().is_terminal());
    }

    #[test]
    fn test_unknown_status_is_failure() {
        let payload = json!({
            "status": "error",
            "lastResult": { "status": "somethingNew", "errorMessage": "boom" }
        });
        let status: IndexerStatus = serde_json::from_value(payload).unwrap();
        assert_eq!(
            status.run_status(),
            IndexerRunStatus::Failed {
                error_message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_reset_is_not_terminal() {
        let payload = json!({ "lastResult": { "status": "reset" } });
        let status: IndexerStatus = serde_json::from_value(payload).unwrap();
        assert_eq!(status.run_status(), IndexerRunStatus::InProgress);
    }

    #[test]
    fn test_failure_without_message_names_status() {
        let payload = json!({ "lastResult": { "status": "transientFailure" } });
        let status: IndexerStatus = serde_json::from_value(payload).unwrap();
        assert_eq!(
            status.run_status(),
            IndexerRunStatus::Failed {
                error_message: "indexer execution ended with status TransientFailure".to_string()
            }
        );
    }

    #[test]
    fn test_result_of_earlier_execution_is_in_progress() {
        let earlier: IndexerStatus = serde_json::from_value(json!({
            "lastResult": {
                "status": "success",
                "startTime": "2024-03-01T10:00:00Z",
                "endTime": "2024-03-01T10:00:05Z",
                "itemsProcessed": 99
            }
        }))
        .unwrap();
        let later: IndexerStatus = serde_json::from_value(json!({
            "lastResult": {
                "status": "success",
                "startTime": "2024-03-01T11:00:00Z",
                "endTime": "2024-03-01T11:00:04Z",
                "itemsProcessed": 99
            }
        }))
        .unwrap();
        let previous = earlier.last_result.as_ref();

        assert_eq!(earlier.run_status_since(previous), IndexerRunStatus::InProgress);
        assert_eq!(
            later.run_status_since(previous),
            IndexerRunStatus::Success { item_count: 99 }
        );
        assert_eq!(
            earlier.run_status_since(None),
            IndexerRunStatus::Success { item_count: 99 }
        );
    }

    #[test]
    fn test_transient_failure_is_terminal() {
        let payload = json!({
            "lastResult": { "status": "transientFailure", "errorMessage": "Login failed" }
        });
        let status: IndexerStatus = serde_json::from_value(payload).unwrap();
        assert!(status.run_status().is_terminal());
    }
}
