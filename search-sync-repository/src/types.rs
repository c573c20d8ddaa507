//! Result types for document batch operations.

use search_sync_shared::IndexingResult;

/// Result of a batch operation for a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOperationResult {
    /// The document key.
    pub key: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if the operation failed.
    pub error: Option<String>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// A batch can be accepted by the service while some of its documents fail,
/// so callers should check `failed` rather than rely on the call succeeding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of a batch with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

impl From<Vec<IndexingResult>> for BatchOperationSummary {
    fn from(items: Vec<IndexingResult>) -> Self {
        let results: Vec<BatchOperationResult> = items
            .into_iter()
            .map(|item| BatchOperationResult {
                key: item.key,
                success: item.status,
                error: if item.status { None } else { item.error_message },
            })
            .collect();

        let succeeded = results.iter().filter(|r| r.success).count();

        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_indexing_results() {
        let summary = BatchOperationSummary::from(vec![
            IndexingResult {
                key: "1".to_string(),
                status: true,
                error_message: None,
                status_code: 201,
            },
            IndexingResult {
                key: "2".to_string(),
                status: false,
                error_message: Some("Document is too large".to_string()),
                status_code: 400,
            },
        ]);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete_success());
        assert_eq!(
            summary.results[1].error.as_deref(),
            Some("Document is too large")
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchOperationSummary::empty();
        assert_eq!(summary.total, 0);
        assert!(summary.is_complete_success());
    }
}
