//! Document index client.
//!
//! Pushes batches of document actions straight into an index, bypassing
//! indexers. Used for indexes whose documents do not come from a data source.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::DocumentBatchConfig;
use crate::errors::DocumentError;
use crate::interfaces::SearchServiceClient;
use crate::types::BatchOperationSummary;
use search_sync_shared::DocumentAction;

/// Client for uploading, merging and deleting documents in an index.
pub struct DocumentIndexClient {
    service: Arc<dyn SearchServiceClient>,
    config: DocumentBatchConfig,
}

impl DocumentIndexClient {
    /// Create a new DocumentIndexClient with default configuration.
    pub fn new(service: Arc<dyn SearchServiceClient>) -> Self {
        Self {
            service,
            config: DocumentBatchConfig::default(),
        }
    }

    /// Create a new DocumentIndexClient with custom configuration.
    pub fn with_config(service: Arc<dyn SearchServiceClient>, config: DocumentBatchConfig) -> Self {
        Self { service, config }
    }

    fn validate_batch_size(&self, size: usize) -> Result<(), DocumentError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(DocumentError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Apply a batch of actions to `index`.
    ///
    /// Every action must carry a non-empty string value for `key_field`.
    /// The batch is rejected as a whole, before any remote call, when it is
    /// too large or any action lacks its key.
    ///
    /// A batch accepted by the service can still contain failed documents;
    /// they are reported in the returned summary.
    #[instrument(skip(self, actions), fields(batch_size = actions.len()))]
    pub async fn upload(
        &self,
        index: &str,
        key_field: &str,
        actions: Vec<DocumentAction>,
    ) -> Result<BatchOperationSummary, DocumentError> {
        if actions.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(actions.len())?;

        if let Some(position) = actions.iter().position(|a| a.key(key_field).is_none()) {
            return Err(DocumentError::validation(format!(
                "Action {} has no value for key field '{}'",
                position, key_field
            )));
        }

        let results = self.service.index_documents(index, &actions).await?;
        let summary = BatchOperationSummary::from(results);

        if summary.is_complete_success() {
            info!(index, total = summary.total, "Indexed document batch");
        } else {
            warn!(
                index,
                total = summary.total,
                failed = summary.failed,
                "Document batch partially failed"
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchServiceError;
    use crate::testing::InMemorySearchService;
    use search_sync_shared::{FieldDefinition, FieldType, IndexSchema};
    use serde_json::{json, Map, Value};

    fn file_doc(id: &str, name: &str) -> DocumentAction {
        let value = json!({ "fileId": id, "name": name, "groupIds": ["group1"] });
        let document: Map<String, Value> = value.as_object().cloned().unwrap_or_default();
        DocumentAction::merge_or_upload(document)
    }

    async fn setup() -> (Arc<InMemorySearchService>, DocumentIndexClient) {
        let service = Arc::new(InMemorySearchService::new());
        service
            .seed_index(IndexSchema::new(
                "securedfiles",
                vec![
                    FieldDefinition::new("fileId", FieldType::String).key(),
                    FieldDefinition::new("name", FieldType::String).searchable(),
                    FieldDefinition::new("groupIds", FieldType::StringCollection).filterable(),
                ],
            ))
            .await;
        let client = DocumentIndexClient::new(service.clone());
        (service, client)
    }

    #[tokio::test]
    async fn test_upload_empty_batch() {
        let (service, client) = setup().await;

        let summary = client.upload("securedfiles", "fileId", vec![]).await.unwrap();

        assert_eq!(summary, BatchOperationSummary::empty());
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_reports_every_document() {
        let (service, client) = setup().await;
        let actions = vec![
            file_doc("1", "secured_file_a"),
            file_doc("2", "secured_file_b"),
            DocumentAction::delete("fileId", "3"),
        ];

        let summary = client.upload("securedfiles", "fileId", actions).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(
            summary.results.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
        assert_eq!(service.documents().await.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_key() {
        let (service, client) = setup().await;
        let actions = vec![file_doc("1", "a"), file_doc("", "b")];

        let err = client.upload("securedfiles", "fileId", actions).await.unwrap_err();

        assert!(matches!(err, DocumentError::ValidationError(_)));
        assert!(err.to_string().contains("Action 1"));
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_enforces_batch_limit() {
        let service = Arc::new(InMemorySearchService::new());
        let client = DocumentIndexClient::with_config(
            service.clone(),
            DocumentBatchConfig::with_max_batch_size(2),
        );
        let actions = vec![file_doc("1", "a"), file_doc("2", "b"), file_doc("3", "c")];

        let err = client.upload("securedfiles", "fileId", actions).await.unwrap_err();

        assert!(matches!(
            err,
            DocumentError::BatchSizeExceeded { provided: 3, max: 2 }
        ));
    }

    #[tokio::test]
    async fn test_unlimited_config_accepts_large_batch() {
        let (service, _) = setup().await;
        let client = DocumentIndexClient::with_config(service.clone(), DocumentBatchConfig::unlimited());
        let actions: Vec<DocumentAction> = (0..1500)
            .map(|i| file_doc(&i.to_string(), "bulk"))
            .collect();

        let summary = client.upload("securedfiles", "fileId", actions).await.unwrap();

        assert_eq!(summary.total, 1500);
    }

    #[tokio::test]
    async fn test_service_rejection_is_propagated() {
        let (service, client) = setup().await;
        service
            .fail("index_documents", SearchServiceError::request(413, "Request too large"))
            .await;

        let err = client
            .upload("securedfiles", "fileId", vec![file_doc("1", "a")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DocumentError::Service(SearchServiceError::RequestError { status: 413, .. })
        ));
    }
}
