//! Provisioning of indexes, data sources and indexers.
//!
//! Each `ensure_*` operation leaves the named resource in the state described
//! by its definition, whatever existed before:
//!
//! - indexes are dropped and recreated, since a schema cannot be patched
//! - data sources are created or replaced in place
//! - indexers are reset first, so the next run reprocesses every row, and
//!   then created or replaced

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::errors::{ProvisioningError, SearchServiceError};
use crate::interfaces::SearchServiceClient;
use crate::validate::{validate_data_source, validate_indexer, validate_schema};
use search_sync_shared::{DataSourceConnection, IndexSchema, Indexer};

/// Names of the resources to remove in [`ProvisioningClient::teardown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownPlan {
    pub indexers: Vec<String>,
    pub data_sources: Vec<String>,
    pub index: Option<String>,
}

/// Creates and removes remote resources through a [`SearchServiceClient`].
#[derive(Clone)]
pub struct ProvisioningClient {
    service: Arc<dyn SearchServiceClient>,
}

/// A 404 from a delete means there was nothing to remove.
fn ignore_missing(result: Result<(), SearchServiceError>) -> Result<bool, SearchServiceError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

impl ProvisioningClient {
    pub fn new(service: Arc<dyn SearchServiceClient>) -> Self {
        Self { service }
    }

    /// Recreate the index from `schema`, dropping any existing index of the
    /// same name together with its documents.
    #[instrument(skip(self, schema), fields(index = %schema.name))]
    pub async fn ensure_index(&self, schema: &IndexSchema) -> Result<(), ProvisioningError> {
        validate_schema(schema)?;

        let deleted = ignore_missing(self.service.delete_index(&schema.name).await)
            .map_err(|e| ProvisioningError::index(&schema.name, e))?;
        if deleted {
            info!(index = %schema.name, "Deleted existing index");
        }

        self.service
            .create_index(schema)
            .await
            .map_err(|e| ProvisioningError::index(&schema.name, e))?;

        info!(
            index = %schema.name,
            fields = schema.fields.len(),
            suggesters = schema.suggesters.len(),
            "Created index"
        );
        Ok(())
    }

    /// Create the data source, or replace the existing one in place.
    #[instrument(skip(self, data_source), fields(data_source = %data_source.name))]
    pub async fn ensure_data_source(
        &self,
        data_source: &DataSourceConnection,
    ) -> Result<(), ProvisioningError> {
        validate_data_source(data_source)?;

        self.service
            .create_or_update_data_source(data_source)
            .await
            .map_err(|e| ProvisioningError::data_source(&data_source.name, e))?;

        info!(
            data_source = %data_source.name,
            kind = ?data_source.kind,
            container = %data_source.container.name,
            "Data source ready"
        );
        Ok(())
    }

    /// Reset the indexer if it already exists, then create or replace it.
    #[instrument(skip(self, indexer), fields(indexer = %indexer.name))]
    pub async fn ensure_indexer(&self, indexer: &Indexer) -> Result<(), ProvisioningError> {
        validate_indexer(indexer)?;

        match self.service.reset_indexer(&indexer.name).await {
            Ok(()) => info!(indexer = %indexer.name, "Reset existing indexer"),
            Err(e) if e.is_not_found() => {
                debug!(indexer = %indexer.name, "No existing indexer to reset")
            }
            Err(e) => return Err(ProvisioningError::indexer(&indexer.name, e)),
        }

        self.service
            .create_or_update_indexer(indexer)
            .await
            .map_err(|e| ProvisioningError::indexer(&indexer.name, e))?;

        info!(
            indexer = %indexer.name,
            data_source = %indexer.data_source_name,
            index = %indexer.target_index_name,
            "Indexer ready"
        );
        Ok(())
    }

    /// Delete indexers, then data sources, then the index.
    ///
    /// Resources that do not exist are skipped. The first other failure
    /// stops the teardown.
    #[instrument(skip(self, plan))]
    pub async fn teardown(&self, plan: &TeardownPlan) -> Result<(), ProvisioningError> {
        for name in &plan.indexers {
            let deleted = ignore_missing(self.service.delete_indexer(name).await)
                .map_err(|e| ProvisioningError::indexer(name, e))?;
            log_teardown("indexer", name, deleted);
        }

        for name in &plan.data_sources {
            let deleted = ignore_missing(self.service.delete_data_source(name).await)
                .map_err(|e| ProvisioningError::data_source(name, e))?;
            log_teardown("data source", name, deleted);
        }

        if let Some(name) = &plan.index {
            let deleted = ignore_missing(self.service.delete_index(name).await)
                .map_err(|e| ProvisioningError::index(name, e))?;
            log_teardown("index", name, deleted);
        }

        Ok(())
    }
}

fn log_teardown(kind: &str, name: &str, deleted: bool) {
    if deleted {
        info!(kind, name, "Deleted");
    } else {
        warn!(kind, name, "Nothing to delete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySearchService;
    use search_sync_shared::{FieldDefinition, FieldType, Suggester};

    fn geonames() -> IndexSchema {
        IndexSchema::new(
            "geonames",
            vec![
                FieldDefinition::new("FEATURE_ID", FieldType::String).key(),
                FieldDefinition::new("FEATURE_NAME", FieldType::String).searchable(),
            ],
        )
        .with_suggester(Suggester::new("sg", ["FEATURE_NAME"]))
    }

    fn usgs_source() -> DataSourceConnection {
        DataSourceConnection::sql("usgs-datasource", "Server=tcp:example", "GeoNamesRI")
    }

    fn usgs_indexer() -> Indexer {
        Indexer::new("usgs-indexer", "usgs-datasource", "geonames")
    }

    fn setup() -> (Arc<InMemorySearchService>, ProvisioningClient) {
        let service = Arc::new(InMemorySearchService::new());
        let client = ProvisioningClient::new(service.clone());
        (service, client)
    }

    #[tokio::test]
    async fn test_ensure_index_creates_fresh_index() {
        let (service, client) = setup();

        client.ensure_index(&geonames()).await.unwrap();

        assert_eq!(
            service.calls().await,
            vec!["delete_index:geonames", "create_index:geonames"]
        );
        assert_eq!(service.index("geonames").await, Some(geonames()));
    }

    #[tokio::test]
    async fn test_ensure_index_replaces_existing_schema() {
        let (service, client) = setup();
        service
            .seed_index(IndexSchema::new(
                "geonames",
                vec![FieldDefinition::new("id", FieldType::String).key()],
            ))
            .await;

        client.ensure_index(&geonames()).await.unwrap();

        let index = service.index("geonames").await.unwrap();
        assert_eq!(index.fields.len(), 2);
        assert_eq!(index.suggesters[0].name, "sg");
    }

    #[tokio::test]
    async fn test_invalid_schema_makes_no_remote_call() {
        let (service, client) = setup();
        let schema = IndexSchema::new(
            "geonames",
            vec![FieldDefinition::new("FEATURE_ID", FieldType::String)],
        );

        let err = client.ensure_index(&schema).await.unwrap_err();

        assert!(matches!(err, ProvisioningError::ValidationError(_)));
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_index_surfaces_delete_failure() {
        let (service, client) = setup();
        service
            .fail("delete_index", SearchServiceError::request(403, "Forbidden"))
            .await;

        let err = client.ensure_index(&geonames()).await.unwrap_err();

        match err {
            ProvisioningError::Index { name, source } => {
                assert_eq!(name, "geonames");
                assert_eq!(source, SearchServiceError::request(403, "Forbidden"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(service.call_count("create_index").await, 0);
    }

    #[tokio::test]
    async fn test_ensure_data_source_is_idempotent() {
        let (service, client) = setup();

        client.ensure_data_source(&usgs_source()).await.unwrap();
        client.ensure_data_source(&usgs_source()).await.unwrap();

        assert_eq!(service.call_count("create_or_update_data_source").await, 2);
        assert_eq!(service.data_source("usgs-datasource").await, Some(usgs_source()));
    }

    #[tokio::test]
    async fn test_ensure_indexer_resets_existing() {
        let (service, client) = setup();
        service.seed_index(geonames()).await;
        service.seed_data_source(usgs_source()).await;
        service.seed_indexer(usgs_indexer()).await;

        let updated = usgs_indexer().with_description("Data indexer");
        client.ensure_indexer(&updated).await.unwrap();

        assert_eq!(
            service.calls().await,
            vec![
                "reset_indexer:usgs-indexer",
                "create_or_update_indexer:usgs-indexer"
            ]
        );
        assert_eq!(service.indexer("usgs-indexer").await, Some(updated));
    }

    #[tokio::test]
    async fn test_ensure_indexer_creates_when_missing() {
        let (service, client) = setup();
        service.seed_index(geonames()).await;
        service.seed_data_source(usgs_source()).await;

        client.ensure_indexer(&usgs_indexer()).await.unwrap();

        assert!(service.indexer("usgs-indexer").await.is_some());
    }

    #[tokio::test]
    async fn test_ensure_indexer_reports_missing_data_source() {
        let (service, client) = setup();
        service.seed_index(geonames()).await;

        let err = client.ensure_indexer(&usgs_indexer()).await.unwrap_err();

        assert!(matches!(err, ProvisioningError::Indexer { ref name, .. } if name == "usgs-indexer"));
        assert!(err.to_string().contains("usgs-datasource"));
    }

    #[tokio::test]
    async fn test_teardown_order_and_missing_resources() {
        let (service, client) = setup();
        service.seed_index(geonames()).await;
        service.seed_data_source(usgs_source()).await;
        service.seed_indexer(usgs_indexer()).await;

        let plan = TeardownPlan {
            indexers: vec!["usgs-indexer".to_string(), "gone-indexer".to_string()],
            data_sources: vec!["usgs-datasource".to_string()],
            index: Some("geonames".to_string()),
        };
        client.teardown(&plan).await.unwrap();

        assert_eq!(
            service.calls().await,
            vec![
                "delete_indexer:usgs-indexer",
                "delete_indexer:gone-indexer",
                "delete_data_source:usgs-datasource",
                "delete_index:geonames"
            ]
        );
        assert!(service.index("geonames").await.is_none());
    }

    #[tokio::test]
    async fn test_teardown_stops_on_failure() {
        let (service, client) = setup();
        service
            .fail(
                "delete_data_source",
                SearchServiceError::connection("connection reset"),
            )
            .await;

        let plan = TeardownPlan {
            indexers: vec![],
            data_sources: vec!["usgs-datasource".to_string()],
            index: Some("geonames".to_string()),
        };
        let err = client.teardown(&plan).await.unwrap_err();

        assert!(matches!(err, ProvisioningError::DataSource { .. }));
        assert_eq!(service.call_count("delete_index").await, 0);
    }
}
