//! Data source connection definitions.

use serde::{Deserialize, Serialize};

/// The kind of store an indexer pulls documents from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceKind {
    /// A relational table.
    #[serde(rename = "azuresql")]
    Sql,
    /// A document container.
    #[serde(rename = "cosmosdb")]
    DocumentStore,
}

/// How the service detects changed rows between indexer runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum ChangeDetectionPolicy {
    /// Built-in SQL change tracking.
    #[serde(rename = "#Microsoft.Azure.Search.SqlIntegratedChangeTrackingPolicy")]
    SqlIntegratedChangeTracking,
    /// Monotonic high-water-mark column (e.g. `_ts` on a document store).
    #[serde(rename = "#Microsoft.Azure.Search.HighWaterMarkChangeDetectionPolicy")]
    HighWaterMark {
        #[serde(rename = "highWaterMarkColumnName")]
        column: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCredentials {
    pub connection_string: String,
}

/// The table or collection within the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// A registered connection an indexer reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConnection {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub credentials: DataSourceCredentials,
    pub container: DataContainer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_change_detection_policy: Option<ChangeDetectionPolicy>,
}

impl DataSourceConnection {
    pub fn new(
        name: impl Into<String>,
        kind: DataSourceKind,
        connection_string: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            credentials: DataSourceCredentials {
                connection_string: connection_string.into(),
            },
            container: DataContainer {
                name: container.into(),
                query: None,
            },
            data_change_detection_policy: None,
        }
    }

    /// SQL table source.
    ///
    /// No change detection is attached; tables with change tracking enabled
    /// opt in with [`with_change_detection`](Self::with_change_detection).
    pub fn sql(
        name: impl Into<String>,
        connection_string: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self::new(name, DataSourceKind::Sql, connection_string, table)
    }

    /// Document-store source tracked by the `_ts` timestamp.
    ///
    /// The database name is appended to the connection string in the form the
    /// service expects (`...;Database=<name>`).
    pub fn document_store(
        name: impl Into<String>,
        connection_string: &str,
        database: &str,
        collection: impl Into<String>,
    ) -> Self {
        let connection = format!(
            "{};Database={}",
            connection_string.trim_end_matches(';'),
            database
        );
        Self::new(name, DataSourceKind::DocumentStore, connection, collection).with_change_detection(
            ChangeDetectionPolicy::HighWaterMark {
                column: "_ts".to_string(),
            },
        )
    }

    pub fn with_change_detection(mut self, policy: ChangeDetectionPolicy) -> Self {
        self.data_change_detection_policy = Some(policy);
        self
    }

    /// Restrict the container to a query (document stores only).
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.container.query = Some(query.into());
        self
    }
}
