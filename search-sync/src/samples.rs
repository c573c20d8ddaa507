//! Resource definitions for the bundled sample data sets.

use serde_json::{json, Map, Value};

use search_sync_pipeline::SyncPlan;
use search_sync_shared::{
    ChangeDetectionPolicy, DataSourceConnection, DocumentAction, FieldDefinition, FieldType,
    IndexSchema, Indexer, Suggester,
};

pub const GEONAMES_INDEX: &str = "geonames";
pub const USGS_DATA_SOURCE: &str = "usgs-datasource";
pub const USGS_INDEXER: &str = "usgs-indexer";
/// Table holding the USGS place names.
pub const USGS_TABLE: &str = "GeoNamesRI";

pub const HOTELS_INDEX: &str = "hotels";
pub const SQL_DATA_SOURCE: &str = "azure-sql";
pub const SQL_INDEXER: &str = "azure-sql-indexer";
pub const COSMOS_INDEXER: &str = "cosmos-db-indexer";
/// Both hotel data sets keep their rows in a container named `hotels`.
pub const HOTELS_CONTAINER: &str = "hotels";

pub const SECURED_FILES_INDEX: &str = "securedfiles";
pub const SECURED_FILES_KEY: &str = "fileId";

/// Index used by suggest, autocomplete and facets when none is configured.
pub const JOBS_INDEX: &str = "nycjobs";

/// USGS geographic names, filled from a SQL table.
pub fn geonames_schema(index: &str, suggester: &str) -> IndexSchema {
    use FieldType::{DateTimeOffset, Int32, String};

    let text = |name: &str| {
        FieldDefinition::new(name, String)
            .searchable()
            .filterable()
            .sortable()
    };
    let number = |name: &str| {
        FieldDefinition::new(name, Int32)
            .filterable()
            .sortable()
            .facetable()
    };
    let date = |name: &str| {
        FieldDefinition::new(name, DateTimeOffset)
            .filterable()
            .sortable()
            .facetable()
    };

    IndexSchema::new(
        index,
        vec![
            FieldDefinition::new("FEATURE_ID", String).key(),
            text("FEATURE_NAME"),
            text("FEATURE_CLASS"),
            text("STATE_ALPHA"),
            number("STATE_NUMERIC"),
            text("COUNTY_NAME"),
            number("COUNTY_NUMERIC"),
            number("ELEV_IN_M"),
            number("ELEV_IN_FT"),
            text("MAP_NAME"),
            FieldDefinition::new("DESCRIPTION", String).searchable(),
            FieldDefinition::new("HISTORY", String).searchable(),
            date("DATE_CREATED"),
            date("DATE_EDITED"),
        ],
    )
    .with_suggester(Suggester::new(suggester, ["FEATURE_NAME", "COUNTY_NAME"]))
}

/// Single-source plan: the USGS table into the geonames index.
pub fn geonames_plan(index: &str, suggester: &str, sql_connection: &str) -> SyncPlan {
    SyncPlan::new(geonames_schema(index, suggester)).with_source(
        DataSourceConnection::sql(USGS_DATA_SOURCE, sql_connection, USGS_TABLE),
        Indexer::new(USGS_INDEXER, USGS_DATA_SOURCE, index).with_description("USGS data indexer"),
    )
}

pub fn hotels_schema(index: &str, suggester: &str) -> IndexSchema {
    use FieldType::{Boolean, DateTimeOffset, Double, GeographyPoint, String, StringCollection};

    IndexSchema::new(
        index,
        vec![
            FieldDefinition::new("HotelId", String).key().filterable(),
            FieldDefinition::new("HotelName", String)
                .searchable()
                .filterable()
                .sortable(),
            FieldDefinition::new("Description", String).searchable(),
            FieldDefinition::new("Category", String)
                .searchable()
                .filterable()
                .sortable()
                .facetable(),
            FieldDefinition::new("Tags", StringCollection)
                .searchable()
                .filterable()
                .facetable(),
            FieldDefinition::new("ParkingIncluded", Boolean)
                .filterable()
                .sortable()
                .facetable(),
            FieldDefinition::new("LastRenovationDate", DateTimeOffset)
                .filterable()
                .sortable()
                .facetable(),
            FieldDefinition::new("Rating", Double)
                .filterable()
                .sortable()
                .facetable(),
            FieldDefinition::new("Location", GeographyPoint)
                .filterable()
                .sortable(),
        ],
    )
    .with_suggester(Suggester::new(suggester, ["HotelName", "Category"]))
}

/// Two sources feeding one index: hotels from SQL, rooms from the document
/// store. The document-store source is named after its database.
///
/// Existing data sources and indexers are kept; indexers are reset instead.
pub fn hotels_plan(
    index: &str,
    suggester: &str,
    sql_connection: &str,
    cosmos_connection: &str,
    cosmos_database: &str,
) -> SyncPlan {
    SyncPlan::new(hotels_schema(index, suggester))
        .with_source(
            DataSourceConnection::sql(SQL_DATA_SOURCE, sql_connection, HOTELS_CONTAINER)
                .with_change_detection(ChangeDetectionPolicy::SqlIntegratedChangeTracking),
            Indexer::new(SQL_INDEXER, SQL_DATA_SOURCE, index).with_description("Data indexer"),
        )
        .with_source(
            DataSourceConnection::document_store(
                cosmos_database,
                cosmos_connection,
                cosmos_database,
                HOTELS_CONTAINER,
            ),
            Indexer::new(COSMOS_INDEXER, cosmos_database, index).with_description("Data indexer"),
        )
        .without_teardown()
}

/// Files tagged with the groups allowed to see them.
pub fn secured_files_schema(index: &str) -> IndexSchema {
    IndexSchema::new(
        index,
        vec![
            FieldDefinition::new(SECURED_FILES_KEY, FieldType::String)
                .key()
                .filterable(),
            FieldDefinition::new("name", FieldType::String)
                .filterable()
                .sortable()
                .facetable(),
            FieldDefinition::new("groupIds", FieldType::StringCollection).filterable(),
        ],
    )
}

fn secured_file(id: &str, name: &str, groups: &[&str]) -> DocumentAction {
    let mut document = Map::new();
    document.insert(SECURED_FILES_KEY.to_string(), Value::from(id));
    document.insert("name".to_string(), Value::from(name));
    document.insert("groupIds".to_string(), json!(groups));
    DocumentAction::merge_or_upload(document)
}

pub fn secured_files_documents() -> Vec<DocumentAction> {
    vec![
        secured_file("1", "secured_file_a", &["group1"]),
        secured_file("2", "secured_file_b", &["group1"]),
        secured_file("3", "secured_file_c", &["group2"]),
        secured_file("4", "secured_file_d", &["group2"]),
        secured_file("5", "secured_file_e", &["group1", "group2"]),
    ]
}
