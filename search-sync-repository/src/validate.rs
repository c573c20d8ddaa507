//! Local validation of resource definitions.
//!
//! Everything here runs before a request is sent, so a bad definition never
//! reaches the service.

use std::collections::HashSet;

use crate::errors::ProvisioningError;
use search_sync_shared::{DataSourceConnection, FieldType, IndexSchema, Indexer, IndexingSchedule};

/// Longest resource name the service accepts.
pub const MAX_NAME_LENGTH: usize = 128;

fn validate_name(kind: &str, name: &str) -> Result<(), ProvisioningError> {
    if name.trim().is_empty() {
        return Err(ProvisioningError::validation(format!("{} name is required", kind)));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ProvisioningError::validation(format!(
            "{} name '{}' is longer than {} characters",
            kind, name, MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Index names are lowercase letters, digits and dashes, starting with a
/// letter or digit.
fn validate_index_name(name: &str) -> Result<(), ProvisioningError> {
    validate_name("Index", name)?;

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || name.starts_with('-') {
        return Err(ProvisioningError::validation(format!(
            "Index name '{}' must contain only lowercase letters, digits or dashes and must not start with a dash",
            name
        )));
    }
    Ok(())
}

/// Validate an index schema.
///
/// Checks:
/// - the index name and every field name are set, field names are unique
/// - exactly one field is the key, and it is a string
/// - `searchable` only on string fields, `sortable` never on collections
/// - suggesters only draw from existing searchable string fields
pub fn validate_schema(schema: &IndexSchema) -> Result<(), ProvisioningError> {
    validate_index_name(&schema.name)?;

    if schema.fields.is_empty() {
        return Err(ProvisioningError::validation(format!(
            "Index '{}' has no fields",
            schema.name
        )));
    }

    let mut seen = HashSet::new();
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(ProvisioningError::validation(format!(
                "Index '{}' has a field without a name",
                schema.name
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ProvisioningError::validation(format!(
                "Field '{}' is defined more than once",
                field.name
            )));
        }
        if field.searchable && !field.field_type.is_textual() {
            return Err(ProvisioningError::validation(format!(
                "Field '{}' cannot be searchable: only string fields support full-text search",
                field.name
            )));
        }
        if field.sortable && field.field_type.is_collection() {
            return Err(ProvisioningError::validation(format!(
                "Field '{}' cannot be sortable: collection fields are not sortable",
                field.name
            )));
        }
    }

    let keys: Vec<&str> = schema.key_fields().map(|f| f.name.as_str()).collect();
    match keys.as_slice() {
        [] => {
            return Err(ProvisioningError::validation(format!(
                "Index '{}' must have exactly one key field, found none",
                schema.name
            )))
        }
        [key] => {
            let key_field = schema.field(key).map(|f| f.field_type);
            if key_field != Some(FieldType::String) {
                return Err(ProvisioningError::validation(format!(
                    "Key field '{}' must be of type Edm.String",
                    key
                )));
            }
        }
        many => {
            return Err(ProvisioningError::validation(format!(
                "Index '{}' must have exactly one key field, found {}: {}",
                schema.name,
                many.len(),
                many.join(", ")
            )))
        }
    }

    for suggester in &schema.suggesters {
        validate_name("Suggester", &suggester.name)?;
        if suggester.source_fields.is_empty() {
            return Err(ProvisioningError::validation(format!(
                "Suggester '{}' has no source fields",
                suggester.name
            )));
        }
        for source in &suggester.source_fields {
            match schema.field(source) {
                Some(f) if f.searchable && f.field_type.is_textual() => {}
                Some(_) => {
                    return Err(ProvisioningError::validation(format!(
                        "Suggester '{}' source field '{}' must be a searchable string field",
                        suggester.name, source
                    )))
                }
                None => {
                    return Err(ProvisioningError::validation(format!(
                        "Suggester '{}' refers to unknown field '{}'",
                        suggester.name, source
                    )))
                }
            }
        }
    }

    Ok(())
}

/// Validate a data source connection.
pub fn validate_data_source(data_source: &DataSourceConnection) -> Result<(), ProvisioningError> {
    validate_name("Data source", &data_source.name)?;
    if data_source.credentials.connection_string.trim().is_empty() {
        return Err(ProvisioningError::validation(format!(
            "Data source '{}' has no connection string",
            data_source.name
        )));
    }
    if data_source.container.name.trim().is_empty() {
        return Err(ProvisioningError::validation(format!(
            "Data source '{}' has no container",
            data_source.name
        )));
    }
    Ok(())
}

/// Validate an indexer definition.
pub fn validate_indexer(indexer: &Indexer) -> Result<(), ProvisioningError> {
    validate_name("Indexer", &indexer.name)?;
    validate_name("Data source", &indexer.data_source_name)?;
    validate_index_name(&indexer.target_index_name)?;

    if let Some(schedule) = &indexer.schedule {
        match schedule.minutes() {
            Some(m) if m >= IndexingSchedule::MIN_INTERVAL_MINUTES => {}
            Some(m) => {
                return Err(ProvisioningError::validation(format!(
                    "Indexer '{}' schedule of {} minutes is below the {} minute minimum",
                    indexer.name,
                    m,
                    IndexingSchedule::MIN_INTERVAL_MINUTES
                )))
            }
            None => {
                return Err(ProvisioningError::validation(format!(
                    "Indexer '{}' has an unsupported schedule interval '{}'",
                    indexer.name, schedule.interval
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_sync_shared::{FieldDefinition, Suggester};

    fn schema_with(fields: Vec<FieldDefinition>) -> IndexSchema {
        IndexSchema::new("geonames", fields)
    }

    #[test]
    fn test_single_key_schema_is_valid() {
        let schema = schema_with(vec![
            FieldDefinition::new("FEATURE_ID", FieldType::String).key(),
            FieldDefinition::new("FEATURE_NAME", FieldType::String)
                .searchable()
                .filterable()
                .sortable(),
            FieldDefinition::new("ELEV_IN_M", FieldType::Int32)
                .filterable()
                .facetable(),
        ])
        .with_suggester(Suggester::new("sg", ["FEATURE_NAME"]));

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_schema_without_key_is_rejected() {
        let schema = schema_with(vec![FieldDefinition::new("FEATURE_ID", FieldType::String)]);
        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("found none"));
    }

    #[test]
    fn test_schema_with_two_keys_is_rejected() {
        let schema = schema_with(vec![
            FieldDefinition::new("a", FieldType::String).key(),
            FieldDefinition::new("b", FieldType::String).key(),
        ]);
        let err = validate_schema(&schema).unwrap_err();
        assert!(matches!(err, ProvisioningError::ValidationError(_)));
        assert!(err.to_string().contains("found 2: a, b"));
    }

    #[test]
    fn test_non_string_key_is_rejected() {
        let schema = schema_with(vec![FieldDefinition::new("id", FieldType::Int32).key()]);
        assert!(validate_schema(&schema).is_err());
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let schema = schema_with(vec![
            FieldDefinition::new("id", FieldType::String).key(),
            FieldDefinition::new("name", FieldType::String),
            FieldDefinition::new("name", FieldType::String),
        ]);
        assert!(validate_schema(&schema).is_err());
    }

    #[test]
    fn test_capability_rules() {
        let searchable_int = schema_with(vec![
            FieldDefinition::new("id", FieldType::String).key(),
            FieldDefinition::new("count", FieldType::Int32).searchable(),
        ]);
        assert!(validate_schema(&searchable_int).is_err());

        let sortable_collection = schema_with(vec![
            FieldDefinition::new("id", FieldType::String).key(),
            FieldDefinition::new("tags", FieldType::StringCollection).sortable(),
        ]);
        assert!(validate_schema(&sortable_collection).is_err());
    }

    #[test]
    fn test_suggester_must_use_searchable_fields() {
        let schema = schema_with(vec![
            FieldDefinition::new("id", FieldType::String).key(),
            FieldDefinition::new("title", FieldType::String),
        ])
        .with_suggester(Suggester::new("sg", ["title"]));
        assert!(validate_schema(&schema).is_err());

        let unknown = schema_with(vec![FieldDefinition::new("id", FieldType::String).key()])
            .with_suggester(Suggester::new("sg", ["missing"]));
        let err = validate_schema(&unknown).unwrap_err();
        assert!(err.to_string().contains("unknown field 'missing'"));
    }

    #[test]
    fn test_index_name_rules() {
        let upper = IndexSchema::new(
            "GeoNames",
            vec![FieldDefinition::new("id", FieldType::String).key()],
        );
        assert!(validate_schema(&upper).is_err());

        let dash = IndexSchema::new(
            "-geonames",
            vec![FieldDefinition::new("id", FieldType::String).key()],
        );
        assert!(validate_schema(&dash).is_err());
    }

    #[test]
    fn test_data_source_requires_connection_string() {
        let source = DataSourceConnection::sql("usgs-datasource", "", "GeoNamesRI");
        assert!(validate_data_source(&source).is_err());

        let source = DataSourceConnection::sql("usgs-datasource", "Server=tcp:x", "GeoNamesRI");
        assert!(validate_data_source(&source).is_ok());
    }

    #[test]
    fn test_indexer_schedule_minimum() {
        let indexer = Indexer::new("usgs-indexer", "usgs-datasource", "geonames")
            .with_schedule(IndexingSchedule::every_minutes(2));
        assert!(validate_indexer(&indexer).is_err());

        let indexer = Indexer::new("usgs-indexer", "usgs-datasource", "geonames")
            .with_schedule(IndexingSchedule::every_minutes(120));
        assert!(validate_indexer(&indexer).is_ok());
    }
}
