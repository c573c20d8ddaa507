//! Index schema definitions.
//!
//! An [`IndexSchema`] is submitted to the search service as a whole and is
//! never patched in place: updating a schema means deleting the index and
//! creating it again.

use serde::{Deserialize, Serialize};

/// Primitive type of a field in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,
    #[serde(rename = "Edm.Int32")]
    Int32,
    #[serde(rename = "Edm.Int64")]
    Int64,
    #[serde(rename = "Edm.Double")]
    Double,
    #[serde(rename = "Edm.Boolean")]
    Boolean,
    #[serde(rename = "Edm.DateTimeOffset")]
    DateTimeOffset,
    #[serde(rename = "Edm.GeographyPoint")]
    GeographyPoint,
    #[serde(rename = "Collection(Edm.String)")]
    StringCollection,
}

impl FieldType {
    /// Whether full-text search can be enabled on this type.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::StringCollection)
    }

    /// Whether this is a multi-valued type.
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::StringCollection)
    }
}

/// A single field of an index schema and its capability flags.
///
/// Capabilities default to `false`; use the builder methods to turn them on.
///
/// ```ignore
/// let field = FieldDefinition::new("STATE_NUMERIC", FieldType::Int32)
///     .filterable()
///     .sortable()
///     .facetable();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub facetable: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            key: false,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
        }
    }

    /// Mark this field as the document key.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }
}

/// A named suggester backing suggest and autocomplete requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggester {
    pub name: String,
    pub search_mode: String,
    pub source_fields: Vec<String>,
}

impl Suggester {
    /// The only search mode the service accepts for suggesters.
    pub const SEARCH_MODE: &'static str = "analyzingInfixMatching";

    pub fn new<I, S>(name: impl Into<String>, source_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            search_mode: Self::SEARCH_MODE.to_string(),
            source_fields: source_fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A complete index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggesters: Vec<Suggester>,
}

impl IndexSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            fields,
            suggesters: Vec::new(),
        }
    }

    /// Attach a suggester to the schema.
    pub fn with_suggester(mut self, suggester: Suggester) -> Self {
        self.suggesters.push(suggester);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields flagged as key, in declaration order.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_serializes_to_wire_shape() {
        let field = FieldDefinition::new("FEATURE_ID", FieldType::String).key();
        let value = serde_json::to_value(&field).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "FEATURE_ID",
                "type": "Edm.String",
                "key": true,
                "searchable": false,
                "filterable": false,
                "sortable": false,
                "facetable": false
            })
        );
    }

    #[test]
    fn test_schema_omits_empty_suggesters() {
        let schema = IndexSchema::new(
            "geonames",
            vec![FieldDefinition::new("id", FieldType::String).key()],
        );
        let value = serde_json::to_value(&schema).unwrap();
        assert!(value.get("suggesters").is_none());

        let schema = schema.with_suggester(Suggester::new("sg", ["id"]));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["suggesters"][0]["searchMode"], "analyzingInfixMatching");
    }

    #[test]
    fn test_collection_type_name() {
        let value = serde_json::to_value(FieldType::StringCollection).unwrap();
        assert_eq!(value, json!("Collection(Edm.String)"));
        assert!(FieldType::StringCollection.is_collection());
        assert!(FieldType::StringCollection.is_textual());
        assert!(!FieldType::Int32.is_textual());
    }

    #[test]
    fn test_key_fields() {
        let schema = IndexSchema::new(
            "hotels",
            vec![
                FieldDefinition::new("HotelId", FieldType::String).key(),
                FieldDefinition::new("HotelName", FieldType::String).searchable(),
            ],
        );
        assert_eq!(schema.key_fields().count(), 1);
        assert!(schema.field("HotelName").unwrap().searchable);
        assert!(schema.field("missing").is_none());
    }
}
