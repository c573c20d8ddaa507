//! Document upload actions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentActionKind {
    Upload,
    Merge,
    MergeOrUpload,
    Delete,
}

/// A single document plus what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAction {
    #[serde(rename = "@search.action")]
    pub kind: DocumentActionKind,
    #[serde(flatten)]
    pub document: Map<String, Value>,
}

impl DocumentAction {
    pub fn new(kind: DocumentActionKind, document: Map<String, Value>) -> Self {
        Self { kind, document }
    }

    pub fn merge_or_upload(document: Map<String, Value>) -> Self {
        Self::new(DocumentActionKind::MergeOrUpload, document)
    }

    /// Delete by key only.
    pub fn delete(key_field: &str, key: impl Into<String>) -> Self {
        let mut document = Map::new();
        document.insert(key_field.to_string(), Value::String(key.into()));
        Self::new(DocumentActionKind::Delete, document)
    }

    /// The value of `key_field`, when present as a non-empty string.
    pub fn key(&self, key_field: &str) -> Option<&str> {
        self.document
            .get(key_field)
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
    }
}

/// Per-document result returned by the `docs/index` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResult {
    pub key: String,
    pub status: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_is_flattened_into_document() {
        let mut doc = Map::new();
        doc.insert("fileId".to_string(), json!("1"));
        doc.insert("groupIds".to_string(), json!(["group1"]));

        let value = serde_json::to_value(DocumentAction::merge_or_upload(doc)).unwrap();
        assert_eq!(
            value,
            json!({
                "@search.action": "mergeOrUpload",
                "fileId": "1",
                "groupIds": ["group1"]
            })
        );
    }

    #[test]
    fn test_key_lookup() {
        let action = DocumentAction::delete("fileId", "42");
        assert_eq!(action.kind, DocumentActionKind::Delete);
        assert_eq!(action.key("fileId"), Some("42"));
        assert_eq!(action.key("other"), None);

        let empty = DocumentAction::delete("fileId", "");
        assert_eq!(empty.key("fileId"), None);
    }
}
