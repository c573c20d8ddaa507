//! Query request and response types.
//!
//! These mirror the JSON bodies of the service's document endpoints
//! (`docs/search`, `docs/suggest`, `docs/autocomplete`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether any or all search terms must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    Any,
    All,
}

/// How autocomplete builds its completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutocompleteMode {
    OneTerm,
    TwoTerms,
    OneTermWithContext,
}

/// Body of a `docs/search` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
}

impl SearchRequest {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Default::default()
        }
    }

    /// Match every document; useful for facet-only requests.
    pub fn match_all() -> Self {
        Self::new("*")
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }
}

/// Body of a `docs/suggest` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub search: String,
    pub suggester_name: String,
    pub fuzzy: bool,
    pub top: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Body of a `docs/autocomplete` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    pub search: String,
    pub suggester_name: String,
    pub autocomplete_mode: AutocompleteMode,
    pub fuzzy: bool,
    pub top: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// One suggestion: the matched text plus any selected document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "@search.text")]
    pub text: String,
    #[serde(flatten)]
    pub document: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub text: String,
    #[serde(default)]
    pub query_plus_text: String,
}

/// `{ "value": [...] }` envelope shared by the list-shaped responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList<T> {
    pub value: Vec<T>,
}

/// One bucket of a facet aggregation.
///
/// `value` is kept as raw JSON: numeric facets come back as numbers and
/// string facets as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: Value,
    pub count: u64,
}

/// Response of a `docs/search` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(rename = "@search.facets", default)]
    pub facets: HashMap<String, Vec<FacetCount>>,
    #[serde(default)]
    pub value: Vec<Map<String, Value>>,
}

/// Build a facet expression such as `agency,count:500`.
pub fn facet_expression(field: &str, max_values: u32) -> String {
    format!("{},count:{}", field, max_values)
}

/// Build a security-trimming filter matching documents whose `field`
/// collection contains any of `groups`.
///
/// Produces `groupIds/any(g:search.in(g, 'a, b'))`. Single quotes in group
/// ids are doubled as the filter syntax requires.
pub fn group_filter<S: AsRef<str>>(field: &str, groups: &[S]) -> String {
    let joined = groups
        .iter()
        .map(|g| g.as_ref().replace('\'', "''"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}/any(g:search.in(g, '{}'))", field, joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_skips_unset_options() {
        let request = SearchRequest::new("lake").with_mode(SearchMode::All);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value, json!({ "search": "lake", "searchMode": "all" }));
    }

    #[test]
    fn test_facet_only_request() {
        let request = SearchRequest::match_all()
            .with_top(0)
            .with_facet(facet_expression("agency", 500));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["search"], "*");
        assert_eq!(value["top"], 0);
        assert_eq!(value["facets"], json!(["agency,count:500"]));
    }

    #[test]
    fn test_autocomplete_mode_wire_name() {
        let value = serde_json::to_value(AutocompleteMode::OneTermWithContext).unwrap();
        assert_eq!(value, json!("oneTermWithContext"));
    }

    #[test]
    fn test_search_results_parse_facets() {
        let payload = json!({
            "@odata.count": 3,
            "@search.facets": {
                "agency": [
                    { "value": "DEPT OF PARKS", "count": 2 },
                    { "value": "POLICE", "count": 1 }
                ],
                "ELEV_IN_M": [ { "value": 12, "count": 7 } ]
            },
            "value": []
        });

        let results: SearchResults = serde_json::from_value(payload).unwrap();
        assert_eq!(results.count, Some(3));
        assert_eq!(results.facets["agency"].len(), 2);
        assert_eq!(results.facets["agency"][0].value, json!("DEPT OF PARKS"));
        assert_eq!(results.facets["ELEV_IN_M"][0].value, json!(12));
    }

    #[test]
    fn test_suggestion_keeps_selected_fields() {
        let payload = json!({ "@search.text": "<b>Bus</b> driver", "id": "17" });
        let suggestion: Suggestion = serde_json::from_value(payload).unwrap();

        assert_eq!(suggestion.text, "<b>Bus</b> driver");
        assert_eq!(suggestion.document["id"], json!("17"));
    }

    #[test]
    fn test_group_filter() {
        assert_eq!(
            group_filter("groupIds", &["group1", "group2"]),
            "groupIds/any(g:search.in(g, 'group1, group2'))"
        );
        assert_eq!(
            group_filter("groupIds", &["o'brien"]),
            "groupIds/any(g:search.in(g, 'o''brien'))"
        );
    }
}
