//! Query parameter and result shapes shared by every data source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Filter;
use crate::sort::OrderBy;

/// A structured query descriptor.
///
/// Field names follow the `$`-prefixed wire spellings used in view
/// configurations, so a `QueryParams` embeds directly in declarative
/// schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Ordered list of fields to project.
    #[serde(rename = "$select", default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,

    /// Filter: flat condition map or predicate AST.
    #[serde(rename = "$filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    /// Sort keys in any of the three accepted shapes.
    #[serde(rename = "$orderby", default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    /// Number of records to drop before the page starts.
    #[serde(rename = "$skip", default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,

    /// Page size cap, applied after `$skip`.
    #[serde(rename = "$top", default, skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,

    /// Related entities to expand (pass-through for HTTP backends).
    #[serde(rename = "$expand", default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<Vec<String>>,

    /// Free-text substring search across string fields.
    #[serde(rename = "$search", default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Whether the backend should include a total count.
    #[serde(rename = "$count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A normalized page of query results.
///
/// `total` reflects the pre-pagination count when computable, so
/// `data.len() <= total` is not guaranteed; `has_more` is advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub data: Vec<Value>,

    #[serde(default)]
    pub total: usize,

    #[serde(rename = "hasMore", default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a bare record list, using its length as the total.
    pub fn from_records(data: Vec<Value>) -> Self {
        Self {
            total: data.len(),
            data,
            has_more: None,
            cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterNode;
    use serde_json::json;

    #[test]
    fn test_params_wire_names() {
        let params: QueryParams = serde_json::from_value(json!({
            "$select": ["name", "age"],
            "$filter": {"status": "active"},
            "$orderby": ["-age"],
            "$skip": 10,
            "$top": 5,
            "$search": "ali",
            "$count": true
        }))
        .unwrap();

        assert_eq!(params.select.as_deref(), Some(["name".to_string(), "age".to_string()].as_slice()));
        assert_eq!(params.skip, Some(10));
        assert_eq!(params.top, Some(5));
        assert_eq!(params.search.as_deref(), Some("ali"));
        assert_eq!(params.count, Some(true));
        assert!(matches!(params.filter, Some(Filter::Object(_))));

        let round = serde_json::to_value(&params).unwrap();
        assert_eq!(round["$skip"], 10);
        assert_eq!(round["$filter"], json!({"status": "active"}));
        assert_eq!(round["$orderby"], json!(["-age"]));
    }

    #[test]
    fn test_ast_filter_param() {
        let params: QueryParams = serde_json::from_value(json!({
            "$filter": ["and", ["a", "=", 1], ["b", ">", 2]]
        }))
        .unwrap();
        match params.filter {
            Some(Filter::Ast(FilterNode::Group { nodes, .. })) => assert_eq!(nodes.len(), 2),
            other => panic!("expected AST group, got {:?}", other),
        }
    }

    #[test]
    fn test_query_result_from_records() {
        let result = QueryResult::from_records(vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(result.total, 2);
        assert_eq!(result.data.len(), 2);
        assert!(result.has_more.is_none());
    }
}
