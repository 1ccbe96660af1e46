//! Filter representation and evaluation.
//!
//! Two filter dialects coexist in view configurations: a MongoDB-like flat
//! object of field conditions, and a nested-array predicate AST. `Filter` is
//! the sum type covering both; each dialect has its own evaluator and the two
//! are not interoperable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::helpers::{compare_values, get_field_value, value_to_string, values_equal};

/// A view filter: either a flat object of field conditions or a predicate AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Flat map of field -> condition; implicit AND across fields.
    Object(Map<String, Value>),
    /// Nested `[field, op, value]` / `["and"|"or", ...]` predicate tree.
    Ast(FilterNode),
}

impl Filter {
    /// Build a filter from its JSON wire shape. Arrays parse as an AST,
    /// objects as a condition map; anything else is not a filter.
    pub fn from_value(value: &Value) -> Option<Filter> {
        match value {
            Value::Object(map) => Some(Filter::Object(map.clone())),
            Value::Array(_) => Some(Filter::Ast(FilterNode::parse(value))),
            _ => None,
        }
    }

    /// The JSON wire shape of this filter.
    pub fn to_value(&self) -> Value {
        match self {
            Filter::Object(map) => Value::Object(map.clone()),
            Filter::Ast(node) => node.to_value(),
        }
    }

    /// Evaluate this filter against a record.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Filter::Object(map) => matches_object_filter(record, map),
            Filter::Ast(node) => matches_ast_filter(record, node),
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Filter::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a filter object or AST array"))
    }
}

/// One node of the predicate AST.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Empty or unrecognized node; matches every record.
    MatchAll,
    /// `[field, operator, value]` leaf.
    Condition(FilterCondition),
    /// `["and"|"or", ...nodes]` logical group.
    Group {
        logic: GroupLogic,
        nodes: Vec<FilterNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLogic {
    And,
    Or,
}

impl GroupLogic {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupLogic::And => "and",
            GroupLogic::Or => "or",
        }
    }
}

/// Leaf comparison operators. Unknown spellings are preserved so the
/// evaluator can report them before falling back to match-all.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    Between,
    Other(String),
}

impl FilterOp {
    pub fn parse(s: &str) -> FilterOp {
        match s.to_ascii_lowercase().as_str() {
            "=" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Gte,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Lte,
            "in" => FilterOp::In,
            "not in" | "notin" => FilterOp::NotIn,
            "contains" => FilterOp::Contains,
            "notcontains" => FilterOp::NotContains,
            "startswith" => FilterOp::StartsWith,
            "between" => FilterOp::Between,
            _ => FilterOp::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not in",
            FilterOp::Contains => "contains",
            FilterOp::NotContains => "notcontains",
            FilterOp::StartsWith => "startswith",
            FilterOp::Between => "between",
            FilterOp::Other(s) => s,
        }
    }
}

impl FilterNode {
    /// Parse a node from its nested-array wire shape.
    ///
    /// Malformed shapes degrade to `MatchAll` rather than failing, so a bad
    /// filter renders everything instead of rendering nothing.
    pub fn parse(value: &Value) -> FilterNode {
        let items = match value.as_array() {
            Some(items) => items,
            None => return FilterNode::MatchAll,
        };
        if items.is_empty() {
            return FilterNode::MatchAll;
        }

        if let Some(logic) = items[0].as_str() {
            match logic.to_ascii_lowercase().as_str() {
                "and" => {
                    return FilterNode::Group {
                        logic: GroupLogic::And,
                        nodes: items[1..].iter().map(FilterNode::parse).collect(),
                    }
                }
                "or" => {
                    return FilterNode::Group {
                        logic: GroupLogic::Or,
                        nodes: items[1..].iter().map(FilterNode::parse).collect(),
                    }
                }
                _ => {}
            }
        }

        if items.len() == 3 {
            if let (Some(field), Some(op)) = (items[0].as_str(), items[1].as_str()) {
                return FilterNode::Condition(FilterCondition {
                    field: field.to_string(),
                    operator: FilterOp::parse(op),
                    value: items[2].clone(),
                });
            }
        }

        tracing::warn!(node = %value, "unrecognized filter node shape, treating as match-all");
        FilterNode::MatchAll
    }

    /// The nested-array wire shape of this node.
    pub fn to_value(&self) -> Value {
        match self {
            FilterNode::MatchAll => Value::Array(vec![]),
            FilterNode::Condition(cond) => Value::Array(vec![
                Value::String(cond.field.clone()),
                Value::String(cond.operator.as_str().to_string()),
                cond.value.clone(),
            ]),
            FilterNode::Group { logic, nodes } => {
                let mut items = vec![Value::String(logic.as_str().to_string())];
                items.extend(nodes.iter().map(FilterNode::to_value));
                Value::Array(items)
            }
        }
    }
}

/// Evaluate a predicate AST node against a record.
pub fn matches_ast_filter(record: &Value, node: &FilterNode) -> bool {
    match node {
        FilterNode::MatchAll => true,
        FilterNode::Group { logic, nodes } => match logic {
            GroupLogic::And => nodes.iter().all(|n| matches_ast_filter(record, n)),
            GroupLogic::Or => nodes.iter().any(|n| matches_ast_filter(record, n)),
        },
        FilterNode::Condition(cond) => matches_condition(record, cond),
    }
}

fn matches_condition(record: &Value, cond: &FilterCondition) -> bool {
    let actual = get_field_value(record, &cond.field);

    match &cond.operator {
        FilterOp::Eq => values_equal(&actual, &cond.value),
        FilterOp::Ne => !values_equal(&actual, &cond.value),
        FilterOp::Gt => compare_values(&actual, &cond.value) == Some(std::cmp::Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_values(&actual, &cond.value),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        FilterOp::Lt => compare_values(&actual, &cond.value) == Some(std::cmp::Ordering::Less),
        FilterOp::Lte => matches!(
            compare_values(&actual, &cond.value),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        FilterOp::In => cond
            .value
            .as_array()
            .map(|arr| arr.iter().any(|v| values_equal(&actual, v)))
            .unwrap_or(false),
        FilterOp::NotIn => cond
            .value
            .as_array()
            .map(|arr| !arr.iter().any(|v| values_equal(&actual, v)))
            .unwrap_or(true),
        FilterOp::Contains => string_contains(&actual, &cond.value),
        FilterOp::NotContains => !string_contains(&actual, &cond.value),
        FilterOp::StartsWith => actual
            .as_str()
            .map(|s| {
                s.to_lowercase()
                    .starts_with(&value_to_string(&cond.value).to_lowercase())
            })
            .unwrap_or(false),
        FilterOp::Between => matches_between(&actual, &cond.value),
        FilterOp::Other(op) => {
            tracing::warn!(operator = %op, field = %cond.field, "unknown filter operator, treating as match");
            true
        }
    }
}

/// Case-insensitive substring match; only string record values ever match.
fn string_contains(actual: &Value, needle: &Value) -> bool {
    actual
        .as_str()
        .map(|s| {
            s.to_lowercase()
                .contains(&value_to_string(needle).to_lowercase())
        })
        .unwrap_or(false)
}

/// Inclusive range check; the filter value must be a 2-element array.
fn matches_between(actual: &Value, range: &Value) -> bool {
    let bounds = match range.as_array() {
        Some(arr) if arr.len() == 2 => arr,
        _ => return false,
    };
    matches!(
        compare_values(actual, &bounds[0]),
        Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
    ) && matches!(
        compare_values(actual, &bounds[1]),
        Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
    )
}

/// Evaluate a flat object filter against a record.
///
/// Conditions that are objects are operator bags (`$gt`, `$gte`, `$lt`,
/// `$lte`, `$ne`, `$in`, `$contains`) where every operator must pass;
/// primitive conditions are equality checks. All fields must match.
pub fn matches_object_filter(record: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(field, condition)| {
        let actual = get_field_value(record, field);
        match condition {
            Value::Object(ops) => ops.iter().all(|(op, expected)| match op.as_str() {
                "$gt" => compare_values(&actual, expected) == Some(std::cmp::Ordering::Greater),
                "$gte" => matches!(
                    compare_values(&actual, expected),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ),
                "$lt" => compare_values(&actual, expected) == Some(std::cmp::Ordering::Less),
                "$lte" => matches!(
                    compare_values(&actual, expected),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                ),
                "$ne" => !values_equal(&actual, expected),
                "$in" => expected
                    .as_array()
                    .map(|arr| arr.iter().any(|v| values_equal(&actual, v)))
                    .unwrap_or(false),
                "$contains" => string_contains(&actual, expected),
                other => {
                    tracing::warn!(operator = %other, field = %field, "unknown filter operator, treating as match");
                    true
                }
            }),
            other => values_equal(&actual, other),
        }
    })
}

/// Free-text search: case-insensitive substring match across the record's
/// top-level string-valued fields.
pub fn matches_search(record: &Value, query: &str) -> bool {
    let needle = query.to_lowercase();
    match record {
        Value::Object(obj) => obj.values().any(|v| {
            v.as_str()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> FilterNode {
        FilterNode::parse(&value)
    }

    #[test]
    fn test_leaf_operators() {
        let doc = json!({"name": "Charlie", "age": 30, "tags": ["a", "b"]});

        assert!(matches_ast_filter(&doc, &parse(json!(["age", "=", 30]))));
        assert!(matches_ast_filter(&doc, &parse(json!(["age", "!=", 31]))));
        assert!(matches_ast_filter(&doc, &parse(json!(["age", ">", 25]))));
        assert!(matches_ast_filter(&doc, &parse(json!(["age", ">=", 30]))));
        assert!(matches_ast_filter(&doc, &parse(json!(["age", "<", 31]))));
        assert!(matches_ast_filter(&doc, &parse(json!(["age", "<=", 30]))));
        assert!(!matches_ast_filter(&doc, &parse(json!(["age", ">", 30]))));
    }

    #[test]
    fn test_membership_operators() {
        let doc = json!({"status": "active"});

        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["status", "in", ["active", "pending"]]))
        ));
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["status", "in", ["closed"]]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["status", "not in", ["closed"]]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["status", "notin", ["closed"]]))
        ));
        // Non-array operand: `in` never matches, `not in` always does
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["status", "in", "active"]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["status", "not in", "active"]))
        ));
    }

    #[test]
    fn test_string_operators() {
        let doc = json!({"name": "Charlie", "age": 30});

        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["name", "contains", "HARL"]))
        ));
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["name", "contains", "xyz"]))
        ));
        // Non-string record values never match contains
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["age", "contains", "3"]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["age", "notcontains", "3"]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["name", "startswith", "cha"]))
        ));
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["name", "startswith", "har"]))
        ));
    }

    #[test]
    fn test_between() {
        let doc = json!({"age": 30});
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["age", "between", [30, 40]]))
        ));
        assert!(matches_ast_filter(
            &doc,
            &parse(json!(["age", "between", [20, 30]]))
        ));
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["age", "between", [31, 40]]))
        ));
        // Malformed range never matches
        assert!(!matches_ast_filter(
            &doc,
            &parse(json!(["age", "between", [30]]))
        ));
    }

    #[test]
    fn test_logical_groups() {
        let doc = json!({"age": 30, "role": "admin"});
        let a = parse(json!(["age", ">=", 25]));
        let b = parse(json!(["role", "=", "admin"]));

        let and = parse(json!(["and", ["age", ">=", 25], ["role", "=", "admin"]]));
        assert_eq!(
            matches_ast_filter(&doc, &and),
            matches_ast_filter(&doc, &a) && matches_ast_filter(&doc, &b)
        );

        let or = parse(json!(["or", ["age", ">", 99], ["role", "=", "admin"]]));
        assert!(matches_ast_filter(&doc, &or));

        let nested = parse(json!([
            "and",
            ["age", ">=", 25],
            ["or", ["role", "=", "admin"], ["role", "=", "owner"]]
        ]));
        assert!(matches_ast_filter(&doc, &nested));
    }

    #[test]
    fn test_permissive_fallbacks() {
        let doc = json!({"age": 30});
        // Empty node matches everything
        assert!(matches_ast_filter(&doc, &parse(json!([]))));
        // Unknown operators match everything
        assert!(matches_ast_filter(&doc, &parse(json!(["age", "~~", 5]))));
        // Unrecognized shapes match everything
        assert!(matches_ast_filter(&doc, &parse(json!(["age", 30]))));
    }

    #[test]
    fn test_object_filter() {
        let doc = json!({"status": "active", "age": 30, "name": "Alice"});

        let filter = json!({"status": "active"});
        assert!(matches_object_filter(&doc, filter.as_object().unwrap()));

        let filter = json!({"status": "active", "age": {"$gt": 25, "$lt": 35}});
        assert!(matches_object_filter(&doc, filter.as_object().unwrap()));

        let filter = json!({"age": {"$gt": 25, "$lt": 28}});
        assert!(!matches_object_filter(&doc, filter.as_object().unwrap()));

        let filter = json!({"age": {"$ne": 31}, "name": {"$contains": "lic"}});
        assert!(matches_object_filter(&doc, filter.as_object().unwrap()));

        let filter = json!({"status": {"$in": ["active", "pending"]}});
        assert!(matches_object_filter(&doc, filter.as_object().unwrap()));

        let filter = json!({"status": "closed"});
        assert!(!matches_object_filter(&doc, filter.as_object().unwrap()));
    }

    #[test]
    fn test_search() {
        let doc = json!({"name": "Alice Smith", "age": 30, "city": "Portland"});
        assert!(matches_search(&doc, "smith"));
        assert!(matches_search(&doc, "PORT"));
        assert!(!matches_search(&doc, "30")); // numbers are not searched
        assert!(!matches_search(&doc, "berlin"));
    }

    #[test]
    fn test_filter_round_trip() {
        let wire = json!(["and", ["age", ">", 21], ["name", "startswith", "a"]]);
        let filter = Filter::from_value(&wire).unwrap();
        assert_eq!(filter.to_value(), wire);

        let wire = json!({"status": "active", "age": {"$gte": 18}});
        let filter = Filter::from_value(&wire).unwrap();
        assert_eq!(filter.to_value(), wire);

        assert!(Filter::from_value(&json!("nope")).is_none());
    }
}
