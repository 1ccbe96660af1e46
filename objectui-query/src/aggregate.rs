//! Client-side group-by aggregation.
//!
//! Used natively by the in-memory data source and as the fallback for chart
//! components whose active data source has no aggregate support.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::Filter;
use crate::helpers::{get_field_value, js_number, number_from_f64, value_to_string};

/// Reduction applied to each group's values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    #[default]
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }
}

/// Parameters for a group-by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateParams {
    /// Field whose values are reduced.
    pub field: String,

    /// Reduction function; `sum` when unspecified.
    #[serde(default)]
    pub function: AggregateFunction,

    /// Field whose stringified value keys each group.
    #[serde(rename = "groupBy")]
    pub group_by: String,

    /// Optional pre-aggregation filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl AggregateParams {
    pub fn new(field: &str, function: AggregateFunction, group_by: &str) -> Self {
        Self {
            field: field.to_string(),
            function,
            group_by: group_by.to_string(),
            filter: None,
        }
    }
}

/// Group records by the stringified `group_by` value and reduce each group's
/// `field` values.
///
/// Missing and null group keys collapse into a literal `"Unknown"` group.
/// Field values coerce number-style (non-numeric becomes 0) so one bad
/// record never poisons a whole aggregation. Returns one row per group,
/// `{ <group_by>: key, <field>: result }`; group order follows first
/// appearance in the input.
pub fn aggregate_records(records: &[Value], params: &AggregateParams) -> Vec<Value> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();

    for record in records {
        if let Some(filter) = &params.filter {
            if !filter.matches(record) {
                continue;
            }
        }
        let key = group_key(&get_field_value(record, &params.group_by));
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    let mut rows = Vec::with_capacity(order.len());
    for key in order {
        let members = &groups[&key];
        let values: Vec<f64> = members
            .iter()
            .map(|r| js_number(&get_field_value(r, &params.field)))
            .collect();

        let result = match params.function {
            AggregateFunction::Count => Value::Number(serde_json::Number::from(members.len())),
            AggregateFunction::Sum => Value::Number(number_from_f64(values.iter().sum())),
            AggregateFunction::Avg => Value::Number(number_from_f64(
                values.iter().sum::<f64>() / values.len() as f64,
            )),
            AggregateFunction::Min => Value::Number(number_from_f64(
                values.iter().copied().fold(f64::INFINITY, f64::min),
            )),
            AggregateFunction::Max => Value::Number(number_from_f64(
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )),
        };

        let mut row = Map::new();
        row.insert(params.group_by.clone(), Value::String(key));
        row.insert(params.field.clone(), result);
        rows.push(Value::Object(row));
    }

    rows
}

fn group_key(value: &Value) -> String {
    if value.is_null() {
        "Unknown".to_string()
    } else {
        value_to_string(value)
    }
}

/// Peel a raw query response down to a flat record array.
///
/// Accepts a bare array or an object carrying `.records`, `.data`, or
/// `.value` (checked in that order); anything else yields an empty list.
pub fn extract_records(response: &Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        Value::Object(obj) => {
            for key in ["records", "data", "value"] {
                if let Some(Value::Array(items)) = obj.get(key) {
                    return items.clone();
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn find_row<'a>(rows: &'a [Value], group_by: &str, key: &str) -> &'a Value {
        rows.iter()
            .find(|r| r[group_by] == key)
            .unwrap_or_else(|| panic!("no row for group {}", key))
    }

    #[test]
    fn test_sum_by_group() {
        let records = vec![
            json!({"a": "x", "v": 10}),
            json!({"a": "x", "v": 20}),
            json!({"a": "y", "v": 5}),
        ];
        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Sum, "a"),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(find_row(&rows, "a", "x")["v"].as_f64(), Some(30.0));
        assert_eq!(find_row(&rows, "a", "y")["v"].as_f64(), Some(5.0));
    }

    #[test]
    fn test_count_avg_min_max() {
        let records = vec![
            json!({"g": "a", "v": 10}),
            json!({"g": "a", "v": 20}),
            json!({"g": "b", "v": 7}),
        ];

        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Count, "g"),
        );
        assert_eq!(find_row(&rows, "g", "a")["v"], json!(2));

        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Avg, "g"),
        );
        assert_eq!(find_row(&rows, "g", "a")["v"].as_f64(), Some(15.0));

        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Min, "g"),
        );
        assert_eq!(find_row(&rows, "g", "a")["v"].as_f64(), Some(10.0));

        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Max, "g"),
        );
        assert_eq!(find_row(&rows, "g", "a")["v"].as_f64(), Some(20.0));
    }

    #[test]
    fn test_missing_group_key_is_unknown() {
        let records = vec![
            json!({"v": 3}),
            json!({"cat": null, "v": 4}),
            json!({"cat": "known", "v": 5}),
        ];
        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Sum, "cat"),
        );
        assert_eq!(find_row(&rows, "cat", "Unknown")["v"].as_f64(), Some(7.0));
        assert_eq!(find_row(&rows, "cat", "known")["v"].as_f64(), Some(5.0));
    }

    #[test]
    fn test_non_numeric_values_coerce_to_zero() {
        let records = vec![
            json!({"g": "a", "v": "oops"}),
            json!({"g": "a", "v": 10}),
            json!({"g": "a"}),
        ];
        let rows = aggregate_records(
            &records,
            &AggregateParams::new("v", AggregateFunction::Sum, "g"),
        );
        assert_eq!(rows[0]["v"].as_f64(), Some(10.0));
    }

    #[test]
    fn test_filtered_aggregation() {
        let records = vec![
            json!({"g": "a", "v": 10, "keep": true}),
            json!({"g": "a", "v": 20, "keep": false}),
        ];
        let mut params = AggregateParams::new("v", AggregateFunction::Sum, "g");
        params.filter = Filter::from_value(&json!({"keep": true}));
        let rows = aggregate_records(&records, &params);
        assert_eq!(rows[0]["v"].as_f64(), Some(10.0));
    }

    #[test]
    fn test_extract_records_shapes() {
        let rows = json!([{"id": 1}]);
        assert_eq!(extract_records(&rows).len(), 1);
        assert_eq!(extract_records(&json!({"records": [{"id": 1}]})).len(), 1);
        assert_eq!(extract_records(&json!({"data": [{"id": 1}, {"id": 2}]})).len(), 2);
        assert_eq!(extract_records(&json!({"value": [{"id": 1}]})).len(), 1);
        assert!(extract_records(&json!({"other": [1]})).is_empty());
        assert!(extract_records(&json!(null)).is_empty());
        assert!(extract_records(&json!("text")).is_empty());
    }
}
