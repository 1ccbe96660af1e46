//! Order-by normalization and multi-key stable sort.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::helpers::{compare_values, get_field_value};

/// Sort direction for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One normalized sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

/// The `$orderby` parameter in any of its three accepted wire shapes.
///
/// Each shape normalizes to an ordered list of `SortClause`s but serializes
/// back to its original form so wire encoding stays faithful.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// `["-created", "name"]`; a leading `-` means descending.
    Fields(Vec<String>),
    /// `[{"field": "name", "order": "asc"}, ...]`
    Clauses(Vec<SortClause>),
    /// `{"name": "asc", "created": "desc"}`
    Map(Map<String, Value>),
}

impl OrderBy {
    pub fn from_value(value: &Value) -> Option<OrderBy> {
        match value {
            Value::Array(items) => {
                if items.iter().all(|v| v.is_string()) {
                    Some(OrderBy::Fields(
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect(),
                    ))
                } else {
                    let mut clauses = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(s) => clauses.push(parse_field_spec(s)),
                            Value::Object(obj) => {
                                let field = obj.get("field")?.as_str()?.to_string();
                                let order = obj
                                    .get("order")
                                    .map(parse_direction)
                                    .unwrap_or(SortOrder::Asc);
                                clauses.push(SortClause { field, order });
                            }
                            _ => return None,
                        }
                    }
                    Some(OrderBy::Clauses(clauses))
                }
            }
            Value::Object(map) => Some(OrderBy::Map(map.clone())),
            _ => None,
        }
    }

    /// Flatten to an ordered list of sort keys.
    pub fn normalize(&self) -> Vec<SortClause> {
        match self {
            OrderBy::Fields(fields) => fields.iter().map(|f| parse_field_spec(f)).collect(),
            OrderBy::Clauses(clauses) => clauses.clone(),
            OrderBy::Map(map) => map
                .iter()
                .map(|(field, direction)| SortClause {
                    field: field.clone(),
                    order: parse_direction(direction),
                })
                .collect(),
        }
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OrderBy::Fields(fields) => fields.serialize(serializer),
            OrderBy::Clauses(clauses) => clauses.serialize(serializer),
            OrderBy::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for OrderBy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        OrderBy::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("expected an order-by list or map"))
    }
}

fn parse_field_spec(spec: &str) -> SortClause {
    match spec.strip_prefix('-') {
        Some(field) => SortClause {
            field: field.to_string(),
            order: SortOrder::Desc,
        },
        None => SortClause {
            field: spec.to_string(),
            order: SortOrder::Asc,
        },
    }
}

fn parse_direction(direction: &Value) -> SortOrder {
    match direction {
        Value::String(s) if s.to_ascii_lowercase().starts_with("desc") => SortOrder::Desc,
        Value::Number(n) if n.as_f64().unwrap_or(0.0) < 0.0 => SortOrder::Desc,
        _ => SortOrder::Asc,
    }
}

/// Sort records in place by multiple sort keys.
///
/// The sort is stable: records comparing equal on every key retain their
/// original relative order. Null and missing values sort first ascending
/// and last descending.
pub fn apply_sort(records: &mut [Value], clauses: &[SortClause]) {
    records.sort_by(|a, b| {
        for clause in clauses {
            let av = get_field_value(a, &clause.field);
            let bv = get_field_value(b, &clause.field);

            let ordering = compare_sort_values(&av, &bv);
            if ordering == std::cmp::Ordering::Equal {
                continue;
            }
            return match clause.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
        }
        std::cmp::Ordering::Equal
    });
}

fn compare_sort_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(std::cmp::Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_asc_desc() {
        let mut docs = vec![json!({"x": 3}), json!({"x": 1}), json!({"x": 2})];
        apply_sort(
            &mut docs,
            &[SortClause {
                field: "x".to_string(),
                order: SortOrder::Asc,
            }],
        );
        assert_eq!(docs[0]["x"], 1);
        assert_eq!(docs[2]["x"], 3);

        apply_sort(
            &mut docs,
            &[SortClause {
                field: "x".to_string(),
                order: SortOrder::Desc,
            }],
        );
        assert_eq!(docs[0]["x"], 3);
        assert_eq!(docs[2]["x"], 1);
    }

    #[test]
    fn test_sort_stability() {
        let mut docs = vec![
            json!({"name": "B", "i": 0}),
            json!({"name": "A", "i": 1}),
            json!({"name": "B", "i": 2}),
        ];
        apply_sort(
            &mut docs,
            &[SortClause {
                field: "name".to_string(),
                order: SortOrder::Asc,
            }],
        );
        assert_eq!(docs[0]["name"], "A");
        // The two B records keep their original relative order
        assert_eq!(docs[1]["i"], 0);
        assert_eq!(docs[2]["i"], 2);
    }

    #[test]
    fn test_multi_key_sort() {
        let mut docs = vec![
            json!({"role": "b", "age": 1}),
            json!({"role": "a", "age": 2}),
            json!({"role": "a", "age": 1}),
        ];
        apply_sort(
            &mut docs,
            &[
                SortClause {
                    field: "role".to_string(),
                    order: SortOrder::Asc,
                },
                SortClause {
                    field: "age".to_string(),
                    order: SortOrder::Desc,
                },
            ],
        );
        assert_eq!(docs[0], json!({"role": "a", "age": 2}));
        assert_eq!(docs[1], json!({"role": "a", "age": 1}));
        assert_eq!(docs[2], json!({"role": "b", "age": 1}));
    }

    #[test]
    fn test_nulls_first_asc_last_desc() {
        let mut docs = vec![json!({"x": 2}), json!({}), json!({"x": 1})];
        apply_sort(
            &mut docs,
            &[SortClause {
                field: "x".to_string(),
                order: SortOrder::Asc,
            }],
        );
        assert_eq!(docs[0], json!({}));
        assert_eq!(docs[1]["x"], 1);

        apply_sort(
            &mut docs,
            &[SortClause {
                field: "x".to_string(),
                order: SortOrder::Desc,
            }],
        );
        assert_eq!(docs[0]["x"], 2);
        assert_eq!(docs[2], json!({}));
    }

    #[test]
    fn test_order_by_shapes() {
        let by_fields = OrderBy::from_value(&json!(["-created", "name"])).unwrap();
        assert_eq!(
            by_fields.normalize(),
            vec![
                SortClause {
                    field: "created".to_string(),
                    order: SortOrder::Desc
                },
                SortClause {
                    field: "name".to_string(),
                    order: SortOrder::Asc
                },
            ]
        );

        let by_clauses =
            OrderBy::from_value(&json!([{"field": "age", "order": "desc"}])).unwrap();
        assert_eq!(
            by_clauses.normalize(),
            vec![SortClause {
                field: "age".to_string(),
                order: SortOrder::Desc
            }]
        );

        let by_map = OrderBy::from_value(&json!({"name": "asc", "age": "desc"})).unwrap();
        assert_eq!(
            by_map.normalize(),
            vec![
                SortClause {
                    field: "name".to_string(),
                    order: SortOrder::Asc
                },
                SortClause {
                    field: "age".to_string(),
                    order: SortOrder::Desc
                },
            ]
        );

        assert!(OrderBy::from_value(&json!(42)).is_none());
    }
}
