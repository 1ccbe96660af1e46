//! Core evaluation helper functions shared by the filter, sort, and
//! aggregation modules:
//! - get_field_value: Extract nested field values from JSON
//! - values_equal: Compare two JSON values for equality
//! - compare_values: Compare two JSON values for ordering
//! - js_number: Coerce a JSON value to a number, script-style
//! - value_to_string: Stringify a scalar for keys and IDs

use std::cmp::Ordering;

use serde_json::Value;

/// Extract a nested field value from a JSON document.
///
/// # Arguments
/// * `value` - The JSON value to extract from
/// * `field_path` - Dot-separated field path (e.g., "address.city")
///
/// # Returns
/// The field value, or Value::Null if not found
#[inline]
pub fn get_field_value(value: &Value, field_path: &str) -> Value {
    let mut current = value;

    for part in field_path.split('.') {
        match current.get(part) {
            Some(val) => current = val,
            None => return Value::Null,
        }
    }

    current.clone()
}

/// Compare two JSON values for equality.
///
/// Numbers are compared by their f64 representation for proper numeric comparison.
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Compare two JSON values for ordering.
///
/// Only number/number, string/string, and bool/bool pairs are comparable;
/// mixed-type pairs return None so relational filters never match them.
#[inline]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let af = a.as_f64()?;
            let bf = b.as_f64()?;
            af.partial_cmp(&bf)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Create a serde_json::Number from an f64 value.
#[inline]
pub fn number_from_f64(n: f64) -> serde_json::Number {
    serde_json::Number::from_f64(n).unwrap_or_else(|| serde_json::Number::from(0))
}

/// Coerce a JSON value to a number using `Number(x) || 0` semantics:
/// numbers pass through, numeric strings parse, booleans become 1/0,
/// everything else (including NaN) collapses to 0.
#[inline]
pub fn js_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Stringify a JSON value for use as a record ID or group key.
///
/// Scalars render without JSON quoting; composites fall back to their
/// JSON encoding.
#[inline]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_field_value() {
        let doc = json!({"name": "Alice", "address": {"city": "NYC"}});
        assert_eq!(get_field_value(&doc, "name"), json!("Alice"));
        assert_eq!(get_field_value(&doc, "address.city"), json!("NYC"));
        assert_eq!(get_field_value(&doc, "missing"), Value::Null);
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(1), &json!(1)));
        assert!(values_equal(&json!(1.0), &json!(1)));
        assert!(values_equal(&json!("hello"), &json!("hello")));
        assert!(!values_equal(&json!(1), &json!(2)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(1), &json!(2)), Some(Ordering::Less));
        assert_eq!(
            compare_values(&json!(2), &json!(1)),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_values(&json!("a"), &json!("b")), Some(Ordering::Less));
        // Mixed types are not comparable
        assert_eq!(compare_values(&json!(5), &json!("abc")), None);
        assert_eq!(compare_values(&Value::Null, &json!(1)), None);
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number(&json!(42)), 42.0);
        assert_eq!(js_number(&json!("3.5")), 3.5);
        assert_eq!(js_number(&json!("not a number")), 0.0);
        assert_eq!(js_number(&json!(true)), 1.0);
        assert_eq!(js_number(&json!(false)), 0.0);
        assert_eq!(js_number(&Value::Null), 0.0);
        assert_eq!(js_number(&json!([1, 2])), 0.0);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("abc")), "abc");
        assert_eq!(value_to_string(&json!(5)), "5");
        assert_eq!(value_to_string(&json!(true)), "true");
    }
}
