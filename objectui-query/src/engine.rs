//! The in-memory query pipeline: filter, search, sort, paginate, project.

use serde_json::{Map, Value};

use crate::filter::matches_search;
use crate::params::{QueryParams, QueryResult};
use crate::sort::apply_sort;

/// Run a full query over an owned record set.
///
/// Stages apply in a fixed order: filter, free-text search, total capture,
/// sort, skip/top, projection. `total` is the post-filter, pre-pagination
/// count, and projection runs last so `$select` never affects which records
/// match or how they sort.
pub fn run_query(records: Vec<Value>, params: &QueryParams) -> QueryResult {
    let mut records = match &params.filter {
        Some(filter) => records.into_iter().filter(|r| filter.matches(r)).collect(),
        None => records,
    };

    if let Some(query) = params.search.as_deref().filter(|q| !q.is_empty()) {
        records.retain(|r| matches_search(r, query));
    }

    let total = records.len();

    if let Some(order_by) = &params.order_by {
        apply_sort(&mut records, &order_by.normalize());
    }

    let skip = params.skip.unwrap_or(0);
    let mut records: Vec<Value> = records
        .into_iter()
        .skip(skip)
        .take(params.top.unwrap_or(usize::MAX))
        .collect();

    let has_more = skip + params.top.unwrap_or(records.len()) < total;

    if let Some(select) = params.select.as_deref().filter(|s| !s.is_empty()) {
        for record in &mut records {
            *record = select_record(record, select);
        }
    }

    QueryResult {
        data: records,
        total,
        has_more: Some(has_more),
        cursor: None,
    }
}

/// Project a record down to the named fields, in `$select` order.
/// Fields absent from the record are omitted; non-object records pass
/// through untouched.
pub fn select_record(record: &Value, fields: &[String]) -> Value {
    match record {
        Value::Object(obj) => {
            let mut selected = Map::new();
            for field in fields {
                if let Some(value) = obj.get(field) {
                    selected.insert(field.clone(), value.clone());
                }
            }
            Value::Object(selected)
        }
        other => other.clone(),
    }
}
