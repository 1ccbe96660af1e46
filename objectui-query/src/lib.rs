//! ObjectUI Query - Storage-independent query engine for ObjectUI data
//! sources.
//!
//! This crate provides the pure in-memory query machinery shared by the
//! data-source adapters: parameter and result shapes, the two filter
//! dialects (flat condition maps and predicate ASTs), sort normalization,
//! pagination and projection, and group-by aggregation. It has no HTTP or
//! runtime dependencies and can be used by both adapters and tests.
//!
//! # Main Components
//!
//! - **Params**: `QueryParams` / `QueryResult` wire shapes
//! - **Filter**: `Filter` sum type and both evaluators
//! - **Sort**: `$orderby` normalization and stable multi-key sorting
//! - **Engine**: the filter -> search -> sort -> paginate -> select pipeline
//! - **Aggregate**: group-by reduction and response envelope peeling
//!
//! # Example
//!
//! ```rust
//! use objectui_query::{run_query, QueryParams};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"name": "Alice", "age": 34}),
//!     json!({"name": "Bob", "age": 28}),
//! ];
//!
//! let params: QueryParams = serde_json::from_value(json!({
//!     "$filter": ["age", ">", 30],
//!     "$select": ["name"],
//! }))
//! .unwrap();
//!
//! let result = run_query(records, &params);
//! assert_eq!(result.total, 1);
//! assert_eq!(result.data, vec![json!({"name": "Alice"})]);
//! ```

pub mod aggregate;
pub mod engine;
pub mod filter;
pub mod helpers;
pub mod params;
pub mod sort;

// Re-export main types for convenience
pub use aggregate::{aggregate_records, extract_records, AggregateFunction, AggregateParams};
pub use engine::{run_query, select_record};
pub use filter::{
    matches_ast_filter, matches_object_filter, matches_search, Filter, FilterCondition,
    FilterNode, FilterOp, GroupLogic,
};
pub use helpers::{
    compare_values, get_field_value, js_number, number_from_f64, value_to_string, values_equal,
};
pub use params::{QueryParams, QueryResult};
pub use sort::{apply_sort, OrderBy, SortClause, SortOrder};
