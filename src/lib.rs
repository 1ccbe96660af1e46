//! ObjectUI Data
//!
//! Schema-driven data source resolution for ObjectUI views. A declarative
//! `ViewData` block selects and parameterizes a data-source adapter; every
//! adapter implements the same `DataSource` contract, so rendering
//! components depend only on the trait and never on a concrete backend.
//!
//! # Value Provider Example
//!
//! ```rust
//! use objectui_data::{resolve_data_source, ResolveOptions, ViewData};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let view: ViewData = serde_json::from_value(json!({
//!     "provider": "value",
//!     "items": [
//!         {"id": "1", "name": "Alice", "age": 34},
//!         {"id": "2", "name": "Bob", "age": 28},
//!     ]
//! }))
//! .unwrap();
//!
//! let source = resolve_data_source(Some(&view), None, &ResolveOptions::default()).unwrap();
//! let page = source.find("people", None).await.unwrap();
//! assert_eq!(page.total, 2);
//! # });
//! ```
//!
//! # API Provider Example
//!
//! ```no_run
//! use objectui_data::{resolve_data_source, ResolveOptions, ViewData};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), objectui_data::DataSourceError> {
//!     let view: ViewData = serde_json::from_value(json!({
//!         "provider": "api",
//!         "read": {"url": "https://api.example.com/contacts"}
//!     }))
//!     .unwrap();
//!
//!     let source = resolve_data_source(Some(&view), None, &ResolveOptions::default()).unwrap();
//!     let page = source.find("contacts", None).await?;
//!     println!("{} of {} records", page.data.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod datasource;
pub mod error;

pub use datasource::{
    json_type_name, resolve_data_source, ApiDataSource, BulkOperation, DataSource, FieldSchema,
    HttpEndpoint, HttpRequest, HttpResponse, HttpTransport, ObjectSchema, RequestBody,
    ReqwestTransport, ResolveOptions, ValueDataSource, ViewData,
};
pub use error::{DataSourceError, DataSourceResult};

// Re-export the query engine; the common types surface at the crate root.
pub use objectui_query as query;
pub use objectui_query::{
    aggregate_records, extract_records, AggregateFunction, AggregateParams, Filter, FilterNode,
    OrderBy, QueryParams, QueryResult, SortClause, SortOrder,
};
