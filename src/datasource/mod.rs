//! Data-source adapters and the contract they implement.
//!
//! The `DataSource` trait is the sole seam between rendering components and
//! data: every adapter implements it, and components never depend on a
//! concrete adapter type. Adapters are selected per view by
//! `resolve_data_source` from a declarative `ViewData` descriptor.

mod api;
mod resolve;
mod transport;
mod value;

pub use api::{ApiDataSource, HttpEndpoint};
pub use resolve::{resolve_data_source, ResolveOptions, ViewData};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody, ReqwestTransport};
pub use value::ValueDataSource;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataSourceError, DataSourceResult};
use objectui_query::{AggregateParams, QueryParams, QueryResult};

/// The capability contract every adapter implements.
///
/// `find`, `find_one`, `create`, `update`, and `delete` are required;
/// `bulk`, `aggregate`, and the metadata getters are optional capabilities
/// with graceful defaults, so callers probe `supports_aggregate` (or accept
/// `OperationNotSupported`) instead of crashing on adapters without them.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Paged, filtered, sorted query over a resource.
    async fn find(
        &self,
        resource: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<QueryResult>;

    /// Fetch a single record by ID; `None` when it does not exist.
    async fn find_one(
        &self,
        resource: &str,
        id: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<Option<Value>>;

    /// Create a record and return the stored representation.
    async fn create(&self, resource: &str, data: Value) -> DataSourceResult<Value>;

    /// Merge fields into an existing record and return the result.
    /// Fails with `RecordNotFound` when the ID does not match.
    async fn update(&self, resource: &str, id: &str, data: Value) -> DataSourceResult<Value>;

    /// Delete a record by ID; `false` when it was already gone.
    async fn delete(&self, resource: &str, id: &str) -> DataSourceResult<bool>;

    /// Apply one operation to a batch of items, best-effort and
    /// non-transactional: items are processed in order, completed items stay
    /// applied, and the first failure aborts the rest.
    async fn bulk(
        &self,
        resource: &str,
        operation: BulkOperation,
        items: Vec<Value>,
    ) -> DataSourceResult<Vec<Value>> {
        let _ = (resource, items);
        Err(DataSourceError::OperationNotSupported(format!(
            "bulk {}",
            operation.as_str()
        )))
    }

    /// Group-by aggregation; one row per distinct group key.
    async fn aggregate(
        &self,
        resource: &str,
        params: &AggregateParams,
    ) -> DataSourceResult<Vec<Value>> {
        let _ = (resource, params);
        Err(DataSourceError::OperationNotSupported(
            "aggregate".to_string(),
        ))
    }

    /// Whether `aggregate` has a native implementation. Chart components use
    /// this to decide between a native call and client-side aggregation.
    fn supports_aggregate(&self) -> bool {
        false
    }

    /// Schema metadata for a named object; adapters without real metadata
    /// return an empty stub so schema-dependent callers degrade gracefully.
    async fn get_object_schema(&self, name: &str) -> DataSourceResult<ObjectSchema> {
        Ok(ObjectSchema::stub(name))
    }

    /// View metadata, when the backing service exposes it.
    async fn get_view(&self, view_id: &str) -> DataSourceResult<Option<Value>> {
        let _ = view_id;
        Ok(None)
    }

    /// Application metadata, when the backing service exposes it.
    async fn get_app(&self, app_id: &str) -> DataSourceResult<Option<Value>> {
        let _ = app_id;
        Ok(None)
    }
}

/// The operation applied to every item of a `bulk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Create,
    Update,
    Delete,
}

impl BulkOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkOperation::Create => "create",
            BulkOperation::Update => "update",
            BulkOperation::Delete => "delete",
        }
    }
}

/// Minimal schema stub: field names mapped to JSON type names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
}

impl ObjectSchema {
    /// An empty schema for adapters with no metadata endpoint.
    pub fn stub(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: BTreeMap::new(),
        }
    }
}

/// JSON type name of a value, used for inferred field schemas.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
