//! In-memory data source.
//!
//! Wraps a static record array in the full `DataSource` contract: the
//! filter/sort/paginate pipeline, local CRUD with synthetic IDs, and
//! group-by aggregation. Records are cloned on the way in and on the way
//! out, so callers never alias the internal store.

use async_trait::async_trait;
use chrono::Utc;
use nanoid::nanoid;
use parking_lot::RwLock;
use serde_json::Value;

use super::{json_type_name, BulkOperation, DataSource, FieldSchema, ObjectSchema};
use crate::error::{DataSourceError, DataSourceResult};
use objectui_query::{
    aggregate_records, run_query, select_record, value_to_string, AggregateParams, QueryParams,
    QueryResult,
};

/// `DataSource` over an in-memory record array.
///
/// Operations are synchronous computations behind the async contract; the
/// lock is held only for the duration of each call's body, and writes are
/// last-one-wins.
pub struct ValueDataSource {
    items: RwLock<Vec<Value>>,
    id_field: Option<String>,
}

impl ValueDataSource {
    /// Build from a record slice. The input is cloned, so later mutation of
    /// the caller's array never reaches this adapter.
    pub fn new(items: &[Value]) -> Self {
        Self {
            items: RwLock::new(items.to_vec()),
            id_field: None,
        }
    }

    /// Use a specific ID field instead of the `_id`-then-`id` probe.
    pub fn with_id_field(mut self, field: &str) -> Self {
        self.id_field = Some(field.to_string());
        self
    }

    /// Clone out the full record set.
    pub fn get_all(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    /// Stringified ID of a record: the configured field when set, else the
    /// first non-null of `_id` and `id`.
    fn record_id(&self, record: &Value) -> Option<String> {
        if let Some(field) = &self.id_field {
            return record
                .get(field)
                .filter(|v| !v.is_null())
                .map(value_to_string);
        }
        for field in ["_id", "id"] {
            if let Some(value) = record.get(field) {
                if !value.is_null() {
                    return Some(value_to_string(value));
                }
            }
        }
        None
    }

    /// ID of a bulk item: bare scalars are taken as the ID itself, objects
    /// are probed like records.
    fn bulk_item_id(&self, item: &Value) -> Option<String> {
        match item {
            Value::Object(_) => self.record_id(item),
            Value::Null => None,
            other => Some(value_to_string(other)),
        }
    }

    fn generate_id() -> String {
        format!("auto_{}_{}", Utc::now().timestamp_millis(), nanoid!(6))
    }
}

impl From<Vec<Value>> for ValueDataSource {
    fn from(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
            id_field: None,
        }
    }
}

#[async_trait]
impl DataSource for ValueDataSource {
    async fn find(
        &self,
        _resource: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<QueryResult> {
        let records = self.get_all();
        Ok(match params {
            Some(params) => run_query(records, params),
            None => run_query(records, &QueryParams::default()),
        })
    }

    async fn find_one(
        &self,
        _resource: &str,
        id: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<Option<Value>> {
        let items = self.items.read();
        let found = items
            .iter()
            .find(|record| self.record_id(record).as_deref() == Some(id));

        Ok(found.map(|record| {
            match params.and_then(|p| p.select.as_deref()).filter(|s| !s.is_empty()) {
                Some(select) => select_record(record, select),
                None => record.clone(),
            }
        }))
    }

    async fn create(&self, _resource: &str, data: Value) -> DataSourceResult<Value> {
        let mut record = data;
        if !record.is_object() {
            return Err(DataSourceError::InvalidRequest(
                "record must be a JSON object".to_string(),
            ));
        }

        if self.record_id(&record).is_none() {
            let field = self.id_field.clone().unwrap_or_else(|| "id".to_string());
            if let Value::Object(obj) = &mut record {
                obj.insert(field, Value::String(Self::generate_id()));
            }
        }

        self.items.write().push(record.clone());
        Ok(record)
    }

    async fn update(&self, _resource: &str, id: &str, data: Value) -> DataSourceResult<Value> {
        let mut items = self.items.write();
        let position = items
            .iter()
            .position(|record| self.record_id(record).as_deref() == Some(id))
            .ok_or_else(|| DataSourceError::RecordNotFound(id.to_string()))?;

        // Shallow merge: incoming fields overwrite, everything else stays.
        if let (Value::Object(existing), Value::Object(patch)) = (&mut items[position], &data) {
            for (key, value) in patch {
                existing.insert(key.clone(), value.clone());
            }
        }
        Ok(items[position].clone())
    }

    async fn delete(&self, _resource: &str, id: &str) -> DataSourceResult<bool> {
        let mut items = self.items.write();
        match items
            .iter()
            .position(|record| self.record_id(record).as_deref() == Some(id))
        {
            Some(position) => {
                items.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn bulk(
        &self,
        resource: &str,
        operation: BulkOperation,
        items: Vec<Value>,
    ) -> DataSourceResult<Vec<Value>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match operation {
                BulkOperation::Create => results.push(self.create(resource, item).await?),
                BulkOperation::Update => {
                    let id = self.bulk_item_id(&item).ok_or_else(|| {
                        DataSourceError::InvalidRequest(
                            "bulk update item has no id".to_string(),
                        )
                    })?;
                    results.push(self.update(resource, &id, item).await?);
                }
                BulkOperation::Delete => {
                    if let Some(id) = self.bulk_item_id(&item) {
                        if self.delete(resource, &id).await? {
                            results.push(item);
                        }
                    }
                }
            }
        }
        Ok(results)
    }

    async fn aggregate(
        &self,
        _resource: &str,
        params: &AggregateParams,
    ) -> DataSourceResult<Vec<Value>> {
        Ok(aggregate_records(&self.items.read(), params))
    }

    fn supports_aggregate(&self) -> bool {
        true
    }

    /// Infer a minimal schema from the first record's keys and value types.
    async fn get_object_schema(&self, name: &str) -> DataSourceResult<ObjectSchema> {
        let mut schema = ObjectSchema::stub(name);
        let items = self.items.read();
        if let Some(Value::Object(first)) = items.first() {
            for (key, value) in first {
                schema.fields.insert(
                    key.clone(),
                    FieldSchema {
                        field_type: json_type_name(value).to_string(),
                    },
                );
            }
        }
        Ok(schema)
    }
}
