//! HTTP-backed data source.
//!
//! Adapts the `DataSource` contract to one or two configured endpoints:
//! `read` serves queries and `write` serves mutations, each falling back to
//! the other when absent. No fixed response schema is assumed; the envelope
//! detection in `normalize_query_response` is the compatibility layer that
//! lets one adapter work against REST, OData, and Salesforce-style backends
//! without per-backend configuration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::transport::{HttpRequest, HttpTransport, RequestBody, ReqwestTransport};
use super::{DataSource, ObjectSchema};
use crate::error::{DataSourceError, DataSourceResult};
use objectui_query::{AggregateParams, OrderBy, QueryParams, QueryResult};

/// One configured HTTP endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpEndpoint {
    pub url: String,

    /// Override for the query method; defaults to GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Query parameters baked into the endpoint; call-site params win on
    /// conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,

    /// Headers sent with every request to this endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl HttpEndpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: None,
            params: None,
            headers: None,
        }
    }
}

/// `DataSource` adapter over raw HTTP endpoints.
pub struct ApiDataSource {
    read: Option<HttpEndpoint>,
    write: Option<HttpEndpoint>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiDataSource {
    pub fn new(read: Option<HttpEndpoint>, write: Option<HttpEndpoint>) -> Self {
        Self {
            read,
            write,
            default_headers: HashMap::new(),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    /// Adapter-wide header, overridden by endpoint and call-site headers.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Swap the transport, e.g. for an abort-capable client or a test mock.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    fn read_endpoint(&self) -> DataSourceResult<&HttpEndpoint> {
        self.read
            .as_ref()
            .or(self.write.as_ref())
            .ok_or(DataSourceError::MissingHttpConfig)
    }

    fn write_endpoint(&self) -> DataSourceResult<&HttpEndpoint> {
        self.write
            .as_ref()
            .or(self.read.as_ref())
            .ok_or(DataSourceError::MissingHttpConfig)
    }

    /// Layer adapter, endpoint, and per-request headers, later layers
    /// overriding earlier ones case-insensitively.
    fn merge_headers(&self, endpoint: &HttpEndpoint) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .default_headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some(endpoint_headers) = &endpoint.headers {
            for (name, value) in endpoint_headers {
                set_header(&mut headers, name, value);
            }
        }
        headers
    }

    async fn send(
        &self,
        endpoint: &HttpEndpoint,
        method: &str,
        path: Option<&str>,
        query: &[(String, String)],
        body: Option<RequestBody>,
    ) -> DataSourceResult<Value> {
        let url = build_url(endpoint, path, query);
        let mut headers = self.merge_headers(endpoint);

        if let Some(body) = &body {
            let has_content_type = headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                let content_type = match body {
                    RequestBody::Json(_) => "application/json",
                    RequestBody::Text(_) => "text/plain",
                    RequestBody::Bytes { content_type, .. } => content_type.as_str(),
                };
                headers.push(("Content-Type".to_string(), content_type.to_string()));
            }
        }

        let response = self
            .transport
            .execute(HttpRequest {
                method: method.to_string(),
                url,
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(DataSourceError::Http {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }

        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        if response.is_json() {
            serde_json::from_str(&response.body).map_err(|e| {
                DataSourceError::InvalidResponse(format!("failed to parse JSON response: {}", e))
            })
        } else {
            Ok(Value::String(response.body))
        }
    }
}

#[async_trait]
impl DataSource for ApiDataSource {
    async fn find(
        &self,
        _resource: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<QueryResult> {
        let endpoint = self.read_endpoint()?;
        let method = endpoint.method.clone().unwrap_or_else(|| "GET".to_string());
        let query = params.map(translate_params).unwrap_or_default();
        let value = self.send(endpoint, &method, None, &query, None).await?;
        Ok(normalize_query_response(value))
    }

    async fn find_one(
        &self,
        _resource: &str,
        id: &str,
        params: Option<&QueryParams>,
    ) -> DataSourceResult<Option<Value>> {
        let endpoint = self.read_endpoint()?;
        let query = params.map(translate_params).unwrap_or_default();
        // Not-found is an expected outcome here, so any failure (including
        // 404s surfaced as HTTP errors) becomes None.
        match self.send(endpoint, "GET", Some(id), &query, None).await {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        }
    }

    async fn create(&self, _resource: &str, data: Value) -> DataSourceResult<Value> {
        let endpoint = self.write_endpoint()?;
        self.send(endpoint, "POST", None, &[], Some(RequestBody::Json(data)))
            .await
    }

    async fn update(&self, _resource: &str, id: &str, data: Value) -> DataSourceResult<Value> {
        let endpoint = self.write_endpoint()?;
        self.send(
            endpoint,
            "PATCH",
            Some(id),
            &[],
            Some(RequestBody::Json(data)),
        )
        .await
    }

    async fn delete(&self, _resource: &str, id: &str) -> DataSourceResult<bool> {
        let endpoint = self.write_endpoint()?;
        // "Already gone" is as good as deleted; errors collapse to false.
        match self.send(endpoint, "DELETE", Some(id), &[], None).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn aggregate(
        &self,
        _resource: &str,
        params: &AggregateParams,
    ) -> DataSourceResult<Vec<Value>> {
        let endpoint = self.read_endpoint()?;
        let mut query = vec![
            ("field".to_string(), params.field.clone()),
            ("function".to_string(), params.function.as_str().to_string()),
            ("groupBy".to_string(), params.group_by.clone()),
        ];
        if let Some(filter) = &params.filter {
            query.push((
                "filter".to_string(),
                serde_json::to_string(filter).unwrap_or_default(),
            ));
        }

        let value = self
            .send(endpoint, "GET", Some("aggregate"), &query, None)
            .await?;
        Ok(match value {
            Value::Array(rows) => rows,
            Value::Object(obj) => {
                let mut rows = Vec::new();
                for key in ["data", "results"] {
                    if let Some(Value::Array(items)) = obj.get(key) {
                        rows = items.clone();
                        break;
                    }
                }
                rows
            }
            _ => Vec::new(),
        })
    }

    fn supports_aggregate(&self) -> bool {
        true
    }

    // Generic HTTP APIs expose no metadata endpoint; return a stub so
    // schema-dependent callers degrade instead of crashing.
    async fn get_object_schema(&self, name: &str) -> DataSourceResult<ObjectSchema> {
        Ok(ObjectSchema::stub(name))
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// Build the request URL: trimmed base, optional path suffix, endpoint
/// params merged under call-site params.
fn build_url(endpoint: &HttpEndpoint, path: Option<&str>, query: &[(String, String)]) -> String {
    let mut url = endpoint.url.trim_end_matches('/').to_string();
    if let Some(path) = path {
        url.push('/');
        url.push_str(path);
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(params) = &endpoint.params {
        for (key, value) in params {
            pairs.push((key.clone(), query_value(value)));
        }
    }
    for (key, value) in query {
        pairs.retain(|(existing, _)| existing != key);
        pairs.push((key.clone(), value.clone()));
    }

    if !pairs.is_empty() {
        let encoded = serde_urlencoded::to_string(&pairs).unwrap_or_default();
        url.push('?');
        url.push_str(&encoded);
    }
    url
}

/// Stringify a configured param value for the query string; strings stay
/// bare, everything else uses its JSON encoding.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Translate structured query params into wire query-string pairs.
fn translate_params(params: &QueryParams) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    if let Some(select) = &params.select {
        pairs.push(("select".to_string(), select.join(",")));
    }
    if let Some(filter) = &params.filter {
        pairs.push((
            "filter".to_string(),
            serde_json::to_string(filter).unwrap_or_default(),
        ));
    }
    if let Some(order_by) = &params.order_by {
        let encoded = match order_by {
            // Plain field lists keep their compact form, leading `-` intact
            OrderBy::Fields(fields) => fields.join(","),
            other => other
                .normalize()
                .iter()
                .map(|clause| format!("{} {}", clause.field, clause.order.as_str()))
                .collect::<Vec<_>>()
                .join(","),
        };
        pairs.push(("orderby".to_string(), encoded));
    }
    if let Some(skip) = params.skip {
        pairs.push(("skip".to_string(), skip.to_string()));
    }
    if let Some(top) = params.top {
        pairs.push(("top".to_string(), top.to_string()));
    }
    if let Some(expand) = &params.expand {
        pairs.push(("expand".to_string(), expand.join(",")));
    }
    if let Some(search) = &params.search {
        pairs.push(("search".to_string(), search.clone()));
    }
    if let Some(count) = params.count {
        pairs.push(("count".to_string(), count.to_string()));
    }

    pairs
}

const ENVELOPE_KEYS: [&str; 5] = ["data", "items", "results", "records", "value"];
const TOTAL_KEYS: [&str; 3] = ["total", "totalCount", "count"];

/// Normalize a raw response into `QueryResult`.
///
/// Accepts a bare array, an already-shaped result, or any of the known
/// envelope conventions; a single object becomes a one-record result.
fn normalize_query_response(value: Value) -> QueryResult {
    match value {
        Value::Array(data) => QueryResult::from_records(data),
        Value::Object(obj) => {
            for key in ENVELOPE_KEYS {
                if let Some(Value::Array(data)) = obj.get(key) {
                    let total = TOTAL_KEYS
                        .iter()
                        .find_map(|k| obj.get(*k).and_then(|v| v.as_u64()))
                        .map(|n| n as usize)
                        .unwrap_or(data.len());
                    return QueryResult {
                        data: data.clone(),
                        total,
                        has_more: obj.get("hasMore").and_then(|v| v.as_bool()),
                        cursor: obj
                            .get("cursor")
                            .and_then(|v| v.as_str())
                            .map(String::from),
                    };
                }
            }
            QueryResult {
                data: vec![Value::Object(obj)],
                total: 1,
                has_more: None,
                cursor: None,
            }
        }
        _ => QueryResult::empty(),
    }
}
