//! Pluggable HTTP transport.
//!
//! `ApiDataSource` never talks to the network directly; it hands fully built
//! requests to an `HttpTransport`. The default implementation wraps
//! `reqwest`, and callers can inject their own (with timeouts, abort
//! handling, or canned responses for tests) through the adapter options.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DataSourceError, DataSourceResult};

/// A fully built request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// Request payload variants.
///
/// JSON is the default encoding; plain strings go out as text, and raw
/// bytes pass through untouched with their own content type.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Text(String),
    Bytes { content_type: String, data: Vec<u8> },
}

/// The transport-level view of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    /// A JSON response with a canonical status text, convenient for mock
    /// transports.
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            status_text: status_text(status).to_string(),
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    /// A plain-text response.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            status_text: status_text(status).to_string(),
            content_type: Some("text/plain".to_string()),
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("json"))
            .unwrap_or(false)
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

/// Executes HTTP requests on behalf of `ApiDataSource`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> DataSourceResult<HttpResponse>;
}

/// Default transport backed by a pooled `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(16)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> DataSourceResult<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let method: reqwest::Method = request.method.parse().map_err(|_| {
            DataSourceError::InvalidRequest(format!("invalid HTTP method: {}", request.method))
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = match body {
                RequestBody::Json(value) => {
                    let encoded = serde_json::to_string(&value).map_err(|e| {
                        DataSourceError::InvalidRequest(format!("unserializable body: {}", e))
                    })?;
                    builder.body(encoded)
                }
                RequestBody::Text(text) => builder.body(text),
                RequestBody::Bytes { data, .. } => builder.body(data),
            };
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DataSourceError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.map_err(|e| {
            DataSourceError::Connection(format!("Failed to read response body: {}", e))
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_predicates() {
        let ok = HttpResponse::json(200, "{}");
        assert!(ok.is_success());
        assert!(ok.is_json());
        assert_eq!(ok.status_text, "OK");

        let not_found = HttpResponse::json(404, "{\"error\":\"missing\"}");
        assert!(!not_found.is_success());
        assert_eq!(not_found.status_text, "Not Found");

        let plain = HttpResponse::text(200, "pong");
        assert!(!plain.is_json());
    }
}
