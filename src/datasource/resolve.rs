//! View-data descriptors and adapter resolution.
//!
//! A `ViewData` block embedded in a component schema declares where a view's
//! records come from. `resolve_data_source` is the pure selection function
//! that turns one into a concrete adapter, or defers to whatever data
//! source the rendering context already has.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::{ApiDataSource, HttpEndpoint};
use super::transport::HttpTransport;
use super::value::ValueDataSource;
use super::DataSource;

/// Declarative data-source configuration, discriminated by `provider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ViewData {
    /// Defer entirely to the caller-supplied fallback data source,
    /// typically a remote object-model client owned by the host.
    Object { object: String },

    /// HTTP endpoints: `read` for queries, `write` for mutations.
    Api {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        read: Option<HttpEndpoint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        write: Option<HttpEndpoint>,
    },

    /// Inline records served from memory.
    Value {
        #[serde(default)]
        items: Vec<Value>,
        #[serde(rename = "idField", default, skip_serializing_if = "Option::is_none")]
        id_field: Option<String>,
    },

    /// Any unrecognized provider string; resolves like `object`.
    #[serde(other)]
    Unknown,
}

/// Caller-supplied knobs applied when the resolver constructs an adapter.
#[derive(Clone, Default)]
pub struct ResolveOptions {
    /// Adapter-wide headers for constructed `ApiDataSource`s.
    pub default_headers: HashMap<String, String>,

    /// Transport override for constructed `ApiDataSource`s.
    pub transport: Option<Arc<dyn HttpTransport>>,

    /// ID field for constructed `ValueDataSource`s, when the view data does
    /// not name one itself.
    pub id_field: Option<String>,
}

/// Select or construct the data source for a view.
///
/// Absent view data, `object` providers, and unknown providers all return
/// the fallback exactly as given. `api` and `value` providers construct a
/// fresh adapter on every call; there is no caching here, so callers
/// stabilize the returned reference themselves if re-resolution is costly.
pub fn resolve_data_source(
    view_data: Option<&ViewData>,
    fallback: Option<Arc<dyn DataSource>>,
    options: &ResolveOptions,
) -> Option<Arc<dyn DataSource>> {
    match view_data {
        None | Some(ViewData::Object { .. }) | Some(ViewData::Unknown) => fallback,
        Some(ViewData::Api { read, write }) => {
            let mut source = ApiDataSource::new(read.clone(), write.clone())
                .with_default_headers(options.default_headers.clone());
            if let Some(transport) = &options.transport {
                source = source.with_transport(transport.clone());
            }
            Some(Arc::new(source))
        }
        Some(ViewData::Value { items, id_field }) => {
            let mut source = ValueDataSource::new(items);
            if let Some(field) = id_field.as_ref().or(options.id_field.as_ref()) {
                source = source.with_id_field(field);
            }
            Some(Arc::new(source))
        }
    }
}
