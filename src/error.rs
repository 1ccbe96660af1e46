//! Error types for the data-source layer.
//!
//! Adapters signal failures exclusively through these errors; logging and
//! display policy belong to the embedding application.

use thiserror::Error;

/// Data-source error type
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// An API operation was invoked on an adapter with neither a read nor a
    /// write endpoint configured. Always propagated, never swallowed.
    #[error("No HTTP configuration provided")]
    MissingHttpConfig,

    /// A non-2xx HTTP response, carrying status, status text, and the raw
    /// response body.
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Record with id '{0}' not found")]
    RecordNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),
}

/// Result type for data-source operations
pub type DataSourceResult<T> = Result<T, DataSourceError>;

impl DataSourceError {
    /// The HTTP status code, for HTTP-originated errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            DataSourceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl serde::Serialize for DataSourceError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
