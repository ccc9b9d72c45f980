//! Error types for the diff feed service
//!
//! One error type per layer:
//! - `ConfigError`: startup configuration problems (the only fatal kind)
//! - `FetchError`: outbound HTTP failures against GitHub or the idle ping target
//! - `IngestError`: failures scoped to a single source feed entry
//! - `PublishError`: Atom serialization failures
//! - `AppError`: errors surfaced to HTTP callers

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("${0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for ${key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Outbound HTTP errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode feed: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Request(e) if e.is_timeout())
    }
}

/// Errors that drop a single source entry
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse timestamp: {value:?}")]
    Timestamp { value: String },
}

/// Output feed errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize atom feed: {0}")]
    Serialize(String),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Publish(#[from] PublishError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Publish(e) => {
                tracing::error!(error = %e, "Failed generating atom feed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "failed generating atom feed",
                )
                    .into_response()
            }
        }
    }
}
