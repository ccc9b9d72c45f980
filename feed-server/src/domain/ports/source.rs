//! Source client port trait
//!
//! Defines the outbound HTTP interface of the ingestion pipeline: the GitHub
//! activity feed, compare patch/diff bodies and the idle ping.

use async_trait::async_trait;

use crate::domain::entities::SourceEntry;
use crate::error::FetchError;

/// Outbound HTTP operations
///
/// Implementations bound every call with a timeout; a timeout surfaces as a
/// regular `FetchError`.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch and decode the Atom feed at `url`
    async fn fetch_feed(&self, url: &str) -> Result<Vec<SourceEntry>, FetchError>;

    /// Fetch a text body, failing on any non-success status
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError>;

    /// Fire a GET at `url` and discard the response
    async fn ping(&self, url: &str) -> Result<(), FetchError>;
}
