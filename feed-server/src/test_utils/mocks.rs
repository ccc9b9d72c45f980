//! Mock implementations of port traits
//!
//! In-memory stand-ins configured per URL. Anything not configured answers
//! with a 404 status error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::SourceEntry;
use crate::domain::ports::SourceClient;
use crate::error::FetchError;

/// Canned response for one URL
#[derive(Clone)]
enum Canned<T> {
    Ok(T),
    Status(u16),
}

// ============================================================================
// Mock Source Client
// ============================================================================

#[derive(Default)]
pub struct MockSourceClient {
    feeds: Arc<RwLock<HashMap<String, Canned<Vec<SourceEntry>>>>>,
    bodies: Arc<RwLock<HashMap<String, Canned<String>>>>,
    /// Body URLs in request order; feed fetches and pings are not recorded
    requests: Arc<RwLock<Vec<String>>>,
    pings: Arc<RwLock<usize>>,
}

impl MockSourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entries` as the decoded feed at `url`
    pub fn with_feed(self, url: &str, entries: Vec<SourceEntry>) -> Self {
        self.feeds
            .write()
            .unwrap()
            .insert(url.to_string(), Canned::Ok(entries));
        self
    }

    /// Answer feed fetches for `url` with a status error
    pub fn with_feed_status(self, url: &str, status: u16) -> Self {
        self.feeds
            .write()
            .unwrap()
            .insert(url.to_string(), Canned::Status(status));
        self
    }

    /// Serve `body` for body fetches and pings of `url`
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.bodies
            .write()
            .unwrap()
            .insert(url.to_string(), Canned::Ok(body.to_string()));
        self
    }

    /// Answer body fetches and pings of `url` with a status error
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.bodies
            .write()
            .unwrap()
            .insert(url.to_string(), Canned::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn ping_count(&self) -> usize {
        *self.pings.read().unwrap()
    }

    fn lookup_body(&self, url: &str) -> Result<String, FetchError> {
        match self.bodies.read().unwrap().get(url) {
            Some(Canned::Ok(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(status_error(url, *status)),
            None => Err(status_error(url, 404)),
        }
    }
}

fn status_error(url: &str, status: u16) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status,
    }
}

#[async_trait]
impl SourceClient for MockSourceClient {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<SourceEntry>, FetchError> {
        match self.feeds.read().unwrap().get(url) {
            Some(Canned::Ok(entries)) => Ok(entries.clone()),
            Some(Canned::Status(status)) => Err(status_error(url, *status)),
            None => Err(status_error(url, 404)),
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        self.requests.write().unwrap().push(url.to_string());
        self.lookup_body(url)
    }

    async fn ping(&self, url: &str) -> Result<(), FetchError> {
        *self.pings.write().unwrap() += 1;
        self.lookup_body(url).map(|_| ())
    }
}
