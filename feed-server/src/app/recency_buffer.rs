//! Recency buffer
//!
//! Bounded, URL-deduplicated store of published feed items. Overflow keeps
//! the items with the most recent `updated` timestamps.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::entities::FeedItem;

/// Result of [`RecencyBuffer::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The item is held by the buffer
    Added,
    /// An item with the same URL was already held
    Duplicate,
    /// The item was older than everything held in a full buffer and was pruned right away
    Evicted,
}

#[derive(Default)]
struct Inner {
    items: Vec<FeedItem>,
    urls: HashSet<String>,
}

/// Shared between the ingestion worker (single writer) and HTTP handlers
pub struct RecencyBuffer {
    capacity: usize,
    inner: RwLock<Inner>,
}

impl RecencyBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `item` unless its URL is already held, then prune to capacity.
    pub fn insert(&self, item: FeedItem) -> Insertion {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.urls.contains(&item.url) {
            return Insertion::Duplicate;
        }
        let url = item.url.clone();
        inner.urls.insert(url.clone());
        inner.items.push(item);

        if inner.items.len() > self.capacity {
            // stable sort: among equal timestamps the later insert survives
            inner.items.sort_by(|a, b| a.updated.cmp(&b.updated));
            let overflow = inner.items.len() - self.capacity;
            let evicted: Vec<FeedItem> = inner.items.drain(..overflow).collect();
            for item in evicted {
                tracing::debug!(url = %item.url, "Evicted feed item");
                inner.urls.remove(&item.url);
            }
        }

        if inner.urls.contains(&url) {
            Insertion::Added
        } else {
            Insertion::Evicted
        }
    }

    /// True if an item updated at `updated` would be evicted by its own insert
    ///
    /// Equal timestamps are kept: among ties the later insert survives.
    pub fn would_evict(&self, updated: DateTime<Utc>) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if inner.items.len() < self.capacity {
            return false;
        }
        inner
            .items
            .iter()
            .map(|i| i.updated)
            .min()
            .map_or(true, |oldest| updated < oldest)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .urls
            .contains(url)
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<FeedItem> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
