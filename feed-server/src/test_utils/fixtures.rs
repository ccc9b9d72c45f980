//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::app::RecencyBuffer;
use crate::domain::entities::{FeedItem, SourceEntry};
use crate::feed::{preformatted, FeedMeta};
use crate::AppState;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Create a feed item with default values
pub fn test_feed_item(url: &str) -> FeedItem {
    test_feed_item_at(url, 0)
}

/// Create a feed item updated `minutes` after a fixed base time
pub fn test_feed_item_at(url: &str, minutes: i64) -> FeedItem {
    FeedItem {
        url: url.to_string(),
        updated: base_time() + Duration::minutes(minutes),
        title: "octocat pushed to feature in acme/widget (main...feature)".to_string(),
        author: "octocat".to_string(),
        patch: preformatted(&sample_patch()),
        diff: None,
    }
}

/// Create an upstream entry with the given fields
pub fn test_entry(title: &str, link: &str, updated: &str) -> SourceEntry {
    SourceEntry {
        title: title.to_string(),
        link: link.to_string(),
        updated: updated.to_string(),
        author: "octocat".to_string(),
    }
}

/// Create a valid upstream entry pointing at a compare link
pub fn test_compare_entry(url: &str) -> SourceEntry {
    test_entry(
        "octocat pushed to feature in acme/widget",
        url,
        "2024-03-01T12:30:45Z",
    )
}

pub fn sample_patch() -> String {
    r#"From 1a2b3c4d Mon Sep 17 00:00:00 2001
From: Octo Cat <octocat@example.com>
Date: Fri, 1 Mar 2024 12:30:45 +0000
Subject: [PATCH] Use <Vec> & friends

---
 src/lib.rs | 2 +-
 1 file changed, 1 insertion(+), 1 deletion(-)

diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn main() {
-    let items = Vec::new();
+    let items: Vec<&str> = Vec::new();
 }
"#
    .to_string()
}

pub fn sample_diff() -> String {
    r#"diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn main() {
-    let items = Vec::new();
+    let items: Vec<&str> = Vec::new();
 }
"#
    .to_string()
}

/// Create app state around an empty buffer
pub fn test_app_state(capacity: usize) -> AppState {
    AppState {
        buffer: Arc::new(RecencyBuffer::new(capacity)),
        feed_meta: Arc::new(FeedMeta {
            title: "github-diff-feed".to_string(),
            base_url: Some("https://diff-feed.example.com".to_string()),
        }),
    }
}
