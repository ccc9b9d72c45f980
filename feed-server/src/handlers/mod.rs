//! HTTP handlers
//!
//! Axum request handlers for the feed and liveness endpoints.

pub mod feed;
pub mod health;

pub use feed::{get_diff_feed, get_feed, get_patch_feed};
pub use health::{health, ping};
