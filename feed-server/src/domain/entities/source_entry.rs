//! Source entry domain entity
//!
//! One entry of the upstream GitHub activity feed, as decoded from Atom.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout used by GitHub activity feeds
pub const SOURCE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Upstream feed entry
///
/// `updated` is kept as the raw text so a malformed timestamp only drops
/// this entry instead of the whole feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub title: String,
    pub link: String,
    pub updated: String,
    pub author: String,
}

impl SourceEntry {
    pub fn parse_updated(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(self.updated.trim(), SOURCE_TIME_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    }

    /// True if the title contains any of the given markers
    pub fn is_excluded(&self, markers: &[String]) -> bool {
        markers.iter().any(|m| self.title.contains(m.as_str()))
    }
}
