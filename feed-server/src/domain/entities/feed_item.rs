//! Feed item domain entity
//!
//! One published diff entry of the output feed.

use chrono::{DateTime, Utc};

/// Which body an output feed publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Patch,
    Diff,
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyKind::Patch => write!(f, "patch"),
            BodyKind::Diff => write!(f, "diff"),
        }
    }
}

/// Published diff entry, keyed by `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub url: String,
    pub updated: DateTime<Utc>,
    pub title: String,
    pub author: String,
    /// Preformatted patch HTML or the size placeholder
    pub patch: String,
    /// Annotated diff HTML or the size placeholder, when fetched
    pub diff: Option<String>,
}

impl FeedItem {
    /// Body for the requested feed variant; items without a diff fall back to the patch
    pub fn body(&self, kind: BodyKind) -> &str {
        match kind {
            BodyKind::Patch => &self.patch,
            BodyKind::Diff => self.diff.as_deref().unwrap_or(&self.patch),
        }
    }
}
