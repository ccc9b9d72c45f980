//! Domain entities
//!
//! Plain data types shared by the ingestion pipeline and the publisher.

pub mod compare_link;
pub mod feed_item;
pub mod source_entry;

pub use compare_link::CompareLinkMatcher;
pub use feed_item::{BodyKind, FeedItem};
pub use source_entry::SourceEntry;
