//! Feed renderer
//!
//! Renders recency buffer snapshots as Atom documents.

use atom_syndication::{Content, Entry, Feed, Link, Person, Text};
use chrono::Utc;

use crate::domain::entities::{BodyKind, FeedItem};
use crate::error::PublishError;

const SUBTITLE: &str = "feed generated from github feed";

/// Output feed metadata
#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: String,
    /// Public URL of this service, if known
    pub base_url: Option<String>,
}

impl FeedMeta {
    fn id(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("urn:{}", self.title))
    }
}

fn link(href: String, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

fn render_entry(item: &FeedItem, kind: BodyKind) -> Entry {
    let mut author = Person::default();
    author.set_name(item.author.clone());

    let mut content = Content::default();
    content.set_content_type(Some("html".to_string()));
    content.set_value(Some(item.body(kind).to_string()));

    let mut entry = Entry::default();
    entry.set_id(item.url.clone());
    entry.set_title(Text::plain(item.title.clone()));
    entry.set_updated(item.updated);
    entry.set_links(vec![link(item.url.clone(), "alternate")]);
    entry.set_authors(vec![author]);
    entry.set_content(Some(content));
    entry
}

/// Render `items` as an Atom feed, newest first
///
/// `path` is the route the feed is served from and becomes the self link.
pub fn render_feed(
    meta: &FeedMeta,
    items: &[FeedItem],
    kind: BodyKind,
    path: &str,
) -> Result<String, PublishError> {
    let mut items: Vec<&FeedItem> = items.iter().collect();
    items.sort_by(|a, b| b.updated.cmp(&a.updated));

    let updated = items.first().map(|i| i.updated).unwrap_or_else(Utc::now);

    let mut links = Vec::new();
    if let Some(base) = &meta.base_url {
        links.push(link(base.clone(), "alternate"));
        links.push(link(format!("{}{}", base, path), "self"));
    }

    let mut feed = Feed::default();
    feed.set_id(meta.id());
    feed.set_title(Text::plain(meta.title.clone()));
    feed.set_subtitle(Some(Text::plain(SUBTITLE)));
    feed.set_updated(updated);
    feed.set_links(links);
    feed.set_entries(
        items
            .into_iter()
            .map(|item| render_entry(item, kind))
            .collect::<Vec<_>>(),
    );

    let bytes = feed
        .write_to(Vec::new())
        .map_err(|e| PublishError::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PublishError::Serialize(e.to_string()))
}
