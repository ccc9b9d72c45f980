//! Atom decoding for the GitHub activity feed
//!
//! Only the fields the pipeline needs are read; everything else in the
//! document is ignored.

use serde::Deserialize;

use crate::domain::entities::SourceEntry;
use crate::error::FetchError;

#[derive(Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: AtomText,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    author: Option<AtomPerson>,
}

#[derive(Default, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
}

#[derive(Deserialize)]
struct AtomPerson {
    #[serde(default)]
    name: String,
}

impl AtomEntry {
    /// First link wins; entries without one are dropped
    fn into_source_entry(self) -> Option<SourceEntry> {
        let link = self.links.into_iter().map(|l| l.href).find(|h| !h.is_empty())?;
        Some(SourceEntry {
            title: self.title.value.trim().to_string(),
            link,
            updated: self.updated.trim().to_string(),
            author: self.author.map(|a| a.name).unwrap_or_default(),
        })
    }
}

/// Decode an Atom document into source entries, preserving document order
pub fn decode_feed(xml: &str) -> Result<Vec<SourceEntry>, FetchError> {
    let feed: AtomFeed =
        quick_xml::de::from_str(xml).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(AtomEntry::into_source_entry)
        .collect())
}
