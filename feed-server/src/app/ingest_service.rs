//! Ingestion service
//!
//! Runs one upstream feed entry through the pipeline:
//! filter (compare link, excluded title, duplicate) → fetch patch → fetch
//! diff → render → insert into the recency buffer.
//!
//! Every failure here is scoped to the entry being processed.

use std::sync::Arc;

use crate::app::{Insertion, RecencyBuffer};
use crate::domain::entities::{CompareLinkMatcher, FeedItem, SourceEntry};
use crate::domain::ports::SourceClient;
use crate::error::{FetchError, IngestError};
use crate::feed::{preformatted, DiffHighlight};

pub const PATCH_TOO_LARGE: &str = "Patch size too big.";
pub const DIFF_TOO_LARGE: &str = "Diff size too big.";

/// Pipeline knobs taken from the config
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub excluded_title_markers: Vec<String>,
    /// Bodies above this many bytes are replaced by a placeholder
    pub size_threshold: usize,
    pub fetch_diff: bool,
    pub diff_highlight: DiffHighlight,
}

/// Why an entry was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotCompareLink,
    ExcludedTitle,
    Duplicate,
    /// Older than everything held by a full buffer
    TooOld,
    EmptyBody,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotCompareLink => write!(f, "not a compare link"),
            SkipReason::ExcludedTitle => write!(f, "excluded title"),
            SkipReason::Duplicate => write!(f, "duplicate url"),
            SkipReason::TooOld => write!(f, "older than every buffered item"),
            SkipReason::EmptyBody => write!(f, "empty body"),
        }
    }
}

/// Terminal state of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    Skipped(SkipReason),
}

/// Service turning upstream entries into buffered feed items
pub struct IngestService<SC>
where
    SC: SourceClient,
{
    client: Arc<SC>,
    buffer: Arc<RecencyBuffer>,
    matcher: CompareLinkMatcher,
    settings: IngestSettings,
}

impl<SC> IngestService<SC>
where
    SC: SourceClient,
{
    pub fn new(
        client: Arc<SC>,
        buffer: Arc<RecencyBuffer>,
        matcher: CompareLinkMatcher,
        settings: IngestSettings,
    ) -> Self {
        Self {
            client,
            buffer,
            matcher,
            settings,
        }
    }

    /// Fetch the upstream feed
    pub async fn poll(&self, feed_url: &str) -> Result<Vec<SourceEntry>, FetchError> {
        self.client.fetch_feed(feed_url).await
    }

    /// Process one entry; filters run before any network call
    pub async fn process_entry(&self, entry: &SourceEntry) -> Result<IngestOutcome, IngestError> {
        let Some(link) = self.matcher.parse(&entry.link) else {
            return Ok(IngestOutcome::Skipped(SkipReason::NotCompareLink));
        };
        if entry.is_excluded(&self.settings.excluded_title_markers) {
            return Ok(IngestOutcome::Skipped(SkipReason::ExcludedTitle));
        }
        if self.buffer.contains(&link.url) {
            return Ok(IngestOutcome::Skipped(SkipReason::Duplicate));
        }

        let updated = entry
            .parse_updated()
            .ok_or_else(|| IngestError::Timestamp {
                value: entry.updated.clone(),
            })?;
        if self.buffer.would_evict(updated) {
            return Ok(IngestOutcome::Skipped(SkipReason::TooOld));
        }

        tracing::info!(
            owner = %link.owner,
            repo = %link.repo,
            url = %link.patch_url(),
            "Fetching patch"
        );
        let patch = self.client.fetch_body(&link.patch_url()).await?;
        if patch.is_empty() {
            return Ok(IngestOutcome::Skipped(SkipReason::EmptyBody));
        }
        let patch = self.render_patch(&patch);

        let diff = if self.settings.fetch_diff {
            self.fetch_diff(&link.diff_url()).await
        } else {
            None
        };

        let item = FeedItem {
            url: link.url.clone(),
            updated,
            title: format!("{} ({})", entry.title, link.range()),
            author: entry.author.clone(),
            patch,
            diff,
        };

        match self.buffer.insert(item) {
            Insertion::Added => Ok(IngestOutcome::Inserted),
            Insertion::Duplicate => Ok(IngestOutcome::Skipped(SkipReason::Duplicate)),
            Insertion::Evicted => Ok(IngestOutcome::Skipped(SkipReason::TooOld)),
        }
    }

    /// Process one entry and log the result; never fails
    pub async fn handle_entry(&self, entry: &SourceEntry) -> Option<IngestOutcome> {
        match self.process_entry(entry).await {
            Ok(IngestOutcome::Inserted) => {
                tracing::info!(
                    url = %entry.link,
                    items = self.buffer.len(),
                    "Published feed item"
                );
                Some(IngestOutcome::Inserted)
            }
            Ok(IngestOutcome::Skipped(reason)) => {
                tracing::debug!(url = %entry.link, %reason, "Skipped feed entry");
                Some(IngestOutcome::Skipped(reason))
            }
            Err(e) => {
                tracing::warn!(url = %entry.link, error = %e, "Failed to ingest feed entry");
                None
            }
        }
    }

    /// The diff is optional: failures leave the item with its patch only
    async fn fetch_diff(&self, url: &str) -> Option<String> {
        tracing::info!(url = %url, "Fetching diff");
        match self.client.fetch_body(url).await {
            Ok(body) if body.is_empty() => None,
            Ok(body) if body.len() > self.settings.size_threshold => Some(DIFF_TOO_LARGE.to_string()),
            Ok(body) => Some(self.settings.diff_highlight.apply(&body)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch diff");
                None
            }
        }
    }

    fn render_patch(&self, body: &str) -> String {
        if body.len() > self.settings.size_threshold {
            PATCH_TOO_LARGE.to_string()
        } else {
            preformatted(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        sample_diff, sample_patch, test_compare_entry, test_entry, test_feed_item_at,
        MockSourceClient,
    };

    const COMPARE_URL: &str = "https://github.com/acme/widget/compare/main...feature";

    fn settings() -> IngestSettings {
        IngestSettings {
            excluded_title_markers: vec!["pushed to gh-pages at".to_string()],
            size_threshold: 1024 * 1024,
            fetch_diff: true,
            diff_highlight: DiffHighlight::Words,
        }
    }

    fn create_service(
        client: MockSourceClient,
        settings: IngestSettings,
    ) -> (
        IngestService<MockSourceClient>,
        Arc<MockSourceClient>,
        Arc<RecencyBuffer>,
    ) {
        let client = Arc::new(client);
        let buffer = Arc::new(RecencyBuffer::new(50));
        let service = IngestService::new(
            client.clone(),
            buffer.clone(),
            CompareLinkMatcher::new("github.com").unwrap(),
            settings,
        );
        (service, client, buffer)
    }

    fn client_with_bodies() -> MockSourceClient {
        MockSourceClient::new()
            .with_body(&format!("{}.patch", COMPARE_URL), &sample_patch())
            .with_body(&format!("{}.diff", COMPARE_URL), &sample_diff())
    }

    #[tokio::test]
    async fn process_entry_inserts_item() {
        let (service, _client, buffer) = create_service(client_with_bodies(), settings());
        let entry = test_compare_entry(COMPARE_URL);

        let outcome = service.process_entry(&entry).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Inserted);
        let items = buffer.snapshot();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.url, COMPARE_URL);
        assert_eq!(item.title, format!("{} (main...feature)", entry.title));
        assert_eq!(item.author, entry.author);
        assert_eq!(item.updated, entry.parse_updated().unwrap());
        assert_eq!(item.patch, preformatted(&sample_patch()));
        assert_eq!(
            item.diff.as_deref(),
            Some(DiffHighlight::Words.apply(&sample_diff()).as_str())
        );
    }

    #[tokio::test]
    async fn process_entry_skips_non_compare_links() {
        let (service, client, buffer) = create_service(client_with_bodies(), settings());
        let entry = test_entry(
            "octocat starred acme/widget",
            "https://github.com/acme/widget/commits/main",
            "2024-03-01T12:30:45Z",
        );

        let outcome = service.process_entry(&entry).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::NotCompareLink));
        assert!(buffer.is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn process_entry_skips_excluded_titles_without_fetching() {
        let (service, client, buffer) = create_service(client_with_bodies(), settings());
        let entry = test_entry(
            "octocat pushed to gh-pages at acme/widget",
            COMPARE_URL,
            "2024-03-01T12:30:45Z",
        );

        let outcome = service.process_entry(&entry).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::ExcludedTitle));
        assert!(buffer.is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn process_entry_skips_duplicates_without_fetching() {
        let (service, client, buffer) = create_service(client_with_bodies(), settings());
        let entry = test_compare_entry(COMPARE_URL);
        service.process_entry(&entry).await.unwrap();
        let fetched = client.requests().len();

        let outcome = service.process_entry(&entry).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::Duplicate));
        assert_eq!(buffer.len(), 1);
        assert_eq!(client.requests().len(), fetched);
    }

    #[tokio::test]
    async fn process_entry_drops_bad_timestamp_without_fetching() {
        let (service, client, buffer) = create_service(client_with_bodies(), settings());
        let entry = test_entry("octocat pushed", COMPARE_URL, "01/03/2024");

        let result = service.process_entry(&entry).await;

        assert!(matches!(result, Err(IngestError::Timestamp { .. })));
        assert!(buffer.is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn process_entry_drops_failed_patch_fetch() {
        let client = MockSourceClient::new().with_status(&format!("{}.patch", COMPARE_URL), 500);
        let (service, _client, buffer) = create_service(client, settings());

        let result = service.process_entry(&test_compare_entry(COMPARE_URL)).await;

        assert!(matches!(
            result,
            Err(IngestError::Fetch(FetchError::Status { status: 500, .. }))
        ));
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn process_entry_drops_empty_patch() {
        let client = MockSourceClient::new()
            .with_body(&format!("{}.patch", COMPARE_URL), "")
            .with_body(&format!("{}.diff", COMPARE_URL), &sample_diff());
        let (service, client, buffer) = create_service(client, settings());

        let outcome = service.process_entry(&test_compare_entry(COMPARE_URL)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::EmptyBody));
        assert!(buffer.is_empty());
        assert_eq!(client.request_count(&format!("{}.diff", COMPARE_URL)), 0);
    }

    #[tokio::test]
    async fn oversized_bodies_become_placeholders() {
        let big = "+x\n".repeat(400);
        let client = MockSourceClient::new()
            .with_body(&format!("{}.patch", COMPARE_URL), &big)
            .with_body(&format!("{}.diff", COMPARE_URL), &big);
        let mut settings = settings();
        settings.size_threshold = 1000;
        let (service, _client, buffer) = create_service(client, settings);

        service
            .process_entry(&test_compare_entry(COMPARE_URL))
            .await
            .unwrap();

        let item = &buffer.snapshot()[0];
        assert_eq!(item.patch, PATCH_TOO_LARGE);
        assert_eq!(item.diff.as_deref(), Some(DIFF_TOO_LARGE));
    }

    #[tokio::test]
    async fn body_at_threshold_is_kept() {
        let body = "+x\n".repeat(10);
        let client = MockSourceClient::new()
            .with_body(&format!("{}.patch", COMPARE_URL), &body)
            .with_body(&format!("{}.diff", COMPARE_URL), &body);
        let mut settings = settings();
        settings.size_threshold = body.len();
        let (service, _client, buffer) = create_service(client, settings);

        service
            .process_entry(&test_compare_entry(COMPARE_URL))
            .await
            .unwrap();

        assert_eq!(buffer.snapshot()[0].patch, preformatted(&body));
    }

    #[tokio::test]
    async fn failed_diff_fetch_keeps_patch() {
        let client = MockSourceClient::new()
            .with_body(&format!("{}.patch", COMPARE_URL), &sample_patch())
            .with_status(&format!("{}.diff", COMPARE_URL), 404);
        let (service, _client, buffer) = create_service(client, settings());

        let outcome = service.process_entry(&test_compare_entry(COMPARE_URL)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Inserted);
        let item = &buffer.snapshot()[0];
        assert_eq!(item.patch, preformatted(&sample_patch()));
        assert!(item.diff.is_none());
    }

    #[tokio::test]
    async fn diff_not_fetched_when_disabled() {
        let mut settings = settings();
        settings.fetch_diff = false;
        let (service, client, buffer) = create_service(client_with_bodies(), settings);

        service
            .process_entry(&test_compare_entry(COMPARE_URL))
            .await
            .unwrap();

        assert!(buffer.snapshot()[0].diff.is_none());
        assert_eq!(client.request_count(&format!("{}.diff", COMPARE_URL)), 0);
        assert_eq!(client.request_count(&format!("{}.patch", COMPARE_URL)), 1);
    }

    #[tokio::test]
    async fn diff_uses_configured_highlight() {
        let mut settings = settings();
        settings.diff_highlight = DiffHighlight::Lines;
        let (service, _client, buffer) = create_service(client_with_bodies(), settings);

        service
            .process_entry(&test_compare_entry(COMPARE_URL))
            .await
            .unwrap();

        assert_eq!(
            buffer.snapshot()[0].diff.as_deref(),
            Some(DiffHighlight::Lines.apply(&sample_diff()).as_str())
        );
    }

    #[tokio::test]
    async fn entry_older_than_full_buffer_is_skipped_without_fetching() {
        let client = Arc::new(client_with_bodies());
        let buffer = Arc::new(RecencyBuffer::new(1));
        buffer.insert(test_feed_item_at(
            "https://github.com/acme/widget/compare/main...newer",
            120,
        ));
        let service = IngestService::new(
            client.clone(),
            buffer.clone(),
            CompareLinkMatcher::new("github.com").unwrap(),
            settings(),
        );
        // 2024-03-01T12:30:45Z, older than the held item
        let entry = test_compare_entry(COMPARE_URL);

        for _ in 0..3 {
            let outcome = service.process_entry(&entry).await.unwrap();
            assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::TooOld));
        }

        assert!(!buffer.contains(COMPARE_URL));
        assert_eq!(buffer.len(), 1);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn entry_newer_than_full_buffer_replaces_oldest() {
        let older = "https://github.com/acme/widget/compare/main...older";
        let buffer = Arc::new(RecencyBuffer::new(1));
        buffer.insert(test_feed_item_at(older, 0));
        let service = IngestService::new(
            Arc::new(client_with_bodies()),
            buffer.clone(),
            CompareLinkMatcher::new("github.com").unwrap(),
            settings(),
        );

        let outcome = service
            .process_entry(&test_compare_entry(COMPARE_URL))
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Inserted);
        assert!(buffer.contains(COMPARE_URL));
        assert!(!buffer.contains(older));
    }

    #[tokio::test]
    async fn handle_entry_swallows_errors() {
        let client = MockSourceClient::new().with_status(&format!("{}.patch", COMPARE_URL), 502);
        let (service, _client, buffer) = create_service(client, settings());

        let outcome = service.handle_entry(&test_compare_entry(COMPARE_URL)).await;

        assert!(outcome.is_none());
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn poll_returns_feed_entries() {
        let entries = vec![test_compare_entry(COMPARE_URL)];
        let client = MockSourceClient::new().with_feed("https://github.com/acme.atom", entries.clone());
        let (service, _client, _buffer) = create_service(client, settings());

        assert_eq!(service.poll("https://github.com/acme.atom").await.unwrap(), entries);
        assert!(service.poll("https://github.com/other.atom").await.is_err());
    }
}
