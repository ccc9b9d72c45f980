//! Background tasks
//!
//! - poller: fetches the upstream feed on a fixed interval and queues entries
//! - worker: drains the queue, one entry at a time, in arrival order
//! - idle pinger: GETs the public `/ping` route so the host never idles out

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::app::IngestService;
use crate::domain::entities::SourceEntry;
use crate::domain::ports::SourceClient;
use crate::error::FetchError;

/// Fetch the feed once and queue its entries in document order.
///
/// Returns the number of entries queued.
pub async fn poll_once<SC>(
    service: &IngestService<SC>,
    feed_url: &str,
    queue: &UnboundedSender<SourceEntry>,
) -> Result<usize, FetchError>
where
    SC: SourceClient,
{
    tracing::info!(url = %feed_url, "Fetching source feed");
    let entries = service.poll(feed_url).await?;
    let count = entries.len();

    for entry in entries {
        if queue.send(entry).is_err() {
            tracing::warn!("Ingestion queue closed, dropping remaining entries");
            break;
        }
    }

    Ok(count)
}

/// Poll forever; the first poll happens immediately
pub async fn run_poller<SC>(
    service: Arc<IngestService<SC>>,
    feed_url: String,
    period: Duration,
    queue: UnboundedSender<SourceEntry>,
) where
    SC: SourceClient,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match poll_once(&service, &feed_url, &queue).await {
            Ok(count) => tracing::debug!(entries = count, "Queued source feed entries"),
            Err(e) => {
                tracing::warn!(url = %feed_url, error = %e, "Feed fetch failed, retrying next tick")
            }
        }

        if queue.is_closed() {
            tracing::warn!("Ingestion worker gone, stopping poller");
            return;
        }
    }
}

/// Process queued entries until every sender is dropped
pub async fn run_worker<SC>(service: Arc<IngestService<SC>>, mut queue: UnboundedReceiver<SourceEntry>)
where
    SC: SourceClient,
{
    while let Some(entry) = queue.recv().await {
        service.handle_entry(&entry).await;
    }
    tracing::info!("Ingestion queue closed, worker exiting");
}

/// Ping `url` every `period`, starting one period after launch
pub async fn run_idle_ping<SC>(client: Arc<SC>, url: String, period: Duration)
where
    SC: SourceClient,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        interval.tick().await;
        match client.ping(&url).await {
            Ok(()) => tracing::debug!(url = %url, "Idle ping sent"),
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %url, "Idle ping timed out")
            }
            Err(e) => tracing::warn!(url = %url, error = %e, "Idle ping failed"),
        }
    }
}
