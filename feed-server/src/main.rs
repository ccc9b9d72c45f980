//! github-diff-feed
//!
//! Polls a GitHub activity feed, fetches the patch and diff behind every
//! compare link it finds, and republishes the most recent ones as an Atom feed.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::sync::mpsc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::GithubClientImpl;
use app::{IngestService, IngestSettings, RecencyBuffer};
use config::Config;
use domain::entities::CompareLinkMatcher;
use feed::FeedMeta;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub buffer: Arc<RecencyBuffer>,
    pub feed_meta: Arc<FeedMeta>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_feed))
        .route("/patch", get(handlers::get_patch_feed))
        .route("/diff", get(handlers::get_diff_feed))
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,github_diff_feed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting github-diff-feed...");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Create adapters
    let client = Arc::new(
        GithubClientImpl::new(config.http_timeout).context("Failed to build HTTP client")?,
    );
    let matcher = CompareLinkMatcher::new(&config.compare_host)
        .context("Failed to build compare link pattern")?;

    // Create application services
    let buffer = Arc::new(RecencyBuffer::new(config.feed_item_max));
    let ingest_service = Arc::new(IngestService::new(
        client.clone(),
        buffer.clone(),
        matcher,
        IngestSettings {
            excluded_title_markers: config.excluded_title_markers.clone(),
            size_threshold: config.feed_size_threshold,
            fetch_diff: config.fetch_diff,
            diff_highlight: config.diff_highlight,
        },
    ));

    // Background tasks
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    let mut tasks = vec![
        tokio::spawn(app::run_poller(
            ingest_service.clone(),
            config.source_feed_url.clone(),
            config.poll_interval,
            queue_tx,
        )),
        tokio::spawn(app::run_worker(ingest_service, queue_rx)),
    ];
    if let Some(ping_url) = config.idle_ping_url() {
        tracing::info!(url = %ping_url, "Idle ping enabled");
        tasks.push(tokio::spawn(app::run_idle_ping(
            client,
            ping_url,
            config.idle_ping_interval,
        )));
    }

    // Create app state
    let state = AppState {
        buffer,
        feed_meta: Arc::new(FeedMeta {
            title: config.feed_title.clone(),
            base_url: config.public_base_url.clone(),
        }),
    };

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    for task in tasks {
        task.abort();
    }

    Ok(())
}
