//! Application layer
//!
//! The ingestion pipeline, the recency buffer it fills and the background
//! tasks that drive it.

pub mod background;
pub mod ingest_service;
pub mod recency_buffer;

pub use background::{run_idle_ping, run_poller, run_worker};
pub use ingest_service::{IngestService, IngestSettings};
pub use recency_buffer::{Insertion, RecencyBuffer};
