//! Event store, ingestion service, and periodic scheduler.
//!
//! This crate provides the durable side of eventscout:
//! - SQLite event store with `(source, event_id)` deduplication
//! - Ingestion: aggregate every source, then insert the combined batch
//! - Recommendation: read the store, then filter by interest tags
//! - Periodic ingestion with exponential backoff
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use eventscout_providers::{Aggregator, KudaGoConfig, KudaGoSource};
//! use eventscout_server::{EventStore, IngestService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(EventStore::open("events.db")?);
//!     let aggregator = Aggregator::new().with_source(KudaGoSource::new(KudaGoConfig::new())?);
//!     let service = IngestService::new(aggregator, store);
//!
//!     service.ingest(&HashMap::new()).await?;
//!     for event in service.recommend("music, art").await? {
//!         println!("{}", event.title);
//!     }
//!     Ok(())
//! }
//! ```

mod demo;
mod error;
mod scheduler;
mod service;
mod store;

pub use demo::{DEMO_SOURCE, demo_events};
pub use error::{ServerError, ServerResult, StoreError, StoreResult};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState,
};
pub use service::{IngestReport, IngestService, serve};
pub use store::{EventStore, InsertReport, StoredEvent};
