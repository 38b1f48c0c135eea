//! Ingestion and recommendation on top of the event store.
//!
//! Ingestion is `aggregate` followed by `insert_all`; recommendation is
//! `read_all` followed by interest matching. Reads always go to the store.
//! Store calls block on SQLite, so they run on the blocking thread pool.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;

use eventscout_core::{Event, InterestMatcher};
use eventscout_providers::Aggregator;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult, StoreResult};
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerState};
use crate::store::{EventStore, InsertReport};

/// Outcome of one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Events returned by all sources together.
    pub fetched: usize,
    /// Rows written.
    pub inserted: usize,
    /// Events already stored.
    pub skipped: usize,
}

impl IngestReport {
    fn new(fetched: usize, insert: InsertReport) -> Self {
        Self {
            fetched,
            inserted: insert.inserted,
            skipped: insert.skipped,
        }
    }
}

/// Couples an aggregator with the store it feeds.
pub struct IngestService {
    aggregator: Aggregator,
    store: Arc<EventStore>,
    // Serializes ingestion passes.
    pass_lock: Mutex<()>,
}

impl IngestService {
    /// Creates a service.
    pub fn new(aggregator: Aggregator, store: Arc<EventStore>) -> Self {
        Self {
            aggregator,
            store,
            pass_lock: Mutex::new(()),
        }
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Returns the aggregator.
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Fetches from every source and stores the combined result.
    ///
    /// Provider failures only shrink the batch; a store failure is returned.
    pub async fn ingest(
        &self,
        locations_by_source: &HashMap<String, String>,
    ) -> StoreResult<IngestReport> {
        let _pass = self.pass_lock.lock().await;

        let events = self.aggregator.aggregate(locations_by_source).await;
        let fetched = events.len();
        let store = Arc::clone(&self.store);
        let insert = tokio::task::spawn_blocking(move || store.insert_all(&events)).await??;
        let report = IngestReport::new(fetched, insert);

        info!(
            fetched = report.fetched,
            inserted = report.inserted,
            skipped = report.skipped,
            "ingest finished"
        );
        Ok(report)
    }

    /// Returns stored events matching `interest_text`, in stored order.
    ///
    /// Blank interest text returns every stored event.
    pub async fn recommend(&self, interest_text: &str) -> StoreResult<Vec<Event>> {
        let store = Arc::clone(&self.store);
        let events = tokio::task::spawn_blocking(move || store.read_all()).await??;
        let total = events.len();
        let matcher = InterestMatcher::new(interest_text);
        let matched = matcher.filter(events);
        debug!(total, matched = matched.len(), "recommendation computed");
        Ok(matched)
    }
}

/// Runs ingestion every `config.interval` until Ctrl-C.
pub async fn serve(
    service: Arc<IngestService>,
    config: SchedulerConfig,
    locations_by_source: HashMap<String, String>,
) -> ServerResult<()> {
    serve_until(service, config, locations_by_source, tokio::signal::ctrl_c()).await?;
    Ok(())
}

/// Runs ingestion until `shutdown` resolves, then lets the pass in flight
/// finish and returns the final scheduler state.
async fn serve_until<S>(
    service: Arc<IngestService>,
    config: SchedulerConfig,
    locations_by_source: HashMap<String, String>,
    shutdown: S,
) -> ServerResult<SchedulerState>
where
    S: Future<Output = io::Result<()>>,
{
    if service.aggregator().is_empty() {
        return Err(ServerError::config("no event sources are enabled"));
    }

    let scheduler = Scheduler::new(config);
    let handle = scheduler.handle();
    let locations = Arc::new(locations_by_source);

    let run = scheduler.run(move || {
        let service = service.clone();
        let locations = locations.clone();
        async move {
            service
                .ingest(&locations)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    });
    tokio::pin!(run);

    let interrupted = tokio::select! {
        _ = &mut run => false,
        signal = shutdown => {
            signal?;
            true
        }
    };
    if interrupted {
        info!("interrupt received, finishing current pass");
        // The loop only exits on Stop, so it still holds the receiver.
        if handle.stop().await.is_ok() {
            run.await;
        }
    }

    let state = handle.state().await;
    info!(
        passes = state.passes,
        consecutive_failures = state.consecutive_failures,
        "scheduler stopped"
    );
    Ok(state)
}
