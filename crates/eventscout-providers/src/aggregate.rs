//! Aggregation driver.
//!
//! Calls every registered source one after another and concatenates what
//! they return. A source that fails contributes nothing; the remaining
//! sources still run and earlier results are kept.

use std::collections::HashMap;

use eventscout_core::Event;
use tracing::{debug, info};

use crate::provider::EventSource;

/// Ordered set of event sources.
#[derive(Default)]
pub struct Aggregator {
    sources: Vec<Box<dyn EventSource>>,
}

impl Aggregator {
    /// Creates an aggregator with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a source.
    pub fn with_source(mut self, source: impl EventSource + 'static) -> Self {
        self.push(Box::new(source));
        self
    }

    /// Registers a source; sources run in registration order.
    pub fn push(&mut self, source: Box<dyn EventSource>) {
        self.sources.push(source);
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the registered source names in invocation order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Fetches from every source sequentially and concatenates the results.
    ///
    /// `locations_by_source` maps a source name to the location passed to
    /// it; sources missing from the map use their default location. Output
    /// keeps the invocation order and each source's own order.
    pub async fn aggregate(&self, locations_by_source: &HashMap<String, String>) -> Vec<Event> {
        let mut all = Vec::new();

        for source in &self.sources {
            let location = locations_by_source
                .get(source.name())
                .map(String::as_str)
                .unwrap_or_else(|| source.default_location());

            let events = source.fetch(location).await;
            debug!(
                source = source.name(),
                location,
                count = events.len(),
                "source done"
            );
            all.extend(events);
        }

        info!(
            sources = self.sources.len(),
            count = all.len(),
            "aggregation finished"
        );
        all
    }
}
