//! Subcommand implementations.

pub mod config;
pub mod events;
pub mod fetch;
pub mod profile;
pub mod store;

use std::sync::Arc;

use eventscout_server::EventStore;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Opens the event store named by the configuration.
pub(crate) fn open_store(config: &ClientConfig) -> ClientResult<Arc<EventStore>> {
    let path = config.database_path();
    debug!(path = %path.display(), "opening event store");
    Ok(Arc::new(EventStore::open(&path)?))
}
