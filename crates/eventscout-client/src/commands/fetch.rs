//! Ingestion commands: one-shot `fetch` and periodic `serve`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use eventscout_server::IngestService;
use tracing::info;

use crate::commands::open_store;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Fetches from every enabled provider once and stores the result.
pub async fn fetch(config: &ClientConfig, locations: Vec<(String, String)>) -> ClientResult<()> {
    let aggregator = config.build_aggregator();
    if aggregator.is_empty() {
        return Err(ClientError::Config(
            "no event sources are enabled; enable [kudago], [timepad] or [eventbrite] in config.toml"
                .into(),
        ));
    }

    let locations: HashMap<String, String> = locations.into_iter().collect();
    let service = IngestService::new(aggregator, open_store(config)?);
    let report = service.ingest(&locations).await?;

    println!(
        "Fetched {} events: {} new, {} already stored.",
        report.fetched, report.inserted, report.skipped
    );
    Ok(())
}

/// Runs ingestion periodically until Ctrl-C.
pub async fn serve(config: &ClientConfig, interval_secs: Option<u64>) -> ClientResult<()> {
    let mut scheduler_config = config.scheduler_config();
    if let Some(secs) = interval_secs {
        if secs == 0 {
            return Err(ClientError::Config("--interval must be at least 1".into()));
        }
        scheduler_config.interval = Duration::from_secs(secs);
    }

    let aggregator = config.build_aggregator();
    info!(
        sources = ?aggregator.source_names(),
        interval_secs = scheduler_config.interval.as_secs(),
        database = %config.database_path().display(),
        "starting periodic ingestion"
    );

    let service = Arc::new(IngestService::new(aggregator, open_store(config)?));
    eventscout_server::serve(service, scheduler_config, HashMap::new()).await?;
    Ok(())
}
