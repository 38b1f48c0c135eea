//! KudaGo adapter.
//!
//! KudaGo's public API needs no credential. Locations are slugs (`ekb`,
//! `msk`, `spb`), requests carry a Unix time window, and start times come
//! back as epoch seconds in `dates[0].start`.

use std::time::Duration;

use chrono::Utc;
use eventscout_core::{Event, epoch_to_display};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::http::{DEFAULT_TIMEOUT, build_client, get_json};
use crate::normalize::{clean_text, first_non_blank, id_to_string, parse_items};
use crate::provider::{BoxFuture, EventSource};

/// Source name stored on KudaGo events.
pub const KUDAGO_SOURCE: &str = "kudago";

/// Public API root.
pub const KUDAGO_BASE_URL: &str = "https://kudago.com/public-api/v1.4";

/// Fields requested for each listing.
const FIELDS: &str = "id,title,short_title,dates,site_url,tags,categories,description";

/// Largest page KudaGo accepts.
const MAX_PAGE_SIZE: usize = 100;

const SECONDS_PER_DAY: i64 = 86_400;

/// Configuration for the KudaGo adapter.
#[derive(Debug, Clone)]
pub struct KudaGoConfig {
    /// API root, without the trailing `/events/`.
    pub base_url: String,
    /// Location slug used when the caller supplies none.
    pub location: String,
    /// Length of the `actual_since`..`actual_until` window.
    pub days_ahead: u32,
    /// Upper bound on listings collected per fetch.
    pub max_events: usize,
    /// Response language.
    pub lang: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for KudaGoConfig {
    fn default() -> Self {
        Self {
            base_url: KUDAGO_BASE_URL.to_string(),
            location: "ekb".to_string(),
            days_ahead: 30,
            max_events: 20,
            lang: "ru".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl KudaGoConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to set the default location slug.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the time window in days.
    pub fn with_days_ahead(mut self, days: u32) -> Self {
        self.days_ahead = days;
        self
    }

    /// Builder method to set the listing cap.
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Builder method to set the response language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid kudago base_url '{}': {}", self.base_url, e))?;
        if self.max_events == 0 {
            return Err("kudago max_events must be at least 1".to_string());
        }
        if self.days_ahead == 0 {
            return Err("kudago days_ahead must be at least 1".to_string());
        }
        Ok(())
    }

    fn events_url(&self) -> String {
        format!("{}/events/", self.base_url.trim_end_matches('/'))
    }
}

/// One page of `/events/`.
#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    results: Vec<Value>,
    next: Option<String>,
}

/// Event source backed by the KudaGo public API.
pub struct KudaGoSource {
    config: KudaGoConfig,
    client: reqwest::Client,
}

impl KudaGoSource {
    /// Creates the adapter.
    pub fn new(config: KudaGoConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &KudaGoConfig {
        &self.config
    }

    /// Downloads raw listings, following `next` until `max_events` are in.
    async fn download(&self, location: &str) -> ProviderResult<Vec<Value>> {
        let max_events = self.config.max_events;
        let since = Utc::now().timestamp();
        let until = since + i64::from(self.config.days_ahead) * SECONDS_PER_DAY;
        let page_size = max_events.min(MAX_PAGE_SIZE);

        let mut request = self.client.get(self.config.events_url()).query(&[
            ("location", location.to_string()),
            ("actual_since", since.to_string()),
            ("actual_until", until.to_string()),
            ("page_size", page_size.to_string()),
            ("lang", self.config.lang.clone()),
            ("fields", FIELDS.to_string()),
            ("text_format", "text".to_string()),
        ]);

        let mut items = Vec::new();
        loop {
            let page: EventsPage = get_json(request).await?;
            debug!(
                source = KUDAGO_SOURCE,
                location,
                count = page.results.len(),
                "fetched page"
            );

            let empty = page.results.is_empty();
            items.extend(page.results);
            if items.len() >= max_events || empty {
                break;
            }
            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => request = self.client.get(next),
                None => break,
            }
        }

        items.truncate(max_events);
        Ok(items)
    }
}

impl EventSource for KudaGoSource {
    fn name(&self) -> &str {
        KUDAGO_SOURCE
    }

    fn default_location(&self) -> &str {
        &self.config.location
    }

    fn try_fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let items = self
                .download(location)
                .await
                .map_err(|e| e.with_provider(KUDAGO_SOURCE))?;
            Ok(parse_items(KUDAGO_SOURCE, &items, parse_item))
        })
    }
}

/// Maps one KudaGo listing into an [`Event`].
///
/// Returns `None` when the item is not an object or has no id.
pub fn parse_item(item: &Value) -> Option<Event> {
    let item = item.as_object()?;
    let id = id_to_string(item.get("id")?)?;

    let title = item.get("title").and_then(Value::as_str).unwrap_or_default();
    let description = item
        .get("description")
        .and_then(Value::as_str)
        .map(clean_text);
    let summary = first_non_blank([
        item.get("short_title").and_then(Value::as_str),
        description.as_deref(),
    ])
    .unwrap_or_default();

    // KudaGo marks undated entries with negative starts.
    let start = item
        .get("dates")
        .and_then(Value::as_array)
        .and_then(|dates| dates.first())
        .and_then(|date| date.get("start"))
        .and_then(Value::as_i64)
        .filter(|start| *start > 0);

    let link = item
        .get("site_url")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let tags = ["tags", "categories"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str);

    Some(
        Event::new(KUDAGO_SOURCE, id, title)
            .with_occurs_at(epoch_to_display(start))
            .with_link(link)
            .with_summary(summary)
            .with_tags(tags),
    )
}
