//! Eventbrite adapter.
//!
//! Eventbrite searches by free-text query and requires a private token sent
//! as a bearer credential. Without a token the adapter still registers but
//! every fetch fails with a configuration error.

use std::time::Duration;

use eventscout_core::{Event, iso_to_display};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::http::{DEFAULT_TIMEOUT, build_client, get_json};
use crate::normalize::{clean_text, first_non_blank, id_to_string, parse_items};
use crate::provider::{BoxFuture, EventSource};

/// Source name stored on Eventbrite events.
pub const EVENTBRITE_SOURCE: &str = "eventbrite";

/// Public API root.
pub const EVENTBRITE_BASE_URL: &str = "https://www.eventbriteapi.com/v3";

/// Related objects expanded inline in search results.
const EXPAND: &str = "venue,category,format";

/// Configuration for the Eventbrite adapter.
#[derive(Debug, Clone)]
pub struct EventbriteConfig {
    /// API root, without the trailing `/events/search/`.
    pub base_url: String,
    /// Search query used when the caller supplies none.
    pub location: String,
    /// Upper bound on listings collected per fetch.
    pub max_events: usize,
    /// Private token.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for EventbriteConfig {
    fn default() -> Self {
        Self {
            base_url: EVENTBRITE_BASE_URL.to_string(),
            location: "Ekaterinburg".to_string(),
            max_events: 20,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EventbriteConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to set the default search query.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the listing cap.
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Builder method to set the private token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// A missing token is not a validation error; it is reported on fetch.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid eventbrite base_url '{}': {}", self.base_url, e))?;
        if self.max_events == 0 {
            return Err("eventbrite max_events must be at least 1".to_string());
        }
        Ok(())
    }

    fn search_url(&self) -> String {
        format!("{}/events/search/", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    has_more_items: bool,
}

/// One page of `/events/search/`.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    events: Vec<Value>,
    #[serde(default)]
    pagination: Pagination,
}

/// Event source backed by the Eventbrite API.
pub struct EventbriteSource {
    config: EventbriteConfig,
    client: reqwest::Client,
}

impl EventbriteSource {
    /// Creates the adapter.
    pub fn new(config: EventbriteConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EventbriteConfig {
        &self.config
    }

    async fn download(&self, location: &str) -> ProviderResult<Vec<Value>> {
        let token = self
            .config
            .token
            .as_deref()
            .ok_or_else(|| ProviderError::configuration("eventbrite token is not configured"))?;
        let max_events = self.config.max_events;

        let mut items = Vec::new();
        let mut page_number: u32 = 1;
        loop {
            let request = self
                .client
                .get(self.config.search_url())
                .bearer_auth(token)
                .query(&[
                    ("q", location.to_string()),
                    ("expand", EXPAND.to_string()),
                    ("page", page_number.to_string()),
                ]);

            let page: SearchPage = get_json(request).await?;
            debug!(
                source = EVENTBRITE_SOURCE,
                location,
                page = page_number,
                count = page.events.len(),
                "fetched page"
            );

            let empty = page.events.is_empty();
            items.extend(page.events);
            if empty || items.len() >= max_events || !page.pagination.has_more_items {
                break;
            }
            page_number += 1;
        }

        items.truncate(max_events);
        Ok(items)
    }
}

impl EventSource for EventbriteSource {
    fn name(&self) -> &str {
        EVENTBRITE_SOURCE
    }

    fn default_location(&self) -> &str {
        &self.config.location
    }

    fn try_fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let items = self
                .download(location)
                .await
                .map_err(|e| e.with_provider(EVENTBRITE_SOURCE))?;
            Ok(parse_items(EVENTBRITE_SOURCE, &items, parse_item))
        })
    }
}

/// Reads `object.key` as a string, e.g. `name.text`.
fn nested_str<'a>(item: &'a serde_json::Map<String, Value>, object: &str, key: &str) -> Option<&'a str> {
    item.get(object)?.get(key)?.as_str()
}

/// Maps one Eventbrite search result into an [`Event`].
///
/// Returns `None` when the item is not an object or has no id.
pub fn parse_item(item: &Value) -> Option<Event> {
    let item = item.as_object()?;
    let id = id_to_string(item.get("id")?)?;

    let title = nested_str(item, "name", "text").unwrap_or_default();
    let description = nested_str(item, "description", "text").map(clean_text);
    let summary = first_non_blank([
        description.as_deref(),
        item.get("summary").and_then(Value::as_str),
    ])
    .unwrap_or_default();
    let link = item.get("url").and_then(Value::as_str).unwrap_or_default();

    let tags = [
        nested_str(item, "category", "short_name"),
        nested_str(item, "category", "name"),
        nested_str(item, "format", "short_name"),
    ];

    Some(
        Event::new(EVENTBRITE_SOURCE, id, title)
            .with_occurs_at(iso_to_display(nested_str(item, "start", "local")))
            .with_link(link)
            .with_summary(summary)
            .with_tags(tags.into_iter().flatten()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::test_server::{TestServer, header, query_pairs};
    use serde_json::json;

    fn result(id: &str) -> Value {
        json!({
            "id": id,
            "name": {"text": format!("Concert {}", id)},
            "start": {"local": "2025-04-12T20:00:00", "utc": "2025-04-12T15:00:00Z"},
            "url": format!("https://www.eventbrite.com/e/{}", id),
            "category": {"name": "Music", "short_name": "Music"},
        })
    }

    #[test]
    fn parse_full_item() {
        let event = parse_item(&json!({
            "id": "774411",
            "name": {"text": "Jazz Night", "html": "Jazz Night"},
            "description": {"text": "Live   jazz\nall night"},
            "summary": "Live jazz",
            "start": {"local": "2025-04-12T20:00:00"},
            "url": "https://www.eventbrite.com/e/jazz-night-774411",
            "category": {"name": "Music", "short_name": "Music"},
            "format": {"short_name": "Concert"},
        }))
        .unwrap();

        assert_eq!(event.source, "eventbrite");
        assert_eq!(event.external_id, "774411");
        assert_eq!(event.title, "Jazz Night");
        assert_eq!(event.summary, "Live jazz all night");
        assert_eq!(event.occurs_at, "2025-04-12 20:00");
        assert_eq!(event.link, "https://www.eventbrite.com/e/jazz-night-774411");
        assert_eq!(event.tags, vec!["music", "concert"]);
    }

    #[test]
    fn parse_uses_summary_then_title() {
        let event = parse_item(&json!({
            "id": "1",
            "name": {"text": "Jazz Night"},
            "description": null,
            "summary": "Live jazz",
        }))
        .unwrap();
        assert_eq!(event.summary, "Live jazz");

        let event = parse_item(&json!({"id": "2", "name": null})).unwrap();
        assert_eq!(event.title, "Untitled");
        assert_eq!(event.summary, "Untitled");
        assert_eq!(event.occurs_at, "");
    }

    #[test]
    fn parse_drops_items_without_id() {
        assert!(parse_item(&json!({"name": {"text": "Jazz"}})).is_none());
        assert!(parse_item(&json!(null)).is_none());
    }

    #[tokio::test]
    async fn missing_token_is_configuration_error() {
        let source = EventbriteSource::new(EventbriteConfig::new()).unwrap();
        let err = source.try_fetch("Ekaterinburg").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("eventbrite"));
        assert!(source.fetch("Ekaterinburg").await.is_empty());
    }

    #[tokio::test]
    async fn fetch_sends_bearer_and_pages() {
        let server = TestServer::bind().await;
        let base = server.base_url().to_string();
        let handle = server.serve(vec![
            (
                200,
                json!({
                    "events": [result("1"), result("2")],
                    "pagination": {"page_number": 1, "has_more_items": true},
                })
                .to_string(),
            ),
            (
                200,
                json!({
                    "events": [result("3")],
                    "pagination": {"page_number": 2, "has_more_items": false},
                })
                .to_string(),
            ),
        ]);

        let source = EventbriteSource::new(
            EventbriteConfig::new()
                .with_base_url(&base)
                .with_token("private-token"),
        )
        .unwrap();
        let events = source.fetch("Ekaterinburg").await;
        let heads = handle.await.unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.external_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(events[0].tags, vec!["music"]);

        assert_eq!(
            header(&heads[0], "authorization"),
            Some("Bearer private-token")
        );
        let first = query_pairs(&heads[0]);
        assert_eq!(first["q"], "Ekaterinburg");
        assert_eq!(first["expand"], EXPAND);
        assert_eq!(first["page"], "1");
        assert_eq!(query_pairs(&heads[1])["page"], "2");
    }

    #[tokio::test]
    async fn rate_limit_fails_softly() {
        let server = TestServer::bind().await;
        let base = server.base_url().to_string();
        let handle = server.serve(vec![(429, "{}".to_string())]);

        let source = EventbriteSource::new(
            EventbriteConfig::new().with_base_url(&base).with_token("t"),
        )
        .unwrap();
        let err = source.try_fetch("Ekaterinburg").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert!(err.is_retryable());
        handle.await.unwrap();
    }
}
