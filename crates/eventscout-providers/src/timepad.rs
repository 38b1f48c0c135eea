//! TimePad adapter.
//!
//! TimePad filters by a free-text city name and pages with `limit`/`skip`
//! against the `total` it reports. A token is optional; when present it is
//! sent as a bearer credential.

use std::time::Duration;

use eventscout_core::{Event, iso_to_display};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::http::{DEFAULT_TIMEOUT, build_client, get_json};
use crate::normalize::{clean_text, id_to_string, parse_items};
use crate::provider::{BoxFuture, EventSource};

/// Source name stored on TimePad events.
pub const TIMEPAD_SOURCE: &str = "timepad";

/// Public API root.
pub const TIMEPAD_BASE_URL: &str = "https://api.timepad.ru/v1";

/// Largest `limit` TimePad accepts.
const MAX_PAGE_SIZE: usize = 100;

/// Configuration for the TimePad adapter.
#[derive(Debug, Clone)]
pub struct TimePadConfig {
    /// API root, without the trailing `/events`.
    pub base_url: String,
    /// City name used when the caller supplies none.
    pub location: String,
    /// Upper bound on listings collected per fetch.
    pub max_events: usize,
    /// Optional API token.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TimePadConfig {
    fn default() -> Self {
        Self {
            base_url: TIMEPAD_BASE_URL.to_string(),
            location: "Екатеринбург".to_string(),
            max_events: 20,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TimePadConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to set the default city.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the listing cap.
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Builder method to set the API token.
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
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid timepad base_url '{}': {}", self.base_url, e))?;
        if self.max_events == 0 {
            return Err("timepad max_events must be at least 1".to_string());
        }
        Ok(())
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url.trim_end_matches('/'))
    }
}

/// One page of `/events`.
#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    values: Vec<Value>,
}

/// Event source backed by the TimePad API.
pub struct TimePadSource {
    config: TimePadConfig,
    client: reqwest::Client,
}

impl TimePadSource {
    /// Creates the adapter.
    pub fn new(config: TimePadConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TimePadConfig {
        &self.config
    }

    async fn download(&self, location: &str) -> ProviderResult<Vec<Value>> {
        let max_events = self.config.max_events;
        let limit = max_events.min(MAX_PAGE_SIZE);

        let mut items = Vec::new();
        loop {
            let skip = items.len();
            let mut request = self.client.get(self.config.events_url()).query(&[
                ("cities", location.to_string()),
                ("limit", limit.to_string()),
                ("skip", skip.to_string()),
                ("fields", "description_short".to_string()),
            ]);
            if let Some(ref token) = self.config.token {
                request = request.bearer_auth(token);
            }

            let page: EventsPage = get_json(request).await?;
            debug!(
                source = TIMEPAD_SOURCE,
                location,
                skip,
                total = page.total,
                count = page.values.len(),
                "fetched page"
            );

            let empty = page.values.is_empty();
            items.extend(page.values);
            if empty || items.len() >= max_events || items.len() >= page.total {
                break;
            }
        }

        items.truncate(max_events);
        Ok(items)
    }
}

impl EventSource for TimePadSource {
    fn name(&self) -> &str {
        TIMEPAD_SOURCE
    }

    fn default_location(&self) -> &str {
        &self.config.location
    }

    fn try_fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let items = self
                .download(location)
                .await
                .map_err(|e| e.with_provider(TIMEPAD_SOURCE))?;
            Ok(parse_items(TIMEPAD_SOURCE, &items, parse_item))
        })
    }
}

/// Maps one TimePad listing into an [`Event`].
///
/// Returns `None` when the item is not an object or has no id.
pub fn parse_item(item: &Value) -> Option<Event> {
    let item = item.as_object()?;
    let id = id_to_string(item.get("id")?)?;

    let title = item.get("name").and_then(Value::as_str).unwrap_or_default();
    let summary = item
        .get("description_short")
        .and_then(Value::as_str)
        .map(clean_text)
        .unwrap_or_default();
    let starts_at = item.get("starts_at").and_then(Value::as_str);
    let link = item.get("url").and_then(Value::as_str).unwrap_or_default();

    let categories = item
        .get("categories")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|category| category.get("name").and_then(Value::as_str));

    Some(
        Event::new(TIMEPAD_SOURCE, id, title)
            .with_occurs_at(iso_to_display(starts_at))
            .with_link(link)
            .with_summary(summary)
            .with_tags(categories),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::test_server::{TestServer, header, query_pairs};
    use serde_json::json;

    fn listing(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Meetup {}", id),
            "starts_at": "2025-03-01T19:00:00+0500",
            "url": format!("https://afisha.timepad.ru/event/{}", id),
            "categories": [{"id": 462, "name": "ИТ и интернет"}],
        })
    }

    #[test]
    fn parse_full_item() {
        let event = parse_item(&json!({
            "id": 3120517,
            "name": "Rust Meetup",
            "starts_at": "2025-03-01T19:00:00+0500",
            "url": "https://it-ekb.timepad.ru/event/3120517/",
            "description_short": "<p>Talks &amp; pizza</p>",
            "categories": [{"id": 462, "name": "IT"}, {"id": 1, "name": "Education, Science"}],
        }))
        .unwrap();

        assert_eq!(event.source, "timepad");
        assert_eq!(event.external_id, "3120517");
        assert_eq!(event.title, "Rust Meetup");
        assert_eq!(event.occurs_at, "2025-03-01 19:00");
        assert_eq!(event.link, "https://it-ekb.timepad.ru/event/3120517/");
        assert_eq!(event.summary, "Talks & pizza");
        assert_eq!(event.tags, vec!["it", "education", "science"]);
    }

    #[test]
    fn parse_defaults() {
        let event = parse_item(&json!({"id": "77"})).unwrap();
        assert_eq!(event.external_id, "77");
        assert_eq!(event.title, "Untitled");
        assert_eq!(event.summary, "Untitled");
        assert_eq!(event.occurs_at, "");
        assert!(event.tags.is_empty());
    }

    #[test]
    fn parse_drops_items_without_id() {
        assert!(parse_item(&json!({"name": "Rust Meetup"})).is_none());
        assert!(parse_item(&json!([1, 2])).is_none());
    }

    #[test]
    fn blank_token_is_ignored() {
        assert!(TimePadConfig::new().with_token("  ").token.is_none());
        assert_eq!(
            TimePadConfig::new().with_token("abc").token.as_deref(),
            Some("abc")
        );
    }

    #[tokio::test]
    async fn fetch_pages_with_skip_until_total() {
        let server = TestServer::bind().await;
        let base = server.base_url().to_string();
        let handle = server.serve(vec![
            (
                200,
                json!({"total": 3, "values": [listing(1), listing(2)]}).to_string(),
            ),
            (200, json!({"total": 3, "values": [listing(3)]}).to_string()),
        ]);

        let config = TimePadConfig::new()
            .with_base_url(&base)
            .with_max_events(10)
            .with_token("secret");
        let source = TimePadSource::new(config).unwrap();
        let events = source.fetch("Екатеринбург").await;
        let heads = handle.await.unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[2].external_id, "3");

        let first = query_pairs(&heads[0]);
        assert_eq!(first["cities"], "Екатеринбург");
        assert_eq!(first["limit"], "10");
        assert_eq!(first["skip"], "0");
        assert_eq!(query_pairs(&heads[1])["skip"], "2");
        assert_eq!(header(&heads[0], "authorization"), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn fetch_without_token_sends_no_credential() {
        let server = TestServer::bind().await;
        let base = server.base_url().to_string();
        let handle = server.serve(vec![(
            200,
            json!({"total": 1, "values": [listing(1)]}).to_string(),
        )]);

        let source = TimePadSource::new(TimePadConfig::new().with_base_url(&base)).unwrap();
        let events = source.try_fetch("Москва").await.unwrap();
        let heads = handle.await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(header(&heads[0], "authorization"), None);
    }

    #[tokio::test]
    async fn rejected_token_fails_softly() {
        let server = TestServer::bind().await;
        let base = server.base_url().to_string();
        let handle = server.serve(vec![(401, "{}".to_string())]);

        let source =
            TimePadSource::new(TimePadConfig::new().with_base_url(&base).with_token("bad"))
                .unwrap();
        let err = source.try_fetch("Москва").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        handle.await.unwrap();
    }
}
