//! EventSource trait definition.
//!
//! An [`EventSource`] is one external event-listing provider. It knows how to
//! build its own request for a location and how to map each listing into the
//! canonical [`Event`]. Failures stay inside the source: [`EventSource::fetch`]
//! logs them and yields an empty list so an aggregation pass keeps going.

use std::future::Future;
use std::pin::Pin;

use eventscout_core::Event;
use tracing::warn;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One event provider (KudaGo, TimePad, Eventbrite, ...).
///
/// Implementations keep no state between calls apart from their
/// configuration and HTTP client.
///
/// # Example Implementation
///
/// ```ignore
/// impl EventSource for MySource {
///     fn name(&self) -> &str { "mysource" }
///     fn default_location(&self) -> &str { "ekb" }
///
///     fn try_fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
///         Box::pin(async move {
///             let items = self.download(location).await?;
///             Ok(parse_items(self.name(), &items, parse_item))
///         })
///     }
/// }
/// ```
pub trait EventSource: Send + Sync {
    /// Returns the provider identifier stored in [`Event::source`].
    fn name(&self) -> &str;

    /// Returns the location used when the caller supplies none.
    fn default_location(&self) -> &str;

    /// Fetches and parses listings for `location`.
    ///
    /// Items that cannot be parsed are dropped individually; only failures
    /// of the request itself are returned as errors.
    fn try_fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>>;

    /// Fetches listings, turning any failure into an empty list.
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Vec<Event>> {
        Box::pin(async move {
            match self.try_fetch(location).await {
                Ok(events) => events,
                Err(err) => {
                    warn!(
                        source = self.name(),
                        location,
                        code = %err.code(),
                        error = %err,
                        "fetch failed, continuing without events"
                    );
                    Vec::new()
                }
            }
        })
    }
}

/// A source that serves a fixed list of events.
///
/// Used for demo data and in tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    location: String,
    events: Vec<Event>,
}

impl StaticSource {
    /// Creates a source that always returns `events`.
    pub fn new(name: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            name: name.into(),
            location: String::new(),
            events,
        }
    }

    /// Builder method to set the default location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

impl EventSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_location(&self) -> &str {
        &self.location
    }

    fn try_fetch<'a>(&'a self, _location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
        let events = self.events.clone();
        Box::pin(async move { Ok(events) })
    }
}

/// A source that always fails.
///
/// Stands in for a provider that could not be configured, so the failure is
/// logged on every pass instead of silently dropping the provider.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    code: ProviderErrorCode,
    message: String,
}

impl ErrorSource {
    /// Creates a failing source from the error that prevented setup.
    pub fn new(name: impl Into<String>, error: &ProviderError) -> Self {
        Self {
            name: name.into(),
            code: error.code(),
            message: error.message().to_string(),
        }
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_location(&self) -> &str {
        ""
    }

    fn try_fetch<'a>(&'a self, _location: &'a str) -> BoxFuture<'a, ProviderResult<Vec<Event>>> {
        let error = ProviderError::new(self.code, &self.message).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_returns_events() {
        let source = StaticSource::new("demo", vec![Event::new("demo", "1", "City Tour")])
            .with_location("msk");

        assert_eq!(source.name(), "demo");
        assert_eq!(source.default_location(), "msk");
        let events = source.fetch("anywhere").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "City Tour");
    }

    #[tokio::test]
    async fn error_source_fails_softly() {
        let source = ErrorSource::new(
            "eventbrite",
            &ProviderError::configuration("eventbrite token is missing"),
        );

        let err = source.try_fetch("Ekaterinburg").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("eventbrite"));

        assert!(source.fetch("Ekaterinburg").await.is_empty());
    }
}
