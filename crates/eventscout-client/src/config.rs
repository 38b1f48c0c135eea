//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventscout/config.toml` by default.
//!
//! Provider tokens support secret references:
//! - `env::VAR_NAME` resolved from the environment (after loading `.env`)
//! - `pass::path/in/store` resolved via `pass show`
//! - plain text used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use eventscout_core::UserInterestProfile;
use eventscout_providers::{
    Aggregator, EVENTBRITE_SOURCE, ErrorSource, EventbriteConfig, EventbriteSource,
    KUDAGO_SOURCE, KudaGoConfig, KudaGoSource, ProviderError, ProviderResult, TIMEPAD_SOURCE,
    TimePadConfig, TimePadSource,
};
use eventscout_server::SchedulerConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::secret::{SecretRef, resolve_token};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the eventscout client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// SQLite database file; defaults to the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// HTTP settings shared by all providers.
    pub http: HttpSettings,

    /// KudaGo settings.
    pub kudago: KudaGoSettings,

    /// TimePad settings.
    pub timepad: TimePadSettings,

    /// Eventbrite settings.
    pub eventbrite: EventbriteSettings,

    /// Periodic ingestion settings.
    pub schedule: ScheduleSettings,

    /// Interest profile filled by `eventscout profile`.
    pub profile: UserInterestProfile,
}

/// HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

/// Periodic ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Seconds between ingestion passes.
    pub interval_secs: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path`, or the default path when `None`.
    ///
    /// A missing file at the default path yields the defaults; a missing
    /// file given explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventscout")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventscout")
    }

    /// Returns the database path in effect.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("events.db"))
    }

    /// Returns the per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Returns the scheduler configuration for `serve`.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(Duration::from_secs(self.schedule.interval_secs))
    }

    /// Builds the aggregator from the enabled providers.
    ///
    /// A provider that cannot be set up is registered as a failing source,
    /// so every pass logs why it produced nothing.
    pub fn build_aggregator(&self) -> Aggregator {
        let timeout = self.timeout();
        let mut aggregator = Aggregator::new();

        if self.kudago.enabled {
            register(
                &mut aggregator,
                KUDAGO_SOURCE,
                KudaGoSource::new(self.kudago.to_provider_config(timeout)),
            );
        }
        if self.timepad.enabled {
            register(
                &mut aggregator,
                TIMEPAD_SOURCE,
                self.timepad
                    .to_provider_config(timeout)
                    .map_err(ProviderError::configuration)
                    .and_then(TimePadSource::new),
            );
        }
        if self.eventbrite.enabled {
            register(
                &mut aggregator,
                EVENTBRITE_SOURCE,
                self.eventbrite
                    .to_provider_config(timeout)
                    .map_err(ProviderError::configuration)
                    .and_then(EventbriteSource::new),
            );
        }

        aggregator
    }

    /// Enabled sources whose token is written into the config file as is.
    pub fn inline_token_sources(&self) -> Vec<&'static str> {
        [
            (TIMEPAD_SOURCE, self.timepad.enabled, self.timepad.token.as_deref()),
            (EVENTBRITE_SOURCE, self.eventbrite.enabled, self.eventbrite.token.as_deref()),
        ]
        .into_iter()
        .filter(|(_, enabled, token)| {
            *enabled
                && token
                    .map(str::trim)
                    .is_some_and(|t| !t.is_empty() && SecretRef::parse(t).is_inline())
        })
        .map(|(name, _, _)| name)
        .collect()
    }

    /// Checks every section, resolving token references.
    pub fn validate(&self) -> Result<(), String> {
        if self.http.timeout_secs == 0 {
            return Err("http.timeout_secs must be at least 1".to_string());
        }
        if self.schedule.interval_secs == 0 {
            return Err("schedule.interval_secs must be at least 1".to_string());
        }

        let timeout = self.timeout();
        self.kudago.to_provider_config(timeout).validate()?;
        self.timepad.to_provider_config(timeout)?.validate()?;
        let eventbrite = self.eventbrite.to_provider_config(timeout)?;
        eventbrite.validate()?;
        if self.eventbrite.enabled && eventbrite.token.is_none() {
            return Err(
                "eventbrite is enabled but has no token; set [eventbrite] token or enabled = false"
                    .to_string(),
            );
        }
        Ok(())
    }
}

fn register<S>(aggregator: &mut Aggregator, name: &str, source: ProviderResult<S>)
where
    S: eventscout_providers::EventSource + 'static,
{
    match source {
        Ok(source) => {
            debug!(source = name, "provider registered");
            aggregator.push(Box::new(source));
        }
        Err(e) => {
            warn!(source = name, error = %e, "provider misconfigured");
            aggregator.push(Box::new(ErrorSource::new(name, &e)));
        }
    }
}

// ---------------------------------------------------------------------------
// Provider sections
// ---------------------------------------------------------------------------

/// `[kudago]` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KudaGoSettings {
    pub enabled: bool,
    /// Location slug (`ekb`, `msk`, `spb`, ...).
    pub location: String,
    pub max_events: usize,
    /// Days ahead covered by the time window.
    pub days_ahead: u32,
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for KudaGoSettings {
    fn default() -> Self {
        let defaults = KudaGoConfig::default();
        Self {
            enabled: true,
            location: defaults.location,
            max_events: defaults.max_events,
            days_ahead: defaults.days_ahead,
            lang: defaults.lang,
            base_url: None,
        }
    }
}

impl KudaGoSettings {
    /// Converts to provider configuration.
    pub fn to_provider_config(&self, timeout: Duration) -> KudaGoConfig {
        let mut config = KudaGoConfig::new()
            .with_location(&self.location)
            .with_max_events(self.max_events)
            .with_days_ahead(self.days_ahead)
            .with_lang(&self.lang)
            .with_timeout(timeout);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }
}

/// `[timepad]` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePadSettings {
    pub enabled: bool,
    /// City name as TimePad spells it.
    pub location: String,
    pub max_events: usize,
    /// Optional token (supports `env::` and `pass::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for TimePadSettings {
    fn default() -> Self {
        let defaults = TimePadConfig::default();
        Self {
            enabled: true,
            location: defaults.location,
            max_events: defaults.max_events,
            token: None,
            base_url: None,
        }
    }
}

impl TimePadSettings {
    /// Converts to provider configuration, resolving the token reference.
    pub fn to_provider_config(&self, timeout: Duration) -> Result<TimePadConfig, String> {
        let mut config = TimePadConfig::new()
            .with_location(&self.location)
            .with_max_events(self.max_events)
            .with_timeout(timeout);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(token) = resolve_token(self.token.as_deref())
            .map_err(|e| format!("failed to resolve timepad token: {}", e))?
        {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

/// `[eventbrite]` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventbriteSettings {
    pub enabled: bool,
    /// Free-text search query, usually the city name.
    pub location: String,
    pub max_events: usize,
    /// Private token (supports `env::` and `pass::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EventbriteSettings {
    fn default() -> Self {
        let defaults = EventbriteConfig::default();
        Self {
            enabled: true,
            location: defaults.location,
            max_events: defaults.max_events,
            token: None,
            base_url: None,
        }
    }
}

impl EventbriteSettings {
    /// Converts to provider configuration, resolving the token reference.
    pub fn to_provider_config(&self, timeout: Duration) -> Result<EventbriteConfig, String> {
        let mut config = EventbriteConfig::new()
            .with_location(&self.location)
            .with_max_events(self.max_events)
            .with_timeout(timeout);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(token) = resolve_token(self.token.as_deref())
            .map_err(|e| format!("failed to resolve eventbrite token: {}", e))?
        {
            config = config.with_token(token);
        }
        Ok(config)
    }
}
