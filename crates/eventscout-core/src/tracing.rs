//! Log setup for the eventscout binary.
//!
//! One-shot commands log compactly to stderr and stay quiet unless asked.
//! The `serve` loop logs JSON lines with timestamps so its output can be
//! shipped elsewhere. `RUST_LOG` overrides the preset level.
//!
//! ```ignore
//! use eventscout_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::daemon())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Shape of each log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One human-readable line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the eventscout crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Print the file and line of each event.
    pub source_location: bool,
    pub timestamps: bool,
    /// Directive used instead of `RUST_LOG`, e.g. `eventscout_providers=trace`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

impl TracingConfig {
    /// Warnings only, no timestamps.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            source_location: false,
            timestamps: false,
            filter: None,
        }
    }

    /// `--debug` on a one-shot command.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            source_location: true,
            ..Self::cli()
        }
    }

    /// Long-running `serve`: info level JSON with timestamps.
    #[must_use]
    pub fn daemon() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            source_location: true,
            timestamps: true,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: TracingOutputFormat) -> Self {
        Self { format, ..self }
    }

    #[must_use]
    pub fn with_filter(self, directive: impl Into<String>) -> Self {
        Self {
            filter: Some(directive.into()),
            ..self
        }
    }

    /// Explicit directive first, then `RUST_LOG`, then the preset level.
    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("eventscout={}", self.level)))),
        }
    }
}

/// Installs the global subscriber, logging to stderr.
///
/// # Errors
///
/// Fails when a subscriber is already installed or the filter does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.source_location)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let layer = match (config.format, config.timestamps) {
        (TracingOutputFormat::Json, _) => layer.json().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
