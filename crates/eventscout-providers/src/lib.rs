//! EventSource trait, provider adapters, and the aggregation driver.
//!
//! This crate turns third-party event listings into canonical events:
//!
//! - [`EventSource`] - The trait every provider adapter implements
//! - [`KudaGoSource`], [`TimePadSource`], [`EventbriteSource`] - The adapters
//! - [`Aggregator`] - Runs every source in turn and concatenates the results
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────┐
//! │  KudaGo  │   │ TimePad  │   │ Eventbrite │
//! └────┬─────┘   └────┬─────┘   └─────┬──────┘
//!      │ epoch        │ ISO-8601      │ ISO-8601
//!      ▼              ▼               ▼
//!   parse_item()   parse_item()    parse_item()
//!      │              │               │
//!      │         EventSource          │
//!      └──────────────┬───────────────┘
//!                     ▼
//!              ┌────────────┐
//!              │ Aggregator │  sequential, failures yield []
//!              └─────┬──────┘
//!                    ▼
//!               Vec<Event>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use eventscout_providers::{Aggregator, KudaGoConfig, KudaGoSource};
//!
//! let aggregator = Aggregator::new().with_source(KudaGoSource::new(KudaGoConfig::new())?);
//! let events = aggregator.aggregate(&HashMap::new()).await;
//! ```

pub mod aggregate;
pub mod error;
pub mod eventbrite;
pub mod http;
pub mod kudago;
pub mod normalize;
pub mod provider;
pub mod timepad;

#[cfg(test)]
mod test_server;

// Re-export main types at crate root
pub use aggregate::Aggregator;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use eventbrite::{EVENTBRITE_SOURCE, EventbriteConfig, EventbriteSource};
pub use http::DEFAULT_TIMEOUT;
pub use kudago::{KUDAGO_SOURCE, KudaGoConfig, KudaGoSource};
pub use provider::{BoxFuture, ErrorSource, EventSource, StaticSource};
pub use timepad::{TIMEPAD_SOURCE, TimePadConfig, TimePadSource};
