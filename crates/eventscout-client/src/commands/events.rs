//! Listing and recommendation commands.

use eventscout_core::{
    Event, FormatOptions, OutputFormat, RECOMMENDATION_HEADING, format_json, format_text,
    match_events,
};
use tracing::info;

use crate::cli::OutputArgs;
use crate::commands::open_store;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Heading printed above `list` output.
pub const STORED_HEADING: &str = "Stored events:";

/// Prints every stored event.
pub fn list(config: &ClientConfig, output: &OutputArgs) -> ClientResult<()> {
    let events = open_store(config)?.read_all()?;
    println!("{}", render(&events, STORED_HEADING, output)?);
    Ok(())
}

/// Prints stored events matching the interests.
///
/// Without `--interests` the profile's interests are used; blank interests
/// match everything.
pub fn recommend(
    config: &ClientConfig,
    interests: Option<&str>,
    output: &OutputArgs,
) -> ClientResult<()> {
    let interest_text = interests.unwrap_or_else(|| config.profile.interest_text());
    if interest_text.trim().is_empty() {
        info!("no interests given, showing every stored event");
    }

    let events = open_store(config)?.read_all()?;
    let matched = match_events(interest_text, events);
    println!("{}", render(&matched, RECOMMENDATION_HEADING, output)?);
    Ok(())
}

/// Renders events in the requested format.
pub fn render(events: &[Event], heading: &str, output: &OutputArgs) -> ClientResult<String> {
    let mut options = FormatOptions::default();
    if let Some(limit) = output.limit {
        options = options.with_limit(limit);
    }
    if let Some(max) = output.max_summary_length {
        options = options.with_max_summary_length(max);
    }

    match output.output_format() {
        OutputFormat::Text => Ok(format_text(events, heading, &options)),
        OutputFormat::Json => {
            format_json(events, &options).map_err(|e| ClientError::Render(e.to_string()))
        }
    }
}
