//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eventscout_core::OutputFormat;

/// eventscout - events from KudaGo, TimePad and Eventbrite, matched to your interests
#[derive(Debug, Parser)]
#[command(name = "eventscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "EVENTSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output options shared by listing commands.
#[derive(Debug, Clone, clap::Args)]
pub struct OutputArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Maximum number of events to display
    #[arg(long)]
    pub limit: Option<usize>,

    /// Maximum description length (truncated with ellipsis)
    #[arg(long)]
    pub max_summary_length: Option<usize>,
}

impl OutputArgs {
    /// Returns the selected output format.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch events from every enabled provider and store them
    Fetch {
        /// Override a provider's location, as SOURCE=LOCATION (can be repeated)
        #[arg(long = "location", short, value_parser = parse_location, action = clap::ArgAction::Append)]
        locations: Vec<(String, String)>,
    },

    /// List every stored event
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Recommend stored events matching your interests
    Recommend {
        /// Comma-separated interests; defaults to the profile's interests
        #[arg(long, short)]
        interests: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch and store events periodically until interrupted
    Serve {
        /// Seconds between passes; defaults to [schedule] interval_secs
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Fill in your interest profile
    Profile,

    /// Store the demo events if the store is empty
    SeedDemo,

    /// Delete every stored event
    Reset {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Check the configuration, resolving token references
    Validate,
    /// Print the configuration and database paths
    Path,
}

/// Parses `SOURCE=LOCATION`.
fn parse_location(value: &str) -> Result<(String, String), String> {
    let (source, location) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SOURCE=LOCATION, got '{}'", value))?;
    let (source, location) = (source.trim(), location.trim());
    if source.is_empty() || location.is_empty() {
        return Err(format!("expected SOURCE=LOCATION, got '{}'", value));
    }
    Ok((source.to_lowercase(), location.to_string()))
}
