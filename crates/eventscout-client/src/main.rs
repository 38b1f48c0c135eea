//! eventscout CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use eventscout_core::{TracingConfig, init_tracing};
use tracing::Level;

use eventscout_client::cli::{Cli, Command, ConfigAction};
use eventscout_client::commands;
use eventscout_client::config::ClientConfig;
use eventscout_client::error::{ClientError, ClientResult};
use eventscout_client::secret;

#[tokio::main]
async fn main() -> ExitCode {
    // Tokens may reference variables defined in ./.env
    if let Err(e) = secret::load_dotenv() {
        eprintln!("warning: ignoring .env: {}", e);
    }

    let cli = Cli::parse();

    let tracing_config = match (&cli.command, cli.debug) {
        (Command::Serve { .. }, false) => TracingConfig::daemon(),
        (Command::Serve { .. }, true) => TracingConfig::daemon().with_level(Level::DEBUG),
        (_, true) => TracingConfig::cli_debug(),
        (_, false) => TracingConfig::cli(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config.as_deref()).map_err(ClientError::Config)?;
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    match cli.command {
        Command::Fetch { locations } => commands::fetch::fetch(&config, locations).await,
        Command::List { output } => commands::events::list(&config, &output),
        Command::Recommend { interests, output } => {
            commands::events::recommend(&config, interests.as_deref(), &output)
        }
        Command::Serve { interval } => commands::fetch::serve(&config, interval).await,
        Command::Profile => commands::profile::run(&config, &config_path),
        Command::SeedDemo => commands::store::seed_demo(&config),
        Command::Reset { yes } => commands::store::reset(&config, yes),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
