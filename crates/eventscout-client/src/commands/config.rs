//! Configuration commands.

use std::io::{self, Write};
use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration, resolving token references.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    report(config, &mut io::stdout())
}

fn report<W: Write>(config: &ClientConfig, out: &mut W) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    let aggregator = config.build_aggregator();
    let sources = aggregator.source_names();
    if sources.is_empty() {
        writeln!(out, "Configuration is valid, but no event sources are enabled.")?;
    } else {
        writeln!(
            out,
            "Configuration is valid. Enabled sources: {}",
            sources.join(", ")
        )?;
    }
    for source in config.inline_token_sources() {
        writeln!(
            out,
            "Warning: the {} token is stored in plain text; consider `env::VAR` or `pass::path`.",
            source
        )?;
    }
    if !config.profile.is_complete() {
        writeln!(
            out,
            "Profile is incomplete; run `eventscout profile` to fill it in."
        )?;
    }
    Ok(())
}

/// Show the configuration and database paths.
pub fn path(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    println!("database: {}", config.database_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(config: &ClientConfig) -> ClientResult<String> {
        let mut out = Vec::new();
        report(config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn report_lists_sources_and_warns_on_plain_token() {
        let config: ClientConfig = toml::from_str(
            r#"
[timepad]
enabled = false
[eventbrite]
token = "plain-token"
"#,
        )
        .unwrap();

        let shown = render(&config).unwrap();
        assert!(shown.contains("Enabled sources: kudago, eventbrite"));
        assert!(shown.contains("the eventbrite token is stored in plain text"));
        assert!(shown.contains("Profile is incomplete"));
    }

    #[test]
    fn report_without_sources() {
        let mut config = ClientConfig::default();
        config.kudago.enabled = false;
        config.timepad.enabled = false;
        config.eventbrite.enabled = false;

        let shown = render(&config).unwrap();
        assert!(shown.contains("no event sources are enabled"));
        assert!(!shown.contains("plain text"));
    }

    #[test]
    fn report_fails_on_invalid_config() {
        let mut config = ClientConfig::default();
        config.eventbrite.enabled = false;
        config.http.timeout_secs = 0;
        let err = render(&config).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
