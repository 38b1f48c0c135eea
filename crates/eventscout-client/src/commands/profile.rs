//! Interactive interest profile registration.

use std::io::{self, BufRead, Write};
use std::path::Path;

use eventscout_core::{ProfileError, ProfileField, RegistrationFlow, UserInterestProfile};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Asks for every missing profile field and saves the result.
///
/// A complete profile is asked again from the first field.
pub fn run(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let flow = if config.profile.is_complete() {
        RegistrationFlow::new()
    } else {
        RegistrationFlow::resume(config.profile.clone())
    };

    let profile = fill(flow, &mut io::stdin().lock(), &mut io::stdout())?;
    save_profile(config_path, &profile)?;
    println!("Profile saved to {}", config_path.display());
    Ok(())
}

/// Drives `flow` to completion, one line of `input` per answer.
///
/// Blank answers are asked again; end of input aborts.
fn fill<R: BufRead, W: Write>(
    mut flow: RegistrationFlow,
    input: &mut R,
    output: &mut W,
) -> ClientResult<UserInterestProfile> {
    while let Some(field) = flow.current_field() {
        write!(output, "{} ", field.prompt())?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Err(ClientError::Config(format!(
                "input ended before {} was answered",
                field
            )));
        }

        match flow.submit(&answer) {
            Ok(state) => debug!(field = %field, ?state, "answer accepted"),
            Err(ProfileError::EmptyAnswer { .. }) => {
                writeln!(output, "Please enter a value.")?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    flow.finish().ok_or(ClientError::Profile(ProfileError::AlreadyComplete))
}

/// Writes `profile` under `[profile]` in the config file at `path`.
///
/// Other tables and comments in the file are left untouched.
pub fn save_profile(path: &Path, profile: &UserInterestProfile) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    if !doc.contains_key("profile") {
        doc["profile"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let table = doc["profile"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!("`profile` in {} is not a table", path.display()))
    })?;
    for field in ProfileField::ORDER {
        table[field.as_str()] = toml_edit::value(profile.get(field));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, doc.to_string())?;
    info!(path = %path.display(), "profile saved");
    Ok(())
}
