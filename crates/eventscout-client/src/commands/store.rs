//! Store maintenance commands.

use std::io::{self, BufRead, Write};

use eventscout_server::demo_events;

use crate::commands::open_store;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Inserts the demo events when the store is empty.
pub fn seed_demo(config: &ClientConfig) -> ClientResult<()> {
    let report = open_store(config)?.seed_if_empty(&demo_events())?;
    if report.inserted > 0 {
        println!("Stored {} demo events.", report.inserted);
    } else {
        println!("Store already has events; demo events not added.");
    }
    Ok(())
}

/// Deletes every stored event, asking first unless `yes` is set.
pub fn reset(config: &ClientConfig, yes: bool) -> ClientResult<()> {
    let path = config.database_path();
    if !yes {
        let prompt = format!("Delete every event stored in {}? [y/N] ", path.display());
        let confirmed = confirm(&mut io::stdin().lock(), &mut io::stdout(), &prompt)?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = open_store(config)?.clear()?;
    println!("Removed {} events.", removed);
    Ok(())
}

/// Asks a yes/no question; anything but `y`/`yes` is a no.
fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<bool> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscout_core::Event;
    use eventscout_server::EventStore;

    fn config_in(dir: &tempfile::TempDir) -> ClientConfig {
        ClientConfig {
            database_path: Some(dir.path().join("events.db")),
            ..Default::default()
        }
    }

    #[test]
    fn confirm_answers() {
        let mut out = Vec::new();
        assert!(confirm(&mut "y\n".as_bytes(), &mut out, "? ").unwrap());
        assert!(confirm(&mut " YES \n".as_bytes(), &mut out, "? ").unwrap());
        assert!(!confirm(&mut "n\n".as_bytes(), &mut out, "? ").unwrap());
        assert!(!confirm(&mut "".as_bytes(), &mut out, "? ").unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "? ? ? ? ");
    }

    #[test]
    fn seed_then_reset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        seed_demo(&config).unwrap();
        seed_demo(&config).unwrap();
        let store = EventStore::open(config.database_path()).unwrap();
        assert_eq!(store.count().unwrap(), 4);
        drop(store);

        reset(&config, true).unwrap();
        let store = EventStore::open(config.database_path()).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn seed_skips_non_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        EventStore::open(config.database_path())
            .unwrap()
            .insert_all(&[Event::new("kudago", "1", "Expo")])
            .unwrap();

        seed_demo(&config).unwrap();
        let store = EventStore::open(config.database_path()).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
