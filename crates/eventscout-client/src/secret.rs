//! Secret references for provider tokens.
//!
//! Token values in `config.toml` may point at a secret kept elsewhere:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME` (a `.env` file is loaded first)
//! - `pass::path/in/store` runs `pass show path/in/store`, first line wins
//! - anything else is the token itself

use std::path::{Path, PathBuf};
use std::process::Command;

/// A parsed token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// `env::VAR`
    Env(&'a str),
    /// `pass::path`
    Pass(&'a str),
    /// Inline value.
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Parses a raw config value.
    pub fn parse(value: &'a str) -> Self {
        if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns true when the value is stored inline in the config file.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Plain(_))
    }

    /// Resolves the reference to the secret value.
    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Env(var) => std::env::var(var)
                .map_err(|_| format!("environment variable `{}` is not set", var)),
            Self::Pass(path) => read_pass(path),
            Self::Plain(value) => Ok(value.to_string()),
        }
    }
}

/// Resolves an optional token; blank values and blank resolutions are `None`.
pub fn resolve_token(value: Option<&str>) -> Result<Option<String>, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let token = SecretRef::parse(raw).resolve()?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Loads `.env` from the working directory or one of its parents.
///
/// Returns the file loaded, or `None` when there is none. A file that exists
/// but cannot be read or parsed is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::dotenv())
}

/// Loads the env file at `path`, with the same rules as [`load_dotenv`].
pub fn load_env_file(path: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn skip_missing(loaded: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn read_pass(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .args(["show", path])
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` printed nothing", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefixes() {
        assert_eq!(SecretRef::parse("env::TOKEN"), SecretRef::Env("TOKEN"));
        assert_eq!(SecretRef::parse("pass::web/eventbrite"), SecretRef::Pass("web/eventbrite"));
        assert_eq!(SecretRef::parse("abc123"), SecretRef::Plain("abc123"));
        assert!(SecretRef::parse("abc123").is_inline());
        assert!(!SecretRef::parse("env::X").is_inline());
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_EVENTSCOUT_TEST_TOKEN", "  from-env  ");
        }
        assert_eq!(
            resolve_token(Some("env::_EVENTSCOUT_TEST_TOKEN")).unwrap(),
            Some("from-env".to_string())
        );
        unsafe {
            std::env::remove_var("_EVENTSCOUT_TEST_TOKEN");
        }
    }

    #[test]
    fn missing_env_var_errors() {
        let err = resolve_token(Some("env::_EVENTSCOUT_UNSET_VAR_98765")).unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn blank_values_are_none() {
        assert_eq!(resolve_token(None).unwrap(), None);
        assert_eq!(resolve_token(Some("   ")).unwrap(), None);
        assert_eq!(resolve_token(Some("tok")).unwrap(), Some("tok".to_string()));
    }

    #[test]
    fn missing_env_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).unwrap().is_none());
    }

    #[test]
    fn env_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "_EVENTSCOUT_DOTENV_TOKEN=from-file\n").unwrap();

        assert_eq!(load_env_file(&path).unwrap(), Some(path.clone()));
        assert_eq!(
            resolve_token(Some("env::_EVENTSCOUT_DOTENV_TOKEN")).unwrap(),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "_EVENTSCOUT_DOTENV_BROKEN=\"unterminated\n").unwrap();

        let err = load_env_file(&path).unwrap_err();
        assert!(!err.not_found());
    }

    #[test]
    fn pass_failure_errors() {
        // fails whether or not `pass` is installed
        assert!(SecretRef::parse("pass::eventscout/does/not/exist/31337")
            .resolve()
            .is_err());
    }
}
