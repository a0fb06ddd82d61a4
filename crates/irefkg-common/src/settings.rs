//! Settings file helpers

use crate::error::{CommonError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Deserialize a YAML settings file
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value = serde_yaml::from_str(&text).map_err(|source| CommonError::Yaml {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded settings file");
    Ok(value)
}

/// Load `.env` from the working directory if present. Variables already set
/// in the process environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {},
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

/// Read an environment variable as a boolean (`true/false`, `1/0`, `yes/no`)
pub fn env_flag(name: &str) -> Result<Option<bool>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };

    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        other => Err(CommonError::config(format!("{} must be a boolean, got '{}'", name, other))),
    }
}
