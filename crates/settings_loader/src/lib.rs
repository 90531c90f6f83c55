//! # Settings Loader
//!
//! Loads the service settings (listen address, data directory, currency symbol) from a
//! JSON file, then lets environment variables override individual fields.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Explicit file, falling back to ./settings.json and then to built-in defaults
//! let path = Some(PathBuf::from("config/settings.json"));
//! let settings = settings_loader::load_settings_with_fallback(path.as_ref())?;
//!
//! // Apply HOST / PORT / DATA_DIR / CURRENCY_SYMBOL from the process environment
//! let settings = settings_loader::apply_env_overrides(settings, |key| std::env::var(key).ok())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_CURRENCY_SYMBOL: &str = "CURRENCY_SYMBOL";

/// Loads settings from a JSON file. Missing fields take their defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Tries the provided path, then `settings.json` in the current directory, then defaults.
///
/// A file that exists but fails to parse is an error; only missing files fall through.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<Settings> {
    let candidates = path
        .map(|p| p.as_path())
        .into_iter()
        .chain(std::iter::once(Path::new(DEFAULT_SETTINGS_FILE)));

    for candidate in candidates {
        if settings_file_exists(candidate) {
            tracing::debug!("Loading settings from {}", candidate.display());
            return load_settings(candidate);
        }
    }

    tracing::debug!("No settings file found, using defaults");
    Ok(Settings::default())
}

/// Overrides fields from `lookup`, usually `|k| std::env::var(k).ok()`.
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut settings: Settings, lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(ENV_HOST) {
        settings.host = host;
    }
    if let Some(port) = get(ENV_PORT) {
        settings.port = port
            .trim()
            .parse()
            .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
    }
    if let Some(dir) = get(ENV_DATA_DIR) {
        settings.data_dir = PathBuf::from(dir);
    }
    if let Some(symbol) = get(ENV_CURRENCY_SYMBOL) {
        settings.currency_symbol = symbol;
    }
    Ok(settings)
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}
