//! `config.toml` loading and the precedence rules for runtime settings.
//!
//! Every field is optional. A missing file yields defaults, and so does a file
//! that fails to parse (after a warning).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::paths::{config_file_path, database_file_path};
use crate::player::PlaybackPolicy;

pub(crate) const DB_ENV: &str = "PLAYWATCH_DB";
pub(crate) const VIEW_URL_ENV: &str = "PLAYWATCH_VIEW_URL";
pub(crate) const CONFIG_ENV: &str = "PLAYWATCH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) database: Option<PathBuf>,
    pub(crate) view_url: Option<String>,
    pub(crate) policy: PlaybackPolicy,
}

/// Loads the config named by `explicit`, then `PLAYWATCH_CONFIG`, then the
/// default location.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match env_value(CONFIG_ENV) {
            Some(raw) => PathBuf::from(raw),
            None => config_file_path()?,
        },
    };
    if !path.exists() {
        if explicit.is_some() {
            warn!(path = %path.display(), "config file not found, using defaults");
        }
        return Ok(Config::default());
    }
    load_from_path(&path)
}

pub(crate) fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Ok(Config::default())
        }
    }
}

/// Database location: flag, then environment, then config, then the data dir.
pub(crate) fn resolve_database_path(
    flag: Option<PathBuf>,
    env: Option<String>,
    config: &Config,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(raw) = env {
        return Ok(PathBuf::from(raw));
    }
    if let Some(path) = config.database.clone() {
        return Ok(path);
    }
    database_file_path()
}

/// View-report base URL with the same precedence as the database path.
pub(crate) fn resolve_view_url(flag: Option<String>, env: Option<String>, config: &Config) -> Option<String> {
    flag.or(env)
        .or_else(|| config.view_url.clone())
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

pub(crate) fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
