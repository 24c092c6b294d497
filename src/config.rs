use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;
use crate::error::CleanupError;
use crate::fs::expand_home;

pub const DEFAULT_API_URL: &str = "https://api-cloud.browserstack.com/app-live/";
pub const USER_VAR: &str = "BROWSERSTACK_USER";
pub const KEY_VAR: &str = "BROWSERSTACK_KEY";
pub const API_URL_VAR: &str = "BROWSERSTACK_API_URL";

/// Optional settings read from `config.toml`. Every field may be omitted.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub user: Option<String>,
    pub key: Option<String>,
}

/// Settings given on the command line, highest precedence.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub user: String,
    pub key: String,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("browserstack-cleanup").join("config.toml"))
}

impl FileConfig {
    /// Reads the config file. An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (expand_home(path)?, true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(CleanupError::Config(format!("config file '{}' does not exist", path.display())).into());
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let file_config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(file_config)
    }
}

impl Config {
    pub fn from_env(overrides: &CliOverrides, file_config: FileConfig) -> Result<Self> {
        Self::resolve(overrides, file_config, |name| env::var(name).ok())
    }

    /// Precedence: CLI flag, then environment, then config file, then built-in default.
    pub fn resolve<F>(overrides: &CliOverrides, file_config: FileConfig, lookup_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup_env(name).filter(|value| !value.is_empty());

        let user = lookup(USER_VAR)
            .or(file_config.user)
            .ok_or(CleanupError::MissingCredentials(USER_VAR))?;
        let key = lookup(KEY_VAR)
            .or(file_config.key)
            .ok_or(CleanupError::MissingCredentials(KEY_VAR))?;

        let raw_api_url = overrides.api_url.clone()
            .or_else(|| lookup(API_URL_VAR))
            .or(file_config.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Config {
            api_url: normalize_api_url(&raw_api_url)?,
            user,
            key,
        })
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn normalize_api_url(raw: &str) -> Result<Url, CleanupError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| CleanupError::Config(format!("invalid API URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(CleanupError::Config(format!("API URL '{}' cannot be used as a base", raw)));
    }
    Ok(url)
}
