use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "https://api.chucknorris.io/jokes/random?category=science";
pub const DEFAULT_FIELD: &str = "Value";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Fully resolved settings, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: Url,
    pub interval: Duration,
    pub timeout: Duration,
    /// JSON key holding the fragment text.
    pub field: String,
    pub log_file: PathBuf,
}

/// One layer of optional settings. The config file deserializes into this,
/// and command-line flags are folded into the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub url: Option<String>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub field: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl RawConfig {
    /// Values set in `over` win over `self`.
    pub fn layer(self, over: RawConfig) -> RawConfig {
        RawConfig {
            url: over.url.or(self.url),
            interval: over.interval.or(self.interval),
            timeout: over.timeout.or(self.timeout),
            field: over.field.or(self.field),
            log_file: over.log_file.or(self.log_file),
        }
    }

    pub fn resolve(self) -> Result<Config, ConfigError> {
        let raw_url = self.url.unwrap_or_else(|| DEFAULT_URL.to_string());
        let normalized = normalize_url(&raw_url);
        let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;

        let interval = parse_duration(self.interval.as_deref())?.unwrap_or(DEFAULT_INTERVAL);
        if interval < MIN_INTERVAL {
            return Err(ConfigError::IntervalTooShort(interval));
        }

        let timeout = parse_duration(self.timeout.as_deref())?.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let field = self.field.unwrap_or_else(|| DEFAULT_FIELD.to_string());
        if field.trim().is_empty() {
            return Err(ConfigError::EmptyField);
        }

        Ok(Config {
            url,
            interval,
            timeout,
            field,
            log_file: self.log_file.unwrap_or_else(default_log_path),
        })
    }
}

fn parse_duration(value: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| {
            humantime::parse_duration(v.trim()).map_err(|source| ConfigError::Duration {
                value: v.to_string(),
                source,
            })
        })
        .transpose()
}

/// Normalize a bare URL into a fully-qualified one.
/// - `:3000/path` → `http://localhost:3000/path`
/// - `localhost/...` → `http://localhost/...`
/// - anything else without a scheme → `https://...`
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return url.to_string();
    }
    if url.starts_with(':') {
        return format!("http://localhost{}", url);
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        return format!("http://{}", url);
    }
    format!("https://{}", url)
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("fortune")
}

pub fn default_config_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("config.toml")
}

pub fn default_log_path() -> PathBuf {
    app_dir(dirs::data_local_dir()).join("fortune.log")
}

/// Read the config file layer.
///
/// An explicitly requested file must exist. The default location is
/// optional and silently skipped when absent.
pub fn load_file(explicit: Option<&Path>) -> Result<RawConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(RawConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
    Ok(toml::from_str::<RawConfig>(&content)?)
}
