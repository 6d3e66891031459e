use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Ui(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failure of a single fetch. All variants are transient for the TUI:
/// the next tick simply tries again.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("field \"{0}\" is missing")]
    MissingField(String),
    #[error("field \"{0}\" is not a string")]
    NotAString(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid duration \"{value}\": {source}")]
    Duration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("refresh interval must be at least 1s, got {0:?}")]
    IntervalTooShort(Duration),
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("response field name must not be empty")]
    EmptyField,
}

impl FetchError {
    /// Maps a transport-level reqwest error onto the taxonomy.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else {
            FetchError::Network(err)
        }
    }

    /// Same as [`from_transport`](Self::from_transport), for errors raised
    /// while streaming the body.
    pub fn from_body(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else {
            FetchError::BodyRead(err)
        }
    }
}
