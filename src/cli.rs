use std::path::PathBuf;

use clap::Parser;

use crate::config::RawConfig;

/// Shows a fresh Chuck Norris fact in your terminal every few seconds.
#[derive(Debug, Parser)]
#[command(name = "fortune", version, about)]
pub struct Cli {
    /// Endpoint returning a JSON object with the fact text
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Refresh interval, e.g. `10s` or `2m`
    #[arg(short, long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// HTTP request timeout, e.g. `5s`
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// JSON field holding the fact text
    #[arg(long, value_name = "NAME")]
    pub field: Option<String>,

    /// Config file (defaults to <config dir>/fortune/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file (defaults to <data dir>/fortune/fortune.log)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print a single fact to stdout and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Flag values as the top configuration layer.
    pub fn overrides(&self) -> RawConfig {
        RawConfig {
            url: self.url.clone(),
            interval: self.interval.clone(),
            timeout: self.timeout.clone(),
            field: self.field.clone(),
            log_file: self.log_file.clone(),
        }
    }
}
