use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use docchat_core::ProgressTiming;
use docchat_engine::{GatewaySettings, DEFAULT_ENDPOINT_BASE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

/// Looked up in the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "docchat.ron";

#[derive(Debug, Parser)]
#[command(
    name = "docchat",
    version,
    about = "Upload a document and ask questions about it from the terminal"
)]
pub struct Cli {
    /// Configuration file (RON). Defaults to ./docchat.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the ingestion/query API.
    #[arg(long, env = "DOCCHAT_ENDPOINT_BASE")]
    pub endpoint: Option<String>,
    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
    /// Document (PDF or TXT) to upload right away.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint_base: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub log_destination: LogDestination,
    pub timing: TimingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_base: DEFAULT_ENDPOINT_BASE.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            log_destination: LogDestination::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Simulated ingestion progress, in milliseconds and percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub step_period_ms: u64,
    pub progress_period_ms: u64,
    pub progress_increment: u8,
    pub progress_ceiling: u8,
    pub handoff_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let timing = ProgressTiming::default();
        Self {
            step_period_ms: millis(timing.step_period),
            progress_period_ms: millis(timing.progress_period),
            progress_increment: timing.progress_increment,
            progress_ceiling: timing.progress_ceiling,
            handoff_delay_ms: millis(timing.handoff_delay),
        }
    }
}

impl TimingConfig {
    /// Zero periods would make the tickers spin; they are raised to 1 ms.
    pub fn to_progress_timing(&self) -> ProgressTiming {
        ProgressTiming {
            step_period: Duration::from_millis(self.step_period_ms.max(1)),
            progress_period: Duration::from_millis(self.progress_period_ms.max(1)),
            progress_increment: self.progress_increment,
            progress_ceiling: self.progress_ceiling,
            handoff_delay: Duration::from_millis(self.handoff_delay_ms),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl AppConfig {
    /// Reads `explicit`, or `./docchat.ron` if it exists, or falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                match fs::read_to_string(path) {
                    Ok(text) => Self::parse(path, &text),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
                    Err(source) => Err(ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Command-line flags (and the endpoint environment variable) win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(endpoint) = cli.endpoint.as_deref().map(str::trim) {
            if !endpoint.is_empty() {
                self.endpoint_base = endpoint.to_string();
            }
        }
        if let Some(destination) = cli.log {
            self.log_destination = destination;
        }
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            endpoint_base: self.endpoint_base.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}
