use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub postman: PostmanConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.postman.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "postman.api_key is required".to_string(),
            ));
        }
        let base = self.postman.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "postman.base_url must be an http(s) url, got '{base}'"
            )));
        }
        if self.discovery.collection_interval.is_zero() {
            return Err(ConfigError::Validation(
                "discovery.collection_interval must be greater than zero".to_string(),
            ));
        }
        if self.runner.executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "runner.executable must not be empty".to_string(),
            ));
        }
        if self.http_server.request_timeout_ms <= self.runner.stop_grace_ms {
            return Err(ConfigError::Validation(format!(
                "http_server.request_timeout_ms ({}) must exceed runner.stop_grace_ms ({})",
                self.http_server.request_timeout_ms, self.runner.stop_grace_ms
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PostmanConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

// api_key never reaches the logs through `{:?}`.
impl fmt::Debug for PostmanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostmanConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"*****")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.getpostman.com".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for PostmanConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Where newman writes its summary/html reports. Defaults to the OS temp dir.
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

impl RunnerConfig {
    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_executable() -> String {
    "newman".to_string()
}

fn default_stop_grace_ms() -> u64 {
    5_000
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            artifact_dir: None,
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(with = "humantime_serde", default = "default_collection_interval")]
    pub collection_interval: Duration,
}

fn default_collection_interval() -> Duration {
    Duration::from_secs(3 * 60 * 60)
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            collection_interval: default_collection_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// When set, logs are additionally written to a daily rolling file here.
    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "postman-ext.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}
