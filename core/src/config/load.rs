use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub const ENV_BASE_URL: &str = "STEADYBIT_EXTENSION_POSTMAN_BASE_URL";
pub const ENV_API_KEY: &str = "STEADYBIT_EXTENSION_POSTMAN_API_KEY";
pub const ENV_DISCOVERY_INTERVAL: &str =
    "STEADYBIT_EXTENSION_POSTMAN_COLLECTION_DISCOVERY_INTERVAL";
pub const ENV_PORT: &str = "STEADYBIT_EXTENSION_PORT";
pub const ENV_ARTIFACT_DIR: &str = "STEADYBIT_EXTENSION_ARTIFACT_DIR";
pub const ENV_LOG_LEVEL: &str = "STEADYBIT_LOG_LEVEL";

/// Loads `config.toml` from the working directory if present, then applies
/// environment overrides and validates.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    let cfg = if path.exists() {
        read_file(path)?
    } else {
        AppConfig::default()
    };
    finish(cfg)
}

/// Like [`load_default`], but the given file must exist.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    finish(read_file(path)?)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse(e.into()))?;
    toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse(e.into()))
}

fn finish(mut cfg: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_BASE_URL) {
        cfg.postman.base_url = v.trim().trim_end_matches('/').to_string();
    }
    if let Some(v) = get(ENV_API_KEY) {
        cfg.postman.api_key = v.trim().to_string();
    }
    if let Some(v) = get(ENV_DISCOVERY_INTERVAL) {
        cfg.discovery.collection_interval = humantime_serde::re::humantime::parse_duration(
            v.trim(),
        )
        .map_err(|e| ConfigError::EnvInvalid {
            key: ENV_DISCOVERY_INTERVAL.to_string(),
            source: e.into(),
        })?;
    }
    if let Some(v) = get(ENV_PORT) {
        cfg.http_server.port = v.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::EnvInvalid {
                key: ENV_PORT.to_string(),
                source: e.into(),
            }
        })?;
    }
    if let Some(v) = get(ENV_ARTIFACT_DIR) {
        cfg.runner.artifact_dir = Some(PathBuf::from(v.trim()));
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        cfg.logging.level = v.trim().to_ascii_lowercase();
    }

    Ok(())
}
