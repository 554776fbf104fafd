mod load;
mod types;

pub use load::{
    apply_env_overrides, load_default, load_from, DEFAULT_CONFIG_FILE, ENV_API_KEY,
    ENV_ARTIFACT_DIR, ENV_BASE_URL, ENV_DISCOVERY_INTERVAL, ENV_LOG_LEVEL, ENV_PORT,
};
pub use types::{
    AppConfig, DiscoveryConfig, HttpServerConfig, LoggingConfig, PostmanConfig, RunnerConfig,
};
