//! Tracing setup.
//!
//! Filter priority: `RUST_LOG`, then `--log-level`, then `logging.level`.
//! With `logging.directory` set, events are also written to a daily rolling
//! file through a non-blocking writer; keep the returned guard alive for the
//! lifetime of the process or buffered lines are lost.

use postman_ext_core::api::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout = fmt::layer().with_target(true);

    match cfg.directory.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, &cfg.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .try_init()?;
            Ok(None)
        }
    }
}
