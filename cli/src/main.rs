use std::path::Path;

use clap::Parser;
mod commands;
mod http;
mod logging;
use commands::cli;
use postman_ext_core::api::{collection_run_description, AppConfig};
use postman_ext_core::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = cli::Args::parse();
    let cmd = args
        .command
        .take()
        .unwrap_or(cli::Commands::Serve(cli::ServeArgs::default()));

    match cmd {
        // Describing the action needs no credentials.
        cli::Commands::Describe => {
            println!(
                "{}",
                serde_json::to_string_pretty(&collection_run_description())?
            );
        }
        cli::Commands::Serve(serve_args) => {
            let cfg = load_config(&args)?;
            let _log_guard = logging::init_logging(&cfg.logging)?;
            commands::http_server::handle_serve(serve_args, &cfg).await?;
        }
        cli::Commands::CheckConfig => {
            let cfg = load_config(&args)?;
            let _log_guard = logging::init_logging(&cfg.logging)?;
            tracing::info!(config = ?cfg, "configuration is valid");
            println!("configuration is valid");
        }
    }
    Ok(())
}

fn load_config(args: &cli::Args) -> anyhow::Result<AppConfig> {
    let mut cfg = match args.config.as_deref() {
        Some(path) => config::load_from(Path::new(path))?,
        None => config::load_default()?,
    };
    if let Some(level) = args.log_level.as_deref() {
        cfg.logging.level = level.to_ascii_lowercase();
    }
    Ok(cfg)
}
