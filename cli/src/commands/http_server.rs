//! `serve` command: wires services, discovery refresh and the HTTP server.

use postman_ext_core::api::AppConfig;
use postman_ext_plugins::build_services;

use crate::commands::cli::ServeArgs;
use crate::http::{server, AppState};

pub async fn handle_serve(args: ServeArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    // CLI flags win over the config file.
    let host = args.host.unwrap_or_else(|| cfg.http_server.host.clone());
    let port = args.port.unwrap_or(cfg.http_server.port);

    let services = build_services(cfg)?;
    tracing::info!(
        base_url = %cfg.postman.base_url,
        executable = %services.action.settings().executable,
        artifact_dir = %services.action.settings().artifact_dir.display(),
        discovery_interval = ?cfg.discovery.collection_interval,
        "services ready"
    );

    let refresh = services.discovery.clone().spawn_refresh();
    let state = AppState::new(services);

    let result = server::start_server(
        server::ServerConfig {
            host,
            port,
            request_timeout_ms: cfg.http_server.request_timeout_ms,
        },
        state,
    )
    .await;

    refresh.abort();
    result
}
