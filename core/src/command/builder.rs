use crate::report::ReportPaths;
use crate::run::RunConfig;

pub const RUN_SUBCOMMAND: &str = "run";
pub const REPORTERS: &str = "cli,json-summary,htmlextra";

/// Everything needed to render one newman invocation.
pub struct CommandSpec<'a> {
    pub executable: &'a str,
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub collection_id: &'a str,
    pub environment_id: Option<&'a str>,
    pub config: &'a RunConfig,
    pub reports: &'a ReportPaths,
}

pub fn build_command(spec: &CommandSpec<'_>) -> Vec<String> {
    let base = spec.base_url.trim_end_matches('/');
    let cfg = spec.config;

    let mut argv: Vec<String> = vec![
        spec.executable.to_string(),
        RUN_SUBCOMMAND.to_string(),
        format!(
            "{base}/collections/{}?apikey={}",
            spec.collection_id, spec.api_key
        ),
    ];

    if let Some(env_id) = spec.environment_id {
        argv.push("--environment".to_string());
        argv.push(format!(
            "{base}/environments/{env_id}?apikey={}",
            spec.api_key
        ));
    }

    for var in &cfg.env_vars {
        argv.push("--env-var".to_string());
        argv.push(format!("{}={}", var.key, var.value));
    }

    if cfg.verbose {
        argv.push("--verbose".to_string());
    }
    if cfg.bail {
        argv.push("--bail".to_string());
    }
    // 0 means "no timeout" to newman; never pass it through.
    if cfg.timeout_ms > 0 {
        argv.push("--timeout".to_string());
        argv.push(cfg.timeout_ms.to_string());
    }
    if cfg.timeout_request_ms > 0 {
        argv.push("--timeout-request".to_string());
        argv.push(cfg.timeout_request_ms.to_string());
    }

    argv.push("--reporters".to_string());
    argv.push(REPORTERS.to_string());
    argv.push("--reporter-summary-json-export".to_string());
    argv.push(spec.reports.summary.display().to_string());
    argv.push("--reporter-htmlextra-export".to_string());
    argv.push(spec.reports.html.display().to_string());
    argv.push("--reporter-htmlextra-omitResponseBodies".to_string());

    if cfg.iterations > 1 {
        argv.push("-n".to_string());
        argv.push(cfg.iterations.to_string());
    }

    argv
}

/// Joins `argv` for logging with every occurrence of `secret` masked.
pub fn mask_secret(argv: &[String], secret: &str) -> String {
    let joined = argv.join(" ");
    if secret.is_empty() {
        return joined;
    }
    joined.replace(secret, "*****")
}
