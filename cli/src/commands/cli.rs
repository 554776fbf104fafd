use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Runs Postman collections with newman on behalf of the platform")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a TOML config file. Without it `config.toml` in the working
    /// directory is used when present.
    #[arg(long, env = "STEADYBIT_EXTENSION_CONFIG", global = true)]
    pub config: Option<String>,

    /// Overrides `logging.level` (e.g. "debug"). `RUST_LOG` still wins.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the extension HTTP API (default).
    Serve(ServeArgs),
    /// Print the action description as JSON.
    Describe,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}
