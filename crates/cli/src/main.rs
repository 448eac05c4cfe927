use clap::Parser;
use eyre::WrapErr;
use std::path::PathBuf;
use surfside_config::{ConfigLoader, Environment, TrackerConfig};

mod commands;
mod execute;

use commands::Commands;

const DEMO_ACCOUNT_ID: &str = "00000-1";
const DEMO_SOURCE_ID: &str = "00000-2";

#[derive(Parser, Debug)]
#[command(name = "surfside")]
#[command(about = "Track events against a Surfside collector", long_about = None)]
#[command(version)]
struct Cli {
    /// Tracker namespace
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Collector environment (development, production)
    #[arg(long, global = true)]
    environment: Option<Environment>,

    /// Collector base URL, overriding the environment preset
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[arg(long, global = true)]
    account_id: Option<String>,

    #[arg(long, global = true)]
    source_id: Option<String>,

    /// JSON config file, read before SURFSIDE_* environment variables
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level when SURFSIDE_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Capture batches in memory and print them instead of sending
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// File, then environment, then flags; demo credentials fill any gaps
    fn tracker_config(&self) -> surfside_core::Result<TrackerConfig> {
        let mut loader = ConfigLoader::new().with_env(true);
        if let Some(path) = &self.config {
            loader = loader.file(path);
        }
        let mut config = loader.load()?;

        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(account_id) = &self.account_id {
            config.account_id = account_id.clone();
        } else if config.account_id.is_empty() {
            config.account_id = DEMO_ACCOUNT_ID.to_string();
        }
        if let Some(source_id) = &self.source_id {
            config.source_id = source_id.clone();
        } else if config.source_id.is_empty() {
            config.source_id = DEMO_SOURCE_ID.to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    surfside_utils::tracing::init(&cli.log_level)
        .map_err(|e| eyre::eyre!("failed to initialize logging: {e}"))?;

    let config = cli
        .tracker_config()
        .wrap_err("failed to load tracker configuration")?;
    execute::execute_command(cli.command, config, cli.dry_run).await
}
