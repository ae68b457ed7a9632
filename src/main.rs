use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dockpanel::config::Config;
use dockpanel::errors::{HasErrorCode, PanelResult};
use dockpanel::telemetry::initialize_telemetry_with_configuration;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "dockpanel", version, about = "Manage nginx containers from a small dashboard")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, global = true, env = "DOCKPANEL_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the container API backed by the local Docker daemon
    Serve,
    /// Open the interactive dashboard against a running API
    Console,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async {
                let _guard = initialize_telemetry_with_configuration(&config.telemetry, true)?;
                report(dockpanel::serve(config).await)
            })
        }
        Command::Console => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async {
                let _guard = initialize_telemetry_with_configuration(&config.telemetry, false)?;
                report(dockpanel::run_console(config).await)
            })
        }
    }
}

fn report(result: PanelResult<()>) -> Result<()> {
    if let Err(e) = &result {
        error!("[{}] {}", e.error_code(), e);
    }
    Ok(result?)
}
