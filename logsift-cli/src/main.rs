//! logsift -- search, filter and follow web server access logs.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use logsift_cli::cli::Cli;
use logsift_cli::commands;
use logsift_cli::error::CliError;
use logsift_cli::logging::init_tracing;
use logsift_cli::settings::{RunSettings, load_config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        eprintln!("logsift: {e}");
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.log_level.as_deref()).await?;
    init_tracing(&config.general)?;
    debug!(config = ?cli.config, "configuration loaded");

    let settings = RunSettings::resolve(&cli, &config)?;
    let cancel = CancellationToken::new();

    // SIGINT only ends tail mode gracefully; batch mode keeps the default behaviour.
    if settings.tail {
        let token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping");
                token.cancel();
            }
        });
    }

    let mut diagnostics = std::io::stderr();
    commands::execute(&settings, &mut diagnostics, &cancel).await?;
    Ok(())
}
