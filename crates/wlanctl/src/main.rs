mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wlanctl_config::Configurer;
use wlanctl_core::{ChannelAddress, ControllerConfig, WifiController};

use crate::cli::{Cli, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_controller_config(&cli.global)?;
    tracing::debug!(
        socket = %config.address.socket_path().display(),
        command = ?cli.command,
        "dispatching command"
    );

    let controller = WifiController::new(config);
    commands::dispatch(cli.command, &controller, &cli.global).await
}

/// Build a `ControllerConfig` from `--socket`, or from the layered config files.
fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let mut config = if let Some(socket) = &global.socket {
        ControllerConfig::new(ChannelAddress::from_socket_path(socket))
    } else {
        let dir = global
            .config_dir
            .clone()
            .unwrap_or_else(wlanctl_config::config_dir);
        let configurer = Configurer::load(&dir)?;
        ControllerConfig::from_lookup(&configurer)?
    };

    if let Some(secs) = global.timeout {
        config.reply_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}
