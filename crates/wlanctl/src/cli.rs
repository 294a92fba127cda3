//! Clap derive structures for the `wlanctl` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wlanctl -- talk to a wpa_supplicant-style daemon over its control socket
#[derive(Debug, Parser)]
#[command(
    name = "wlanctl",
    version,
    about = "Query and control a wireless network daemon",
    long_about = "Query and control a wpa_supplicant-style wireless daemon.\n\n\
        The control socket is taken from --socket, or resolved from the\n\
        layered system/model configuration files.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding system-config.toml and model-config.toml
    #[arg(long, env = "WLANCTL_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Control socket path (bypasses the configuration files)
    #[arg(long, short = 's', env = "WLANCTL_SOCKET", global = true)]
    pub socket: Option<PathBuf>,

    /// Reply timeout in seconds
    #[arg(long, short = 't', env = "WLANCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WLANCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current connection status
    #[command(alias = "st")]
    Status,

    /// Scan for access points and list the results
    Scan,

    /// List networks registered with the daemon
    #[command(alias = "net")]
    Networks,

    /// Connect to a registered network
    Connect(ConnectArgs),

    /// Disconnect from the current network
    Disconnect,

    /// Print notifications as they arrive, until Ctrl-C
    Watch,
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Network id, as shown by `wlanctl networks`
    pub id: u32,

    /// Wait for the daemon to report the connection
    #[arg(long, short = 'w')]
    pub wait: bool,
}
