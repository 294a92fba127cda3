//! CLI error types with miette diagnostics.
//!
//! Maps `WifiError` and `ConfigError` into user-facing errors with help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wlanctl_config::ConfigError;
use wlanctl_core::WifiError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not open the control socket at {path}")]
    #[diagnostic(
        code(wlanctl::connection_failed),
        help(
            "{reason}\n\
             Check that the daemon is running with ctrl_interface enabled,\n\
             or point --socket at its control socket."
        )
    )]
    ConnectionFailed { path: String, reason: String },

    #[error("Lost the control channel: {reason}")]
    #[diagnostic(code(wlanctl::connection_lost))]
    ConnectionLost { reason: String },

    #[error("No reply to {command} within {timeout_ms}ms")]
    #[diagnostic(
        code(wlanctl::timeout),
        help("The daemon may be busy. Raise the limit with --timeout <secs>.")
    )]
    Timeout { command: String, timeout_ms: u64 },

    // ── Daemon ───────────────────────────────────────────────────────

    #[error("The daemon rejected {command}: {reason}")]
    #[diagnostic(
        code(wlanctl::rejected),
        help("Run: wlanctl networks to see the registered network ids")
    )]
    Rejected { command: String, reason: String },

    #[error("{0}")]
    #[diagnostic(code(wlanctl::aborted))]
    Aborted(String),

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(wlanctl::no_config),
        help(
            "Set WLANCTL_CONFIG_DIR or --config-dir to the directory holding\n\
             system-config.toml and model-config.toml, or pass --socket."
        )
    )]
    NoConfig { path: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(wlanctl::config))]
    Config { message: String },

    // ── Output ───────────────────────────────────────────────────────

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(wlanctl::output))]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionLost { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoConfig { .. } | Self::Config { .. } => exit_code::CONFIG,
            Self::Rejected { .. } | Self::Aborted(_) | Self::Output(_) => exit_code::GENERAL,
        }
    }
}

impl From<WifiError> for CliError {
    fn from(err: WifiError) -> Self {
        match err {
            WifiError::ConnectionFailed { path, reason } => Self::ConnectionFailed { path, reason },
            WifiError::ConnectionLost { reason } => Self::ConnectionLost { reason },
            WifiError::Timeout {
                command,
                timeout_ms,
            } => Self::Timeout {
                command,
                timeout_ms,
            },
            WifiError::Rejected { command, reason } => Self::Rejected { command, reason },
            WifiError::Config { message } => Self::Config { message },
            other @ (WifiError::Cancelled | WifiError::Disposed) => {
                Self::Aborted(other.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
