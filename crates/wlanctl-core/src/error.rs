// ── Core error types ──
//
// Errors surfaced to callers of the controller. Transport failures from
// the control channel are translated into these variants by the worker,
// so consumers never see raw socket errors directly.

use thiserror::Error;

use crate::channel::ChannelError;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WifiError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot open control channel at {path}: {reason}")]
    ConnectionFailed { path: String, reason: String },

    #[error("Control channel lost: {reason}")]
    ConnectionLost { reason: String },

    #[error("No reply to {command} within {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    // ── Command outcomes ─────────────────────────────────────────────
    #[error("Daemon rejected {command}: {reason}")]
    Rejected { command: String, reason: String },

    #[error("Command cancelled by channel reset")]
    Cancelled,

    #[error("Control channel is disposed; call reinit() to reopen it")]
    Disposed,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WifiError {
    /// Whether this failure should be reported through the `Error`
    /// notification. Cancellations are the caller's own doing and only
    /// reach the completion handle.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Translate a channel failure that happened while `command` was in flight.
    pub(crate) fn from_channel(err: ChannelError, command: &str) -> Self {
        match err {
            ChannelError::Timeout { timeout } => Self::Timeout {
                command: command.to_owned(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            ChannelError::Connection { reason } => Self::ConnectionLost { reason },
            ChannelError::NotOpen => Self::ConnectionLost {
                reason: "channel is not open".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_maps_to_command_timeout() {
        let err = WifiError::from_channel(
            ChannelError::Timeout {
                timeout: Duration::from_millis(1500),
            },
            "STATUS",
        );
        assert_eq!(
            err,
            WifiError::Timeout {
                command: "STATUS".into(),
                timeout_ms: 1500
            }
        );
    }

    #[test]
    fn cancellation_is_not_reportable() {
        assert!(!WifiError::Cancelled.is_reportable());
        assert!(WifiError::Disposed.is_reportable());
        assert!(
            WifiError::ConnectionLost {
                reason: "eof".into()
            }
            .is_reportable()
        );
    }
}
