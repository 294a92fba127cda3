// ── Command API ──
//
// Every daemon request flows through the `Command` enum. The facade wraps
// each one in an envelope carrying its epoch and a oneshot responder, and
// the worker executes envelopes strictly in FIFO order.

mod completion;

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::WifiError;
use crate::model::{NetworkConfiguration, ScanResult, Status};

pub use completion::Completion;

/// A request the daemon answers with a terminated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect { id: u32 },
    Disconnect,
    Status,
    /// Trigger a scan. The reply may already carry the results.
    Scan,
    /// Fetch the results of the last scan.
    ScanResults,
    ListNetworks,
}

impl Command {
    /// Wire text, without the line terminator.
    pub fn wire(self) -> String {
        match self {
            Self::Connect { id } => format!("CONNECT {id}"),
            other => other.name().to_owned(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Connect { .. } => "CONNECT",
            Self::Disconnect => "DISCONNECT",
            Self::Status => "STATUS",
            Self::Scan => "SCAN",
            Self::ScanResults => "SCAN_RESULTS",
            Self::ListNetworks => "LIST_NETWORKS",
        }
    }
}

/// Successful outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Acknowledged, no payload.
    Done,
    Status(Arc<Status>),
    /// `SCAN` was accepted; results follow with the next scan event.
    ScanStarted,
    ScanResults(Arc<Vec<ScanResult>>),
    Networks(Arc<Vec<NetworkConfiguration>>),
}

pub(crate) type Responder = oneshot::Sender<Result<CommandResult, WifiError>>;

/// A command on its way to the worker.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    /// Reset epoch at enqueue time; older than the worker's means cancelled.
    pub epoch: u64,
    /// `None` for internal fetches nobody awaits.
    pub response_tx: Option<Responder>,
}

impl CommandEnvelope {
    pub(crate) fn respond(self, result: Result<CommandResult, WifiError>) {
        if let Some(tx) = self.response_tx {
            // Caller may have dropped its completion handle.
            let _ = tx.send(result);
        }
    }
}

/// Everything that travels through the worker's FIFO.
pub(crate) enum Request {
    Command(CommandEnvelope),
    Reinit { epoch: u64 },
    Dispose { epoch: u64 },
}
