// ── Daemon events ──

use serde::{Deserialize, Serialize};

/// Classification of an unsolicited daemon line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Connected,
    Disconnected,
    ScanResultsReady,
    /// Any other event, carrying its name (e.g. `CTRL-EVENT-BSS-ADDED`).
    Other(String),
}

impl EventKind {
    pub(crate) fn from_name(name: &str) -> Self {
        match name {
            "CTRL-EVENT-CONNECTED" => Self::Connected,
            "CTRL-EVENT-DISCONNECTED" => Self::Disconnected,
            "CTRL-EVENT-SCAN-RESULTS" => Self::ScanResultsReady,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// An event line, already stripped of its marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonEvent {
    pub kind: EventKind,
    /// Everything after the event name, trimmed.
    pub payload: String,
}
