// ── Registered networks ──

use serde::{Deserialize, Serialize};

/// A network registered with the daemon. Only registered networks can be
/// passed to `connect()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub id: u32,
    pub ssid: String,
    pub flags: String,
}

impl NetworkConfiguration {
    /// The daemon is currently using this network.
    pub fn is_current(&self) -> bool {
        self.flags.contains("[CURRENT]")
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains("[DISABLED]")
    }
}
