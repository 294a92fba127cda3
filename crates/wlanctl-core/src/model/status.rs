// ── Connection status ──

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Coarse connection state derived from the daemon's `wpa_state` field.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
    #[default]
    Unknown,
}

impl ConnectionState {
    /// Map a raw `wpa_state` value (e.g. `COMPLETED`, `SCANNING`).
    pub fn from_wpa_state(raw: &str) -> Self {
        match raw.trim() {
            "COMPLETED" => Self::Connected,
            "AUTHENTICATING" | "ASSOCIATING" | "ASSOCIATED" | "4WAY_HANDSHAKE"
            | "GROUP_HANDSHAKE" => Self::Connecting,
            "DISCONNECTED" | "INACTIVE" | "SCANNING" | "INTERFACE_DISABLED" => {
                Self::Disconnected
            }
            _ => Self::Unknown,
        }
    }
}

/// Last known connection status, replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub connection_state: ConnectionState,
    pub ssid: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub bssid: Option<String>,
    pub key_mgmt: Option<String>,
}

impl Status {
    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }
}

/// Link state as reported by the most recent connect/disconnect event.
///
/// Tracked separately from [`Status`] so that events never patch a
/// refreshed status snapshot in place.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
    #[default]
    Unknown,
}
