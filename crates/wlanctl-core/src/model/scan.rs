// ── Scan results ──

use serde::{Deserialize, Serialize};

/// Security class of an access point, derived from its capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    #[strum(serialize = "open")]
    Open,
    #[strum(serialize = "WEP")]
    Wep,
    #[strum(serialize = "WPA")]
    Wpa,
}

/// One access point seen during the last scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ssid: String,
    pub bssid: Option<String>,
    /// Signal level in dBm.
    pub signal_level: i32,
    /// Channel frequency in MHz, when the daemon reports it.
    pub frequency: Option<u32>,
    /// Raw capability flags, e.g. `[WPA2-PSK-CCMP][ESS]`.
    pub flags: String,
}

impl ScanResult {
    /// Minimal constructor used by tests and by callers building fixtures.
    pub fn new(ssid: impl Into<String>, signal_level: i32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: None,
            signal_level,
            frequency: None,
            flags: String::new(),
        }
    }

    pub fn security(&self) -> Security {
        // RSN is how the daemon labels WPA2/WPA3 in some builds.
        if self.flags.contains("WPA") || self.flags.contains("RSN") {
            Security::Wpa
        } else if self.flags.contains("WEP") {
            Security::Wep
        } else {
            Security::Open
        }
    }
}
