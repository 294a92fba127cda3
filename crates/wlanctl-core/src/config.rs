// ── Runtime connection configuration ──
//
// These types describe *where* the daemon's control socket lives and how
// long to wait for it. Core never reads config files: the configuration
// crate (or any other `ConfigLookup`) resolves the address and hands a
// `ControllerConfig` in.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WifiError;

/// Device name the Wi-Fi settings are looked up under.
pub const WIFI_DEVICE: &str = "wifi";

const DEFAULT_CTRL_DIR: &str = "/var/run/wpa_supplicant";
const DEFAULT_INTERFACE: &str = "wlan0";
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_IDLE_POLL: Duration = Duration::from_secs(30);

/// Hierarchical configuration lookup consumed by the controller.
///
/// Only used to resolve the channel address before the channel is opened.
pub trait ConfigLookup {
    /// Look up `name` for `device_type`, or `None` when no layer defines it.
    fn attribute(&self, device_type: &str, name: &str) -> Option<String>;

    /// Whether the named device is enabled in the current model.
    fn is_enabled(&self, device_name: &str) -> bool;
}

/// Location of the daemon's control socket: `ctrl_dir/interface`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAddress {
    pub ctrl_dir: PathBuf,
    pub interface: String,
}

impl ChannelAddress {
    pub fn new(ctrl_dir: impl Into<PathBuf>, interface: impl Into<String>) -> Self {
        Self {
            ctrl_dir: ctrl_dir.into(),
            interface: interface.into(),
        }
    }

    /// Split an explicit socket path into directory and interface name.
    pub fn from_socket_path(path: &Path) -> Self {
        let ctrl_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let interface = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            ctrl_dir,
            interface,
        }
    }

    pub fn socket_path(&self) -> PathBuf {
        self.ctrl_dir.join(&self.interface)
    }
}

impl Default for ChannelAddress {
    fn default() -> Self {
        Self::new(DEFAULT_CTRL_DIR, DEFAULT_INTERFACE)
    }
}

/// Configuration for a single controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Where the daemon's control socket lives.
    pub address: ChannelAddress,
    /// Upper bound for a complete reply to one command.
    pub reply_timeout: Duration,
    /// How long an idle read waits before looping. Idle timeouts are not errors.
    pub idle_poll: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            address: ChannelAddress::default(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            idle_poll: DEFAULT_IDLE_POLL,
        }
    }
}

impl ControllerConfig {
    pub fn new(address: ChannelAddress) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Resolve the channel address from a hierarchical configuration.
    ///
    /// Requires the `wifi` device to be enabled; `ctrl_interface` and
    /// `interface` fall back to the daemon's usual defaults.
    pub fn from_lookup(lookup: &impl ConfigLookup) -> Result<Self, WifiError> {
        if !lookup.is_enabled(WIFI_DEVICE) {
            return Err(WifiError::Config {
                message: format!("device '{WIFI_DEVICE}' is not enabled"),
            });
        }

        let ctrl_dir = lookup
            .attribute(WIFI_DEVICE, "ctrl_interface")
            .unwrap_or_else(|| DEFAULT_CTRL_DIR.into());
        let interface = lookup
            .attribute(WIFI_DEVICE, "interface")
            .unwrap_or_else(|| DEFAULT_INTERFACE.into());

        let reply_timeout = match lookup.attribute(WIFI_DEVICE, "reply_timeout_ms") {
            Some(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|_| WifiError::Config {
                    message: format!("reply_timeout_ms must be an integer, got '{raw}'"),
                })?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_REPLY_TIMEOUT,
        };

        Ok(Self {
            address: ChannelAddress::new(ctrl_dir, interface),
            reply_timeout,
            idle_poll: DEFAULT_IDLE_POLL,
        })
    }
}
