// wlanctl-core: Async control-channel client for wpa_supplicant-style daemons.
//
// One worker task owns the daemon's control socket and serializes every
// command on it. Callers get completion handles, read atomic snapshots
// from the `StateCache`, and subscribe to a notification stream.

pub mod channel;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod demux;
pub mod error;
pub mod model;
pub mod notify;
pub mod store;
mod worker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use channel::{ChannelError, ControlChannel, UnixChannel};
pub use command::{Command, CommandResult, Completion};
pub use config::{ChannelAddress, ConfigLookup, ControllerConfig, WIFI_DEVICE};
pub use controller::WifiController;
pub use error::WifiError;
pub use notify::Notification;
pub use store::StateCache;
pub use worker::ChannelLifecycle;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectionState, DaemonEvent, EventKind, LinkState, NetworkConfiguration, ScanResult,
    Security, Status,
};
