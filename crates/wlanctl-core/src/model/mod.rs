// ── Domain model ──
//
// Snapshot types cached by the StateCache and the event types produced
// by the line demultiplexer.

pub mod event;
pub mod network;
pub mod scan;
pub mod status;

pub use event::{DaemonEvent, EventKind};
pub use network::NetworkConfiguration;
pub use scan::{ScanResult, Security};
pub use status::{ConnectionState, LinkState, Status};
