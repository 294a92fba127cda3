// ── Notifications ──
//
// Broadcast fan-out of completed refreshes and daemon events. Sending is
// gated by a mutex so that `dispose()` can guarantee silence: once the
// gate is closed no notification goes out until `reinit()` reopens it.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

const NOTIFICATION_CAPACITY: usize = 256;

/// A one-shot signal to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::Display)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Notification {
    ScanFinished,
    Connected,
    Disconnected,
    StatusReady,
    ListNetworksReady,
    Error(String),
}

pub(crate) struct Notifier {
    tx: broadcast::Sender<Notification>,
    muted: Mutex<bool>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            tx,
            muted: Mutex::new(false),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, notification: Notification) {
        let muted = self.muted.lock().unwrap_or_else(PoisonError::into_inner);
        if *muted {
            trace!(%notification, "notification suppressed while disposed");
            return;
        }
        // No subscribers is fine.
        let _ = self.tx.send(notification);
    }

    /// Close the gate. Blocks until any in-progress `emit` has finished.
    pub(crate) fn mute(&self) {
        *self.muted.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub(crate) fn unmute(&self) {
        *self.muted.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}
