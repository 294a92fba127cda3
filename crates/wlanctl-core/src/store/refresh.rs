// ── Refresh application ──
//
// Every cache mutation goes through `StateCache::apply`, which swaps in
// the new snapshot and names the notification that announces it. The
// caller fires the notification after `apply` returns, so a subscriber
// woken by it always sees the new value.

use std::sync::Arc;

use tracing::debug;

use super::StateCache;
use crate::model::{LinkState, NetworkConfiguration, ScanResult, Status};
use crate::notify::Notification;

/// A completed refresh, ready to be swapped into the cache.
#[derive(Debug, Clone)]
pub(crate) enum Refresh {
    Status(Arc<Status>),
    ScanResults(Arc<Vec<ScanResult>>),
    Networks(Arc<Vec<NetworkConfiguration>>),
    Link(LinkState),
}

impl StateCache {
    pub(crate) fn apply(&self, refresh: Refresh) -> Notification {
        match refresh {
            Refresh::Status(status) => {
                debug!(state = %status.connection_state, "status refreshed");
                self.status.store(status);
                Notification::StatusReady
            }
            Refresh::ScanResults(results) => {
                debug!(count = results.len(), "scan results refreshed");
                self.scan_results.store(results);
                Notification::ScanFinished
            }
            Refresh::Networks(networks) => {
                debug!(count = networks.len(), "network list refreshed");
                self.networks.store(networks);
                Notification::ListNetworksReady
            }
            Refresh::Link(state) => {
                self.link.send_replace(state);
                match state {
                    LinkState::Up => Notification::Connected,
                    LinkState::Down | LinkState::Unknown => Notification::Disconnected,
                }
            }
        }
    }
}
