// ── State cache ──
//
// Lock-free snapshot storage. Readers load an `Arc` and keep it as long
// as they like; the worker swaps in a fresh value only once a refresh
// has completed, so a half-parsed reply is never observable.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::model::{LinkState, NetworkConfiguration, ScanResult, Status};

/// Last-known daemon state shared between the worker and callers.
pub struct StateCache {
    pub(crate) status: ArcSwap<Status>,
    pub(crate) scan_results: ArcSwap<Vec<ScanResult>>,
    pub(crate) networks: ArcSwap<Vec<NetworkConfiguration>>,
    pub(crate) link: watch::Sender<LinkState>,
}

impl StateCache {
    pub fn new() -> Self {
        let (link, _) = watch::channel(LinkState::Unknown);
        Self {
            status: ArcSwap::from_pointee(Status::default()),
            scan_results: ArcSwap::from_pointee(Vec::new()),
            networks: ArcSwap::from_pointee(Vec::new()),
            link,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn status(&self) -> Arc<Status> {
        self.status.load_full()
    }

    pub fn scan_results(&self) -> Arc<Vec<ScanResult>> {
        self.scan_results.load_full()
    }

    pub fn networks(&self) -> Arc<Vec<NetworkConfiguration>> {
        self.networks.load_full()
    }

    pub fn link_state(&self) -> LinkState {
        *self.link.borrow()
    }

    /// Follow link state changes driven by connect/disconnect events.
    pub fn subscribe_link(&self) -> watch::Receiver<LinkState> {
        self.link.subscribe()
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new()
    }
}
