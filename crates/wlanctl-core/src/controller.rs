// ── Controller facade ──
//
// Public entry point. Every request call enqueues a command for the
// worker and returns a `Completion` at once; results also land in the
// shared cache and on the notification stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{info, warn};

use crate::channel::{ControlChannel, UnixChannel};
use crate::command::{Command, CommandEnvelope, Completion, Request};
use crate::config::{ConfigLookup, ControllerConfig};
use crate::error::WifiError;
use crate::model::{NetworkConfiguration, ScanResult, Status};
use crate::notify::Notification;
use crate::store::StateCache;
use crate::worker::{ChannelLifecycle, RequestWorker, Shared};

#[derive(Clone, Copy)]
enum ResetKind {
    Reinit,
    Dispose,
}

// ── WifiController ───────────────────────────────────────────────

/// Handle to one daemon control channel.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. All clones share the same
/// worker, cache and notification stream. Dropping the last clone closes
/// the request queue; the worker then closes the channel and exits.
#[derive(Clone)]
pub struct WifiController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    shared: Arc<Shared>,
    dispatch: Mutex<Dispatch>,
}

/// Enqueue side of the worker FIFO. Reset requests bump the epoch under
/// the same lock that stamps commands, so FIFO order and epoch order agree.
struct Dispatch {
    tx: mpsc::UnboundedSender<Request>,
    epoch: u64,
    epoch_tx: watch::Sender<u64>,
}

impl WifiController {
    /// Create a controller talking to the daemon over its Unix control socket.
    ///
    /// Spawns the request worker, so this must be called from within a
    /// tokio runtime. The channel is opened in the background; watch
    /// [`lifecycle()`](Self::lifecycle) to see when it is ready.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_channel(config, UnixChannel::new())
    }

    /// Create a controller over any [`ControlChannel`] implementation.
    pub fn with_channel<C: ControlChannel>(config: ControllerConfig, channel: C) -> Self {
        let shared = Arc::new(Shared::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let (epoch_tx, epoch_rx) = watch::channel(0);

        let worker = RequestWorker::new(channel, config.clone(), Arc::clone(&shared), rx, epoch_rx);
        tokio::spawn(worker.run());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                shared,
                dispatch: Mutex::new(Dispatch {
                    tx,
                    epoch: 0,
                    epoch_tx,
                }),
            }),
        }
    }

    /// Resolve the channel address from a hierarchical configuration and
    /// create a controller for it.
    pub fn from_lookup(lookup: &impl ConfigLookup) -> Result<Self, WifiError> {
        ControllerConfig::from_lookup(lookup).map(Self::new)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Direct access to the snapshot cache.
    pub fn store(&self) -> &StateCache {
        &self.inner.shared.cache
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Ask the daemon to connect to the registered network `id`.
    pub fn connect(&self, id: u32) -> Completion {
        self.submit(Command::Connect { id })
    }

    pub fn disconnect(&self) -> Completion {
        self.submit(Command::Disconnect)
    }

    /// Refresh the connection status. Fires `StatusReady` on success.
    pub fn status_request(&self) -> Completion {
        self.submit(Command::Status)
    }

    /// Start a scan. `ScanFinished` fires once results have been stored,
    /// either straight from the reply or after the daemon's results event.
    pub fn scan_request(&self) -> Completion {
        self.submit(Command::Scan)
    }

    /// Refresh the registered networks. Fires `ListNetworksReady` on success.
    pub fn list_networks_request(&self) -> Completion {
        self.submit(Command::ListNetworks)
    }

    // ── Cached results ───────────────────────────────────────────

    pub fn status_result(&self) -> Arc<Status> {
        self.store().status()
    }

    pub fn scan_result(&self) -> Arc<Vec<ScanResult>> {
        self.store().scan_results()
    }

    pub fn list_networks_result(&self) -> Arc<Vec<NetworkConfiguration>> {
        self.store().networks()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Cancel everything queued or in flight and reopen the channel.
    /// Also the way back from a disposed state.
    pub fn reinit(&self) {
        let epoch = self.reset(ResetKind::Reinit);
        info!(epoch, "reinit requested");
    }

    /// Cancel everything queued or in flight and close the channel.
    ///
    /// No notification fires after this returns until the next
    /// [`reinit()`](Self::reinit). Later commands fail with
    /// [`WifiError::Disposed`].
    pub fn dispose(&self) {
        let epoch = self.reset(ResetKind::Dispose);
        info!(epoch, "dispose requested");
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.shared.notifier.subscribe()
    }

    pub fn lifecycle(&self) -> watch::Receiver<ChannelLifecycle> {
        self.inner.shared.lifecycle.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────

    fn submit(&self, command: Command) -> Completion {
        let (response_tx, response_rx) = oneshot::channel();
        let dispatch = self.dispatch();
        let envelope = CommandEnvelope {
            command,
            epoch: dispatch.epoch,
            response_tx: Some(response_tx),
        };
        // On failure the envelope is dropped and the completion resolves
        // as disposed.
        if dispatch.tx.send(Request::Command(envelope)).is_err() {
            warn!(command = command.name(), "request worker is gone");
        }
        Completion::new(response_rx)
    }

    fn reset(&self, kind: ResetKind) -> u64 {
        let mut dispatch = self.dispatch();
        dispatch.epoch += 1;
        let epoch = dispatch.epoch;

        let request = match kind {
            ResetKind::Reinit => {
                self.inner.shared.notifier.unmute();
                Request::Reinit { epoch }
            }
            ResetKind::Dispose => {
                self.inner.shared.notifier.mute();
                Request::Dispose { epoch }
            }
        };

        dispatch.epoch_tx.send_replace(epoch);
        if dispatch.tx.send(request).is_err() {
            warn!(epoch, "request worker is gone");
        }
        epoch
    }

    fn dispatch(&self) -> MutexGuard<'_, Dispatch> {
        self.inner
            .dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
