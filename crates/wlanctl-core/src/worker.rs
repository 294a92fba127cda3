// ── Request worker ──
//
// The single task that owns the control channel. It executes commands
// strictly one at a time, demultiplexes every incoming line, applies
// completed refreshes to the cache and fires notifications. Callers only
// ever talk to it through the request FIFO and the epoch watch.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::channel::{ChannelError, ControlChannel};
use crate::command::{Command, CommandEnvelope, CommandResult, Request};
use crate::config::ControllerConfig;
use crate::convert::{parse_networks, parse_scan_results, parse_status};
use crate::demux::{Classified, Outcome, Reply, ReplyAssembler, ReplyFragment, classify};
use crate::error::WifiError;
use crate::model::{DaemonEvent, EventKind, LinkState};
use crate::notify::{Notification, Notifier};
use crate::store::{Refresh, StateCache};

/// Lifecycle of the control channel, observable through
/// [`WifiController::lifecycle`](crate::WifiController::lifecycle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelLifecycle {
    #[default]
    Uninitialized,
    Opening,
    Ready,
    Disposed,
}

/// Where the worker is in the command cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Idle,
    Sending,
    AwaitingReply,
}

/// State shared between the worker and every facade clone.
pub(crate) struct Shared {
    pub cache: StateCache,
    pub notifier: Notifier,
    pub lifecycle: watch::Sender<ChannelLifecycle>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        let (lifecycle, _) = watch::channel(ChannelLifecycle::Uninitialized);
        Self {
            cache: StateCache::new(),
            notifier: Notifier::new(),
            lifecycle,
        }
    }
}

enum Step {
    Handle(Request),
    Poll,
    Shutdown,
}

enum IdleWake {
    Request(Option<Request>),
    Line(Result<String, ChannelError>),
}

enum ReplyWake {
    /// `false` once every epoch sender is gone.
    Reset(bool),
    Line(Result<String, ChannelError>),
}

pub(crate) struct RequestWorker<C> {
    channel: C,
    config: ControllerConfig,
    shared: Arc<Shared>,
    requests: mpsc::UnboundedReceiver<Request>,
    latest_epoch: watch::Receiver<u64>,
    state: WorkerState,
    assembler: ReplyAssembler,
    /// A scan-results event arrived and the results have not been fetched yet.
    scan_pending: bool,
    /// A reply timed out; a late reply may still be in the pipe.
    stale: bool,
    /// Why the channel went down, when it was not an explicit dispose.
    disposed_reason: Option<WifiError>,
}

impl<C: ControlChannel> RequestWorker<C> {
    pub(crate) fn new(
        channel: C,
        config: ControllerConfig,
        shared: Arc<Shared>,
        requests: mpsc::UnboundedReceiver<Request>,
        latest_epoch: watch::Receiver<u64>,
    ) -> Self {
        Self {
            channel,
            config,
            shared,
            requests,
            latest_epoch,
            state: WorkerState::Idle,
            assembler: ReplyAssembler::new(),
            scan_pending: false,
            stale: false,
            disposed_reason: None,
        }
    }

    /// Run until the request FIFO closes, then release the channel.
    pub(crate) async fn run(mut self) {
        info!(
            path = %self.config.address.socket_path().display(),
            "request worker started"
        );
        self.open().await;

        loop {
            let step = if self.lifecycle() == ChannelLifecycle::Ready {
                if self.stale {
                    self.recover().await;
                    continue;
                }
                if self.scan_pending {
                    self.fetch_scan_results().await;
                    continue;
                }
                self.idle().await
            } else {
                self.requests.recv().await.map_or(Step::Shutdown, Step::Handle)
            };

            match step {
                Step::Handle(request) => self.handle(request).await,
                Step::Poll => {}
                Step::Shutdown => break,
            }
        }

        self.channel.close().await;
        self.set_lifecycle(ChannelLifecycle::Disposed);
        info!("request worker stopped");
    }

    // ── Idle ─────────────────────────────────────────────────────────

    /// Wait for the next request while dispatching unsolicited lines.
    async fn idle(&mut self) -> Step {
        let wake = tokio::select! {
            biased;
            request = self.requests.recv() => IdleWake::Request(request),
            line = self.channel.read_line(self.config.idle_poll) => IdleWake::Line(line),
        };

        match wake {
            IdleWake::Request(Some(request)) => Step::Handle(request),
            IdleWake::Request(None) => Step::Shutdown,
            IdleWake::Line(Ok(line)) => {
                if let Some(fragment) = self.route_line(&line, false) {
                    warn!(?fragment, "reply fragment with no command outstanding");
                }
                Step::Poll
            }
            IdleWake::Line(Err(ChannelError::Timeout { .. })) => Step::Poll,
            IdleWake::Line(Err(e)) => {
                let err = WifiError::from_channel(e, "idle read");
                self.report(&err);
                self.enter_disposed(err).await;
                Step::Poll
            }
        }
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Command(envelope) => {
                let latest = *self.latest_epoch.borrow();
                if envelope.epoch < latest {
                    debug!(command = envelope.command.name(), "cancelling queued command");
                    envelope.respond(Err(WifiError::Cancelled));
                } else if self.lifecycle() == ChannelLifecycle::Ready {
                    self.execute(envelope).await;
                } else {
                    let err = self.disposed_reason.clone().unwrap_or(WifiError::Disposed);
                    self.fail(envelope, err);
                }
            }
            Request::Reinit { epoch } => {
                if self.superseded(epoch) {
                    debug!(epoch, "skipping superseded reinit");
                    return;
                }
                info!(epoch, "reinitializing control channel");
                self.reset().await;
                self.set_lifecycle(ChannelLifecycle::Disposed);
                self.open().await;
            }
            Request::Dispose { epoch } => {
                if self.superseded(epoch) {
                    debug!(epoch, "skipping superseded dispose");
                    return;
                }
                info!(epoch, "disposing control channel");
                self.reset().await;
                self.set_lifecycle(ChannelLifecycle::Disposed);
            }
        }
    }

    // ── Command cycle ────────────────────────────────────────────────

    async fn execute(&mut self, envelope: CommandEnvelope) {
        debug_assert_eq!(self.state, WorkerState::Idle, "one command at a time");
        let command = envelope.command;
        let wire = command.wire();

        self.set_state(WorkerState::Sending);
        debug!(command = %wire, "sending command");
        if let Err(e) = self.channel.write_line(&wire).await {
            self.set_state(WorkerState::Idle);
            let err = WifiError::from_channel(e, command.name());
            self.enter_disposed(err.clone()).await;
            self.fail(envelope, err);
            return;
        }

        self.set_state(WorkerState::AwaitingReply);
        let reply = self.await_reply(command, envelope.epoch).await;
        self.set_state(WorkerState::Idle);

        match reply {
            Ok(reply) => self.complete(envelope, reply),
            Err(err @ WifiError::Timeout { .. }) => {
                self.stale = true;
                self.fail(envelope, err);
            }
            // The reset that cancelled it is already queued and closes the channel.
            Err(WifiError::Cancelled) => {
                self.scan_pending = false;
                self.fail(envelope, WifiError::Cancelled);
            }
            Err(err) => {
                self.enter_disposed(err.clone()).await;
                self.fail(envelope, err);
            }
        }
    }

    /// Read lines until a terminal marker, the reply deadline, or a reset
    /// request newer than `epoch`.
    async fn await_reply(&mut self, command: Command, epoch: u64) -> Result<Reply, WifiError> {
        let timeout = self.config.reply_timeout;
        let deadline = Instant::now() + timeout;
        let mut watching_resets = true;
        self.assembler.reset();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let wake = tokio::select! {
                biased;
                changed = self.latest_epoch.changed(), if watching_resets => {
                    ReplyWake::Reset(changed.is_ok())
                }
                line = self.channel.read_line(remaining) => ReplyWake::Line(line),
            };

            match wake {
                ReplyWake::Reset(false) => watching_resets = false,
                ReplyWake::Reset(true) => {
                    let latest = *self.latest_epoch.borrow_and_update();
                    if latest > epoch {
                        debug!(command = command.name(), "in-flight command cancelled");
                        return Err(WifiError::Cancelled);
                    }
                }
                ReplyWake::Line(Ok(line)) => {
                    if let Some(reply) = self
                        .route_line(&line, true)
                        .and_then(|fragment| self.assembler.push(fragment))
                    {
                        return Ok(reply);
                    }
                }
                ReplyWake::Line(Err(ChannelError::Timeout { .. })) => {
                    return Err(WifiError::from_channel(
                        ChannelError::Timeout { timeout },
                        command.name(),
                    ));
                }
                ReplyWake::Line(Err(e)) => return Err(WifiError::from_channel(e, command.name())),
            }
        }
    }

    /// Turn a terminated reply into a result, refreshing the cache first.
    fn complete(&mut self, envelope: CommandEnvelope, reply: Reply) {
        let command = envelope.command;
        if let Outcome::Fail(reason) = reply.outcome {
            self.fail(
                envelope,
                WifiError::Rejected {
                    command: command.wire(),
                    reason,
                },
            );
            return;
        }

        let result = match command {
            Command::Connect { .. } | Command::Disconnect => CommandResult::Done,
            Command::Status => {
                let status = Arc::new(parse_status(&reply.lines));
                self.publish(Refresh::Status(Arc::clone(&status)));
                CommandResult::Status(status)
            }
            Command::Scan if reply.lines.is_empty() => {
                debug!("scan started, waiting for results event");
                CommandResult::ScanStarted
            }
            Command::Scan | Command::ScanResults => {
                let results = Arc::new(parse_scan_results(&reply.lines));
                self.scan_pending = false;
                self.publish(Refresh::ScanResults(Arc::clone(&results)));
                CommandResult::ScanResults(results)
            }
            Command::ListNetworks => {
                let networks = Arc::new(parse_networks(&reply.lines));
                self.publish(Refresh::Networks(Arc::clone(&networks)));
                CommandResult::Networks(networks)
            }
        };

        envelope.respond(Ok(result));
    }

    async fn fetch_scan_results(&mut self) {
        self.scan_pending = false;
        let epoch = *self.latest_epoch.borrow();
        self.execute(CommandEnvelope {
            command: Command::ScanResults,
            epoch,
            response_tx: None,
        })
        .await;
    }

    // ── Lines and events ─────────────────────────────────────────────

    fn route_line(&mut self, line: &str, outstanding: bool) -> Option<ReplyFragment> {
        match classify(line, outstanding) {
            Classified::Event(event) => {
                self.on_event(event);
                None
            }
            Classified::Reply(fragment) => Some(fragment),
            Classified::Discard(reason) => {
                if line.trim().is_empty() {
                    trace!("skipping blank line");
                } else {
                    warn!(line, reason, "discarding line");
                }
                None
            }
        }
    }

    fn on_event(&mut self, event: DaemonEvent) {
        debug!(kind = ?event.kind, payload = %event.payload, "daemon event");
        match event.kind {
            EventKind::Connected => self.publish(Refresh::Link(LinkState::Up)),
            EventKind::Disconnected => self.publish(Refresh::Link(LinkState::Down)),
            EventKind::ScanResultsReady => self.scan_pending = true,
            EventKind::Other(name) => debug!(event = %name, "ignoring daemon event"),
        }
    }

    // ── Outcomes ─────────────────────────────────────────────────────

    fn publish(&self, refresh: Refresh) {
        let notification = self.shared.cache.apply(refresh);
        self.shared.notifier.emit(notification);
    }

    fn report(&self, err: &WifiError) {
        if err.is_reportable() {
            warn!(error = %err, "request failed");
            self.shared.notifier.emit(Notification::Error(err.to_string()));
        }
    }

    fn fail(&self, envelope: CommandEnvelope, err: WifiError) {
        self.report(&err);
        envelope.respond(Err(err));
    }

    // ── Channel lifecycle ────────────────────────────────────────────

    async fn open(&mut self) {
        self.set_lifecycle(ChannelLifecycle::Opening);
        match self.channel.open(&self.config.address).await {
            Ok(()) => {
                self.disposed_reason = None;
                self.set_lifecycle(ChannelLifecycle::Ready);
            }
            Err(e) => {
                let err = WifiError::ConnectionFailed {
                    path: self.config.address.socket_path().display().to_string(),
                    reason: e.to_string(),
                };
                self.report(&err);
                self.disposed_reason = Some(err);
                self.set_lifecycle(ChannelLifecycle::Disposed);
            }
        }
    }

    /// Drop a channel that may still deliver a late reply and open a fresh one.
    async fn recover(&mut self) {
        warn!("recovering stale control channel");
        self.channel.close().await;
        self.stale = false;
        self.assembler.reset();
        self.set_lifecycle(ChannelLifecycle::Disposed);
        self.open().await;
    }

    /// Close the channel and forget all per-connection state.
    async fn reset(&mut self) {
        self.channel.close().await;
        self.assembler.reset();
        self.stale = false;
        self.scan_pending = false;
        self.disposed_reason = None;
    }

    async fn enter_disposed(&mut self, reason: WifiError) {
        self.reset().await;
        self.disposed_reason = Some(reason);
        self.set_lifecycle(ChannelLifecycle::Disposed);
    }

    fn superseded(&self, epoch: u64) -> bool {
        epoch < *self.latest_epoch.borrow()
    }

    fn lifecycle(&self) -> ChannelLifecycle {
        *self.shared.lifecycle.borrow()
    }

    /// Publish `next`. Watchers are only woken by an actual change.
    fn set_lifecycle(&self, next: ChannelLifecycle) {
        self.shared.lifecycle.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            info!(from = %current, to = %next, "channel lifecycle");
            *current = next;
            true
        });
    }

    fn set_state(&mut self, next: WorkerState) {
        trace!(from = ?self.state, to = ?next, "worker state");
        self.state = next;
    }
}
