use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::CommandResult;
use crate::error::WifiError;

/// Handle to the eventual outcome of one command.
///
/// Awaiting is optional: dropping the handle does not cancel the command,
/// whose effects still reach the cache and the notification stream.
#[derive(Debug)]
#[must_use = "a Completion does nothing unless awaited; drop it explicitly to ignore the outcome"]
pub struct Completion {
    rx: oneshot::Receiver<Result<CommandResult, WifiError>>,
}

impl Completion {
    pub(crate) fn new(rx: oneshot::Receiver<Result<CommandResult, WifiError>>) -> Self {
        Self { rx }
    }
}

impl Future for Completion {
    type Output = Result<CommandResult, WifiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped responder means the worker is gone.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(WifiError::Disposed)))
    }
}
