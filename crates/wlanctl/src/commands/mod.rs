//! Command dispatch: bridges CLI args -> controller requests -> output.

pub mod link;
pub mod networks;
pub mod scan;
pub mod status;
pub mod watch;

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use wlanctl_core::{Notification, WifiController};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    cmd: Command,
    controller: &WifiController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, global).await,
        Command::Scan => scan::handle(controller, global).await,
        Command::Networks => networks::handle(controller, global).await,
        Command::Connect(args) => link::connect(controller, args, global).await,
        Command::Disconnect => link::disconnect(controller, global).await,
        Command::Watch => watch::handle(controller, global).await,
    }
}

/// Wait until `wanted` arrives on `notifications`.
///
/// An `Error` notification ends the wait early; `what` names the awaited
/// daemon activity in the timeout error.
pub(crate) async fn wait_for_notification(
    notifications: &mut broadcast::Receiver<Notification>,
    wanted: &Notification,
    timeout: Duration,
    what: &str,
) -> Result<(), CliError> {
    let wait = async {
        loop {
            match notifications.recv().await {
                Ok(notification) if &notification == wanted => return Ok(()),
                Ok(Notification::Error(message)) => return Err(CliError::Aborted(message)),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "notifications dropped"),
                Err(RecvError::Closed) => {
                    return Err(CliError::Aborted("notification stream closed".into()));
                }
            }
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| CliError::Timeout {
            command: what.to_owned(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })?
}
