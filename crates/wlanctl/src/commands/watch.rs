//! `wlanctl watch`: stream notifications until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use wlanctl_core::{ChannelLifecycle, Notification, WifiController};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn line(format: OutputFormat, notification: &Notification) -> Result<String, CliError> {
    Ok(match (format, notification) {
        (OutputFormat::Json, n) => serde_json::to_string(n)?,
        (OutputFormat::Table, Notification::Error(message)) => format!("error: {message}"),
        (OutputFormat::Table, n) => n.to_string(),
    })
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    let mut notifications = controller.notifications();
    let mut lifecycle = controller.lifecycle();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            received = notifications.recv() => match received {
                Ok(notification) => output::print_output(&line(global.output, &notification)?),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "notifications dropped"),
                Err(RecvError::Closed) => break,
            },
            changed = lifecycle.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *lifecycle.borrow_and_update();
                if state == ChannelLifecycle::Disposed {
                    return Err(CliError::ConnectionLost {
                        reason: "the control channel closed".into(),
                    });
                }
            }
        }
    }

    controller.dispose();
    Ok(())
}
