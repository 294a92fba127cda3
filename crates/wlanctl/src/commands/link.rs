//! `wlanctl connect` / `wlanctl disconnect`

use std::time::Duration;

use serde_json::json;
use wlanctl_core::{Notification, WifiController};

use crate::cli::{ConnectArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Lower bound for waiting on association after `--wait`.
const MIN_CONNECT_WAIT: Duration = Duration::from_secs(30);

pub async fn connect(
    controller: &WifiController,
    args: ConnectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut notifications = controller.notifications();
    controller.connect(args.id).await?;

    if args.wait {
        let wait = controller.config().reply_timeout.max(MIN_CONNECT_WAIT);
        super::wait_for_notification(&mut notifications, &Notification::Connected, wait, "connection")
            .await?;
    }

    let out = match global.output {
        OutputFormat::Table if args.wait => format!("Connected to network {}", args.id),
        OutputFormat::Table => format!("Connecting to network {}", args.id),
        OutputFormat::Json => output::render_json(&json!({
            "command": "connect",
            "id": args.id,
            "connected": args.wait,
        }))?,
    };
    output::print_output(&out);
    Ok(())
}

pub async fn disconnect(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    controller.disconnect().await?;

    let out = match global.output {
        OutputFormat::Table => "Disconnected".to_owned(),
        OutputFormat::Json => output::render_json(&json!({ "command": "disconnect" }))?,
    };
    output::print_output(&out);
    Ok(())
}
