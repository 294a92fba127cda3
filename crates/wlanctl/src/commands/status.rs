//! `wlanctl status`

use wlanctl_core::{Status, WifiController};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &Status) -> String {
    [
        format!("State:    {}", s.connection_state),
        format!("SSID:     {}", output::or_dash(s.ssid.as_deref())),
        format!("BSSID:    {}", output::or_dash(s.bssid.as_deref())),
        format!("IP:       {}", output::or_dash(s.ip_address)),
        format!("Key mgmt: {}", output::or_dash(s.key_mgmt.as_deref())),
    ]
    .join("\n")
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    controller.status_request().await?;
    let status = controller.status_result();

    let out = output::render_single(global.output, status.as_ref(), detail)?;
    output::print_output(&out);
    Ok(())
}
