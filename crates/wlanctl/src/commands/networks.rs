//! `wlanctl networks`

use tabled::Tabled;
use wlanctl_core::{NetworkConfiguration, WifiController};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Current")]
    current: &'static str,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl From<&NetworkConfiguration> for NetworkRow {
    fn from(n: &NetworkConfiguration) -> Self {
        Self {
            id: n.id,
            ssid: n.ssid.clone(),
            current: if n.is_current() { "*" } else { "" },
            flags: n.flags.clone(),
        }
    }
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    controller.list_networks_request().await?;
    let networks = controller.list_networks_result();

    let out = output::render_list(global.output, networks.as_slice(), |n| NetworkRow::from(n))?;
    output::print_output(&out);
    Ok(())
}
