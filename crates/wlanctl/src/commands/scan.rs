//! `wlanctl scan`
//!
//! Triggers a scan and prints the results. When the daemon only
//! acknowledges the scan, waits for the results event first.

use std::cmp::Reverse;
use std::time::Duration;

use tabled::Tabled;
use wlanctl_core::{CommandResult, Notification, ScanResult, WifiController};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Lower bound for waiting on scan results; radios take a while.
const MIN_SCAN_WAIT: Duration = Duration::from_secs(10);

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Freq")]
    frequency: String,
    #[tabled(rename = "Security")]
    security: String,
}

impl From<&ScanResult> for ScanRow {
    fn from(r: &ScanResult) -> Self {
        Self {
            ssid: if r.ssid.is_empty() {
                "<hidden>".into()
            } else {
                r.ssid.clone()
            },
            bssid: output::or_dash(r.bssid.as_deref()),
            signal: format!("{} dBm", r.signal_level),
            frequency: output::or_dash(r.frequency.map(|f| format!("{f} MHz"))),
            security: r.security().to_string(),
        }
    }
}

pub async fn handle(controller: &WifiController, global: &GlobalOpts) -> Result<(), CliError> {
    // Subscribe first so the finished notification cannot slip past.
    let mut notifications = controller.notifications();

    if controller.scan_request().await? == CommandResult::ScanStarted {
        let wait = controller.config().reply_timeout.max(MIN_SCAN_WAIT);
        super::wait_for_notification(
            &mut notifications,
            &Notification::ScanFinished,
            wait,
            "scan results",
        )
        .await?;
    }

    let mut results = controller.scan_result().as_ref().clone();
    results.sort_by_key(|r| Reverse(r.signal_level));

    let out = output::render_list(global.output, &results, |r| ScanRow::from(r))?;
    output::print_output(&out);
    Ok(())
}
