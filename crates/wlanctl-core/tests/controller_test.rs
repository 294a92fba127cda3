// End-to-end tests for `WifiController` against a fake daemon on a real
// Unix socket.

#![allow(clippy::unwrap_used)]

mod support;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::TryRecvError;

use support::FakeDaemon;
use wlanctl_core::{
    ChannelLifecycle, CommandResult, ConfigLookup, ConnectionState, LinkState, Notification,
    ScanResult, WifiController, WifiError,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn ready(controller: &WifiController) {
    tokio::time::timeout(
        Duration::from_secs(5),
        controller
            .lifecycle()
            .wait_for(|state| *state == ChannelLifecycle::Ready),
    )
    .await
    .unwrap()
    .unwrap();
}

struct StaticLookup {
    attributes: HashMap<&'static str, String>,
    enabled: bool,
}

impl ConfigLookup for StaticLookup {
    fn attribute(&self, _device_type: &str, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn is_enabled(&self, _device_name: &str) -> bool {
        self.enabled
    }
}

// ── Replies and refreshes ───────────────────────────────────────────

#[tokio::test]
async fn test_scan_with_inline_results() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    let mut notifications = controller.notifications();

    let scan = controller.scan_request();
    daemon.expect("SCAN").await;
    daemon.send(&[
        "<event>CTRL-EVENT-SCAN-RESULTS",
        "ssid=Net1,signal=-40",
        "ssid=Net2,signal=-70",
        "OK",
    ]);

    let expected = vec![ScanResult::new("Net1", -40), ScanResult::new("Net2", -70)];
    assert_eq!(
        scan.await.unwrap(),
        CommandResult::ScanResults(Arc::new(expected.clone()))
    );
    assert_eq!(notifications.recv().await.unwrap(), Notification::ScanFinished);
    assert_eq!(*controller.scan_result(), expected);

    daemon.expect_silence().await;
    assert_eq!(notifications.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_failed_connect_keeps_cache() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    let mut notifications = controller.notifications();

    let connect = controller.connect(3);
    daemon.expect("CONNECT 3").await;
    daemon.send(&["FAIL"]);

    let err = connect.await.unwrap_err();
    assert!(matches!(err, WifiError::Rejected { ref reason, .. } if reason == "FAIL"));

    let Notification::Error(message) = notifications.recv().await.unwrap() else {
        panic!("expected an error notification");
    };
    assert!(message.contains("CONNECT 3"));
    assert_eq!(controller.store().link_state(), LinkState::Unknown);
    assert_eq!(controller.status_result().connection_state, ConnectionState::Unknown);
}

#[tokio::test]
async fn test_connect_event_then_status() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    let mut notifications = controller.notifications();

    let connect = controller.connect(0);
    daemon.expect("CONNECT 0").await;
    daemon.send(&["OK"]);
    assert_eq!(connect.await.unwrap(), CommandResult::Done);

    daemon.send(&["<3>CTRL-EVENT-CONNECTED - Connection to 00:11:22:33:44:55 completed"]);
    assert_eq!(notifications.recv().await.unwrap(), Notification::Connected);

    let status = controller.status_request();
    daemon.expect("STATUS").await;
    daemon.send(&[
        "bssid=00:11:22:33:44:55",
        "ssid=Home",
        "wpa_state=COMPLETED",
        "ip_address=10.0.0.7",
        "OK",
    ]);
    status.await.unwrap();

    assert_eq!(notifications.recv().await.unwrap(), Notification::StatusReady);
    assert_eq!(notifications.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(
        controller.status_result().connection_state,
        ConnectionState::Connected
    );
    assert_eq!(
        controller.status_result().ip_address.map(|ip| ip.to_string()),
        Some("10.0.0.7".to_owned())
    );
}

#[tokio::test]
async fn test_list_networks_table() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    let mut notifications = controller.notifications();

    let list = controller.list_networks_request();
    daemon.expect("LIST_NETWORKS").await;
    daemon.send(&[
        "network id / ssid / bssid / flags",
        "0\tHome\tany\t[CURRENT]",
        "1\tOffice\tany\t[DISABLED]",
        "OK",
    ]);
    list.await.unwrap();

    assert_eq!(notifications.recv().await.unwrap(), Notification::ListNetworksReady);
    let networks = controller.list_networks_result();
    assert_eq!(networks.len(), 2);
    assert_eq!(networks[1].ssid, "Office");
    assert!(networks[1].is_disabled());
}

// ── Ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_outstanding_command() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());

    let first = controller.status_request();
    let second = controller.disconnect();
    let third = controller.list_networks_request();

    daemon.expect("STATUS").await;
    daemon.expect_silence().await;
    daemon.send(&["wpa_state=INACTIVE", "OK"]);
    first.await.unwrap();

    daemon.expect("DISCONNECT").await;
    daemon.expect_silence().await;
    daemon.send(&["OK"]);
    second.await.unwrap();

    daemon.expect("LIST_NETWORKS").await;
    daemon.send(&["OK"]);
    assert_eq!(
        third.await.unwrap(),
        CommandResult::Networks(Arc::new(Vec::new()))
    );
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_dispose_cancels_and_silences() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    let mut notifications = controller.notifications();

    let in_flight = controller.status_request();
    let queued = controller.scan_request();
    daemon.expect("STATUS").await;

    controller.dispose();
    // A late reply must not reach anyone.
    daemon.send(&["wpa_state=COMPLETED", "OK", "<3>CTRL-EVENT-CONNECTED"]);

    assert_eq!(in_flight.await, Err(WifiError::Cancelled));
    assert_eq!(queued.await, Err(WifiError::Cancelled));
    assert_eq!(controller.disconnect().await, Err(WifiError::Disposed));

    daemon.wait_closed(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifications.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(controller.status_result().connection_state, ConnectionState::Unknown);
    assert_eq!(*controller.lifecycle().borrow(), ChannelLifecycle::Disposed);
}

#[tokio::test]
async fn test_reinit_after_dispose() {
    let mut daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    ready(&controller).await;

    controller.dispose();
    daemon.wait_closed(1).await;

    controller.reinit();
    ready(&controller).await;
    daemon.wait_accepted(2).await;

    let disconnect = controller.disconnect();
    daemon.expect("DISCONNECT").await;
    daemon.send(&["OK"]);
    assert_eq!(disconnect.await, Ok(CommandResult::Done));
}

#[tokio::test]
async fn test_missing_socket_fails_commands() {
    let daemon = FakeDaemon::start();
    let mut config = daemon.config();
    config.address.interface = "wlan9".into();

    let controller = WifiController::new(config);
    let err = controller.status_request().await.unwrap_err();
    assert!(matches!(err, WifiError::ConnectionFailed { ref path, .. } if path.ends_with("wlan9")));
}

#[tokio::test]
async fn test_drop_closes_channel() {
    let daemon = FakeDaemon::start();
    let controller = WifiController::new(daemon.config());
    ready(&controller).await;

    let clone = controller.clone();
    drop(controller);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(daemon.closed(), 0, "a live clone keeps the channel open");

    drop(clone);
    daemon.wait_closed(1).await;
}

// ── Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn test_from_lookup() {
    let mut daemon = FakeDaemon::start();
    let socket = daemon.config().address;
    let lookup = StaticLookup {
        attributes: HashMap::from([
            ("ctrl_interface", socket.ctrl_dir.to_string_lossy().into_owned()),
            ("interface", "wlan0".to_owned()),
        ]),
        enabled: true,
    };

    let controller = WifiController::from_lookup(&lookup).unwrap();
    assert_eq!(controller.config().address, socket);

    let status = controller.status_request();
    daemon.expect("STATUS").await;
    daemon.send(&["OK"]);
    status.await.unwrap();
}

#[test]
fn test_from_lookup_disabled() {
    let lookup = StaticLookup {
        attributes: HashMap::new(),
        enabled: false,
    };
    let err = WifiController::from_lookup(&lookup).err().unwrap();
    assert!(matches!(err, WifiError::Config { .. }));
}
