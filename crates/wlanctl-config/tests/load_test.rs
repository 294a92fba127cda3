// Loading configuration files from disk.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use wlanctl_config::{ConfigError, Configurer, MODEL_CONFIG_FILE, SYSTEM_CONFIG_FILE};
use wlanctl_core::{ConfigLookup, ControllerConfig, WifiError};

const SYSTEM: &str = r#"
[device_classes.wifi]
optional = true
ctrl_interface = "/run/wpa_supplicant"

[device_types.wlan]
class = "wifi"
interface = "wlan0"

[additional.wifi]
interface = "wlan0"
reply_timeout_ms = 750
"#;

fn write_dir(system: &str, model: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SYSTEM_CONFIG_FILE), system).unwrap();
    fs::write(dir.path().join(MODEL_CONFIG_FILE), model).unwrap();
    dir
}

#[test]
fn test_load_and_resolve_controller_config() {
    let dir = write_dir(SYSTEM, "[devices.wifi]\ninterface = \"wlan1\"\n");
    let config = Configurer::load(dir.path()).unwrap();

    assert!(config.is_enabled("wifi"));
    let controller = ControllerConfig::from_lookup(&config).unwrap();
    assert_eq!(
        controller.address.socket_path(),
        PathBuf::from("/run/wpa_supplicant/wlan1")
    );
    assert_eq!(controller.reply_timeout, Duration::from_millis(750));
}

#[test]
fn test_optional_wifi_without_model_block_is_disabled() {
    let dir = write_dir(SYSTEM, "");
    let config = Configurer::load(dir.path()).unwrap();

    let err = ControllerConfig::from_lookup(&config).unwrap_err();
    assert!(matches!(err, WifiError::Config { .. }));
}

#[test]
fn test_missing_model_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SYSTEM_CONFIG_FILE), SYSTEM).unwrap();

    let err = Configurer::load(dir.path()).unwrap_err();
    let ConfigError::Missing { path } = &err else {
        panic!("expected a missing-file error, got {err}");
    };
    assert!(path.ends_with(MODEL_CONFIG_FILE));
}

#[test]
fn test_invalid_toml_is_reported() {
    let dir = write_dir("[device_classes.wifi\n", "");
    assert!(matches!(
        Configurer::load(dir.path()),
        Err(ConfigError::Figment(_))
    ));
}
