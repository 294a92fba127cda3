// ── Reply payload → domain types ──
//
// Converts the data lines of an assembled reply into snapshot types.
// Rows come in two shapes: comma-separated `key=value` pairs, or the
// daemon's tab-separated tables (with a `bssid / ...` or
// `network id / ...` header line).
// Rows that fit neither shape are logged and skipped.

use std::net::IpAddr;

use tracing::warn;

use crate::model::{ConnectionState, NetworkConfiguration, ScanResult, Status};

/// Build a [`Status`] from `key=value` lines. Unknown keys are ignored.
pub fn parse_status(lines: &[String]) -> Status {
    let mut status = Status::default();

    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            warn!(line = %line, "status line without '=', skipping");
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "wpa_state" => status.connection_state = ConnectionState::from_wpa_state(value),
            "ssid" => status.ssid = Some(value.to_owned()),
            "bssid" => status.bssid = Some(value.to_owned()),
            "key_mgmt" => status.key_mgmt = Some(value.to_owned()),
            "ip_address" => match value.parse::<IpAddr>() {
                Ok(ip) => status.ip_address = Some(ip),
                Err(_) => warn!(value, "unparsable ip_address in status"),
            },
            _ => {}
        }
    }

    status
}

/// Parse scan rows, skipping headers and malformed rows.
pub fn parse_scan_results(lines: &[String]) -> Vec<ScanResult> {
    rows(lines)
        .filter_map(|line| {
            let parsed = if line.contains('\t') {
                scan_row_from_table(line)
            } else {
                scan_row_from_pairs(line)
            };
            if parsed.is_none() {
                warn!(line = %line, "unparsable scan row, skipping");
            }
            parsed
        })
        .collect()
}

/// Parse registered-network rows, skipping headers and malformed rows.
pub fn parse_networks(lines: &[String]) -> Vec<NetworkConfiguration> {
    rows(lines)
        .filter_map(|line| {
            let parsed = if line.contains('\t') {
                network_row_from_table(line)
            } else {
                network_row_from_pairs(line)
            };
            if parsed.is_none() {
                warn!(line = %line, "unparsable network row, skipping");
            }
            parsed
        })
        .collect()
}

// ── Row helpers ──────────────────────────────────────────────────────

const TABLE_HEADERS: [&str; 2] = ["bssid /", "network id /"];

fn rows(lines: &[String]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| !is_table_header(line))
}

/// Headers carry no tabs; an SSID may well contain ` / `.
fn is_table_header(line: &str) -> bool {
    !line.contains('\t') && TABLE_HEADERS.iter().any(|h| line.starts_with(h))
}

fn pairs(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
}

fn scan_row_from_pairs(line: &str) -> Option<ScanResult> {
    let mut ssid = None;
    let mut signal = None;
    let mut bssid = None;
    let mut frequency = None;
    let mut flags = String::new();

    for (key, value) in pairs(line) {
        match key {
            "ssid" => ssid = Some(value.to_owned()),
            "signal" | "level" => signal = Some(value.parse::<i32>().ok()?),
            "bssid" => bssid = Some(value.to_owned()),
            "freq" | "frequency" => frequency = Some(value.parse::<u32>().ok()?),
            "flags" => value.clone_into(&mut flags),
            _ => {}
        }
    }

    Some(ScanResult {
        ssid: ssid?,
        bssid,
        signal_level: signal?,
        frequency,
        flags,
    })
}

/// `bssid \t frequency \t signal level \t flags \t ssid`
fn scan_row_from_table(line: &str) -> Option<ScanResult> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [bssid, frequency, signal, flags, rest @ ..] = fields.as_slice() else {
        return None;
    };

    Some(ScanResult {
        // Hidden networks have no SSID column.
        ssid: rest.first().copied().unwrap_or_default().to_owned(),
        bssid: Some((*bssid).to_owned()),
        signal_level: signal.trim().parse().ok()?,
        frequency: Some(frequency.trim().parse().ok()?),
        flags: (*flags).to_owned(),
    })
}

fn network_row_from_pairs(line: &str) -> Option<NetworkConfiguration> {
    let mut id = None;
    let mut ssid = String::new();
    let mut flags = String::new();

    for (key, value) in pairs(line) {
        match key {
            "id" => id = Some(value.parse::<u32>().ok()?),
            "ssid" => value.clone_into(&mut ssid),
            "flags" => value.clone_into(&mut flags),
            _ => {}
        }
    }

    Some(NetworkConfiguration {
        id: id?,
        ssid,
        flags,
    })
}

/// `network id \t ssid \t bssid \t flags`
fn network_row_from_table(line: &str) -> Option<NetworkConfiguration> {
    let mut fields = line.split('\t');
    let id = fields.next()?.trim().parse().ok()?;
    let ssid = fields.next()?.to_owned();
    let _bssid = fields.next();
    let flags = fields.next().unwrap_or_default().to_owned();

    Some(NetworkConfiguration { id, ssid, flags })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn status_from_key_value_lines() {
        let status = parse_status(&lines(&[
            "bssid=00:11:22:33:44:55",
            "ssid=HomeNet",
            "key_mgmt=WPA2-PSK",
            "wpa_state=COMPLETED",
            "ip_address=192.168.1.20",
            "address=aa:bb:cc:dd:ee:ff",
        ]));

        assert_eq!(status.connection_state, ConnectionState::Connected);
        assert_eq!(status.ssid.as_deref(), Some("HomeNet"));
        assert_eq!(
            status.ip_address,
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)))
        );
        assert_eq!(status.key_mgmt.as_deref(), Some("WPA2-PSK"));
    }

    #[test]
    fn status_tolerates_garbage() {
        let status = parse_status(&lines(&["no separator", "ip_address=not-an-ip"]));
        assert_eq!(status, Status::default());
    }

    #[test]
    fn scan_rows_from_pairs() {
        let results = parse_scan_results(&lines(&[
            "ssid=Net1,signal=-40",
            "ssid=Net2,signal=-70,bssid=00:11:22:33:44:55,freq=2412,flags=[WPA2-PSK-CCMP]",
        ]));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ScanResult::new("Net1", -40));
        assert_eq!(results[1].bssid.as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(results[1].frequency, Some(2412));
        assert_eq!(results[1].flags, "[WPA2-PSK-CCMP]");
    }

    #[test]
    fn scan_rows_from_daemon_table() {
        let results = parse_scan_results(&lines(&[
            "bssid / frequency / signal level / flags / ssid",
            "00:11:22:33:44:55\t2437\t-52\t[WPA2-PSK-CCMP][ESS]\tCafe",
            "66:77:88:99:aa:bb\t5180\t-80\t[ESS]",
        ]));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ssid, "Cafe");
        assert_eq!(results[0].signal_level, -52);
        assert_eq!(results[0].frequency, Some(2437));
        assert_eq!(results[1].ssid, "");
    }

    #[test]
    fn malformed_scan_rows_are_skipped() {
        let results = parse_scan_results(&lines(&[
            "ssid=NoSignal",
            "signal=-30",
            "ssid=Bad,signal=loud",
            "ssid=Good,signal=-61",
        ]));
        assert_eq!(results, vec![ScanResult::new("Good", -61)]);
    }

    #[test]
    fn slash_in_ssid_is_not_a_header() {
        let results = parse_scan_results(&lines(&[
            "bssid / frequency / signal level / flags / ssid",
            "aa:bb:cc:dd:ee:ff\t2412\t-50\t[ESS]\tHome / Guest",
            "ssid=Lab / 2,signal=-66",
        ]));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ssid, "Home / Guest");
        assert_eq!(results[1].ssid, "Lab / 2");

        let networks = parse_networks(&lines(&[
            "network id / ssid / bssid / flags",
            "2\tCafe / Bar\tany\t",
        ]));
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Cafe / Bar");
    }

    #[test]
    fn networks_from_both_shapes() {
        let networks = parse_networks(&lines(&[
            "network id / ssid / bssid / flags",
            "0\tHome\tany\t[CURRENT]",
            "1\tOffice\tany\t",
            "id=3,ssid=Lab,flags=[DISABLED]",
            "id=x,ssid=Broken",
        ]));

        assert_eq!(networks.len(), 3);
        assert!(networks[0].is_current());
        assert_eq!(networks[1].ssid, "Office");
        assert_eq!(networks[2].id, 3);
        assert!(networks[2].is_disabled());
    }
}
