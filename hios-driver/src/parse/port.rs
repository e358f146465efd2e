//! `show port` and `show mtu`.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{Parsed, fields, is_noise, speed_mbps};
use crate::model::Interface;

const REPORT: &str = "show port";

/// MTU used when `show mtu` has no row for a port.
pub const DEFAULT_MTU: u32 = 1500;

/// Port name to MTU from `show mtu`.
pub fn parse_mtu(output: &str) -> HashMap<String, u32> {
    output
        .lines()
        .filter(|line| !is_noise(line) && !line.contains("Interface"))
        .filter_map(|line| match fields(line).as_slice() {
            [name, mtu] => mtu.parse().ok().map(|mtu| (name.to_string(), mtu)),
            _ => None,
        })
        .collect()
}

/// Interfaces from `show port`, with MTUs joined from `show mtu`.
///
/// Rows are `name [alias] admin phys-mode phys-status link ...`; the
/// admin state is the third field and the configured speed the fourth. When
/// the configured mode is `auto` the speed falls back to the sixth field.
/// Link state is the seventh field, or the last one on short rows.
pub fn parse_ports(output: &str, mtu: &HashMap<String, u32>) -> Parsed<IndexMap<String, Interface>> {
    let mut parsed = Parsed::new(IndexMap::new());

    for line in output.lines() {
        if is_noise(line) || line.trim_start().starts_with("Interface") {
            continue;
        }
        let f = fields(line);
        if f.len() < 6 {
            parsed.skip(REPORT, line, "expected at least 6 fields");
            continue;
        }

        let name = f[0];
        let admin = f[2];
        let phys_mode = f[3];
        let link = f.get(6).copied().unwrap_or(f[f.len() - 1]);

        let mut speed = 0;
        if !phys_mode.to_ascii_lowercase().contains("auto") {
            speed = speed_mbps(phys_mode);
        }
        if speed == 0 && f[5] != "-" {
            speed = speed_mbps(f[5]);
        }

        let speed = speed.checked_mul(1_000_000).unwrap_or_else(|| {
            parsed.skip(REPORT, line, "speed out of range");
            0
        });

        parsed.value.insert(
            name.to_string(),
            Interface {
                is_up: link.eq_ignore_ascii_case("up"),
                is_enabled: admin.eq_ignore_ascii_case("enabled"),
                speed,
                mtu: mtu.get(name).copied().unwrap_or(DEFAULT_MTU),
                ..Default::default()
            },
        );
    }

    parsed
}

/// Port names, in report order, for the facts record.
pub fn parse_interface_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !is_noise(line) && !line.starts_with("Interface") && !line.contains("----"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_PORT: &str = "\
Interface  Name  Admin    Phys Mode  Phys Stat  Link  STP
---------  ----  -------  ---------  ---------  ----  -------
1/1        -     enabled  1000       1000 full  up    forwarding
1/2        -     enabled  auto       -          down  disabled
1/3        -     disabled auto       2.5G       down  disabled
";

    const SHOW_MTU: &str = "\
Interface MTU
--------- -----
1/1       1518
1/2       9000
";

    #[test]
    fn test_sample_port_line() {
        let mut mtu = HashMap::new();
        mtu.insert("1/1".to_string(), 1518);

        let parsed = parse_ports("1/1  up  Enabled  1000  full  up", &mtu);
        let port = &parsed.value["1/1"];
        assert!(port.is_up);
        assert!(port.is_enabled);
        assert_eq!(port.speed, 1_000_000_000);
        assert_eq!(port.mtu, 1518);
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_full_report() {
        let mtu = parse_mtu(SHOW_MTU);
        assert_eq!(mtu.len(), 2);

        let parsed = parse_ports(SHOW_PORT, &mtu);
        let ports = &parsed.value;
        assert_eq!(ports.keys().collect::<Vec<_>>(), ["1/1", "1/2", "1/3"]);

        // "1000 full" splits into two fields, so link is still the 7th.
        assert!(ports["1/1"].is_up);
        assert_eq!(ports["1/1"].speed, 1_000_000_000);

        assert!(!ports["1/2"].is_up);
        assert_eq!(ports["1/2"].speed, 0);
        assert_eq!(ports["1/2"].mtu, 9000);

        assert!(!ports["1/3"].is_enabled);
        assert_eq!(ports["1/3"].mtu, DEFAULT_MTU);
        assert_eq!(ports["1/3"].last_flapped, -1.0);
    }

    #[test]
    fn test_short_row_is_skipped() {
        let parsed = parse_ports("1/9  enabled  auto\n1/1  up  Enabled  1000  full  up", &HashMap::new());
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.anomalies.len(), 1);
        assert_eq!(parsed.anomalies[0].report, "show port");
    }

    #[test]
    fn test_oversized_speed_is_zeroed() {
        let parsed = parse_ports("1/1  -  enabled  99999999999999  x  up", &HashMap::new());
        let port = &parsed.value["1/1"];
        assert_eq!(port.speed, 0);
        assert!(port.is_up);
        assert_eq!(parsed.anomalies.len(), 1);
        assert_eq!(parsed.anomalies[0].reason, "speed out of range");
    }

    #[test]
    fn test_interface_list() {
        assert_eq!(parse_interface_list(SHOW_PORT), ["1/1", "1/2", "1/3"]);
    }
}
