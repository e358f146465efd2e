//! `show ip arp` and the older `show arp` layout.

use super::{Parsed, age_seconds, fields};
use crate::model::ArpEntry;

/// `Intf  IP  <age: N days, HH:MM:SS>  MAC ...`
pub fn parse_ip_arp(output: &str) -> Parsed<Vec<ArpEntry>> {
    let mut parsed = Parsed::new(Vec::new());
    for line in output.lines() {
        let parts = fields(line);
        if parts.len() < 6 || matches!(parts[0], "Intf" | "---------") {
            continue;
        }
        parsed.value.push(ArpEntry {
            interface: parts[0].to_string(),
            ip: parts[1].to_string(),
            mac: parts[5].to_string(),
            age: age_seconds(&parts[2..5].join(" ")),
        });
    }
    parsed
}

/// `show arp`, where the MAC address may wrap onto its own line.
///
/// Entries that never receive a MAC are dropped.
pub fn parse_arp(output: &str) -> Parsed<Vec<ArpEntry>> {
    const REPORT: &str = "show arp";
    let mut parsed = Parsed::new(Vec::new());
    let mut pending: Vec<(ArpEntry, bool)> = Vec::new();

    for line in output.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with("Intf")
            || line.starts_with("MAC Address")
            || line.starts_with("-----")
        {
            continue;
        }
        let parts = fields(line);
        if parts.len() >= 5 {
            let age = match parts[2].parse::<f64>() {
                Ok(age) => age,
                Err(_) => {
                    parsed.skip(REPORT, line, "unreadable age");
                    continue;
                }
            };
            pending.push((
                ArpEntry {
                    interface: parts[0].to_string(),
                    ip: parts[1].to_string(),
                    mac: String::new(),
                    age,
                },
                false,
            ));
        } else if let [mac] = parts[..]
            && let Some((entry, has_mac)) = pending.last_mut()
        {
            entry.mac = mac.to_string();
            *has_mac = true;
        }
    }

    parsed.value = pending
        .into_iter()
        .filter_map(|(entry, has_mac)| has_mac.then_some(entry))
        .collect();
    parsed
}
