//! Report parsers for HiOS CLI output.
//!
//! Every parser is a pure function from the text of one or more `show`
//! commands to a typed record set. Parsers never fail: a record that cannot
//! be read is skipped (or defaulted) and reported as a [`ParseAnomaly`] in
//! the returned [`Parsed`] value, which the caller logs with device context.
//!
//! The helpers in this module are the shared line tokenizer: field splitting,
//! `key....value` leader lines, and the numeric conversions used by several
//! reports.

mod arp;
mod config;
mod counters;
mod ip;
mod lldp;
mod mac;
mod ntp;
mod optics;
mod ping;
mod port;
mod snmp;
mod system;
mod users;
mod vlan;

pub use arp::{parse_arp, parse_ip_arp};
pub use config::{active_profile_index, sanitize_config};
pub use counters::parse_counters;
pub use ip::parse_interfaces_ip;
pub use lldp::{
    LldpField, LLDP_FIELDS, map_capability, parse_lldp_detail, parse_lldp_extended,
    parse_lldp_neighbors,
};
pub use mac::parse_mac_table;
pub use ntp::parse_ntp;
pub use optics::parse_optics;
pub use ping::{parse_ping, ping_command};
pub use port::{parse_interface_list, parse_mtu, parse_ports};
pub use snmp::parse_snmp;
pub use system::{EnvironmentReports, parse_environment, parse_facts};
pub use users::parse_users;
pub use vlan::parse_vlans;

use log::warn;

use crate::error::ParseAnomaly;

/// Vendor reported for every HiOS device.
pub const VENDOR: &str = "Belden";

/// A parsed record set plus the records that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub anomalies: Vec<ParseAnomaly>,
}

impl<T> Parsed<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            anomalies: Vec::new(),
        }
    }

    /// Record a skipped line.
    pub fn skip(
        &mut self,
        report: &'static str,
        line: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.anomalies.push(ParseAnomaly::new(report, line, reason));
    }

    /// Log every anomaly against `host` and return the records.
    pub fn logged(self, host: &str) -> T {
        for anomaly in &self.anomalies {
            warn!("{host}: {anomaly}");
        }
        self.value
    }
}

/// Whitespace-separated fields of a line.
pub fn fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Split a `Key.......value` leader line at the first run of `leader`.
///
/// Returns the trimmed key and the value with any remaining leading dots
/// removed.
pub fn split_leader<'a>(line: &'a str, leader: &str) -> Option<(&'a str, &'a str)> {
    let (key, value) = line.split_once(leader)?;
    Some((key.trim(), value.trim().trim_start_matches('.').trim()))
}

/// `Key....value` with a four-dot leader, the layout of `show system info`
/// and `show lldp remote-data`.
pub fn key_value(line: &str) -> Option<(&str, &str)> {
    split_leader(line, "....")
}

/// Prefix length of a dotted-quad mask, `None` unless it is exactly four
/// numeric octets.
pub fn prefix_length(mask: &str) -> Option<u8> {
    let mut total = 0u8;
    let mut octets = 0;
    for part in mask.split('.') {
        if octets == 4 {
            return None;
        }
        let octet: u8 = part.trim().parse().ok()?;
        total += octet.count_ones() as u8;
        octets += 1;
    }
    (octets == 4).then_some(total)
}

/// Megabits per second for a textual speed token (`1000`, `2.5G`, `10g`).
///
/// Returns `0` when the token is not a speed.
pub fn speed_mbps(token: &str) -> u64 {
    let token = token.trim().to_ascii_lowercase();
    match token.as_str() {
        "10" => 10,
        "100" => 100,
        "1000" => 1_000,
        "2.5g" => 2_500,
        "10g" => 10_000,
        "25g" => 25_000,
        "40g" => 40_000,
        "100g" => 100_000,
        other => match other.strip_suffix('g') {
            Some(gbit) => gbit
                .parse::<f64>()
                .map(|g| (g * 1000.0) as u64)
                .unwrap_or(0),
            None => other.parse().unwrap_or(0),
        },
    }
}

/// Seconds in an `N days, HH:MM:SS` uptime string, `0` if it does not parse.
pub fn parse_uptime(uptime: &str) -> u64 {
    try_parse_uptime(uptime).unwrap_or(0)
}

fn try_parse_uptime(uptime: &str) -> Option<u64> {
    let (days, clock) = uptime
        .trim()
        .split_once(" days, ")
        .or_else(|| uptime.trim().split_once(" day, "))?;
    let days: u64 = days.trim().parse().ok()?;

    let clock = clock.get(..8)?;
    let bytes = clock.as_bytes();
    if bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }
    let two_digits = |s: &str| -> Option<u64> {
        s.bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| s.parse().ok())
            .flatten()
    };
    let hours = two_digits(&clock[0..2])?;
    let minutes = two_digits(&clock[3..5])?;
    let seconds = two_digits(&clock[6..8])?;

    days.checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)
}

/// Seconds in an ARP age string: `0 days, 00:01:05` or `00:01:05`.
///
/// An unreadable clock counts as zero.
pub fn age_seconds(age: &str) -> f64 {
    let (days, clock) = match age.split_once("days,") {
        Some((days, clock)) => (days.trim().parse::<u64>().unwrap_or(0), clock),
        None => (0, age),
    };

    let parts: Vec<u64> = clock
        .trim()
        .split([':', ','])
        .map(|p| p.trim().parse::<u64>())
        .collect::<Result<_, _>>()
        .unwrap_or_default();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        _ => (0, 0, 0),
    };

    days as f64 * 86_400.0 + hours as f64 * 3_600.0 + minutes as f64 * 60.0 + seconds as f64
}

/// Header, separator or pager artifact common to tabular reports.
pub fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('!')
        || trimmed.starts_with("--More--")
        || trimmed.chars().all(|c| c == '-' || c == ' ')
}
