//! `ping <destination>` output.

use std::sync::LazyLock;

use regex::Regex;

use super::Parsed;
use crate::model::{PingProbe, PingResult, PingStats};

const REPORT: &str = "ping";

/// Probe count the device uses when none is given.
const DEFAULT_COUNT: u32 = 5;

static TRANSMITTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) packets transmitted, (\d+) packets received").expect("valid regex")
});
static ROUND_TRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"min/avg/max = ([\d.]+)/([\d.]+)/([\d.]+)").expect("valid regex")
});
static REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) bytes from ([\d.]+): seq=(\d+) ttl=(\d+) time=([\d.]+) ms")
        .expect("valid regex")
});

/// The CLI command for a ping. Only the probe count is configurable.
pub fn ping_command(destination: &str, count: u32) -> String {
    if count != 0 && count != DEFAULT_COUNT {
        format!("ping {destination} count {count}")
    } else {
        format!("ping {destination}")
    }
}

/// Summary statistics and the first reply.
///
/// Loss starts at 100% and RTT bounds at infinity until the summary lines
/// are read; the facade replaces non-finite values before returning.
pub fn parse_ping(output: &str, destination: &str) -> Parsed<PingResult> {
    if output.contains("DNS lookup failed") {
        return Parsed::new(PingResult::Error(format!(
            "DNS lookup failed for {destination}"
        )));
    }
    if output.trim().is_empty() {
        return Parsed::new(PingResult::Error("Empty ping output".to_string()));
    }

    let mut anomalies = Vec::new();
    let mut stats = PingStats {
        packet_loss: 100.0,
        rtt_min: f64::INFINITY,
        rtt_max: f64::NEG_INFINITY,
        ..Default::default()
    };

    if let Some(line) = output.lines().find(|l| l.contains("packets transmitted")) {
        let counts = TRANSMITTED.captures(line).and_then(|caps| {
            let sent: u32 = caps[1].parse().ok()?;
            let received: u32 = caps[2].parse().ok()?;
            Some((sent, received))
        });
        match counts {
            Some((sent, received)) => {
                stats.probes_sent = sent;
                stats.packet_loss = 100.0 - (f64::from(received) / f64::from(sent) * 100.0);
            }
            None => anomalies.push((line, "unreadable packet statistics")),
        }
    }

    if let Some(line) = output.lines().find(|l| l.contains("round-trip")) {
        let rtts = ROUND_TRIP.captures(line).and_then(|caps| {
            Some((
                caps[1].parse::<f64>().ok()?,
                caps[2].parse::<f64>().ok()?,
                caps[3].parse::<f64>().ok()?,
            ))
        });
        match rtts {
            Some((min, avg, max)) => {
                stats.rtt_min = min;
                stats.rtt_avg = avg;
                stats.rtt_max = max;
            }
            None => anomalies.push((line, "unreadable round-trip statistics")),
        }
    }

    if let Some(line) = output.lines().find(|l| l.contains("bytes from")) {
        match REPLY.captures(line) {
            Some(caps) => stats.results.push(PingProbe {
                ip_address: caps[2].to_string(),
                rtt: caps[5].parse().unwrap_or(0.0),
            }),
            None => anomalies.push((line, "unreadable reply")),
        }
    }

    if !stats.results.is_empty() {
        let n = stats.results.len() as f64;
        let mean = stats.results.iter().map(|p| p.rtt).sum::<f64>() / n;
        let variance = stats
            .results
            .iter()
            .map(|p| (p.rtt - mean).powi(2))
            .sum::<f64>()
            / n;
        stats.rtt_stddev = variance.sqrt();
    }

    let mut parsed = Parsed::new(PingResult::Success(stats));
    for (line, reason) in anomalies {
        parsed.skip(REPORT, line, reason);
    }
    parsed
}
