//! `show system info`, temperature, fan and resource reports.

use super::{Parsed, VENDOR, key_value, parse_uptime, split_leader};
use crate::model::{CpuUsage, Environment, Facts, FanStatus, Memory, PowerStatus, Temperature};

/// Facts from `show system info`; the interface list is filled by the caller.
pub fn parse_facts(output: &str) -> Parsed<Facts> {
    let mut parsed = Parsed::new(Facts {
        vendor: VENDOR.to_string(),
        ..Default::default()
    });
    let facts = &mut parsed.value;

    for line in output.lines().map(str::trim) {
        let Some((_, value)) = key_value(line) else {
            continue;
        };
        if line.starts_with("Device hardware description") {
            facts.model = value.to_string();
        } else if line.starts_with("Firmware software release (RAM)") {
            facts.os_version = value.split_whitespace().next().unwrap_or_default().to_string();
        } else if line.starts_with("System uptime") {
            facts.uptime = parse_uptime(value);
            if facts.uptime == 0 {
                parsed.anomalies.push(crate::error::ParseAnomaly::new(
                    "show system info",
                    line,
                    "unreadable uptime",
                ));
            }
        } else if line.starts_with("Serial number") {
            facts.serial_number = value.to_string();
        } else if line.starts_with("System Name") {
            facts.hostname = value.to_string();
            facts.fqdn = value.to_string();
        }
    }

    parsed
}

/// Inputs for [`parse_environment`], one per command.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentReports<'a> {
    /// `show fan`
    pub fan: Option<&'a str>,
    /// `show system temperature limits`
    pub temperature: &'a str,
    /// `show system info`
    pub system_info: &'a str,
    /// `show system resources`
    pub resources: &'a str,
}

/// Value after a three-dot leader with a unit suffix removed.
fn leader_number(line: &str, unit: &str) -> Option<f64> {
    let (_, value) = split_leader(line, "...")?;
    value.trim_end_matches(unit).trim().parse().ok()
}

pub fn parse_environment(reports: EnvironmentReports<'_>) -> Parsed<Environment> {
    const REPORT: &str = "environment";
    let mut parsed = Parsed::new(Environment::default());

    match reports.fan {
        Some(fan) => {
            for line in fan.lines().filter(|l| !l.trim().is_empty()) {
                match line.split_once(':') {
                    Some((location, status)) => {
                        parsed.value.fans.insert(
                            location.trim().to_string(),
                            FanStatus {
                                status: status.to_ascii_lowercase().contains("ok"),
                            },
                        );
                    }
                    None => parsed.skip(REPORT, line, "fan line without ':'"),
                }
            }
        }
        // Fanless models reject the command.
        None => {
            parsed
                .value
                .fans
                .insert("status".to_string(), FanStatus { status: true });
        }
    }

    let (mut current, mut upper, mut lower) = (None, None, None);
    for line in reports.temperature.lines().map(str::trim) {
        let slot = if line.starts_with("Current temperature") {
            &mut current
        } else if line.starts_with("Temperature upper limit") {
            &mut upper
        } else if line.starts_with("Temperature lower limit") {
            &mut lower
        } else {
            continue;
        };
        match leader_number(line, "C") {
            Some(value) => *slot = Some(value),
            None => parsed.skip(REPORT, line, "unreadable temperature"),
        }
    }
    let out_of_range = match (current, upper, lower) {
        (Some(t), Some(hi), Some(lo)) => t > hi || t < lo,
        (Some(t), Some(hi), None) => t > hi,
        (Some(t), None, Some(lo)) => t < lo,
        _ => false,
    };
    parsed.value.temperature.insert(
        "system".to_string(),
        Temperature {
            temperature: current.unwrap_or(0.0),
            is_alert: out_of_range,
            is_critical: out_of_range,
        },
    );

    for psu in ["P1", "P2"] {
        let marker = format!("Power Supply {psu}, state");
        let present = reports
            .system_info
            .lines()
            .find(|line| line.contains(&marker))
            .and_then(|line| line.rsplit("..").next())
            .is_some_and(|state| state.trim().eq_ignore_ascii_case("present"));
        parsed
            .value
            .power
            .insert(psu.to_string(), PowerStatus { status: present });
    }

    let (mut free, mut allocated) = (0u64, 0u64);
    for line in reports.resources.lines().map(str::trim) {
        if line.contains("CPU utilization") {
            match leader_number(line, "%") {
                Some(usage) => {
                    parsed.value.cpu.insert("0".to_string(), CpuUsage { usage });
                }
                None => parsed.skip(REPORT, line, "unreadable CPU utilization"),
            }
        } else if line.contains("Free RAM") {
            free = leader_number(line, "kBytes").map_or(0, |v| v as u64);
        } else if line.contains("Allocated RAM") {
            allocated = leader_number(line, "kBytes").map_or(0, |v| v as u64);
        }
    }
    parsed.value.memory = Memory {
        available_ram: free,
        used_ram: allocated.saturating_sub(free),
    };

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_INFO: &str = "\
System Description.........................Hirschmann Rail Switch
System Name................................GRS1042-CORE
System uptime..............................12 days, 00:00:00
Device hardware description................GRS1042-6T6ZTHH00V9HHSE3AMR
Serial number..............................942135999000101022
Firmware software release (RAM)............HiOS-3A-09.4.04 2024-06-19 12:08
Power Supply P1, state.....................present
Power Supply P2, state.....................not present
";

    #[test]
    fn test_facts() {
        let parsed = parse_facts(SYSTEM_INFO);
        let facts = parsed.value;
        assert_eq!(facts.hostname, "GRS1042-CORE");
        assert_eq!(facts.fqdn, "GRS1042-CORE");
        assert_eq!(facts.model, "GRS1042-6T6ZTHH00V9HHSE3AMR");
        assert_eq!(facts.os_version, "HiOS-3A-09.4.04");
        assert_eq!(facts.serial_number, "942135999000101022");
        assert_eq!(facts.uptime, 1_036_800);
        assert_eq!(facts.vendor, "Belden");
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_facts_bad_uptime_defaults_to_zero() {
        let parsed = parse_facts("System uptime......................soon");
        assert_eq!(parsed.value.uptime, 0);
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn test_environment() {
        let parsed = parse_environment(EnvironmentReports {
            fan: Some("Fan 1: ok\nFan 2: failure"),
            temperature: "\
Current temperature...........47 C
Temperature upper limit.......70 C
Temperature lower limit.......0 C",
            system_info: SYSTEM_INFO,
            resources: "\
CPU utilization...............23%
Free RAM......................150592 kBytes
Allocated RAM.................356920 kBytes",
        });
        let env = parsed.value;

        assert!(env.fans["Fan 1"].status);
        assert!(!env.fans["Fan 2"].status);
        assert_eq!(env.temperature["system"].temperature, 47.0);
        assert!(!env.temperature["system"].is_alert);
        assert!(env.power["P1"].status);
        assert!(!env.power["P2"].status);
        assert_eq!(env.cpu["0"].usage, 23.0);
        assert_eq!(env.memory.available_ram, 150592);
        assert_eq!(env.memory.used_ram, 206328);
    }

    #[test]
    fn test_environment_over_limit_and_fanless() {
        let parsed = parse_environment(EnvironmentReports {
            fan: None,
            temperature: "Current temperature.....81 C\nTemperature upper limit.....70 C",
            ..Default::default()
        });
        let env = parsed.value;
        assert!(env.fans["status"].status);
        assert!(env.temperature["system"].is_alert);
        assert!(env.temperature["system"].is_critical);
        assert!(env.cpu.is_empty());
        assert_eq!(env.memory, Memory::default());
    }
}
