//! `show snmp`.

use super::{Parsed, fields};
use crate::model::SnmpInformation;

/// Value after the label's colon. The value itself may contain colons.
fn after_colon(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

pub fn parse_snmp(output: &str) -> Parsed<SnmpInformation> {
    let mut parsed = Parsed::new(SnmpInformation::default());
    let info = &mut parsed.value;

    for line in output.lines() {
        if line.contains("System ID") {
            info.chassis_id = after_colon(line);
        } else if line.contains("System Contact") {
            info.contact = after_colon(line);
        } else if line.contains("System Location") {
            info.location = after_colon(line);
        } else if line.contains("Community") && line.contains("Status") {
            let parts = fields(line);
            if parts.len() >= 3 {
                let access = if line.contains("readOnly") { "ro" } else { "rw" };
                info.community
                    .insert(parts[1].to_string(), access.to_string());
            }
        }
    }

    parsed
}
