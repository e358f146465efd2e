//! `show vlan brief` and `show vlan port`.

use indexmap::IndexMap;

use super::{Parsed, fields};
use crate::model::Vlan;

/// Data rows after the line containing `header`.
fn rows_after<'a>(output: &'a str, header: &str) -> impl Iterator<Item = &'a str> {
    output
        .split('\n')
        .skip_while(move |line| !line.contains(header))
        .skip(1)
        .filter(|line| !line.trim().is_empty() && !line.starts_with("-----"))
}

/// VLANs keyed by id, with member ports from the port report.
///
/// Port rows naming an unknown VLAN are ignored.
pub fn parse_vlans(brief_output: &str, port_output: &str) -> Parsed<IndexMap<u16, Vlan>> {
    let mut parsed = Parsed::new(IndexMap::new());

    for line in rows_after(brief_output, "VLAN ID VLAN Name") {
        let parts = fields(line);
        if parts.len() < 2 {
            continue;
        }
        match parts[0].parse::<u16>() {
            Ok(id) => {
                parsed.value.insert(
                    id,
                    Vlan {
                        name: parts[1].to_string(),
                        interfaces: Vec::new(),
                    },
                );
            }
            Err(_) => parsed.skip("show vlan brief", line, "unreadable VLAN id"),
        }
    }

    for line in rows_after(port_output, "Interface VLAN ID") {
        let parts = fields(line);
        if parts.len() < 2 {
            continue;
        }
        let Ok(id) = parts[1].parse::<u16>() else {
            parsed.skip("show vlan port", line, "unreadable VLAN id");
            continue;
        };
        if let Some(vlan) = parsed.value.get_mut(&id) {
            vlan.interfaces.push(parts[0].to_string());
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlans() {
        let brief = "\
Max. VLAN ID..................................4042
VLAN ID VLAN Name                        VLAN Type  VLAN Creation Time
------- -------------------------------- ---------  ------------------
1       default                          default    0 days, 00:00:07
10      OT-Cell                          static     0 days, 00:00:31
";
        let ports = "\
Interface VLAN ID Frame Types  Ingress Filtering
--------- ------- ------------ -----------------
1/1       1       admit all    disable
1/2       10      admit all    disable
1/3       10      admit all    disable
1/4       99      admit all    disable
";
        let parsed = parse_vlans(brief, ports);
        let vlans = parsed.value;
        assert_eq!(vlans.len(), 2);
        assert_eq!(vlans[&1u16].name, "default");
        assert_eq!(vlans[&1u16].interfaces, ["1/1"]);
        assert_eq!(vlans[&10u16].name, "OT-Cell");
        assert_eq!(vlans[&10u16].interfaces, ["1/2", "1/3"]);
        assert!(parsed.anomalies.is_empty());
    }
}
