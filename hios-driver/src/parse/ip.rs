//! `show ip interface`.

use indexmap::IndexMap;

use super::{Parsed, fields, prefix_length};
use crate::model::{InterfaceIp, PrefixLength};

const REPORT: &str = "show ip interface";

/// IPv4 addresses keyed by interface.
///
/// Only `interface address mask` rows are read; unconfigured
/// `0.0.0.0/0.0.0.0` entries are dropped.
pub fn parse_interfaces_ip(output: &str) -> Parsed<IndexMap<String, InterfaceIp>> {
    let mut parsed = Parsed::new(IndexMap::new());

    for line in output.lines() {
        // Headers and separators; routed port names never contain a dash.
        if line.starts_with("Interface") || line.contains('-') {
            continue;
        }
        let [interface, address, mask] = fields(line)[..] else {
            continue;
        };
        if address == "0.0.0.0" && mask == "0.0.0.0" {
            continue;
        }
        let Some(length) = prefix_length(mask) else {
            parsed.skip(REPORT, line, "unreadable subnet mask");
            continue;
        };

        let entry: &mut InterfaceIp = parsed.value.entry(interface.to_string()).or_default();
        entry.ipv4.insert(
            address.to_string(),
            PrefixLength {
                prefix_length: length,
            },
        );
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interfaces_ip() {
        let output = "\
Interface  IP Address       Subnet Mask
---------  ---------------  ---------------
vlan/1     192.168.1.4      255.255.255.0
vlan/10    0.0.0.0          0.0.0.0
vlan/20    10.20.0.1        255.255.240.0
vlan/20    10.21.0.1        255.255.255.252
";
        let parsed = parse_interfaces_ip(output);
        let ips = &parsed.value;
        assert_eq!(ips.len(), 2);
        assert_eq!(ips["vlan/1"].ipv4["192.168.1.4"].prefix_length, 24);
        assert_eq!(ips["vlan/20"].ipv4["10.20.0.1"].prefix_length, 20);
        assert_eq!(ips["vlan/20"].ipv4["10.21.0.1"].prefix_length, 30);
        assert!(ips["vlan/1"].ipv6.is_empty());
    }

    #[test]
    fn test_bad_mask_reported() {
        let parsed = parse_interfaces_ip("vlan/1  192.168.1.4  255.255.x.0");
        assert!(parsed.value.is_empty());
        assert_eq!(parsed.anomalies.len(), 1);
    }
}
