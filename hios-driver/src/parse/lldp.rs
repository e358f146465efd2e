//! `show lldp remote-data`.
//!
//! The report is a sequence of blocks, each opened by
//! `Remote data, <local port> - #<n>` and followed by `Label....value`
//! lines. Labels are matched case-insensitively against [`LLDP_FIELDS`];
//! anything else is ignored so new firmware fields do not break parsing.

use indexmap::IndexMap;

use super::{Parsed, key_value};
use crate::model::{LldpMap, LldpNeighbor, LldpNeighborDetail, LldpNeighborExtended};

const REPORT: &str = "show lldp remote-data";
const SECTION_MARKER: &str = "Remote data,";

/// A recognised remote-data label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LldpField {
    SystemName,
    PortDescription,
    SystemDescription,
    ChassisId,
    PortId,
    CapabilityBits,
    ManagementIpv4,
    ManagementIpv6,
    Autoneg,
    MauType,
    PortVlanId,
    VlanMembership,
    LinkAggStatus,
    LinkAggPortId,
}

/// Lower-cased labels and the field each one fills.
pub const LLDP_FIELDS: &[(&str, LldpField)] = &[
    ("system name", LldpField::SystemName),
    ("port description", LldpField::PortDescription),
    ("system description", LldpField::SystemDescription),
    ("chassis id", LldpField::ChassisId),
    ("port id", LldpField::PortId),
    ("autoneg. cap. bits", LldpField::CapabilityBits),
    ("ipv4 management address", LldpField::ManagementIpv4),
    ("ipv6 management address", LldpField::ManagementIpv6),
    ("autoneg. supp./enabled", LldpField::Autoneg),
    ("port oper. mau type", LldpField::MauType),
    ("port vlan id", LldpField::PortVlanId),
    ("vlan membership", LldpField::VlanMembership),
    ("link agg. status", LldpField::LinkAggStatus),
    ("link agg. port id", LldpField::LinkAggPortId),
];

const CAPABILITIES: &[&str] = &[
    "repeater",
    "bridge",
    "wlan-access-point",
    "router",
    "telephone",
    "docsis-cable-device",
    "station",
];

/// Map a device capability token to its standard name, `"other"` if unknown.
pub fn map_capability(token: &str) -> &'static str {
    let token = token.to_ascii_lowercase();
    CAPABILITIES
        .iter()
        .find(|cap| token.contains(*cap))
        .copied()
        .unwrap_or("other")
}

fn lookup(label: &str) -> Option<LldpField> {
    let label = label.to_ascii_lowercase();
    LLDP_FIELDS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, field)| *field)
}

/// One remote-data block.
struct Block<'a> {
    local_port: &'a str,
    fields: Vec<(LldpField, &'a str, &'a str)>,
}

impl<'a> Block<'a> {
    fn get(&self, field: LldpField) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(f, _, _)| *f == field)
            .map(|(_, value, _)| *value)
    }
}

fn blocks(output: &str) -> Vec<Block<'_>> {
    output
        .split(SECTION_MARKER)
        .skip(1)
        .filter_map(|section| {
            let mut lines = section.trim().lines();
            let header = lines.next()?;
            // " 1/6 - #1" -> "1/6"
            let before_dash = header.split('-').next().unwrap_or_default().trim();
            let local_port = before_dash.rsplit(',').next().unwrap_or_default().trim();
            if local_port.is_empty() {
                return None;
            }

            let fields = lines
                .map(str::trim)
                .filter_map(|line| {
                    let (label, value) = key_value(line)?;
                    Some((lookup(label)?, value, line))
                })
                .collect();
            Some(Block { local_port, fields })
        })
        .collect()
}

/// Identifier before a `(subtype)` suffix.
fn strip_subtype(value: &str) -> &str {
    value.split('(').next().unwrap_or_default().trim()
}

/// Capabilities listed inside the first parentheses, unknown ones dropped.
fn capabilities(value: &str) -> Vec<String> {
    let Some((_, inner)) = value.split_once('(') else {
        return Vec::new();
    };
    let inner = inner.split(')').next().unwrap_or_default();
    inner
        .split(',')
        .map(|cap| map_capability(cap.trim()))
        .filter(|cap| *cap != "other")
        .map(str::to_string)
        .collect()
}

/// `<n/a>` or a comma-separated list of VLAN ids.
fn vlan_membership(value: &str) -> Option<Vec<u16>> {
    if value.is_empty() || value == "<n/a>" {
        return Some(Vec::new());
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse().ok())
        .collect()
}

fn detail_from(block: &Block<'_>) -> LldpNeighborDetail {
    let text = |field| block.get(field).unwrap_or_default().to_string();
    let capab = block.get(LldpField::CapabilityBits).map(capabilities).unwrap_or_default();
    LldpNeighborDetail {
        parent_interface: block.local_port.to_string(),
        remote_port: block.get(LldpField::PortId).map(strip_subtype).unwrap_or_default().to_string(),
        remote_port_description: text(LldpField::PortDescription),
        remote_chassis_id: block
            .get(LldpField::ChassisId)
            .map(strip_subtype)
            .unwrap_or_default()
            .to_string(),
        remote_system_name: text(LldpField::SystemName),
        remote_system_description: text(LldpField::SystemDescription),
        remote_system_enable_capab: capab.clone(),
        remote_system_capab: capab,
    }
}

/// `hostname`/`port` pairs keyed by local port.
///
/// A block without both a system name and a port description is skipped.
pub fn parse_lldp_neighbors(output: &str) -> Parsed<LldpMap<LldpNeighbor>> {
    let mut parsed = Parsed::new(IndexMap::new());
    for block in blocks(output) {
        match (block.get(LldpField::SystemName), block.get(LldpField::PortDescription)) {
            (Some(hostname), Some(port)) => {
                let neighbors: &mut Vec<_> = parsed.value.entry(block.local_port.to_string()).or_default();
                neighbors.push(LldpNeighbor {
                    hostname: hostname.to_string(),
                    port: port.to_string(),
                });
            }
            _ => parsed.skip(
                REPORT,
                block.local_port,
                "neighbor without system name or port description",
            ),
        }
    }
    parsed
}

pub fn parse_lldp_detail(output: &str) -> Parsed<LldpMap<LldpNeighborDetail>> {
    let mut parsed = Parsed::new(IndexMap::new());
    for block in blocks(output) {
        let neighbors: &mut Vec<_> = parsed.value.entry(block.local_port.to_string()).or_default();
        neighbors.push(detail_from(&block));
    }
    parsed
}

/// Detail records plus management addresses, autonegotiation, MAU type,
/// VLAN and link aggregation fields.
pub fn parse_lldp_extended(output: &str) -> Parsed<LldpMap<LldpNeighborExtended>> {
    let mut parsed: Parsed<LldpMap<LldpNeighborExtended>> = Parsed::new(IndexMap::new());

    for block in blocks(output) {
        let mut neighbor = LldpNeighborExtended {
            detail: detail_from(&block),
            ..Default::default()
        };

        for &(field, value, line) in &block.fields {
            match field {
                LldpField::ManagementIpv4 => neighbor.remote_management_ipv4 = value.to_string(),
                LldpField::ManagementIpv6 => neighbor.remote_management_ipv6 = value.to_string(),
                LldpField::Autoneg => match value.split_once('/') {
                    Some((supported, enabled)) if !enabled.contains('/') => {
                        neighbor.autoneg_support = supported.trim().to_string();
                        neighbor.autoneg_enabled = enabled.trim().to_string();
                    }
                    _ => parsed.skip(REPORT, line, "expected supported/enabled"),
                },
                LldpField::MauType => {
                    neighbor.port_oper_mau_type = value
                        .rsplit('(')
                        .next()
                        .unwrap_or_default()
                        .trim()
                        .trim_matches(')')
                        .to_string();
                }
                LldpField::PortVlanId => neighbor.port_vlan_id = value.to_string(),
                LldpField::VlanMembership => match vlan_membership(value) {
                    Some(vlans) => neighbor.vlan_membership = vlans,
                    None => parsed.skip(REPORT, line, "unreadable VLAN membership"),
                },
                LldpField::LinkAggStatus => neighbor.link_agg_status = value.to_string(),
                LldpField::LinkAggPortId => neighbor.link_agg_port_id = value.to_string(),
                _ => {}
            }
        }

        parsed
            .value
            .entry(block.local_port.to_string())
            .or_default()
            .push(neighbor);
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const REMOTE_DATA: &str = "\
Remote Data

Remote data, 1/1 - #1
---------------------
Chassis ID.....................................EC:74:BA:35:A0:C0 (MAC address)
Port ID........................................EC:74:BA:35:A0:C1 (MAC address)
Port Description...............................Module: 1 Port: 1 - 2.5 Gbit
System Name....................................BRS50-Office
System Description.............................Hirschmann BOBCAT Switch
Autoneg. supp./enabled.........................yes/yes
Autoneg. cap. bits.............................(10baseT, 10baseTFD, bridge, router, 1000baseTFD)
Port oper. MAU type............................1000BASE-T full duplex (30)
IPv4 Management address........................192.168.1.4
Port VLAN ID...................................1
VLAN membership................................1, 10, 20
Link agg. status...............................agg. not capable
Link agg. port ID..............................0
Firmware Revision..............................09.4.04

Remote data, 1/4 - #2
---------------------
Chassis ID.....................................64:60:38:8A:42:D6 (MAC address)
Port ID........................................1/6 (Interface name)
System Name....................................GRS1042-CORE
VLAN membership................................<n/a>
";

    #[test]
    fn test_neighbors_sample() {
        let parsed = parse_lldp_neighbors(
            "Remote data, 1/1 - #1\nSystem Name....BRS50-Office\nPort Description....Module: 1 Port: 1",
        );
        let neighbors = &parsed.value["1/1"];
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].hostname, "BRS50-Office");
        assert_eq!(neighbors[0].port, "Module: 1 Port: 1");
    }

    #[test]
    fn test_neighbor_without_port_description_skipped() {
        let parsed = parse_lldp_neighbors(REMOTE_DATA);
        assert_eq!(parsed.value.keys().collect::<Vec<_>>(), ["1/1"]);
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn test_detail() {
        let parsed = parse_lldp_detail(REMOTE_DATA);
        let n = &parsed.value["1/1"][0];
        assert_eq!(n.parent_interface, "1/1");
        assert_eq!(n.remote_chassis_id, "EC:74:BA:35:A0:C0");
        assert_eq!(n.remote_port, "EC:74:BA:35:A0:C1");
        assert_eq!(n.remote_system_description, "Hirschmann BOBCAT Switch");
        assert_eq!(n.remote_system_capab, ["bridge", "router"]);
        assert_eq!(n.remote_system_enable_capab, n.remote_system_capab);

        let other = &parsed.value["1/4"][0];
        assert_eq!(other.remote_port, "1/6");
        assert!(other.remote_system_capab.is_empty());
    }

    #[test]
    fn test_extended() {
        let parsed = parse_lldp_extended(REMOTE_DATA);
        assert!(parsed.anomalies.is_empty());

        let n = &parsed.value["1/1"][0];
        assert_eq!(n.detail.remote_system_name, "BRS50-Office");
        assert_eq!(n.remote_management_ipv4, "192.168.1.4");
        assert_eq!(n.autoneg_support, "yes");
        assert_eq!(n.autoneg_enabled, "yes");
        assert_eq!(n.port_oper_mau_type, "30");
        assert_eq!(n.port_vlan_id, "1");
        assert_eq!(n.vlan_membership, [1, 10, 20]);
        assert_eq!(n.link_agg_status, "agg. not capable");
        assert_eq!(n.link_agg_port_id, "0");

        assert!(parsed.value["1/4"][0].vlan_membership.is_empty());
    }

    #[test]
    fn test_bad_vlan_membership_reported() {
        let parsed = parse_lldp_extended("Remote data, 1/2 - #1\nVLAN membership....1, ten");
        assert!(parsed.value["1/2"][0].vlan_membership.is_empty());
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn test_capability_mapping() {
        assert_eq!(map_capability("Bridge"), "bridge");
        assert_eq!(map_capability("wlan-access-point"), "wlan-access-point");
        assert_eq!(map_capability("1000baseTFD"), "other");
    }
}
