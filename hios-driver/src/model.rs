//! Typed records returned by the capability getters.
//!
//! Every record derives `Default`, so a field a transport cannot supply is
//! always present with its zero value. Maps are insertion-ordered so reports
//! keep the device's port order.

use indexmap::IndexMap;
use serde::Serialize;

/// Device summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facts {
    /// Seconds since boot.
    pub uptime: u64,
    pub vendor: String,
    pub model: String,
    pub hostname: String,
    pub fqdn: String,
    pub os_version: String,
    pub serial_number: String,
    pub interface_list: Vec<String>,
}

/// Operational state of one port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub is_up: bool,
    pub is_enabled: bool,
    pub description: String,
    /// Seconds since the last link change, `-1.0` when unknown.
    pub last_flapped: f64,
    /// Bits per second.
    pub speed: u64,
    pub mtu: u32,
    pub mac_address: String,
}

impl Default for Interface {
    fn default() -> Self {
        Self {
            is_up: false,
            is_enabled: false,
            description: String::new(),
            last_flapped: -1.0,
            speed: 0,
            mtu: 0,
            mac_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub tx_errors: u64,
    pub rx_errors: u64,
    pub tx_discards: u64,
    pub rx_discards: u64,
    pub tx_octets: u64,
    pub rx_octets: u64,
    pub tx_unicast_packets: u64,
    pub rx_unicast_packets: u64,
    pub tx_multicast_packets: u64,
    pub rx_multicast_packets: u64,
    pub tx_broadcast_packets: u64,
    pub rx_broadcast_packets: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefixLength {
    pub prefix_length: u8,
}

/// Addresses configured on one interface, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceIp {
    pub ipv4: IndexMap<String, PrefixLength>,
    pub ipv6: IndexMap<String, PrefixLength>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpNeighbor {
    pub hostname: String,
    pub port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpNeighborDetail {
    pub parent_interface: String,
    pub remote_port: String,
    pub remote_port_description: String,
    pub remote_chassis_id: String,
    pub remote_system_name: String,
    pub remote_system_description: String,
    pub remote_system_capab: Vec<String>,
    pub remote_system_enable_capab: Vec<String>,
}

/// Detail record plus the HiOS-specific LLDP fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpNeighborExtended {
    #[serde(flatten)]
    pub detail: LldpNeighborDetail,
    pub remote_management_ipv4: String,
    pub remote_management_ipv6: String,
    pub autoneg_support: String,
    pub autoneg_enabled: String,
    pub port_oper_mau_type: String,
    pub port_vlan_id: String,
    pub vlan_membership: Vec<u16>,
    pub link_agg_status: String,
    pub link_agg_port_id: String,
}

/// Neighbors keyed by local port.
pub type LldpMap<T> = IndexMap<String, Vec<T>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacEntry {
    pub mac: String,
    pub interface: String,
    pub vlan: u16,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub active: bool,
    pub moves: Option<u32>,
    pub last_move: Option<f64>,
}

/// Per-server NTP settings. HiOS exposes none beyond the address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NtpServer {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NtpStats {
    pub remote: String,
    pub referenceid: String,
    pub synchronized: bool,
    pub stratum: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub when: String,
    pub hostpoll: u32,
    pub reachability: u32,
    pub delay: f64,
    pub offset: f64,
    pub jitter: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OpticsReading {
    pub instant: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl OpticsReading {
    pub fn instant(value: f64) -> Self {
        Self {
            instant: value,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpticsState {
    pub input_power: OpticsReading,
    pub output_power: OpticsReading,
    pub laser_bias_current: OpticsReading,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpticsChannel {
    pub index: u32,
    pub state: OpticsState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhysicalChannels {
    pub channel: Vec<OpticsChannel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Optics {
    pub physical_channels: PhysicalChannels,
}

impl Optics {
    /// Single-lane transceiver with instant tx/rx power in dBm.
    pub fn single_lane(tx_power: f64, rx_power: f64) -> Self {
        Self {
            physical_channels: PhysicalChannels {
                channel: vec![OpticsChannel {
                    index: 0,
                    state: OpticsState {
                        input_power: OpticsReading::instant(rx_power),
                        output_power: OpticsReading::instant(tx_power),
                        laser_bias_current: OpticsReading::default(),
                    },
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    pub level: u8,
    pub password: String,
    pub sshkeys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vlan {
    pub name: String,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanStatus {
    pub status: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Temperature {
    pub temperature: f64,
    pub is_alert: bool,
    pub is_critical: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerStatus {
    pub status: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    /// Percent.
    pub usage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Memory {
    /// kBytes.
    pub available_ram: u64,
    /// kBytes.
    pub used_ram: u64,
}

/// Environmental sensors. Each map is keyed by sensor location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Environment {
    pub fans: IndexMap<String, FanStatus>,
    pub temperature: IndexMap<String, Temperature>,
    pub power: IndexMap<String, PowerStatus>,
    pub cpu: IndexMap<String, CpuUsage>,
    pub memory: Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArpEntry {
    pub interface: String,
    pub mac: String,
    pub ip: String,
    /// Seconds.
    pub age: f64,
}

/// Which stored configurations to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigRetrieve {
    #[default]
    All,
    Running,
    Startup,
    Candidate,
}

impl ConfigRetrieve {
    pub fn includes_running(self) -> bool {
        matches!(self, ConfigRetrieve::All | ConfigRetrieve::Running)
    }

    pub fn includes_startup(self) -> bool {
        matches!(self, ConfigRetrieve::All | ConfigRetrieve::Startup)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// CLI script (`show running-config script`).
    #[default]
    Text,
    /// Saved NVM profile as XML.
    Xml,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOptions {
    pub retrieve: ConfigRetrieve,
    /// Include default values (`script all`).
    pub full: bool,
    /// Mask passwords and community strings.
    pub sanitized: bool,
    pub format: ConfigFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSet {
    pub running: String,
    pub startup: String,
    pub candidate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnmpInformation {
    pub chassis_id: String,
    pub contact: String,
    pub location: String,
    /// Community name to access mode.
    pub community: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PingProbe {
    pub ip_address: String,
    pub rtt: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PingStats {
    pub probes_sent: u32,
    /// Percent of probes lost.
    pub packet_loss: f64,
    pub rtt_min: f64,
    pub rtt_max: f64,
    pub rtt_avg: f64,
    pub rtt_stddev: f64,
    pub results: Vec<PingProbe>,
}

/// Outcome of a ping, serialized as `{"success": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PingResult {
    Success(PingStats),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingOptions {
    pub source: String,
    pub ttl: u8,
    /// Seconds.
    pub timeout: u32,
    pub size: u32,
    pub count: u32,
    pub vrf: String,
    pub source_interface: String,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            ttl: 255,
            timeout: 2,
            size: 100,
            count: 5,
            vrf: String::new(),
            source_interface: String::new(),
        }
    }
}

/// Post-processing applied by the device facade before a record set is
/// handed to the caller.
pub trait Normalize {
    fn normalize(&mut self);
}

impl Normalize for Facts {
    fn normalize(&mut self) {
        if self.fqdn.is_empty() {
            self.fqdn = self.hostname.clone();
        }
        if self.vendor.is_empty() {
            self.vendor = crate::parse::VENDOR.to_string();
        }
    }
}

impl Normalize for LldpMap<LldpNeighborDetail> {
    fn normalize(&mut self) {
        for (port, neighbors) in self.iter_mut() {
            for neighbor in neighbors {
                if neighbor.parent_interface.is_empty() {
                    neighbor.parent_interface = port.clone();
                }
            }
        }
    }
}

impl Normalize for LldpMap<LldpNeighborExtended> {
    fn normalize(&mut self) {
        for (port, neighbors) in self.iter_mut() {
            for neighbor in neighbors {
                if neighbor.detail.parent_interface.is_empty() {
                    neighbor.detail.parent_interface = port.clone();
                }
            }
        }
    }
}

impl Normalize for PingResult {
    fn normalize(&mut self) {
        if let PingResult::Success(stats) = self {
            for value in [
                &mut stats.rtt_min,
                &mut stats.rtt_max,
                &mut stats.rtt_avg,
                &mut stats.rtt_stddev,
                &mut stats.packet_loss,
            ] {
                if !value.is_finite() {
                    *value = 0.0;
                }
            }
        }
    }
}

/// Restrict an LLDP map to one local port.
///
/// The requested key is always present, empty when there are no neighbors.
pub fn filter_interface<T>(mut map: LldpMap<T>, interface: &str) -> LldpMap<T> {
    if interface.is_empty() {
        return map;
    }
    let neighbors = map.shift_remove(interface).unwrap_or_default();
    IndexMap::from([(interface.to_string(), neighbors)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_fqdn_falls_back_to_hostname() {
        let mut facts = Facts {
            hostname: "GRS1042-CORE".into(),
            ..Default::default()
        };
        facts.normalize();
        assert_eq!(facts.fqdn, "GRS1042-CORE");
        assert_eq!(facts.vendor, "Belden");
    }

    #[test]
    fn test_lldp_parent_interface_filled() {
        let mut map: LldpMap<LldpNeighborDetail> = IndexMap::new();
        map.insert("1/1".into(), vec![LldpNeighborDetail::default()]);
        map.normalize();
        assert_eq!(map["1/1"][0].parent_interface, "1/1");
    }

    #[test]
    fn test_filter_interface_always_has_key() {
        let mut map: LldpMap<LldpNeighbor> = IndexMap::new();
        map.insert("1/1".into(), vec![LldpNeighbor::default()]);

        let filtered = filter_interface(map.clone(), "2/4");
        assert_eq!(filtered.len(), 1);
        assert!(filtered["2/4"].is_empty());

        let filtered = filter_interface(map.clone(), "1/1");
        assert_eq!(filtered["1/1"].len(), 1);

        assert_eq!(filter_interface(map, "").len(), 1);
    }

    #[test]
    fn test_ping_non_finite_rtts_zeroed() {
        let mut result = PingResult::Success(PingStats {
            rtt_min: f64::INFINITY,
            rtt_max: f64::NEG_INFINITY,
            packet_loss: 100.0,
            ..Default::default()
        });
        result.normalize();
        let PingResult::Success(stats) = result else {
            panic!("expected success");
        };
        assert_eq!(stats.rtt_min, 0.0);
        assert_eq!(stats.rtt_max, 0.0);
        assert_eq!(stats.packet_loss, 100.0);
    }

    #[test]
    fn test_serialized_keys() {
        let entry = MacEntry::default();
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("static").is_some());
        assert!(json["moves"].is_null());

        let json = serde_json::to_value(PingResult::Error("DNS lookup failed".into())).unwrap();
        assert_eq!(json["error"], "DNS lookup failed");

        let json = serde_json::to_value(LldpNeighborExtended::default()).unwrap();
        assert!(json.get("remote_system_name").is_some());
        assert!(json.get("vlan_membership").is_some());
    }
}
