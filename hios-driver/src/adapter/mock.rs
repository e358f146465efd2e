//! Built-in offline device.
//!
//! Serves a fixed GRS1042 snapshot for every getter, so callers and tests can
//! exercise the full capability set with no switch attached. Selected when
//! the configured host is [`MOCK_HOST`](crate::device::config::MOCK_HOST).

use std::time::Duration;

use indexmap::IndexMap;
use log::debug;

use super::DeviceAdapter;
use crate::device::Protocol;
use crate::error::Result;
use crate::model::{
    ArpEntry, ConfigOptions, ConfigSet, CpuUsage, Environment, Facts, FanStatus, Interface,
    InterfaceCounters, InterfaceIp, LldpMap, LldpNeighbor, LldpNeighborDetail,
    LldpNeighborExtended, MacEntry, Memory, NtpServer, NtpStats, Optics, PingOptions, PingProbe,
    PingResult, PingStats, PowerStatus, PrefixLength, SnmpInformation, Temperature, User, Vlan,
};
use crate::parse::VENDOR;
use crate::session::Response;

const HOSTNAME: &str = "GRS1042-CORE";

const PORTS: &[&str] = &[
    "1/1", "1/2", "1/3", "1/4", "1/5", "1/6", "1/7", "1/8", "1/9", "1/10", "1/11", "1/12", "2/1",
    "2/2", "2/3", "2/4", "2/5", "2/6", "2/7", "2/8", "3/1", "3/2", "3/3", "3/4", "3/5", "3/6",
    "3/7", "3/8", "vlan/1", "vlan/2", "vlan/3", "vlan/6", "vlan/9",
];

/// Commands the mock shell answers; anything else is rejected.
const CLI_OUTPUT: &[(&str, &str)] = &[
    ("show vlan brief", "VLAN Brief output..."),
    ("show telnet", "Telnet server information..."),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug)]
pub struct MockAdapter {
    open: bool,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self { open: true }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAdapter for MockAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Ssh
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            debug!("mock: closed");
        }
        self.open = false;
        Ok(())
    }

    async fn cli(&mut self, commands: &[String]) -> Result<IndexMap<String, Response>> {
        Ok(commands
            .iter()
            .map(|command| {
                let response = match CLI_OUTPUT.iter().find(|(c, _)| *c == command.as_str()) {
                    Some((_, output)) => Response::canned(command.as_str(), *output),
                    None => Response::failed(
                        command.as_str(),
                        "Error: Invalid command",
                        "Error: Invalid command",
                        format!("({HOSTNAME}) >"),
                        Duration::ZERO,
                        "Error: Invalid command",
                    ),
                };
                (command.clone(), response)
            })
            .collect())
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        Ok(Facts {
            uptime: 1_036_800,
            vendor: VENDOR.to_string(),
            model: "GRS1042-6T6ZTHH00V9HHSE3AMR".to_string(),
            hostname: HOSTNAME.to_string(),
            fqdn: HOSTNAME.to_string(),
            os_version: "HiOS-3A-09.4.04".to_string(),
            serial_number: "942135999000101022".to_string(),
            interface_list: strings(PORTS),
        })
    }

    async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        Ok(["1/1", "1/2"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    Interface {
                        is_up: false,
                        is_enabled: true,
                        speed: 2_500_000_000,
                        mtu: 1518,
                        ..Default::default()
                    },
                )
            })
            .collect())
    }

    async fn get_interfaces_counters(&mut self) -> Result<IndexMap<String, InterfaceCounters>> {
        let mut counters = IndexMap::new();
        counters.insert(
            "1/1".to_string(),
            InterfaceCounters {
                rx_unicast_packets: 1_358_611_135,
                rx_multicast_packets: 629_480,
                rx_broadcast_packets: 26_574,
                rx_octets: 242_339_760,
                rx_discards: 2_501,
                rx_errors: 0,
                tx_unicast_packets: 1_008_406_913,
                tx_multicast_packets: 541_987,
                tx_broadcast_packets: 498_466,
                tx_octets: 1_579_498_827,
                tx_discards: 0,
                tx_errors: 0,
            },
        );
        Ok(counters)
    }

    async fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceIp>> {
        Ok([("vlan/1", "192.168.1.254"), ("vlan/2", "192.168.10.254")]
            .into_iter()
            .map(|(interface, address)| {
                let mut ip = InterfaceIp::default();
                ip.ipv4
                    .insert(address.to_string(), PrefixLength { prefix_length: 24 });
                (interface.to_string(), ip)
            })
            .collect())
    }

    async fn get_lldp_neighbors(&mut self) -> Result<LldpMap<LldpNeighbor>> {
        Ok([
            ("1/7", "BRS50-LOUNGE", "Module: 1 Port: 5 - 1 Gbit"),
            ("3/3", "eero", "eth1"),
            ("1/1", "BRS50-Office", "Module: 1 Port: 1 - 2.5 Gbit"),
        ]
        .into_iter()
        .map(|(local, hostname, port)| {
            (
                local.to_string(),
                vec![LldpNeighbor {
                    hostname: hostname.to_string(),
                    port: port.to_string(),
                }],
            )
        })
        .collect())
    }

    async fn get_lldp_neighbors_detail(&mut self) -> Result<LldpMap<LldpNeighborDetail>> {
        let mut neighbors = IndexMap::new();
        neighbors.insert(
            "1/1".to_string(),
            vec![LldpNeighborDetail {
                parent_interface: String::new(),
                remote_port: "64:60:38:3F:4A:A6".to_string(),
                remote_port_description: "Module: 1 Port: 1 - 2.5 Gbit".to_string(),
                remote_chassis_id: "64:60:38:3F:4A:A1".to_string(),
                remote_system_name: "BRS50-Office".to_string(),
                remote_system_description: "Hirschmann BOBCAT - SW: HiOS-2A-10.0.00".to_string(),
                remote_system_capab: Vec::new(),
                remote_system_enable_capab: Vec::new(),
            }],
        );
        Ok(neighbors)
    }

    async fn get_lldp_neighbors_detail_extended(
        &mut self,
    ) -> Result<LldpMap<LldpNeighborExtended>> {
        let detail = self.get_lldp_neighbors_detail().await?;
        Ok(detail
            .into_iter()
            .map(|(port, neighbors)| {
                let extended = neighbors
                    .into_iter()
                    .map(|detail| LldpNeighborExtended {
                        detail,
                        remote_management_ipv4: "192.168.1.4".to_string(),
                        autoneg_support: "yes".to_string(),
                        autoneg_enabled: "yes".to_string(),
                        port_oper_mau_type: "2p5GbaseX".to_string(),
                        port_vlan_id: "1".to_string(),
                        vlan_membership: vec![1],
                        link_agg_status: "agg. capable".to_string(),
                        link_agg_port_id: "0".to_string(),
                        ..Default::default()
                    })
                    .collect();
                (port, extended)
            })
            .collect())
    }

    async fn get_mac_address_table(&mut self) -> Result<Vec<MacEntry>> {
        Ok(vec![MacEntry {
            mac: "12:dd:6e:60:34:4b".to_string(),
            interface: "1/7".to_string(),
            vlan: 1,
            is_static: false,
            active: true,
            moves: None,
            last_move: None,
        }])
    }

    async fn get_ntp_servers(&mut self) -> Result<IndexMap<String, NtpServer>> {
        let mut servers = IndexMap::new();
        servers.insert("192.168.3.1".to_string(), NtpServer {});
        Ok(servers)
    }

    async fn get_ntp_stats(&mut self) -> Result<Vec<NtpStats>> {
        Ok(vec![NtpStats {
            remote: "192.168.3.1".to_string(),
            synchronized: true,
            kind: "ipv4".to_string(),
            hostpoll: 30,
            ..Default::default()
        }])
    }

    async fn get_optics(&mut self) -> Result<IndexMap<String, Optics>> {
        let mut optics = IndexMap::new();
        optics.insert("1/1".to_string(), Optics::single_lane(-4.2, -4.4));
        Ok(optics)
    }

    async fn get_users(&mut self) -> Result<IndexMap<String, User>> {
        Ok([("admin", 15), ("snmpuser", 1), ("user", 1)]
            .into_iter()
            .map(|(name, level)| {
                (
                    name.to_string(),
                    User {
                        level,
                        ..Default::default()
                    },
                )
            })
            .collect())
    }

    async fn get_vlans(&mut self) -> Result<IndexMap<u16, Vlan>> {
        let mut vlans = IndexMap::new();
        vlans.insert(
            1,
            Vlan {
                name: "HOME".to_string(),
                interfaces: strings(&[
                    "1/1", "1/2", "1/6", "1/7", "1/8", "1/9", "1/10", "3/2", "3/3", "3/4", "3/5",
                    "3/6", "3/7", "3/8",
                ]),
            },
        );
        vlans.insert(
            2,
            Vlan {
                name: "WLAN".to_string(),
                interfaces: strings(&["2/1", "2/2", "2/3", "2/4", "2/5", "2/6", "2/7", "2/8"]),
            },
        );
        Ok(vlans)
    }

    async fn get_environment(&mut self) -> Result<Environment> {
        let mut env = Environment {
            memory: Memory {
                available_ram: 150_592,
                used_ram: 206_328,
            },
            ..Default::default()
        };
        env.fans
            .insert("status".to_string(), FanStatus { status: true });
        env.temperature.insert(
            "system".to_string(),
            Temperature {
                temperature: 47.0,
                is_alert: false,
                is_critical: false,
            },
        );
        env.power
            .insert("P1".to_string(), PowerStatus { status: true });
        env.power
            .insert("P2".to_string(), PowerStatus { status: false });
        env.cpu.insert("0".to_string(), CpuUsage { usage: 23.0 });
        Ok(env)
    }

    async fn get_arp_table(&mut self, _vrf: &str) -> Result<Vec<ArpEntry>> {
        Ok(vec![ArpEntry {
            interface: "cpu/1".to_string(),
            mac: "ec:74:ba:35:75:70".to_string(),
            ip: "0.0.0.0".to_string(),
            age: 0.0,
        }])
    }

    async fn get_config(&mut self, options: ConfigOptions) -> Result<ConfigSet> {
        let mut set = ConfigSet::default();
        if options.retrieve.includes_running() {
            set.running = "! GRS1042-6T6Z Configuration\n\n! Version: HiOS-3A-09.4.04\n\n\
                           ! Build Date: 2024-06-19 12:08\n\n..."
                .to_string();
        }
        Ok(set)
    }

    async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        let mut community = IndexMap::new();
        community.insert("public".to_string(), "ro".to_string());
        community.insert("private".to_string(), "rw".to_string());
        Ok(SnmpInformation {
            chassis_id: "SSH-CHASSIS-ID".to_string(),
            contact: "admin@example.com".to_string(),
            location: "SSH Lab".to_string(),
            community,
        })
    }

    async fn ping(&mut self, _destination: &str, _options: &PingOptions) -> Result<PingResult> {
        Ok(PingResult::Success(PingStats {
            probes_sent: 3,
            packet_loss: 0.0,
            rtt_min: 0.741,
            rtt_max: 0.923,
            rtt_avg: 0.804,
            rtt_stddev: 0.0,
            results: vec![PingProbe {
                ip_address: "192.168.3.1".to_string(),
                rtt: 0.75,
            }],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_facts_snapshot() {
        let facts = MockAdapter::new().get_facts().await.unwrap();
        assert_eq!(facts.hostname, "GRS1042-CORE");
        assert_eq!(facts.interface_list.len(), 33);
        assert_eq!(facts.interface_list.last().unwrap(), "vlan/9");
    }

    #[tokio::test]
    async fn test_cli_rejects_unknown_commands() {
        let mut mock = MockAdapter::new();
        let commands = vec!["show vlan brief".to_string(), "show bogus".to_string()];
        let out = mock.cli(&commands).await.unwrap();
        assert_eq!(out["show vlan brief"].result, "VLAN Brief output...");
        assert!(!out["show bogus"].is_success());
    }

    #[tokio::test]
    async fn test_extended_lldp_carries_detail() {
        let extended = MockAdapter::new()
            .get_lldp_neighbors_detail_extended()
            .await
            .unwrap();
        let neighbor = &extended["1/1"][0];
        assert_eq!(neighbor.detail.remote_system_name, "BRS50-Office");
        assert_eq!(neighbor.vlan_membership, [1]);
    }

    #[tokio::test]
    async fn test_startup_only_config_is_empty() {
        let options = ConfigOptions {
            retrieve: crate::model::ConfigRetrieve::Startup,
            ..Default::default()
        };
        let set = MockAdapter::new().get_config(options).await.unwrap();
        assert_eq!(set, ConfigSet::default());
    }
}
