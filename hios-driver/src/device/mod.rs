//! Device facade.
//!
//! A [`Device`] owns the connection settings and at most one active
//! adapter. Every getter is dispatched to that adapter and its result passes
//! through the per-record normalization before it is returned.

mod builder;
pub mod config;
mod negotiator;

pub use builder::DeviceBuilder;
pub use config::{DeviceConfig, Ports, Protocol};
pub use negotiator::{Connector, DefaultConnector, negotiate};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::adapter::{Adapter, DeviceAdapter};
use crate::error::{DeviceError, Error, Result};
use crate::model::{
    ArpEntry, ConfigOptions, ConfigSet, Environment, Facts, Interface, InterfaceCounters,
    InterfaceIp, LldpMap, LldpNeighbor, LldpNeighborDetail, LldpNeighborExtended, MacEntry,
    Normalize, NtpServer, NtpStats, Optics, PingOptions, PingResult, SnmpInformation, User, Vlan,
    filter_interface,
};
use crate::session::Response;

/// A HiOS switch reached over whichever transport opens first.
///
/// Methods take `&mut self`, so one device drives one connection at a time.
/// Share a device between tasks behind `tokio::sync::Mutex`.
pub struct Device<C = DefaultConnector> {
    config: DeviceConfig,
    connector: C,
    active: Option<(Protocol, Adapter)>,
}

macro_rules! mutation {
    ($name:ident, $op:literal $(, $arg:ident: $ty:ty)*) => {
        #[doc = concat!("Always fails: `", $op, "` is not available on HiOS.")]
        pub async fn $name(&mut self $(, $arg: $ty)*) -> Result<()> {
            $(let _ = $arg;)*
            Err(Error::Unsupported {
                operation: $op,
                protocol: None,
            })
        }
    };
}

impl Device {
    /// A device using the real transports.
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_connector(config, DefaultConnector)
    }
}

impl<C: Connector> Device<C> {
    pub fn with_connector(config: DeviceConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            active: None,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Negotiate a transport.
    ///
    /// Fails with [`Error::ConnectionFailure`] when no transport opens, and
    /// leaves the device closed.
    pub async fn open(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(DeviceError::AlreadyConnected.into());
        }
        self.active = Some(negotiate(&self.connector, &self.config).await?);
        Ok(())
    }

    /// Release the active adapter. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        if let Some((protocol, mut adapter)) = self.active.take() {
            debug!("{}: closing {} session", self.config.host, protocol);
            if let Err(e) = adapter.close().await {
                warn!("{}: close failed: {}", self.config.host, e);
            }
        }
        Ok(())
    }

    /// Whether an adapter is active. Does not probe the device.
    pub fn is_alive(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_protocol(&self) -> Option<Protocol> {
        self.active.as_ref().map(|(protocol, _)| *protocol)
    }

    fn adapter(&mut self) -> Result<&mut Adapter> {
        self.active
            .as_mut()
            .map(|(_, adapter)| adapter)
            .ok_or_else(|| DeviceError::NotConnected.into())
    }

    /// Run CLI commands, keyed by command in input order.
    pub async fn cli(
        &mut self,
        commands: &[impl AsRef<str>],
    ) -> Result<IndexMap<String, Response>> {
        let commands: Vec<String> = commands.iter().map(|c| c.as_ref().to_string()).collect();
        self.adapter()?.cli(&commands).await
    }

    pub async fn get_facts(&mut self) -> Result<Facts> {
        let mut facts = self.adapter()?.get_facts().await?;
        facts.normalize();
        Ok(facts)
    }

    pub async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        self.adapter()?.get_interfaces().await
    }

    pub async fn get_interfaces_counters(&mut self) -> Result<IndexMap<String, InterfaceCounters>> {
        self.adapter()?.get_interfaces_counters().await
    }

    pub async fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceIp>> {
        self.adapter()?.get_interfaces_ip().await
    }

    pub async fn get_lldp_neighbors(&mut self) -> Result<LldpMap<LldpNeighbor>> {
        self.adapter()?.get_lldp_neighbors().await
    }

    /// LLDP detail, all ports or only `interface` when it is non-empty.
    ///
    /// A requested port with no neighbors maps to an empty list.
    pub async fn get_lldp_neighbors_detail(
        &mut self,
        interface: &str,
    ) -> Result<LldpMap<LldpNeighborDetail>> {
        let mut neighbors = self.adapter()?.get_lldp_neighbors_detail().await?;
        neighbors.normalize();
        Ok(filter_interface(neighbors, interface))
    }

    pub async fn get_lldp_neighbors_detail_extended(
        &mut self,
        interface: &str,
    ) -> Result<LldpMap<LldpNeighborExtended>> {
        let mut neighbors = self.adapter()?.get_lldp_neighbors_detail_extended().await?;
        neighbors.normalize();
        Ok(filter_interface(neighbors, interface))
    }

    pub async fn get_mac_address_table(&mut self) -> Result<Vec<MacEntry>> {
        self.adapter()?.get_mac_address_table().await
    }

    pub async fn get_ntp_servers(&mut self) -> Result<IndexMap<String, NtpServer>> {
        self.adapter()?.get_ntp_servers().await
    }

    pub async fn get_ntp_stats(&mut self) -> Result<Vec<NtpStats>> {
        self.adapter()?.get_ntp_stats().await
    }

    pub async fn get_optics(&mut self) -> Result<IndexMap<String, Optics>> {
        self.adapter()?.get_optics().await
    }

    pub async fn get_users(&mut self) -> Result<IndexMap<String, User>> {
        self.adapter()?.get_users().await
    }

    pub async fn get_vlans(&mut self) -> Result<IndexMap<u16, Vlan>> {
        self.adapter()?.get_vlans().await
    }

    pub async fn get_environment(&mut self) -> Result<Environment> {
        self.adapter()?.get_environment().await
    }

    /// ARP entries. HiOS has a single routing table, so `vrf` is ignored.
    pub async fn get_arp_table(&mut self, vrf: &str) -> Result<Vec<ArpEntry>> {
        self.adapter()?.get_arp_table(vrf).await
    }

    pub async fn get_config(&mut self, options: ConfigOptions) -> Result<ConfigSet> {
        self.adapter()?.get_config(options).await
    }

    pub async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        self.adapter()?.get_snmp_information().await
    }

    pub async fn ping(&mut self, destination: &str, options: &PingOptions) -> Result<PingResult> {
        let mut result = self.adapter()?.ping(destination, options).await?;
        result.normalize();
        Ok(result)
    }

    mutation!(load_merge_candidate, "load_merge_candidate", config: &str);
    mutation!(load_replace_candidate, "load_replace_candidate", config: &str);
    mutation!(compare_config, "compare_config");
    mutation!(commit_config, "commit_config");
    mutation!(discard_config, "discard_config");
    mutation!(rollback, "rollback");
}
