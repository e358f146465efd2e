//! Per-transport session adapters.
//!
//! Every transport implements [`DeviceAdapter`]. A getter the transport
//! cannot serve keeps the trait's default body, which fails with
//! [`Error::Unsupported`]. The facade holds exactly one [`Adapter`] at a time.

pub mod cli;
mod mock;
mod netconf;
mod shell;
mod snmp;

pub use cli::CommandRunner;
pub use mock::MockAdapter;
pub use netconf::NetconfAdapter;
pub use shell::ShellAdapter;
pub use snmp::{SnmpAdapter, SnmpSource};

use std::future::Future;

use indexmap::IndexMap;

use crate::device::Protocol;
use crate::error::{Error, Result};
use crate::model::{
    ArpEntry, ConfigOptions, ConfigSet, Environment, Facts, Interface, InterfaceCounters,
    InterfaceIp, LldpMap, LldpNeighbor, LldpNeighborDetail, LldpNeighborExtended, MacEntry,
    NtpServer, NtpStats, Optics, PingOptions, PingResult, SnmpInformation, User, Vlan,
};
use crate::session::Response;

/// Any failure while opening an adapter is a [`Error::ConnectionFailure`].
fn open_failure(host: &str, err: Error) -> Error {
    match err {
        err @ Error::ConnectionFailure { .. } => err,
        other => Error::ConnectionFailure {
            host: host.to_string(),
            reason: other.to_string(),
        },
    }
}

macro_rules! unsupported {
    ($self:ident, $op:literal) => {{
        let protocol = $self.protocol();
        async move { Err(Error::unsupported($op, protocol)) }
    }};
}

/// Capability set shared by all transports.
pub trait DeviceAdapter: Send {
    /// Transport this adapter speaks.
    fn protocol(&self) -> Protocol;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn cli(
        &mut self,
        _commands: &[String],
    ) -> impl Future<Output = Result<IndexMap<String, Response>>> + Send {
        unsupported!(self, "cli")
    }

    fn get_facts(&mut self) -> impl Future<Output = Result<Facts>> + Send {
        unsupported!(self, "get_facts")
    }

    fn get_interfaces(
        &mut self,
    ) -> impl Future<Output = Result<IndexMap<String, Interface>>> + Send {
        unsupported!(self, "get_interfaces")
    }

    fn get_interfaces_counters(
        &mut self,
    ) -> impl Future<Output = Result<IndexMap<String, InterfaceCounters>>> + Send {
        unsupported!(self, "get_interfaces_counters")
    }

    fn get_interfaces_ip(
        &mut self,
    ) -> impl Future<Output = Result<IndexMap<String, InterfaceIp>>> + Send {
        unsupported!(self, "get_interfaces_ip")
    }

    fn get_lldp_neighbors(
        &mut self,
    ) -> impl Future<Output = Result<LldpMap<LldpNeighbor>>> + Send {
        unsupported!(self, "get_lldp_neighbors")
    }

    fn get_lldp_neighbors_detail(
        &mut self,
    ) -> impl Future<Output = Result<LldpMap<LldpNeighborDetail>>> + Send {
        unsupported!(self, "get_lldp_neighbors_detail")
    }

    fn get_lldp_neighbors_detail_extended(
        &mut self,
    ) -> impl Future<Output = Result<LldpMap<LldpNeighborExtended>>> + Send {
        unsupported!(self, "get_lldp_neighbors_detail_extended")
    }

    fn get_mac_address_table(&mut self) -> impl Future<Output = Result<Vec<MacEntry>>> + Send {
        unsupported!(self, "get_mac_address_table")
    }

    fn get_ntp_servers(
        &mut self,
    ) -> impl Future<Output = Result<IndexMap<String, NtpServer>>> + Send {
        unsupported!(self, "get_ntp_servers")
    }

    fn get_ntp_stats(&mut self) -> impl Future<Output = Result<Vec<NtpStats>>> + Send {
        unsupported!(self, "get_ntp_stats")
    }

    fn get_optics(&mut self) -> impl Future<Output = Result<IndexMap<String, Optics>>> + Send {
        unsupported!(self, "get_optics")
    }

    fn get_users(&mut self) -> impl Future<Output = Result<IndexMap<String, User>>> + Send {
        unsupported!(self, "get_users")
    }

    fn get_vlans(&mut self) -> impl Future<Output = Result<IndexMap<u16, Vlan>>> + Send {
        unsupported!(self, "get_vlans")
    }

    fn get_environment(&mut self) -> impl Future<Output = Result<Environment>> + Send {
        unsupported!(self, "get_environment")
    }

    fn get_arp_table(&mut self, _vrf: &str) -> impl Future<Output = Result<Vec<ArpEntry>>> + Send {
        unsupported!(self, "get_arp_table")
    }

    fn get_config(
        &mut self,
        _options: ConfigOptions,
    ) -> impl Future<Output = Result<ConfigSet>> + Send {
        unsupported!(self, "get_config")
    }

    fn get_snmp_information(&mut self) -> impl Future<Output = Result<SnmpInformation>> + Send {
        unsupported!(self, "get_snmp_information")
    }

    fn ping(
        &mut self,
        _destination: &str,
        _options: &PingOptions,
    ) -> impl Future<Output = Result<PingResult>> + Send {
        unsupported!(self, "ping")
    }
}

/// The active transport of a device.
pub enum Adapter {
    Shell(ShellAdapter),
    Netconf(NetconfAdapter),
    Snmp(SnmpAdapter),
    Mock(MockAdapter),
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Adapter::Shell(a) => a.$method($($arg),*).await,
            Adapter::Netconf(a) => a.$method($($arg),*).await,
            Adapter::Snmp(a) => a.$method($($arg),*).await,
            Adapter::Mock(a) => a.$method($($arg),*).await,
        }
    };
}

impl Adapter {
    /// Variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Adapter::Shell(_) => "shell",
            Adapter::Netconf(_) => "netconf",
            Adapter::Snmp(_) => "snmp",
            Adapter::Mock(_) => "mock",
        }
    }
}

impl DeviceAdapter for Adapter {
    fn protocol(&self) -> Protocol {
        match self {
            Adapter::Shell(a) => a.protocol(),
            Adapter::Netconf(a) => a.protocol(),
            Adapter::Snmp(a) => a.protocol(),
            Adapter::Mock(a) => a.protocol(),
        }
    }

    async fn close(&mut self) -> Result<()> {
        dispatch!(self, close())
    }

    async fn cli(&mut self, commands: &[String]) -> Result<IndexMap<String, Response>> {
        dispatch!(self, cli(commands))
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        dispatch!(self, get_facts())
    }

    async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        dispatch!(self, get_interfaces())
    }

    async fn get_interfaces_counters(&mut self) -> Result<IndexMap<String, InterfaceCounters>> {
        dispatch!(self, get_interfaces_counters())
    }

    async fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceIp>> {
        dispatch!(self, get_interfaces_ip())
    }

    async fn get_lldp_neighbors(&mut self) -> Result<LldpMap<LldpNeighbor>> {
        dispatch!(self, get_lldp_neighbors())
    }

    async fn get_lldp_neighbors_detail(&mut self) -> Result<LldpMap<LldpNeighborDetail>> {
        dispatch!(self, get_lldp_neighbors_detail())
    }

    async fn get_lldp_neighbors_detail_extended(
        &mut self,
    ) -> Result<LldpMap<LldpNeighborExtended>> {
        dispatch!(self, get_lldp_neighbors_detail_extended())
    }

    async fn get_mac_address_table(&mut self) -> Result<Vec<MacEntry>> {
        dispatch!(self, get_mac_address_table())
    }

    async fn get_ntp_servers(&mut self) -> Result<IndexMap<String, NtpServer>> {
        dispatch!(self, get_ntp_servers())
    }

    async fn get_ntp_stats(&mut self) -> Result<Vec<NtpStats>> {
        dispatch!(self, get_ntp_stats())
    }

    async fn get_optics(&mut self) -> Result<IndexMap<String, Optics>> {
        dispatch!(self, get_optics())
    }

    async fn get_users(&mut self) -> Result<IndexMap<String, User>> {
        dispatch!(self, get_users())
    }

    async fn get_vlans(&mut self) -> Result<IndexMap<u16, Vlan>> {
        dispatch!(self, get_vlans())
    }

    async fn get_environment(&mut self) -> Result<Environment> {
        dispatch!(self, get_environment())
    }

    async fn get_arp_table(&mut self, vrf: &str) -> Result<Vec<ArpEntry>> {
        dispatch!(self, get_arp_table(vrf))
    }

    async fn get_config(&mut self, options: ConfigOptions) -> Result<ConfigSet> {
        dispatch!(self, get_config(options))
    }

    async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        dispatch!(self, get_snmp_information())
    }

    async fn ping(&mut self, destination: &str, options: &PingOptions) -> Result<PingResult> {
        dispatch!(self, ping(destination, options))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::{DeviceConfig, Ports};
    use crate::error::ChannelError;

    /// Loopback with every transport pointed at a port nothing listens on.
    pub(crate) fn unreachable() -> DeviceConfig {
        DeviceConfig {
            host: "127.0.0.1".into(),
            username: "admin".into(),
            timeout: Duration::from_millis(500),
            ports: Ports {
                ssh: 1,
                netconf: 1,
                snmp: 1,
            },
            ..Default::default()
        }
    }

    pub(crate) fn assert_connection_failure<T>(result: Result<T>) {
        match result {
            Err(Error::ConnectionFailure { host, reason }) => {
                assert_eq!(host, "127.0.0.1");
                assert!(!reason.contains("Cannot connect to"));
            }
            Err(other) => panic!("expected a connection failure, got: {other}"),
            Ok(_) => panic!("nothing listens on port 1"),
        }
    }

    #[test]
    fn test_open_failure_wraps_lower_errors() {
        let err = open_failure("sw1", ChannelError::Closed.into());
        match err {
            Error::ConnectionFailure { host, reason } => {
                assert_eq!(host, "sw1");
                assert_eq!(reason, "Channel error: Channel closed");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = open_failure("sw1", Error::Timeout(Duration::from_secs(2)));
        assert!(matches!(err, Error::ConnectionFailure { .. }));
    }

    #[test]
    fn test_open_failure_keeps_connection_failure() {
        let err = open_failure(
            "sw1",
            Error::ConnectionFailure {
                host: "sw1".into(),
                reason: "refused".into(),
            },
        );
        assert_eq!(err.to_string(), "Cannot connect to sw1: refused");
    }
}
