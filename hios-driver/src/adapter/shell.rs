//! Interactive CLI over SSH.

use indexmap::IndexMap;
use log::{debug, warn};
use russh::Channel;
use russh::client::Msg;

use super::{DeviceAdapter, open_failure};
use super::cli::{self, CommandRunner};
use crate::channel::Wire;
use crate::device::{DeviceConfig, Protocol};
use crate::error::{ChannelError, Result};
use crate::model::{
    ArpEntry, ConfigOptions, ConfigSet, Environment, Facts, Interface, InterfaceCounters,
    InterfaceIp, LldpMap, LldpNeighbor, LldpNeighborDetail, LldpNeighborExtended, MacEntry,
    NtpServer, NtpStats, Optics, PingOptions, PingResult, SnmpInformation, User, Vlan,
};
use crate::session::{Response, RetrievalPolicy, ShellSession};
use crate::transport::SshTransport;

/// Full capability set, served from `show` commands.
pub struct ShellAdapter<W = Channel<Msg>> {
    host: String,
    transport: Option<SshTransport>,
    session: Option<ShellSession<W>>,
    policy: RetrievalPolicy,
}

impl ShellAdapter {
    /// Log in and start a shell session.
    ///
    /// Every failure is reported as [`Error::ConnectionFailure`](crate::Error::ConnectionFailure).
    pub async fn open(config: &DeviceConfig) -> Result<Self> {
        Self::connect(config)
            .await
            .map_err(|e| open_failure(&config.host, e))
    }

    async fn connect(config: &DeviceConfig) -> Result<Self> {
        let transport = SshTransport::connect(config.ssh_config(Protocol::Ssh)).await?;

        let started = match transport.open_shell().await {
            Ok(channel) => ShellSession::start(&config.host, channel, config.timeout).await,
            Err(e) => Err(e),
        };
        let session = match started {
            Ok(session) => session,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    debug!("{}: closing after failed shell start: {}", config.host, close_err);
                }
                return Err(e);
            }
        };

        debug!("{}: shell session ready", config.host);
        Ok(Self {
            host: config.host.clone(),
            transport: Some(transport),
            session: Some(session),
            policy: config.retrieval.clone(),
        })
    }
}

impl<W: Wire> ShellAdapter<W> {
    /// Wrap an already started session.
    pub fn from_session(
        host: impl Into<String>,
        session: ShellSession<W>,
        policy: RetrievalPolicy,
    ) -> Self {
        Self {
            host: host.into(),
            transport: None,
            session: Some(session),
            policy,
        }
    }

    fn runner(&mut self) -> Result<Runner<'_, W>> {
        match self.session.as_mut() {
            Some(session) => Ok(Runner {
                host: &self.host,
                session,
            }),
            None => Err(ChannelError::Closed.into()),
        }
    }
}

/// Borrowed view of a live session for the capability functions.
struct Runner<'a, W> {
    host: &'a str,
    session: &'a mut ShellSession<W>,
}

impl<W: Wire> CommandRunner for Runner<'_, W> {
    fn host(&self) -> &str {
        self.host
    }

    async fn run(&mut self, command: &str) -> Result<Response> {
        self.session.send_command(command).await
    }

    async fn retrieve(&mut self, command: &str, policy: &RetrievalPolicy) -> Result<String> {
        self.session.retrieve(command, policy).await
    }
}

impl<W: Wire> DeviceAdapter for ShellAdapter<W> {
    fn protocol(&self) -> Protocol {
        Protocol::Ssh
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take()
            && let Err(e) = session.close().await
        {
            debug!("{}: shell close: {}", self.host, e);
        }
        if let Some(transport) = self.transport.take()
            && let Err(e) = transport.close().await
        {
            warn!("{}: disconnect failed: {}", self.host, e);
        }
        Ok(())
    }

    async fn cli(&mut self, commands: &[String]) -> Result<IndexMap<String, Response>> {
        cli::cli(&mut self.runner()?, commands).await
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        cli::facts(&mut self.runner()?).await
    }

    async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        cli::interfaces(&mut self.runner()?).await
    }

    async fn get_interfaces_counters(&mut self) -> Result<IndexMap<String, InterfaceCounters>> {
        cli::interfaces_counters(&mut self.runner()?).await
    }

    async fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceIp>> {
        cli::interfaces_ip(&mut self.runner()?).await
    }

    async fn get_lldp_neighbors(&mut self) -> Result<LldpMap<LldpNeighbor>> {
        cli::lldp_neighbors(&mut self.runner()?).await
    }

    async fn get_lldp_neighbors_detail(&mut self) -> Result<LldpMap<LldpNeighborDetail>> {
        cli::lldp_neighbors_detail(&mut self.runner()?).await
    }

    async fn get_lldp_neighbors_detail_extended(
        &mut self,
    ) -> Result<LldpMap<LldpNeighborExtended>> {
        cli::lldp_neighbors_extended(&mut self.runner()?).await
    }

    async fn get_mac_address_table(&mut self) -> Result<Vec<MacEntry>> {
        cli::mac_address_table(&mut self.runner()?).await
    }

    async fn get_ntp_servers(&mut self) -> Result<IndexMap<String, NtpServer>> {
        cli::ntp_servers(&mut self.runner()?).await
    }

    async fn get_ntp_stats(&mut self) -> Result<Vec<NtpStats>> {
        cli::ntp_stats(&mut self.runner()?).await
    }

    async fn get_optics(&mut self) -> Result<IndexMap<String, Optics>> {
        cli::optics(&mut self.runner()?).await
    }

    async fn get_users(&mut self) -> Result<IndexMap<String, User>> {
        cli::users(&mut self.runner()?).await
    }

    async fn get_vlans(&mut self) -> Result<IndexMap<u16, Vlan>> {
        cli::vlans(&mut self.runner()?).await
    }

    async fn get_environment(&mut self) -> Result<Environment> {
        cli::environment(&mut self.runner()?).await
    }

    async fn get_arp_table(&mut self, vrf: &str) -> Result<Vec<ArpEntry>> {
        if !vrf.is_empty() {
            debug!("{}: VRFs are not supported, ignoring '{}'", self.host, vrf);
        }
        cli::arp_table(&mut self.runner()?).await
    }

    async fn get_config(&mut self, options: ConfigOptions) -> Result<ConfigSet> {
        let policy = self.policy.clone();
        cli::config(&mut self.runner()?, options, &policy).await
    }

    async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        cli::snmp_information(&mut self.runner()?).await
    }

    async fn ping(&mut self, destination: &str, options: &PingOptions) -> Result<PingResult> {
        cli::ping(&mut self.runner()?, destination, options).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channel::ScriptedWire;
    use crate::error::Error;

    async fn adapter(chunks: &[&[u8]]) -> ShellAdapter<ScriptedWire> {
        let wire = ScriptedWire::with_chunks(chunks);
        let session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        ShellAdapter::from_session("sw1", session, RetrievalPolicy::default())
    }

    #[tokio::test]
    async fn test_users_over_session() {
        let mut adapter = adapter(&[
            b"(GRS1042-CORE) >",
            b"cli numlines 0\r\n(GRS1042-CORE) >",
            b"show users\r\nUser Name  Access Mode\r\nadmin\r\nadministrator\r\n(GRS1042-CORE) >",
        ])
        .await;

        let users = adapter.get_users().await.unwrap();
        assert_eq!(users["admin"].level, 15);
    }

    #[tokio::test]
    async fn test_closed_adapter_reports_channel_closed() {
        let mut adapter = adapter(&[b"(GRS1042-CORE) >", b"cli numlines 0\r\n(GRS1042-CORE) >"]).await;

        adapter.close().await.unwrap();
        adapter.close().await.unwrap();
        assert!(matches!(
            adapter.get_facts().await,
            Err(Error::Channel(ChannelError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_open_unreachable_host() {
        let config = crate::adapter::tests::unreachable();
        crate::adapter::tests::assert_connection_failure(ShellAdapter::open(&config).await);
    }
}
