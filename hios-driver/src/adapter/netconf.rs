//! NETCONF getters: facts, interfaces and SNMP settings.

use indexmap::IndexMap;
use log::{debug, warn};
use russh::Channel;
use russh::client::Msg;

use super::{DeviceAdapter, open_failure};
use crate::channel::Wire;
use crate::device::{DeviceConfig, Protocol};
use crate::error::{ChannelError, Result};
use crate::model::{Facts, Interface, SnmpInformation};
use crate::netconf::{NetconfSession, SUBSYSTEM, XmlElement, text_value};
use crate::parse::{Parsed, VENDOR};
use crate::transport::SshTransport;

/// Model string reported over NETCONF, which exposes no hardware description.
const MODEL: &str = "HiOS";

pub struct NetconfAdapter<W = Channel<Msg>> {
    host: String,
    transport: Option<SshTransport>,
    session: Option<NetconfSession<W>>,
}

impl NetconfAdapter {
    /// Connect on the NETCONF port and exchange hellos.
    pub async fn open(config: &DeviceConfig) -> Result<Self> {
        Self::connect(config)
            .await
            .map_err(|e| open_failure(&config.host, e))
    }

    async fn connect(config: &DeviceConfig) -> Result<Self> {
        let transport = SshTransport::connect(config.ssh_config(Protocol::Netconf)).await?;

        let started = match transport.open_subsystem(SUBSYSTEM).await {
            Ok(channel) => NetconfSession::start(&config.host, channel, config.timeout).await,
            Err(e) => Err(e),
        };
        let session = match started {
            Ok(session) => session,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    debug!("{}: closing after failed hello: {}", config.host, close_err);
                }
                return Err(e);
            }
        };

        Ok(Self {
            host: config.host.clone(),
            transport: Some(transport),
            session: Some(session),
        })
    }
}

impl<W: Wire> NetconfAdapter<W> {
    pub fn from_session(host: impl Into<String>, session: NetconfSession<W>) -> Self {
        Self {
            host: host.into(),
            transport: None,
            session: Some(session),
        }
    }

    async fn get(&mut self, filter: &str) -> Result<XmlElement> {
        match self.session.as_mut() {
            Some(session) => session.get(filter).await,
            None => Err(ChannelError::Closed.into()),
        }
    }
}

fn number<T: std::str::FromStr>(
    parsed: &mut Parsed<impl Sized>,
    element: &XmlElement,
    path: &str,
    default: T,
) -> T {
    let text = text_value(element, path, "");
    if text.is_empty() {
        return default;
    }
    match text.parse() {
        Ok(value) => value,
        Err(_) => {
            parsed.skip("netconf", text, format!("{path} is not a number"));
            default
        }
    }
}

/// Facts from a `<system-info>` reply.
pub fn facts_from_xml(data: &XmlElement) -> Parsed<Facts> {
    let mut parsed = Parsed::new(Facts {
        vendor: VENDOR.to_string(),
        model: MODEL.to_string(),
        hostname: text_value(data, ".//hostname", ""),
        os_version: text_value(data, ".//os-version", ""),
        serial_number: text_value(data, ".//serial-number", ""),
        ..Default::default()
    });
    let uptime = number(&mut parsed, data, ".//uptime", 0);
    parsed.value.uptime = uptime;
    parsed
}

/// Interfaces from an `<interfaces>` reply.
///
/// Link state follows `oper-status` and the enabled flag `admin-status`.
pub fn interfaces_from_xml(data: &XmlElement) -> Parsed<IndexMap<String, Interface>> {
    let mut parsed = Parsed::new(IndexMap::new());
    for node in data.descendants("interface") {
        let name = text_value(node, "name", "");
        if name.is_empty() {
            continue;
        }
        let interface = Interface {
            is_up: text_value(node, "oper-status", "") == "up",
            is_enabled: text_value(node, "admin-status", "") == "up",
            description: text_value(node, "description", ""),
            speed: number(&mut parsed, node, "speed", 0),
            mtu: number(&mut parsed, node, "mtu", 1500),
            ..Default::default()
        };
        parsed.value.insert(name, interface);
    }
    parsed
}

/// SNMP settings from an `<snmp>` reply.
pub fn snmp_from_xml(data: &XmlElement) -> SnmpInformation {
    SnmpInformation {
        chassis_id: text_value(data, ".//chassis-id", ""),
        contact: text_value(data, ".//contact", ""),
        location: text_value(data, ".//location", ""),
        community: data
            .descendants("community")
            .into_iter()
            .map(|c| (text_value(c, "name", ""), text_value(c, "access", "")))
            .filter(|(name, _)| !name.is_empty())
            .collect(),
    }
}

impl<W: Wire> DeviceAdapter for NetconfAdapter<W> {
    fn protocol(&self) -> Protocol {
        Protocol::Netconf
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take()
            && let Err(e) = session.close().await
        {
            debug!("{}: netconf close: {}", self.host, e);
        }
        if let Some(transport) = self.transport.take()
            && let Err(e) = transport.close().await
        {
            warn!("{}: disconnect failed: {}", self.host, e);
        }
        Ok(())
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        let data = self.get("<system-info></system-info>").await?;
        Ok(facts_from_xml(&data).logged(&self.host))
    }

    async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let data = self.get("<interfaces></interfaces>").await?;
        Ok(interfaces_from_xml(&data).logged(&self.host))
    }

    async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        let data = self.get("<snmp></snmp>").await?;
        Ok(snmp_from_xml(&data))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::channel::ScriptedWire;
    use crate::error::Error;

    fn data(xml: &str) -> XmlElement {
        XmlElement::parse(xml).unwrap()
    }

    #[test]
    fn test_facts() {
        let parsed = facts_from_xml(&data(
            "<data><system-info><hostname>GRS1042-CORE</hostname>\
             <os-version>HiOS-3A-09.4.04</os-version>\
             <serial-number>942135999000101022</serial-number>\
             <uptime>1036800</uptime></system-info></data>",
        ));
        let facts = parsed.value;
        assert_eq!(facts.vendor, "Belden");
        assert_eq!(facts.model, "HiOS");
        assert_eq!(facts.hostname, "GRS1042-CORE");
        assert_eq!(facts.uptime, 1_036_800);
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_facts_bad_uptime() {
        let parsed = facts_from_xml(&data("<data><uptime>soon</uptime></data>"));
        assert_eq!(parsed.value.uptime, 0);
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn test_interfaces_state_mapping() {
        let parsed = interfaces_from_xml(&data(
            "<data><interfaces>\
             <interface><name>1/1</name><admin-status>up</admin-status>\
             <oper-status>down</oper-status><speed>1000000000</speed></interface>\
             <interface><name>1/2</name><admin-status>up</admin-status>\
             <oper-status>up</oper-status><mtu>9000</mtu><description>uplink</description></interface>\
             </interfaces></data>",
        ));
        let ports = parsed.value;
        assert!(ports["1/1"].is_enabled);
        assert!(!ports["1/1"].is_up);
        assert_eq!(ports["1/1"].speed, 1_000_000_000);
        assert_eq!(ports["1/1"].mtu, 1500);
        assert!(ports["1/2"].is_up);
        assert_eq!(ports["1/2"].mtu, 9000);
        assert_eq!(ports["1/2"].description, "uplink");
    }

    #[test]
    fn test_snmp() {
        let info = snmp_from_xml(&data(
            "<data><snmp><chassis-id>64:60:38:8a:42:d6</chassis-id>\
             <contact>ops</contact><location>Rack 4</location>\
             <community><name>public</name><access>ro</access></community>\
             <community><name>private</name><access>rw</access></community></snmp></data>",
        ));
        assert_eq!(info.chassis_id, "64:60:38:8a:42:d6");
        assert_eq!(info.location, "Rack 4");
        assert_eq!(info.community["public"], "ro");
        assert_eq!(info.community["private"], "rw");
    }

    #[tokio::test]
    async fn test_unsupported_getter() {
        let wire = ScriptedWire::with_chunks(&[b"<hello><capabilities>\
<capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>]]>]]>"]);
        let session = NetconfSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        let mut adapter = NetconfAdapter::from_session("sw1", session);

        let err = adapter.get_users().await.unwrap_err();
        assert_eq!(err.to_string(), "get_users is not supported over netconf");
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_open_unreachable_host() {
        let config = crate::adapter::tests::unreachable();
        crate::adapter::tests::assert_connection_failure(NetconfAdapter::open(&config).await);
    }
}
