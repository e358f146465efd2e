//! SNMP v2c getters over the standard MIB-II scalars and IF-MIB table.

use std::future::Future;
use std::time::Duration;

use async_snmp::{Auth, Client, Oid, UdpClient, Value};
use indexmap::IndexMap;
use log::debug;

use super::{DeviceAdapter, open_failure};
use crate::device::{DeviceConfig, Protocol};
use crate::error::{Error, Result};
use crate::model::{Environment, Facts, Interface, SnmpInformation};
use crate::parse::VENDOR;

const SYSTEM: [u32; 7] = [1, 3, 6, 1, 2, 1, 1];
const SYS_DESCR: u32 = 1;
const SYS_UPTIME: u32 = 3;
const SYS_CONTACT: u32 = 4;
const SYS_NAME: u32 = 5;
const SYS_LOCATION: u32 = 6;

const IF_NUMBER: [u32; 9] = [1, 3, 6, 1, 2, 1, 2, 1, 0];
const IF_ENTRY: [u32; 9] = [1, 3, 6, 1, 2, 1, 2, 2, 1];
const IF_DESCR: u32 = 2;
const IF_MTU: u32 = 4;
const IF_SPEED: u32 = 5;
const IF_PHYS_ADDRESS: u32 = 6;
const IF_ADMIN_STATUS: u32 = 7;
const IF_OPER_STATUS: u32 = 8;
const IF_ALIAS: [u32; 11] = [1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

/// `up(1)` in ifAdminStatus and ifOperStatus.
const STATUS_UP: u64 = 1;

/// Model string reported over SNMP.
const MODEL: &str = "HiOS";

fn scalar(object: u32) -> Oid {
    let mut arcs = SYSTEM.to_vec();
    arcs.extend([object, 0]);
    Oid::from_slice(&arcs)
}

fn if_column(column: u32, index: u32) -> Oid {
    let mut arcs = IF_ENTRY.to_vec();
    arcs.extend([column, index]);
    Oid::from_slice(&arcs)
}

fn if_alias(index: u32) -> Oid {
    let mut arcs = IF_ALIAS.to_vec();
    arcs.push(index);
    Oid::from_slice(&arcs)
}

/// Single-OID reads. Implemented for the UDP client; tests use a table.
pub trait SnmpSource: Send + Sync {
    fn get(&self, oid: &Oid) -> impl Future<Output = Result<Value>> + Send;
}

impl SnmpSource for UdpClient {
    async fn get(&self, oid: &Oid) -> Result<Value> {
        Ok(Client::get(self, oid).await?.value)
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => String::new(),
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
        other => other.to_string(),
    }
}

fn number(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(n) => u64::try_from(*n).ok(),
        Value::Counter32(n) | Value::Gauge32(n) | Value::TimeTicks(n) => Some(u64::from(*n)),
        Value::Counter64(n) => Some(*n),
        _ => None,
    }
}

/// `aa:bb:cc:dd:ee:ff` for a six-byte ifPhysAddress.
fn mac(value: &Value) -> String {
    match value {
        Value::OctetString(bytes) if bytes.len() == 6 => bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":"),
        _ => String::new(),
    }
}

pub struct SnmpAdapter<S = UdpClient> {
    host: String,
    community: String,
    source: Option<S>,
    timeout: Duration,
}

impl SnmpAdapter {
    /// Build a v2c client and probe sysDescr.0.
    ///
    /// A probe that goes unanswered is a connection failure, not a timeout.
    pub async fn open(config: &DeviceConfig) -> Result<Self> {
        Self::connect(config)
            .await
            .map_err(|e| open_failure(&config.host, e))
    }

    async fn connect(config: &DeviceConfig) -> Result<Self> {
        let target = format!("{}:{}", config.host, config.ports.port(Protocol::Snmp));
        let client = Client::builder(target, Auth::v2c(config.community()))
            .timeout(config.timeout)
            .connect()
            .await?;

        let adapter = Self::with_source(&config.host, config.community(), client, config.timeout);
        let descr = adapter.get(&scalar(SYS_DESCR)).await?;
        debug!("{}: SNMP agent answered: {}", adapter.host, text(&descr));
        Ok(adapter)
    }
}

impl<S: SnmpSource> SnmpAdapter<S> {
    pub fn with_source(
        host: impl Into<String>,
        community: impl Into<String>,
        source: S,
        timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            community: community.into(),
            source: Some(source),
            timeout,
        }
    }

    async fn get(&self, oid: &Oid) -> Result<Value> {
        let Some(source) = self.source.as_ref() else {
            return Err(crate::error::ChannelError::Closed.into());
        };
        match tokio::time::timeout(self.timeout, source.get(oid)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    async fn get_text(&self, oid: &Oid) -> Result<String> {
        Ok(text(&self.get(oid).await?))
    }

    async fn get_number(&self, oid: &Oid) -> Result<u64> {
        let value = self.get(oid).await?;
        Ok(number(&value).unwrap_or_else(|| {
            debug!("{}: {} is not numeric: {}", self.host, oid, value);
            0
        }))
    }
}

impl<S: SnmpSource> DeviceAdapter for SnmpAdapter<S> {
    fn protocol(&self) -> Protocol {
        Protocol::Snmp
    }

    async fn close(&mut self) -> Result<()> {
        self.source = None;
        Ok(())
    }

    async fn get_facts(&mut self) -> Result<Facts> {
        let hostname = self.get_text(&scalar(SYS_NAME)).await?;
        let descr = self.get_text(&scalar(SYS_DESCR)).await?;
        let ticks = self.get_number(&scalar(SYS_UPTIME)).await?;

        Ok(Facts {
            uptime: ticks / 100,
            vendor: VENDOR.to_string(),
            model: MODEL.to_string(),
            hostname,
            os_version: descr.split_whitespace().nth(2).unwrap_or_default().to_string(),
            ..Default::default()
        })
    }

    async fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let count = self.get_number(&Oid::from_slice(&IF_NUMBER)).await?;
        let count = u32::try_from(count).unwrap_or(0);

        let mut interfaces = IndexMap::new();
        for index in 1..=count {
            let name = self.get_text(&if_column(IF_DESCR, index)).await?;
            if name.is_empty() {
                continue;
            }
            let speed = self.get_number(&if_column(IF_SPEED, index)).await?;
            let mtu = self.get_number(&if_column(IF_MTU, index)).await?;
            let phys = self.get(&if_column(IF_PHYS_ADDRESS, index)).await?;
            let admin = self.get_number(&if_column(IF_ADMIN_STATUS, index)).await?;
            let oper = self.get_number(&if_column(IF_OPER_STATUS, index)).await?;
            let alias = self.get_text(&if_alias(index)).await?;

            interfaces.insert(
                name,
                Interface {
                    is_up: oper == STATUS_UP,
                    is_enabled: admin == STATUS_UP,
                    description: alias,
                    speed,
                    mtu: u32::try_from(mtu).unwrap_or(0),
                    mac_address: mac(&phys),
                    ..Default::default()
                },
            );
        }
        Ok(interfaces)
    }

    async fn get_environment(&mut self) -> Result<Environment> {
        Ok(Environment::default())
    }

    async fn get_snmp_information(&mut self) -> Result<SnmpInformation> {
        let mut community = IndexMap::new();
        community.insert(self.community.clone(), "ro".to_string());

        Ok(SnmpInformation {
            chassis_id: self.get_text(&scalar(SYS_NAME)).await?,
            contact: self.get_text(&scalar(SYS_CONTACT)).await?,
            location: self.get_text(&scalar(SYS_LOCATION)).await?,
            community,
        })
    }
}
