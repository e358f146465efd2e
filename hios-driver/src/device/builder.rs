//! Builder for creating devices.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::config::{DeviceConfig, Protocol};
use super::negotiator::{Connector, DefaultConnector};
use super::Device;
use crate::error::Result;
use crate::session::RetrievalPolicy;
use crate::transport::HostKeyVerification;

/// Builder for constructing a [`Device`].
///
/// # Example
///
/// ```rust,no_run
/// use hios_driver::{DeviceBuilder, Protocol};
///
/// # async fn example() -> Result<(), hios_driver::Error> {
/// let mut device = DeviceBuilder::new("192.168.1.4")
///     .username("admin")
///     .password("private")
///     .protocol_preference([Protocol::Ssh, Protocol::Snmp])
///     .build()?;
/// device.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceBuilder<C = DefaultConnector> {
    config: DeviceConfig,
    connector: C,
}

impl DeviceBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self::from_config(DeviceConfig {
            host: host.into(),
            ..Default::default()
        })
    }

    /// Start from a deserialized config.
    pub fn from_config(config: DeviceConfig) -> Self {
        Self {
            config,
            connector: DefaultConnector,
        }
    }
}

impl<C: Connector> DeviceBuilder<C> {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = SecretString::from(password.into());
        self
    }

    /// Bound on connect and on every round trip (default: 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the port of one transport.
    pub fn port(mut self, protocol: Protocol, port: u16) -> Self {
        match protocol {
            Protocol::Ssh => self.config.ports.ssh = port,
            Protocol::Netconf => self.config.ports.netconf = port,
            Protocol::Snmp => self.config.ports.snmp = port,
        }
        self
    }

    /// Transports to try, in order.
    pub fn protocol_preference(mut self, order: impl IntoIterator<Item = Protocol>) -> Self {
        self.config.protocol_preference = order.into_iter().collect();
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.config.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.known_hosts_path = Some(path.into());
        self
    }

    /// SNMP community (default: the username).
    pub fn community(mut self, community: impl Into<String>) -> Self {
        self.config.snmp_community = Some(community.into());
        self
    }

    /// Polling bounds for the NVM profile download.
    pub fn retrieval(mut self, policy: RetrievalPolicy) -> Self {
        self.config.retrieval = policy;
        self
    }

    /// Replace the transport connector.
    pub fn connector<N: Connector>(self, connector: N) -> DeviceBuilder<N> {
        DeviceBuilder {
            config: self.config,
            connector,
        }
    }

    /// Validate the settings and create the device.
    ///
    /// Nothing is dialed until [`Device::open`].
    pub fn build(self) -> Result<Device<C>> {
        self.config.validate()?;
        Ok(Device::with_connector(self.config, self.connector))
    }
}
