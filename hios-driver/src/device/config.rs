//! Device connection settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DeviceError;
use crate::session::RetrievalPolicy;
use crate::transport::{HostKeyVerification, SshConfig};

/// Hostname that activates the built-in mock adapter instead of a real transport.
pub const MOCK_HOST: &str = "localhost";

/// One of the three management transports a HiOS switch exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Interactive CLI over an SSH shell.
    Ssh,
    /// NETCONF 1.0 over the SSH `netconf` subsystem.
    Netconf,
    /// SNMP v2c polling.
    Snmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ssh => "ssh",
            Protocol::Netconf => "netconf",
            Protocol::Snmp => "snmp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(Protocol::Ssh),
            "netconf" => Ok(Protocol::Netconf),
            "snmp" => Ok(Protocol::Snmp),
            other => Err(DeviceError::InvalidConfig {
                message: format!("unknown protocol '{other}'"),
            }),
        }
    }
}

/// Per-transport port overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ports {
    pub ssh: u16,
    pub netconf: u16,
    pub snmp: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            ssh: 22,
            netconf: 830,
            snmp: 161,
        }
    }
}

impl Ports {
    /// Port to use for the given transport.
    pub fn port(&self, protocol: Protocol) -> u16 {
        match protocol {
            Protocol::Ssh => self.ssh,
            Protocol::Netconf => self.netconf,
            Protocol::Snmp => self.snmp,
        }
    }
}

/// Everything needed to reach one switch.
///
/// Deserializable so an inventory file can feed it directly; every field
/// except `host` and `username` has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host: String,

    pub username: String,

    pub password: SecretString,

    /// Bound on connect and on every command round trip.
    #[serde(rename = "timeout_secs", deserialize_with = "de_secs")]
    pub timeout: Duration,

    pub ports: Ports,

    /// Transports to try, first success wins.
    pub protocol_preference: Vec<Protocol>,

    pub host_key_verification: HostKeyVerification,

    pub known_hosts_path: Option<PathBuf>,

    /// SNMP community; the username is used when unset.
    pub snmp_community: Option<String>,

    /// Polling bounds for the interactive profile download.
    pub retrieval: RetrievalPolicy,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: SecretString::from(String::new()),
            timeout: Duration::from_secs(60),
            ports: Ports::default(),
            protocol_preference: default_preference(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            snmp_community: None,
            retrieval: RetrievalPolicy::default(),
        }
    }
}

impl DeviceConfig {
    /// Whether this config targets the built-in mock device.
    pub fn is_mock(&self) -> bool {
        self.host == MOCK_HOST
    }

    /// Community string for SNMP reads.
    pub fn community(&self) -> &str {
        self.snmp_community.as_deref().unwrap_or(&self.username)
    }

    /// SSH settings for the shell (`Protocol::Ssh`) or NETCONF subsystem.
    pub fn ssh_config(&self, protocol: Protocol) -> SshConfig {
        SshConfig {
            host: self.host.clone(),
            port: self.ports.port(protocol),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.timeout,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: self.host_key_verification.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }

    /// Reject configs that can never open.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.host.trim().is_empty() {
            return Err(DeviceError::InvalidConfig {
                message: "host is required".into(),
            });
        }
        if self.username.is_empty() && !self.is_mock() {
            return Err(DeviceError::InvalidConfig {
                message: "username is required".into(),
            });
        }
        if self.protocol_preference.is_empty() {
            return Err(DeviceError::InvalidConfig {
                message: "protocol preference list is empty".into(),
            });
        }
        Ok(())
    }
}

/// Default transport order: ssh, snmp, netconf.
pub fn default_preference() -> Vec<Protocol> {
    vec![Protocol::Ssh, Protocol::Snmp, Protocol::Netconf]
}

pub(crate) fn de_secs<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_secs)
}

pub(crate) fn de_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_protocol_round_trip_names() {
        for p in [Protocol::Ssh, Protocol::Netconf, Protocol::Snmp] {
            assert_eq!(p.to_string().parse::<Protocol>().unwrap(), p);
        }
        assert_eq!("NETCONF".parse::<Protocol>().unwrap(), Protocol::Netconf);
        assert!("telnet".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(
            config.protocol_preference,
            vec![Protocol::Ssh, Protocol::Snmp, Protocol::Netconf]
        );
        assert_eq!(config.ports.port(Protocol::Netconf), 830);
        assert_eq!(config.ports.port(Protocol::Snmp), 161);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DeviceConfig = serde_json::from_str(
            r#"{
                "host": "10.0.0.2",
                "username": "admin",
                "password": "private",
                "timeout_secs": 10,
                "ports": { "ssh": 2222 },
                "protocol_preference": ["netconf", "ssh"],
                "host_key_verification": "disabled"
            }"#,
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.password.expose_secret(), "private");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.ports.ssh, 2222);
        assert_eq!(config.ports.netconf, 830);
        assert_eq!(
            config.protocol_preference,
            vec![Protocol::Netconf, Protocol::Ssh]
        );
        assert_eq!(config.host_key_verification, HostKeyVerification::Disabled);
        assert_eq!(config.community(), "admin");
    }

    #[test]
    fn test_validate() {
        let mut config = DeviceConfig {
            host: "10.0.0.2".into(),
            username: "admin".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.protocol_preference.clear();
        assert!(config.validate().is_err());

        let mock = DeviceConfig {
            host: MOCK_HOST.into(),
            ..Default::default()
        };
        assert!(mock.validate().is_ok());
    }

    #[test]
    fn test_ssh_config_uses_protocol_port() {
        let config = DeviceConfig {
            host: "sw1".into(),
            username: "admin".into(),
            ..Default::default()
        };
        assert_eq!(config.ssh_config(Protocol::Ssh).port, 22);
        assert_eq!(config.ssh_config(Protocol::Netconf).port, 830);
    }
}
