//! Transport selection.
//!
//! Transports are tried in preference order and the first that opens is
//! kept. Later entries are never attempted once one succeeds.

use std::future::Future;

use log::{debug, info, warn};

use super::config::{DeviceConfig, Protocol};
use crate::adapter::{Adapter, MockAdapter, NetconfAdapter, ShellAdapter, SnmpAdapter};
use crate::error::{Error, Result};

/// Opens one adapter for one transport.
///
/// [`DefaultConnector`] dials real sessions; tests substitute scripted ones.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        protocol: Protocol,
        config: &DeviceConfig,
    ) -> impl Future<Output = Result<Adapter>> + Send;
}

/// Dials real SSH, NETCONF and SNMP sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

impl Connector for DefaultConnector {
    async fn connect(&self, protocol: Protocol, config: &DeviceConfig) -> Result<Adapter> {
        match protocol {
            Protocol::Ssh => ShellAdapter::open(config).await.map(Adapter::Shell),
            Protocol::Netconf => NetconfAdapter::open(config).await.map(Adapter::Netconf),
            Protocol::Snmp => SnmpAdapter::open(config).await.map(Adapter::Snmp),
        }
    }
}

/// Try each transport in `config.protocol_preference` until one opens.
///
/// [`MOCK_HOST`](super::config::MOCK_HOST) skips the list and the connector
/// and always yields the mock adapter as `ssh`. When all fail, the error
/// names every attempt and no adapter is returned.
pub async fn negotiate<C: Connector>(
    connector: &C,
    config: &DeviceConfig,
) -> Result<(Protocol, Adapter)> {
    if config.is_mock() {
        info!("{}: using the built-in mock device", config.host);
        return Ok((Protocol::Ssh, Adapter::Mock(MockAdapter::new())));
    }

    let mut failures = Vec::with_capacity(config.protocol_preference.len());

    for &protocol in &config.protocol_preference {
        debug!("{}: trying {}", config.host, protocol);
        match connector.connect(protocol, config).await {
            Ok(adapter) => {
                info!("{}: connected over {} ({})", config.host, protocol, adapter.kind());
                return Ok((protocol, adapter));
            }
            Err(e) => {
                warn!("{}: {} failed: {}", config.host, protocol, e);
                let reason = match e {
                    Error::ConnectionFailure { reason, .. } => reason,
                    other => other.to_string(),
                };
                failures.push(format!("{protocol}: {reason}"));
            }
        }
    }

    Err(Error::ConnectionFailure {
        host: config.host.clone(),
        reason: failures.join("; "),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Opens a mock adapter for the listed protocols and fails the rest.
    #[derive(Default)]
    pub(crate) struct ScriptedConnector {
        pub(crate) reachable: Vec<Protocol>,
        pub(crate) attempts: Mutex<Vec<Protocol>>,
    }

    impl ScriptedConnector {
        pub(crate) fn reaching(reachable: &[Protocol]) -> Self {
            Self {
                reachable: reachable.to_vec(),
                ..Default::default()
            }
        }

        pub(crate) fn attempts(&self) -> Vec<Protocol> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl Connector for ScriptedConnector {
        async fn connect(&self, protocol: Protocol, config: &DeviceConfig) -> Result<Adapter> {
            self.attempts.lock().unwrap().push(protocol);
            if self.reachable.contains(&protocol) {
                Ok(Adapter::Mock(MockAdapter::new()))
            } else if protocol == Protocol::Snmp {
                Err(Error::Timeout(std::time::Duration::from_secs(2)))
            } else {
                Err(Error::ConnectionFailure {
                    host: config.host.clone(),
                    reason: "unreachable".to_string(),
                })
            }
        }
    }

    fn config(preference: &[Protocol]) -> DeviceConfig {
        DeviceConfig {
            host: "10.0.0.2".into(),
            username: "admin".into(),
            protocol_preference: preference.to_vec(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_first_reachable() {
        let connector = ScriptedConnector::reaching(&[Protocol::Ssh]);
        let config = config(&[Protocol::Netconf, Protocol::Ssh, Protocol::Snmp]);

        let (protocol, _) = tokio_test::assert_ok!(negotiate(&connector, &config).await);
        assert_eq!(protocol, Protocol::Ssh);
        assert_eq!(connector.attempts(), [Protocol::Netconf, Protocol::Ssh]);
    }

    #[tokio::test]
    async fn test_all_failing_names_every_attempt() {
        let connector = ScriptedConnector::default();
        let config = config(&[Protocol::Ssh, Protocol::Snmp]);

        match negotiate(&connector, &config).await {
            Err(Error::ConnectionFailure { host, reason }) => {
                assert_eq!(host, "10.0.0.2");
                assert_eq!(
                    reason,
                    "ssh: unreachable; snmp: Operation timed out after 2s"
                );
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("negotiation should fail"),
        }
    }

    #[tokio::test]
    async fn test_mock_host_bypasses_transports() {
        let connector = ScriptedConnector::default();
        let mut config = config(&[Protocol::Snmp, Protocol::Netconf]);
        config.host = "localhost".into();

        let (protocol, adapter) = negotiate(&connector, &config).await.unwrap();
        assert_eq!(protocol, Protocol::Ssh);
        assert_eq!(adapter.kind(), "mock");
        assert!(connector.attempts().is_empty());
    }
}
