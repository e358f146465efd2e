//! Error types for hios-driver.

use std::time::Duration;

use thiserror::Error;

use crate::device::Protocol;
use crate::session::RetrievalStage;

/// Main error type for hios-driver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No transport could be opened, or a single adapter failed to open.
    #[error("Cannot connect to {host}: {reason}")]
    ConnectionFailure { host: String, reason: String },

    /// A bounded wait exceeded its budget.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The capability is not implemented for the active transport.
    #[error("{operation} is not supported {}", scope(.protocol))]
    Unsupported {
        operation: &'static str,
        protocol: Option<Protocol>,
    },

    /// The interactive retrieval dialogue never reached its expected state.
    #[error("Interactive retrieval stalled while {stage} after {attempts} polls")]
    ProtocolTimeout {
        stage: RetrievalStage,
        attempts: u32,
    },

    /// A record could not be parsed.
    #[error(transparent)]
    ParseAnomaly(#[from] ParseAnomaly),

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// NETCONF protocol errors
    #[error("NETCONF error: {0}")]
    Netconf(#[from] NetconfError),

    /// SNMP request errors. The client returns them boxed.
    #[error("SNMP error: {0}")]
    Snmp(#[from] Box<async_snmp::Error>),

    /// Device errors (lifecycle misuse, invalid configuration)
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

impl Error {
    /// Shorthand for an unsupported capability on a known transport.
    pub fn unsupported(operation: &'static str, protocol: Protocol) -> Self {
        Error::Unsupported {
            operation,
            protocol: Some(protocol),
        }
    }

    /// Whether this error means the session itself is unusable.
    ///
    /// These abort a `cli()` batch; everything else, including a command
    /// that timed out, is scoped to a single command or record.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailure { .. }
                | Error::Transport(_)
                | Error::Channel(_)
                | Error::Device(DeviceError::NotConnected)
        )
    }
}

fn scope(protocol: &Option<Protocol>) -> String {
    match protocol {
        Some(p) => format!("over {p}"),
        None => "for this device".to_string(),
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host key is not in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (PTY and subsystem operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Failed to start the requested subsystem
    #[error("Failed to start subsystem '{0}'")]
    SubsystemFailed(String),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// NETCONF session errors.
#[derive(Error, Debug)]
pub enum NetconfError {
    /// The server hello was missing or unusable
    #[error("Invalid server hello: {0}")]
    Hello(String),

    /// The server answered with an `<rpc-error>`
    #[error("rpc-error: {0}")]
    Rpc(String),

    /// The reply was not well-formed XML
    #[error("Malformed reply: {0}")]
    Malformed(String),
}

/// Device lifecycle and configuration errors.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Device not connected
    #[error("Device not connected - call open() first")]
    NotConnected,

    /// Device already connected
    #[error("Device already connected")]
    AlreadyConnected,

    /// Invalid configuration in the device builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// A single record that could not be parsed.
///
/// Report parsers log and skip these; the enclosing call still returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not parse {report} record: {line:?} ({reason})")]
pub struct ParseAnomaly {
    pub report: &'static str,
    pub line: String,
    pub reason: String,
}

impl ParseAnomaly {
    pub fn new(report: &'static str, line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            report,
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using hios-driver's Error.
pub type Result<T> = std::result::Result<T, Error>;
