//! # hios-driver
//!
//! Async telemetry driver for Hirschmann/Belden HiOS switches.
//!
//! A [`Device`] tries the switch's management transports in preference
//! order and keeps the first that opens: the interactive CLI over SSH,
//! NETCONF over the SSH `netconf` subsystem, or SNMP v2c. Every getter
//! returns the same typed records whichever transport is active.
//!
//! ## Features
//!
//! - Transport negotiation with ordered fallback
//! - Line-oriented parsers for the HiOS `show` reports
//! - Pagination control and pager handling on the CLI
//! - Interactive download of the saved NVM profile as XML
//! - A built-in mock device (`localhost`) for offline use
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hios_driver::{DeviceBuilder, Protocol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hios_driver::Error> {
//!     let mut device = DeviceBuilder::new("192.168.1.4")
//!         .username("admin")
//!         .password("private")
//!         .protocol_preference([Protocol::Ssh, Protocol::Netconf])
//!         .build()?;
//!
//!     device.open().await?;
//!
//!     let facts = device.get_facts().await?;
//!     println!("{} runs {}", facts.hostname, facts.os_version);
//!
//!     device.close().await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod channel;
pub mod device;
pub mod error;
pub mod model;
pub mod netconf;
pub mod parse;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use adapter::{Adapter, DeviceAdapter};
pub use device::{Connector, Device, DeviceBuilder, DeviceConfig, Protocol};
pub use error::{Error, Result};
pub use model::{
    ArpEntry, ConfigFormat, ConfigOptions, ConfigRetrieve, ConfigSet, Environment, Facts,
    Interface, InterfaceCounters, InterfaceIp, LldpNeighbor, LldpNeighborDetail,
    LldpNeighborExtended, MacEntry, NtpServer, NtpStats, Optics, PingOptions, PingResult,
    SnmpInformation, User, Vlan,
};
pub use session::{Response, RetrievalPolicy};
pub use transport::HostKeyVerification;
