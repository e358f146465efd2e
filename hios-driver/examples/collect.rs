//! Collect telemetry from one HiOS switch and print it as JSON.
//!
//! Runs against the built-in mock device when the host is `localhost`, so
//! it works with no switch attached.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example collect -- --host localhost
//! cargo run --example collect -- --host 192.168.1.4 --user admin --password private \
//!     --protocols ssh,snmp
//! ```

use std::env;
use std::time::Duration;

use hios_driver::{ConfigOptions, DeviceBuilder, PingOptions, Protocol};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse()?;

    let mut builder = DeviceBuilder::new(&args.host)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout))
        .protocol_preference(args.protocols.iter().copied());
    if let Some(password) = &args.password {
        builder = builder.password(password);
    }

    let mut device = builder.build()?;
    device.open().await?;
    eprintln!(
        "Connected to {} over {}",
        args.host,
        device.active_protocol().map(|p| p.as_str()).unwrap_or("?")
    );

    let mut report = serde_json::Map::new();
    report.insert("facts".into(), json!(device.get_facts().await?));

    // Not every transport serves every getter; record what failed instead of aborting.
    macro_rules! collect {
        ($key:literal, $call:expr) => {
            match $call.await {
                Ok(value) => report.insert($key.into(), json!(value)),
                Err(e) => report.insert($key.into(), json!({ "error": e.to_string() })),
            };
        };
    }

    collect!("interfaces", device.get_interfaces());
    collect!("interfaces_counters", device.get_interfaces_counters());
    collect!("interfaces_ip", device.get_interfaces_ip());
    collect!("lldp_neighbors", device.get_lldp_neighbors());
    collect!("lldp_neighbors_detail", device.get_lldp_neighbors_detail(""));
    collect!("mac_address_table", device.get_mac_address_table());
    collect!("ntp_stats", device.get_ntp_stats());
    collect!("optics", device.get_optics());
    collect!("users", device.get_users());
    collect!("vlans", device.get_vlans());
    collect!("environment", device.get_environment());
    collect!("arp_table", device.get_arp_table(""));
    collect!("snmp_information", device.get_snmp_information());
    collect!("config", device.get_config(ConfigOptions::default()));
    if let Some(target) = &args.ping {
        collect!("ping", device.ping(target, &PingOptions::default()));
    }

    device.close().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    user: String,
    password: Option<String>,
    protocols: Vec<Protocol>,
    timeout: u64,
    ping: Option<String>,
}

impl Args {
    fn parse() -> Result<Self, Box<dyn std::error::Error>> {
        let mut args = Args {
            host: "localhost".to_string(),
            user: env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            password: None,
            protocols: vec![Protocol::Ssh, Protocol::Snmp, Protocol::Netconf],
            timeout: 30,
            ping: None,
        };

        let mut argv = env::args().skip(1);
        while let Some(flag) = argv.next() {
            let mut value = || argv.next().ok_or(format!("{flag} needs a value"));
            match flag.as_str() {
                "--host" | "-h" => args.host = value()?,
                "--user" | "-u" => args.user = value()?,
                "--password" | "-P" => args.password = Some(value()?),
                "--timeout" | "-t" => args.timeout = value()?.parse()?,
                "--ping" => args.ping = Some(value()?),
                "--protocols" => {
                    args.protocols = value()?
                        .split(',')
                        .map(str::parse)
                        .collect::<Result<_, _>>()?;
                }
                other => eprintln!("Unknown argument: {other}"),
            }
        }
        Ok(args)
    }
}
