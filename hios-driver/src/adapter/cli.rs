//! Capabilities built from CLI reports.
//!
//! Every function here issues one or more `show` commands through a
//! [`CommandRunner`] and hands the text to the matching parser. The shell
//! adapter runs them over a live session; tests run them over canned output.

use std::future::Future;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::Result;
use crate::model::{
    ArpEntry, ConfigFormat, ConfigOptions, ConfigSet, Environment, Facts, Interface,
    InterfaceCounters, InterfaceIp, LldpMap, LldpNeighbor, LldpNeighborDetail,
    LldpNeighborExtended, MacEntry, NtpServer, NtpStats, Optics, PingOptions, PingResult,
    SnmpInformation, User, Vlan,
};
use crate::parse::{self, EnvironmentReports};
use crate::session::{Response, RetrievalPolicy};

/// Anything that can run a CLI command and return its [`Response`].
pub trait CommandRunner: Send {
    /// Device host, for log context.
    fn host(&self) -> &str;

    fn run(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Run a confirmation-driven download and return its payload.
    fn retrieve(
        &mut self,
        command: &str,
        policy: &RetrievalPolicy,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Result text of a command, even when the device flagged it.
async fn output<R: CommandRunner>(runner: &mut R, command: &str) -> Result<String> {
    let response = runner.run(command).await?;
    if let Some(message) = &response.failure_message {
        debug!("{}: '{}' reported: {}", runner.host(), command, message);
    }
    Ok(response.result)
}

/// Result text of a command, `None` when the device rejected it.
async fn output_if_ok<R: CommandRunner>(runner: &mut R, command: &str) -> Result<Option<String>> {
    let response = runner.run(command).await?;
    if let Some(message) = &response.failure_message {
        debug!("{}: '{}' rejected: {}", runner.host(), command, message);
        return Ok(None);
    }
    Ok(Some(response.result))
}

/// Run each command in order.
///
/// A device-reported failure or a command that timed out stays on its own
/// entry. Only a lost session aborts the batch.
pub async fn cli<R: CommandRunner>(
    runner: &mut R,
    commands: &[String],
) -> Result<IndexMap<String, Response>> {
    let mut results = IndexMap::with_capacity(commands.len());
    for command in commands {
        let response = match runner.run(command).await {
            Ok(response) => response,
            Err(e) if e.is_connection_level() => return Err(e),
            Err(e) => {
                warn!("{}: '{}' failed: {}", runner.host(), command, e);
                let message = format!("Error: {e}");
                Response::failed(command.as_str(), "", "", "", Duration::ZERO, message)
            }
        };
        results.insert(command.clone(), response);
    }
    Ok(results)
}

pub async fn facts<R: CommandRunner>(runner: &mut R) -> Result<Facts> {
    let info = output(runner, "show system info").await?;
    let ports = output(runner, "show port").await?;

    let mut facts = parse::parse_facts(&info).logged(runner.host());
    facts.interface_list = parse::parse_interface_list(&ports);
    Ok(facts)
}

pub async fn interfaces<R: CommandRunner>(runner: &mut R) -> Result<IndexMap<String, Interface>> {
    let ports = output(runner, "show port").await?;
    let mtu = output(runner, "show mtu").await?;
    let mtu = parse::parse_mtu(&mtu);
    Ok(parse::parse_ports(&ports, &mtu).logged(runner.host()))
}

pub async fn interfaces_counters<R: CommandRunner>(
    runner: &mut R,
) -> Result<IndexMap<String, InterfaceCounters>> {
    let text = output(runner, "show interface counters").await?;
    Ok(parse::parse_counters(&text).logged(runner.host()))
}

pub async fn interfaces_ip<R: CommandRunner>(
    runner: &mut R,
) -> Result<IndexMap<String, InterfaceIp>> {
    let text = output(runner, "show ip interface").await?;
    Ok(parse::parse_interfaces_ip(&text).logged(runner.host()))
}

const LLDP_REMOTE_DATA: &str = "show lldp remote-data";

pub async fn lldp_neighbors<R: CommandRunner>(runner: &mut R) -> Result<LldpMap<LldpNeighbor>> {
    let text = output(runner, LLDP_REMOTE_DATA).await?;
    Ok(parse::parse_lldp_neighbors(&text).logged(runner.host()))
}

pub async fn lldp_neighbors_detail<R: CommandRunner>(
    runner: &mut R,
) -> Result<LldpMap<LldpNeighborDetail>> {
    let text = output(runner, LLDP_REMOTE_DATA).await?;
    Ok(parse::parse_lldp_detail(&text).logged(runner.host()))
}

pub async fn lldp_neighbors_extended<R: CommandRunner>(
    runner: &mut R,
) -> Result<LldpMap<LldpNeighborExtended>> {
    let text = output(runner, LLDP_REMOTE_DATA).await?;
    Ok(parse::parse_lldp_extended(&text).logged(runner.host()))
}

pub async fn mac_address_table<R: CommandRunner>(runner: &mut R) -> Result<Vec<MacEntry>> {
    let text = output(runner, "show mac-addr-table").await?;
    Ok(parse::parse_mac_table(&text).logged(runner.host()))
}

pub async fn ntp_stats<R: CommandRunner>(runner: &mut R) -> Result<Vec<NtpStats>> {
    let servers = output(runner, "show sntp client server").await?;
    let status = output(runner, "show sntp client status").await?;
    Ok(parse::parse_ntp(&servers, &status).logged(runner.host()))
}

pub async fn ntp_servers<R: CommandRunner>(runner: &mut R) -> Result<IndexMap<String, NtpServer>> {
    Ok(ntp_stats(runner)
        .await?
        .into_iter()
        .map(|stats| (stats.remote, NtpServer {}))
        .collect())
}

pub async fn optics<R: CommandRunner>(runner: &mut R) -> Result<IndexMap<String, Optics>> {
    let text = output(runner, "show sfp").await?;
    Ok(parse::parse_optics(&text).logged(runner.host()))
}

pub async fn users<R: CommandRunner>(runner: &mut R) -> Result<IndexMap<String, User>> {
    let text = output(runner, "show users").await?;
    Ok(parse::parse_users(&text).logged(runner.host()))
}

pub async fn vlans<R: CommandRunner>(runner: &mut R) -> Result<IndexMap<u16, Vlan>> {
    let brief = output(runner, "show vlan brief").await?;
    let ports = output(runner, "show vlan port").await?;
    Ok(parse::parse_vlans(&brief, &ports).logged(runner.host()))
}

pub async fn environment<R: CommandRunner>(runner: &mut R) -> Result<Environment> {
    let fan = output_if_ok(runner, "show fan").await?;
    let temperature = output(runner, "show system temperature limits").await?;
    let system_info = output(runner, "show system info").await?;
    let resources = output(runner, "show system resources").await?;

    Ok(parse::parse_environment(EnvironmentReports {
        fan: fan.as_deref(),
        temperature: &temperature,
        system_info: &system_info,
        resources: &resources,
    })
    .logged(runner.host()))
}

/// `show ip arp`, then `show arp`. The first command that is accepted and
/// yields at least one entry wins.
pub async fn arp_table<R: CommandRunner>(runner: &mut R) -> Result<Vec<ArpEntry>> {
    let candidates: [(&str, fn(&str) -> parse::Parsed<Vec<ArpEntry>>); 2] = [
        ("show ip arp", parse::parse_ip_arp),
        ("show arp", parse::parse_arp),
    ];

    let mut entries = Vec::new();
    for (command, parser) in candidates {
        let Some(text) = output_if_ok(runner, command).await? else {
            continue;
        };
        entries = parser(&text).logged(runner.host());
        if !entries.is_empty() {
            break;
        }
    }
    Ok(entries)
}

pub async fn snmp_information<R: CommandRunner>(runner: &mut R) -> Result<SnmpInformation> {
    let text = output(runner, "show snmp").await?;
    Ok(parse::parse_snmp(&text).logged(runner.host()))
}

pub async fn ping<R: CommandRunner>(
    runner: &mut R,
    destination: &str,
    options: &PingOptions,
) -> Result<PingResult> {
    let command = parse::ping_command(destination, options.count);
    let text = output(runner, &command).await?;
    Ok(parse::parse_ping(&text, destination).logged(runner.host()))
}

/// Running config as a CLI script, or the active NVM profile as XML.
///
/// The XML profile is the saved configuration and lands in `startup`.
/// HiOS has no candidate configuration.
pub async fn config<R: CommandRunner>(
    runner: &mut R,
    options: ConfigOptions,
    policy: &RetrievalPolicy,
) -> Result<ConfigSet> {
    let mut set = ConfigSet::default();

    match options.format {
        ConfigFormat::Text => {
            if options.retrieve.includes_running() {
                let command = if options.full {
                    "show running-config script all"
                } else {
                    "show running-config script"
                };
                set.running = output(runner, command).await?.trim().to_string();
            }
        }
        ConfigFormat::Xml => {
            if options.retrieve.includes_startup() {
                let profiles = output(runner, "show config profiles nvm").await?;
                match parse::active_profile_index(&profiles) {
                    Some(index) => {
                        let command = format!("show config profiles nvm {index}");
                        set.startup = runner.retrieve(&command, policy).await?;
                    }
                    None => debug!("{}: no active NVM profile", runner.host()),
                }
            }
        }
    }

    if options.sanitized {
        set.running = parse::sanitize_config(&set.running);
        set.startup = parse::sanitize_config(&set.startup);
    }
    Ok(set)
}
