//! `show mac-addr-table`.

use super::{Parsed, fields};
use crate::model::MacEntry;

const REPORT: &str = "show mac-addr-table";

/// Rows are `vlan mac interface ifindex status`. Anything other than a
/// `learned` status counts as static. HiOS keeps no move history.
pub fn parse_mac_table(output: &str) -> Parsed<Vec<MacEntry>> {
    let mut parsed = Parsed::new(Vec::new());

    for line in output.trim().lines().skip(2) {
        let parts = fields(line);
        let [vlan, mac, interface, _ifindex, status, ..] = parts[..] else {
            continue;
        };
        let Ok(vlan) = vlan.parse::<u16>() else {
            parsed.skip(REPORT, line, "unreadable VLAN id");
            continue;
        };
        parsed.value.push(MacEntry {
            mac: mac.to_string(),
            interface: interface.to_string(),
            vlan,
            is_static: !status.eq_ignore_ascii_case("learned"),
            active: true,
            moves: None,
            last_move: None,
        });
    }

    parsed
}
