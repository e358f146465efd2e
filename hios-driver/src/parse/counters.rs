//! `show interface counters`.

use indexmap::IndexMap;

use super::{Parsed, fields};
use crate::model::InterfaceCounters;

const REPORT: &str = "show interface counters";

/// Lines before the first data row.
const HEADER_LINES: usize = 4;

fn numbers<const N: usize>(values: &[&str]) -> Option<[u64; N]> {
    let mut out = [0u64; N];
    for (slot, value) in out.iter_mut().zip(values.get(..N)?) {
        *slot = value.parse().ok()?;
    }
    Some(out)
}

/// Counters keyed by port.
///
/// Each port occupies consecutive rows: a row starting with the port name
/// carries the six receive counters, and the next row with at least six
/// fields carries the six transmit counters. Rows are paired by position,
/// so a device that inserts another six-column row between them (such as
/// an unknown-protocol row) has that row read as transmit counters. A row
/// whose numbers do not parse leaves the counters at zero.
pub fn parse_counters(output: &str) -> Parsed<IndexMap<String, InterfaceCounters>> {
    let mut parsed = Parsed::new(IndexMap::new());
    let mut current: Option<String> = None;

    for line in output.split('\n').skip(HEADER_LINES) {
        let parts = fields(line);
        let Some(first) = parts.first() else {
            continue;
        };

        if first.contains('/') {
            let mut counters = InterfaceCounters::default();
            if parts.len() >= 7 {
                match numbers::<6>(&parts[1..]) {
                    Some([unicast, multicast, broadcast, octets, discards, errors]) => {
                        counters.rx_unicast_packets = unicast;
                        counters.rx_multicast_packets = multicast;
                        counters.rx_broadcast_packets = broadcast;
                        counters.rx_octets = octets;
                        counters.rx_discards = discards;
                        counters.rx_errors = errors;
                    }
                    None => parsed.skip(REPORT, line, "unreadable receive counters"),
                }
            }
            parsed.value.insert(first.to_string(), counters);
            current = Some(first.to_string());
        } else if let Some(port) = &current
            && parts.len() >= 6
        {
            let Some([unicast, multicast, broadcast, octets, discards, errors]) = numbers::<6>(&parts)
            else {
                parsed.skip(REPORT, line, "unreadable transmit counters");
                continue;
            };
            if let Some(counters) = parsed.value.get_mut(port) {
                counters.tx_unicast_packets = unicast;
                counters.tx_multicast_packets = multicast;
                counters.tx_broadcast_packets = broadcast;
                counters.tx_octets = octets;
                counters.tx_discards = discards;
                counters.tx_errors = errors;
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTERS: &str = "\
Interface  Rx Unicast  Rx Multicast  Rx Broadcast  Rx Octets  Rx Discards  Rx Errors
           Tx Unicast  Tx Multicast  Tx Broadcast  Tx Octets  Tx Discards  Tx Errors
           Rx UnknPro
---------  ----------  ------------  ------------  ---------  -----------  ---------
1/1        1200        30            4             98000      0            1
           900         12            2             64000      0            0
           3
1/2        0           0             0             0          0            0
           0           0             0             0          0            0
           0
";

    #[test]
    fn test_rx_and_tx_rows() {
        let parsed = parse_counters(COUNTERS);
        let c = &parsed.value["1/1"];
        assert_eq!(c.rx_unicast_packets, 1200);
        assert_eq!(c.rx_octets, 98000);
        assert_eq!(c.rx_errors, 1);
        assert_eq!(c.tx_unicast_packets, 900);
        assert_eq!(c.tx_octets, 64000);
        assert_eq!(parsed.value.len(), 2);
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_extra_six_column_row_is_read_as_transmit() {
        // Rows pair by position: the second continuation row overwrites tx.
        let output = "h\nh\nh\nh\n\
1/1  1 1 1 1 1 1
     2 2 2 2 2 2
     7 7 7 7 7 7
";
        let parsed = parse_counters(output);
        assert_eq!(parsed.value["1/1"].tx_unicast_packets, 7);
    }

    #[test]
    fn test_unreadable_row_keeps_zeroes() {
        let output = "h\nh\nh\nh\n1/1  1 x 1 1 1 1\n     2 2 2 2 2 2\n";
        let parsed = parse_counters(output);
        let c = &parsed.value["1/1"];
        assert_eq!(c.rx_unicast_packets, 0);
        assert_eq!(c.tx_unicast_packets, 2);
        assert_eq!(parsed.anomalies.len(), 1);
    }
}
