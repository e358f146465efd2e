//! `show sfp`.

use indexmap::IndexMap;

use super::{Parsed, fields};
use crate::model::Optics;

const REPORT: &str = "show sfp";

/// Transmit and receive power per port.
///
/// Each module spans two rows. The first holds the port name followed by
/// `SFP <temp> <tx dBm> <...> <rx dBm>`; the position of `SFP` anchors
/// the power columns since the part id before it may contain spaces.
pub fn parse_optics(output: &str) -> Parsed<IndexMap<String, Optics>> {
    let mut parsed = Parsed::new(IndexMap::new());

    let rows: Vec<&str> = output
        .trim()
        .split('\n')
        .filter(|line| {
            !line.starts_with("Part ID") && !line.starts_with("Intf") && !line.starts_with("----")
        })
        .collect();

    for pair in rows.chunks_exact(2) {
        let line = pair[0];
        let parts = fields(line);
        if parts.len() < 6 {
            continue;
        }

        let power = parts.iter().position(|p| *p == "SFP").and_then(|sfp| {
            let tx = parts.get(sfp + 2)?.parse::<f64>().ok()?;
            let rx = parts.get(sfp + 4)?.parse::<f64>().ok()?;
            Some((tx, rx))
        });
        match power {
            Some((tx, rx)) => {
                parsed
                    .value
                    .insert(parts[0].to_string(), Optics::single_lane(tx, rx));
            }
            None => parsed.skip(REPORT, line, "no readable power after SFP column"),
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optics() {
        let output = "\
Intf  Part ID  Type  Temp  Tx Pwr  Tx Bias  Rx Pwr
----  -------  ----  ----  ------  -------  ------
1/5   M-SFP-LX SFP   38    -5.6    12.0     -7.2
      LC connector
1/6   M-SFP-SX SFP   41    n/a     0.0      n/a
      LC connector
";
        let parsed = parse_optics(output);
        assert_eq!(parsed.value.len(), 1);
        let state = &parsed.value["1/5"].physical_channels.channel[0].state;
        assert_eq!(state.output_power.instant, -5.6);
        assert_eq!(state.input_power.instant, -7.2);
        assert_eq!(state.laser_bias_current.instant, 0.0);
        assert_eq!(parsed.anomalies.len(), 1);
    }
}
