//! `show sntp client server` and `show sntp client status`.

use super::{Parsed, fields};
use crate::model::NtpStats;

const REPORT: &str = "show sntp client";

/// Lines before the first server row.
const HEADER_LINES: usize = 3;

/// One record per configured server.
///
/// Server rows come in pairs: `index type address-type address ...`
/// followed by a row holding the last request status. A server counts as
/// synchronized only if the client as a whole reports synchronization and
/// its own last request succeeded.
pub fn parse_ntp(server_output: &str, status_output: &str) -> Parsed<Vec<NtpStats>> {
    let mut parsed = Parsed::new(Vec::new());

    let mut hostpoll = 0;
    let mut synchronized = false;
    for line in status_output.trim().lines() {
        if line.contains("Request-interval [s]") {
            match line.rsplit('.').next().map(str::trim).map(str::parse::<u32>) {
                Some(Ok(interval)) => hostpoll = interval,
                _ => parsed.skip(REPORT, line, "unreadable request interval"),
            }
        } else if line.contains("Status") {
            synchronized = line
                .to_ascii_lowercase()
                .contains("synchronized to remote server");
        }
    }

    let rows: Vec<&str> = server_output.trim().split('\n').skip(HEADER_LINES).collect();
    for pair in rows.chunks_exact(2) {
        let (server, status) = (pair[0], pair[1]);
        let parts = fields(server);
        if parts.len() < 4 || !parts[0].bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        parsed.value.push(NtpStats {
            remote: parts[3].to_string(),
            kind: parts[1].to_string(),
            synchronized: synchronized && status.to_ascii_lowercase().contains("success"),
            hostpoll,
            ..Default::default()
        });
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVERS: &str = "\
Index  Type   Addr-Type  Address          Port  Status
       Last request status
-----  -----  ---------  ---------------  ----  ------
1      ucast  ipv4       192.168.1.10     123   active
       success
2      ucast  ipv4       pool.ntp.org     123   active
       timeout
";

    const STATUS: &str = "\
SNTP client status
------------------
Operating mode................................unicast
Request-interval [s]..........................30
Status........................................Synchronized to remote server
";

    #[test]
    fn test_ntp_stats() {
        let parsed = parse_ntp(SERVERS, STATUS);
        let stats = parsed.value;
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].remote, "192.168.1.10");
        assert_eq!(stats[0].kind, "ucast");
        assert_eq!(stats[0].hostpoll, 30);
        assert!(stats[0].synchronized);
        assert!(!stats[1].synchronized);
        assert_eq!(stats[1].remote, "pool.ntp.org");
    }

    #[test]
    fn test_not_synchronized_globally() {
        let parsed = parse_ntp(SERVERS, "Status......Disabled");
        assert!(parsed.value.iter().all(|s| !s.synchronized));
        assert!(parsed.value.iter().all(|s| s.hostpoll == 0));
    }
}
