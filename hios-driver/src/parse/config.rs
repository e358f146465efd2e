//! Configuration profile listing and config sanitizing.

/// Placeholder written over secrets.
const MASK: &str = "<removed>";

/// Words that introduce a secret as the last argument of a line.
const SECRET_KEYWORDS: &[&str] = &["password", "passwd", "community", "secret", "key"];

/// Index of the active NVM profile in `show config profiles nvm`.
///
/// The active marker `[x]` sits on the line after the profile's index row.
pub fn active_profile_index(output: &str) -> Option<String> {
    let lines: Vec<&str> = output.lines().collect();
    lines.windows(2).find_map(|pair| {
        pair[1]
            .contains("[x]")
            .then(|| pair[0].split_whitespace().next())
            .flatten()
            .map(str::to_string)
    })
}

/// Mask passwords, community strings and keys in a CLI script.
///
/// On any line containing a secret keyword, the last argument (a quoted
/// string or a single token) is replaced.
pub fn sanitize_config(config: &str) -> String {
    config
        .lines()
        .map(|line| match secret_start(line) {
            Some(at) => format!("{}{MASK}", &line[..at]),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte offset of the secret value on `line`, if any.
fn secret_start(line: &str) -> Option<usize> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let keyword = tokens
        .iter()
        .position(|t| SECRET_KEYWORDS.contains(&t.to_ascii_lowercase().as_str()))?;
    if keyword + 1 >= tokens.len() {
        return None;
    }

    let trimmed = line.trim_end();
    if trimmed.ends_with('"')
        && let Some(open) = trimmed[..trimmed.len() - 1].rfind('"')
    {
        return Some(open);
    }
    trimmed.rfind(char::is_whitespace).map(|ws| ws + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_profile() {
        let output = "\
Index  Name                Date
-----  ------------------  -------------------
1      config              2024-06-19 12:08:11
       [ ]
2      commissioning       2024-07-02 09:15:40
       [x]
";
        assert_eq!(active_profile_index(output).as_deref(), Some("2"));
        assert_eq!(active_profile_index("Index  Name\n1  config\n[ ]"), None);
    }

    #[test]
    fn test_sanitize() {
        let config = "\
hostname GRS1042-CORE
users password admin \"Secret123\"
snmp community ro public
radius server key 1 Sh4red
";
        let clean = sanitize_config(config);
        assert!(clean.contains("hostname GRS1042-CORE"));
        assert!(!clean.contains("Secret123"));
        assert!(!clean.contains("Sh4red"));
        assert!(!clean.contains("public"));
        assert_eq!(clean.matches("<removed>").count(), 3);
    }
}
