//! `show users`.

use indexmap::IndexMap;

use super::Parsed;
use crate::model::User;

/// Privilege level for an access role.
fn level(role: &str) -> u8 {
    match role.to_ascii_lowercase().as_str() {
        "administrator" => 15,
        "guest" => 1,
        _ => 0,
    }
}

/// Local accounts keyed by name. Passwords and keys are never reported.
///
/// Each account is a name row followed by an access-role row.
pub fn parse_users(output: &str) -> Parsed<IndexMap<String, User>> {
    let mut parsed = Parsed::new(IndexMap::new());

    let mut rows: Vec<&str> = output
        .trim()
        .split('\n')
        .filter(|line| {
            !line.trim().is_empty()
                && !line.starts_with("User Name")
                && !line.starts_with("----")
                && !line.starts_with("(SNMPv3-")
        })
        .map(str::trim)
        .collect();
    if rows.first().is_some_and(|row| row.starts_with("Access Mode")) {
        rows.remove(0);
    }

    for pair in rows.chunks_exact(2) {
        let (Some(name), Some(role)) = (
            pair[0].split_whitespace().next(),
            pair[1].split_whitespace().next(),
        ) else {
            continue;
        };
        parsed.value.insert(
            name.to_string(),
            User {
                level: level(role),
                ..Default::default()
            },
        );
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users() {
        let output = "\
User Name                        Password    Lockout  Status
Access Mode                      (SNMPv3-Auth/Enc)
-------------------------------  ----------  -------  ------
admin                            ********    false    active
administrator                    md5/des
user                             ********    false    active
guest                            md5/des
ops                              ********    false    active
operator                         md5/des
";
        let parsed = parse_users(output);
        let users = parsed.value;
        assert_eq!(users.keys().collect::<Vec<_>>(), ["admin", "user", "ops"]);
        assert_eq!(users["admin"].level, 15);
        assert_eq!(users["user"].level, 1);
        assert_eq!(users["ops"].level, 0);
        assert!(users["admin"].password.is_empty());
        assert!(users["admin"].sshkeys.is_empty());
    }
}
