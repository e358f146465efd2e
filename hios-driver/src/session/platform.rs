//! HiOS CLI platform definition.

use std::sync::LazyLock;

use regex::bytes::Regex;

/// Prompt ends in `>` (user exec) or `#` (privileged, config), e.g.
/// `(GRS1042-CORE) >` or `(GRS1042-CORE) (Config)#`.
static PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)[\w.\-@()/: ]{1,63}[>#]\s*\z").expect("prompt pattern is valid")
});

static PAGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--More--(?: or \(q\)uit)?").expect("pager pattern is valid")
});

/// Vendor-specific CLI behavior for Hirschmann HiOS.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Platform name.
    pub name: &'static str,

    /// Patterns that indicate command failure.
    pub failed_when_contains: &'static [&'static str],

    /// Commands to run once the shell is up. The first disables paging.
    pub on_open_commands: &'static [&'static str],
}

impl Platform {
    pub fn hios() -> Self {
        Self {
            name: "hios",
            failed_when_contains: &[
                "Error: Invalid command",
                "Error: Incomplete command",
                "Error: Unknown command",
            ],
            on_open_commands: &[DISABLE_PAGINATION],
        }
    }

    pub fn prompt(&self) -> &'static Regex {
        &PROMPT
    }

    pub fn pager(&self) -> &'static Regex {
        &PAGER
    }

    /// First failure marker present in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<String> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(*marker))
            .map(|marker| marker.to_string())
    }

    /// Strip the echoed command and the trailing prompt.
    ///
    /// Returns `(result, prompt)`.
    pub fn normalize_output(&self, raw: &str, command: &str) -> (String, String) {
        let text = raw.replace('\r', "");

        let (body, prompt) = match text.rfind('\n') {
            Some(pos) => (&text[..pos], text[pos + 1..].trim().to_string()),
            None => ("", text.trim().to_string()),
        };

        let body = match body.split_once('\n') {
            Some((first, rest)) if first.contains(command) => rest,
            None if body.contains(command) => "",
            _ => body,
        };

        (body.trim_matches('\n').trim_end().to_string(), prompt)
    }
}

/// `cli numlines 0` turns off the `--More--` pager for the session.
pub const DISABLE_PAGINATION: &str = "cli numlines 0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_match() {
        let platform = Platform::hios();
        let prompt = platform.prompt();
        assert!(prompt.is_match(b"\n(GRS1042-CORE) >"));
        assert!(prompt.is_match(b"\n(GRS1042-CORE) #"));
        assert!(prompt.is_match(b"\n(GRS1042-CORE) (Config)#"));
        assert!(prompt.is_match(b"(BRS50-Office) > "));
        assert!(!prompt.is_match(b"\n1/1  up  Enabled  1000  full  up"));
        assert!(!prompt.is_match(b"(GRS1042-CORE) >\n1/1 up"));
    }

    #[test]
    fn test_pager_match() {
        let platform = Platform::hios();
        assert!(platform.pager().is_match(b"--More-- or (q)uit"));
        assert!(platform.pager().is_match(b"--More--"));
    }

    #[test]
    fn test_detect_failure() {
        let platform = Platform::hios();
        assert_eq!(
            platform.detect_failure("Error: Invalid command 'show ip arp'"),
            Some("Error: Invalid command".to_string())
        );
        assert_eq!(platform.detect_failure("1/1 up"), None);
    }

    #[test]
    fn test_normalize_output() {
        let platform = Platform::hios();
        let raw = "show mtu\r\nInterface MTU\r\n1/1  1518\r\n(GRS1042-CORE) >";
        let (result, prompt) = platform.normalize_output(raw, "show mtu");
        assert_eq!(result, "Interface MTU\n1/1  1518");
        assert_eq!(prompt, "(GRS1042-CORE) >");
    }

    #[test]
    fn test_normalize_output_without_body() {
        let platform = Platform::hios();
        let (result, prompt) = platform.normalize_output("cli numlines 0\r\n(sw) #", "cli numlines 0");
        assert_eq!(result, "");
        assert_eq!(prompt, "(sw) #");
    }
}
