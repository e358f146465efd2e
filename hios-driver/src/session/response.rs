//! Response type for command execution results.

use std::time::Duration;

use serde::Serialize;

/// Response from a command execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    #[serde(skip)]
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the device rejected the command.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Create a failed response.
    pub fn failed(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            failure_message: Some(failure_message.into()),
            ..Self::new(command, result, raw_result, prompt, elapsed)
        }
    }

    /// Canned response for transports without a live shell.
    pub fn canned(command: impl Into<String>, result: impl Into<String>) -> Self {
        let result = result.into();
        Self::new(command, result.clone(), result, "", Duration::ZERO)
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_response_display() {
        let resp = Response::failed(
            "show ip arp",
            "Error: Invalid command 'arp'",
            "show ip arp\r\nError: Invalid command 'arp'\r\n(sw) >",
            "(sw) >",
            Duration::from_millis(12),
            "Error: Invalid command",
        );
        assert!(!resp.is_success());
        assert_eq!(resp.failure_message.as_deref(), Some("Error: Invalid command"));
        assert_eq!(resp.to_string(), "Error: Invalid command 'arp'");
    }

    #[test]
    fn test_canned_response() {
        let resp = Response::canned("show vlan brief", "VLAN Brief output...");
        assert!(resp.is_success());
        assert_eq!(resp.lines().count(), 1);
        assert_eq!(resp.to_string(), "VLAN Brief output...");
    }
}
