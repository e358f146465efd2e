//! Interactive HiOS CLI session over a PTY.

use std::time::{Duration, Instant};

use log::{debug, warn};
use russh::Channel;
use russh::client::Msg;

use super::platform::{DISABLE_PAGINATION, Platform};
use super::response::Response;
use super::retrieval::{NEGATIVE, Retrieval, RetrievalPolicy, RetrievalStage};
use crate::channel::{PtyChannel, Wire};
use crate::error::{Error, Result};

/// Tail search depth for prompt detection.
const SEARCH_DEPTH: usize = 1000;

/// A logged-in HiOS shell.
///
/// Sends one command at a time and waits for the prompt. Paging is switched
/// off once when the session starts; if that fails, `--More--` prompts are
/// answered as they appear.
pub struct ShellSession<W = Channel<Msg>> {
    host: String,
    channel: PtyChannel<W>,
    platform: Platform,
    timeout: Duration,
    pagination_disabled: bool,
}

impl<W: Wire> ShellSession<W> {
    /// Wait for the first prompt, then run the platform's on-open commands.
    pub async fn start(host: impl Into<String>, wire: W, timeout: Duration) -> Result<Self> {
        let mut session = Self {
            host: host.into(),
            channel: PtyChannel::new(wire, SEARCH_DEPTH),
            platform: Platform::hios(),
            timeout,
            pagination_disabled: false,
        };

        session.wait_for_prompt().await?;
        session.run_on_open().await;
        Ok(session)
    }

    async fn wait_for_prompt(&mut self) -> Result<()> {
        let prompt = self.platform.prompt();
        let pager = self.platform.pager();
        match self
            .channel
            .read_until_pattern(prompt, Some(pager), self.timeout)
            .await
        {
            Ok(_) => Ok(()),
            Err(Error::Timeout(_)) => {
                // Some firmware waits for a keypress after the banner.
                debug!("{}: no prompt after login, nudging", self.host);
                self.channel.send("").await?;
                self.channel
                    .read_until_pattern(prompt, Some(pager), self.timeout)
                    .await
                    .map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    async fn run_on_open(&mut self) {
        for command in self.platform.on_open_commands {
            if *command == DISABLE_PAGINATION {
                self.disable_pagination().await;
                continue;
            }
            if let Err(e) = self.send_command(command).await {
                warn!("{}: on-open command '{}' failed: {}", self.host, command, e);
            }
        }
    }

    /// Turn paging off for the rest of the session.
    ///
    /// Best effort: a failure is logged and the session continues with
    /// pager handling. Once disabled it is never retried or reset.
    pub async fn disable_pagination(&mut self) -> bool {
        if self.pagination_disabled {
            return true;
        }

        match self.send_command(DISABLE_PAGINATION).await {
            Ok(resp) if resp.is_success() => {
                self.pagination_disabled = true;
                debug!("{}: pagination disabled", self.host);
            }
            Ok(resp) => warn!(
                "{}: failed to disable pagination: {}",
                self.host,
                resp.failure_message.unwrap_or_default()
            ),
            Err(e) => warn!("{}: failed to disable pagination: {}", self.host, e),
        }
        self.pagination_disabled
    }

    pub fn pagination_disabled(&self) -> bool {
        self.pagination_disabled
    }

    /// Send a command and wait for the prompt.
    ///
    /// A device-reported error is returned as a failed [`Response`]; only
    /// channel loss and timeouts are errors.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        debug!("{}: send_command: {:?}", self.host, command);

        self.channel.send(command).await?;

        let pager = (!self.pagination_disabled).then(|| self.platform.pager());
        let raw = match self
            .channel
            .read_until_pattern(self.platform.prompt(), pager, self.timeout)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                // Partial output must not leak into the next command.
                self.channel.clear_buffer();
                return Err(e);
            }
        };

        let (result, prompt) = self.platform.normalize_output(&raw, command);
        let elapsed = start.elapsed();

        Ok(match self.platform.detect_failure(&result) {
            Some(message) => {
                debug!("{}: '{}' failed: {}", self.host, command, message);
                Response::failed(command, result, raw, prompt, elapsed, message)
            }
            None => Response::new(command, result, raw, prompt, elapsed),
        })
    }

    /// Run a confirmation-driven download such as
    /// `show config profiles nvm <n>` and return its XML payload.
    ///
    /// The session is back at the prompt afterwards, whether or not the
    /// download completed. A dialogue that never confirmed is declined first.
    pub async fn retrieve(&mut self, command: &str, policy: &RetrievalPolicy) -> Result<String> {
        self.channel.clear_buffer();
        let mut retrieval = Retrieval::new(&mut self.channel, policy);
        let result = retrieval.run(command).await;
        let at_prompt = self.platform.prompt().is_match(retrieval.trailing().as_bytes());

        if let Err(Error::ProtocolTimeout {
            stage: RetrievalStage::AwaitingConfirmation,
            ..
        }) = &result
            && let Err(e) = self.channel.write_raw(NEGATIVE).await
        {
            debug!("{}: could not decline stalled retrieval: {}", self.host, e);
        }

        if !at_prompt
            && let Err(e) = self
                .channel
                .read_until_pattern(self.platform.prompt(), None, self.timeout)
                .await
        {
            debug!("{}: no prompt after retrieval: {}", self.host, e);
            self.channel.clear_buffer();
        }
        result
    }

    /// Close the shell channel.
    pub async fn close(&mut self) -> Result<()> {
        self.channel.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ScriptedWire;

    #[tokio::test]
    async fn test_start_disables_pagination() {
        let wire = ScriptedWire::with_chunks(&[
            b"Welcome\r\n(GRS1042-CORE) >",
            b"cli numlines 0\r\n(GRS1042-CORE) >",
            b"show mtu\r\nInterface MTU\r\n1/1  1518\r\n(GRS1042-CORE) >",
        ]);
        let written = wire.clone();

        let mut session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(session.pagination_disabled());

        let resp = session.send_command("show mtu").await.unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.result, "Interface MTU\n1/1  1518");
        assert_eq!(resp.prompt, "(GRS1042-CORE) >");
        assert_eq!(written.written(), "cli numlines 0\nshow mtu\n");
    }

    #[tokio::test]
    async fn test_degraded_pagination() {
        let wire = ScriptedWire::with_chunks(&[
            b"(sw) >",
            b"cli numlines 0\r\nError: Invalid command 'numlines'\r\n(sw) >",
            b"show port\r\n1/1 up\r\n--More-- or (q)uit",
            b"\r\n1/2 down\r\n(sw) >",
        ]);
        let written = wire.clone();

        let mut session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!session.pagination_disabled());

        let resp = session.send_command("show port").await.unwrap();
        assert_eq!(resp.result, "1/1 up\n\n1/2 down");
        assert!(written.written().ends_with("show port\n "));
    }

    #[tokio::test]
    async fn test_device_error_is_tagged_not_raised() {
        let wire = ScriptedWire::with_chunks(&[
            b"(sw) >",
            b"cli numlines 0\r\n(sw) >",
            b"show arp\r\nError: Unknown command\r\n(sw) >",
        ]);
        let mut session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();

        let resp = session.send_command("show arp").await.unwrap();
        assert_eq!(resp.failure_message.as_deref(), Some("Error: Unknown command"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_retrieval_is_declined_and_resynced() {
        let wire = ScriptedWire::with_chunks(&[b"(sw) >", b"cli numlines 0\r\n(sw) >"]);
        let device = wire.clone();
        let mut session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();

        let err = session
            .retrieve("show config profiles nvm 1", &RetrievalPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ProtocolTimeout {
                stage: RetrievalStage::AwaitingConfirmation,
                ..
            }
        ));
        assert!(device.written().ends_with("show config profiles nvm 1\nn\n"));

        device
            .incoming
            .lock()
            .unwrap()
            .push_back(b"show mtu\r\n1/1  1518\r\n(sw) >".to_vec());
        let resp = session.send_command("show mtu").await.unwrap();
        assert_eq!(resp.result, "1/1  1518");
    }

    #[tokio::test]
    async fn test_retrieval_returns_to_prompt() {
        let wire = ScriptedWire::with_chunks(&[
            b"(sw) >",
            b"cli numlines 0\r\n(sw) >",
            b"Display? (Y/N) ?",
            b"<?xml version=\"1.0\"?><Config></Config>\r\n(sw) >",
        ]);
        let device = wire.clone();
        let mut session = ShellSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        let policy = RetrievalPolicy {
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        };

        let payload = session
            .retrieve("show config profiles nvm 1", &policy)
            .await
            .unwrap();
        assert_eq!(payload, "<?xml version=\"1.0\"?><Config></Config>");

        device
            .incoming
            .lock()
            .unwrap()
            .push_back(b"show mtu\r\n1/1  1518\r\n(sw) >".to_vec());
        let resp = session.send_command("show mtu").await.unwrap();
        assert_eq!(resp.result, "1/1  1518");
    }
}
