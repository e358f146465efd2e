//! Prompt-driven retrieval of configuration profiles.
//!
//! `show config profiles nvm <n>` does not answer like a normal report: the
//! switch first asks for confirmation, then streams the XML profile with no
//! trailing prompt guarantee. This module drives that dialogue as a bounded
//! state machine:
//!
//! ```text
//! Idle -> AwaitingConfirmation -> StreamingPayload -> Complete
//!                 |                       |
//!                 +-------> Failed <------+
//! ```
//!
//! Each waiting state polls the channel a fixed number of times and is also
//! capped by a wall-clock deadline derived from the same policy.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, trace};
use memchr::memmem;
use serde::Deserialize;
use tokio::time::Instant;

use crate::channel::{PtyChannel, Wire};
use crate::device::config::de_millis;
use crate::error::{Error, Result};

/// Token the switch prints when asking to proceed.
pub const CONFIRMATION_TOKEN: &str = "(Y/N) ?";

/// Answer written once the token is seen.
pub const AFFIRMATIVE: &[u8] = b"y\n";

/// Answer that withdraws a dialogue that stalled before confirming.
pub const NEGATIVE: &[u8] = b"n\n";

pub const PAYLOAD_START: &str = "<?xml";
pub const PAYLOAD_END: &str = "</Config>";

/// Raw, unframed access to an interactive channel.
pub trait RawChannel: Send {
    /// Write bytes as-is.
    fn write_raw(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Return whatever output is ready, possibly empty, without waiting.
    fn read_available(&mut self) -> impl Future<Output = Result<String>> + Send;
}

impl<W: Wire> RawChannel for PtyChannel<W> {
    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        PtyChannel::write_raw(self, data).await
    }

    async fn read_available(&mut self) -> Result<String> {
        PtyChannel::read_available(self).await
    }
}

/// Polling bounds for one retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrievalPolicy {
    /// Sleep between polls.
    #[serde(rename = "poll_interval_ms", deserialize_with = "de_millis")]
    pub poll_interval: Duration,

    /// Polls allowed while waiting for the confirmation token.
    pub confirm_attempts: u32,

    /// Polls allowed while waiting for the complete payload.
    pub payload_attempts: u32,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            confirm_attempts: 20,
            payload_attempts: 50,
        }
    }
}

impl RetrievalPolicy {
    /// Wall-clock ceiling for a stage polled `attempts` times.
    fn stage_budget(&self, attempts: u32) -> Duration {
        // One extra interval of slack for the reads themselves.
        self.poll_interval * (attempts + 1)
    }
}

/// The waiting stage a retrieval stalled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStage {
    AwaitingConfirmation,
    StreamingPayload,
}

impl fmt::Display for RetrievalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalStage::AwaitingConfirmation => f.write_str("awaiting confirmation"),
            RetrievalStage::StreamingPayload => f.write_str("streaming payload"),
        }
    }
}

/// Current position in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    Idle,
    AwaitingConfirmation,
    StreamingPayload,
    Complete,
    Failed(RetrievalStage),
}

/// One run of the confirmation dialogue over a raw channel.
pub struct Retrieval<'a, C> {
    channel: &'a mut C,
    policy: &'a RetrievalPolicy,
    state: RetrievalState,
    polls: u32,
    trailing: String,
}

impl<'a, C: RawChannel> Retrieval<'a, C> {
    pub fn new(channel: &'a mut C, policy: &'a RetrievalPolicy) -> Self {
        Self {
            channel,
            policy,
            state: RetrievalState::Idle,
            polls: 0,
            trailing: String::new(),
        }
    }

    pub fn state(&self) -> RetrievalState {
        self.state
    }

    /// Total reads issued so far, across both stages.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Output read after the end marker, typically the returning prompt.
    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    /// Issue `command` and collect the XML payload it produces.
    ///
    /// The result starts at `<?xml` and ends right after `</Config>`.
    pub async fn run(&mut self, command: &str) -> Result<String> {
        let mut line = Vec::with_capacity(command.len() + 1);
        line.extend_from_slice(command.as_bytes());
        line.push(b'\n');
        self.channel.write_raw(&line).await?;
        self.transition(RetrievalState::AwaitingConfirmation);

        let spill = self.await_confirmation().await?;

        self.channel.write_raw(AFFIRMATIVE).await?;
        self.transition(RetrievalState::StreamingPayload);

        let payload = self.stream_payload(spill).await?;
        self.transition(RetrievalState::Complete);
        Ok(payload)
    }

    /// Returns whatever arrived after the token in the same read.
    async fn await_confirmation(&mut self) -> Result<String> {
        let stage = RetrievalStage::AwaitingConfirmation;
        let attempts = self.policy.confirm_attempts;
        let deadline = Instant::now() + self.policy.stage_budget(attempts);
        let mut seen = String::new();

        for attempt in 1..=attempts {
            tokio::time::sleep(self.policy.poll_interval).await;
            seen.push_str(&self.poll(deadline, stage, attempt).await?);
            if let Some(at) = seen.find(CONFIRMATION_TOKEN) {
                return Ok(seen.split_off(at + CONFIRMATION_TOKEN.len()));
            }
        }

        Err(self.fail(stage, attempts))
    }

    async fn stream_payload(&mut self, mut buffer: String) -> Result<String> {
        let stage = RetrievalStage::StreamingPayload;
        let attempts = self.policy.payload_attempts;
        let deadline = Instant::now() + self.policy.stage_budget(attempts);

        if let Some(payload) = self.finish(&buffer) {
            return Ok(payload);
        }

        for attempt in 1..=attempts {
            tokio::time::sleep(self.policy.poll_interval).await;
            buffer.push_str(&self.poll(deadline, stage, attempt).await?);
            if let Some(payload) = self.finish(&buffer) {
                return Ok(payload);
            }
        }

        Err(self.fail(stage, attempts))
    }

    async fn poll(
        &mut self,
        deadline: Instant,
        stage: RetrievalStage,
        attempt: u32,
    ) -> Result<String> {
        self.polls += 1;
        match tokio::time::timeout_at(deadline, self.channel.read_available()).await {
            Ok(read) => {
                let data = read?;
                trace!("{stage}: poll {attempt} read {} bytes", data.len());
                Ok(data)
            }
            Err(_) => Err(self.fail(stage, attempt)),
        }
    }

    fn finish(&mut self, buffer: &str) -> Option<String> {
        let (start, end) = payload_range(buffer)?;
        self.trailing = buffer[end..].to_string();
        Some(buffer[start..end].to_string())
    }

    fn transition(&mut self, next: RetrievalState) {
        debug!("retrieval {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, stage: RetrievalStage, attempts: u32) -> Error {
        self.transition(RetrievalState::Failed(stage));
        Error::ProtocolTimeout { stage, attempts }
    }
}

/// Cut the payload out of `buffer` once both markers are present.
pub fn extract_payload(buffer: &str) -> Option<&str> {
    payload_range(buffer).map(|(start, end)| &buffer[start..end])
}

fn payload_range(buffer: &str) -> Option<(usize, usize)> {
    let bytes = buffer.as_bytes();
    let start = memmem::find(bytes, PAYLOAD_START.as_bytes())?;
    let end = memmem::find(&bytes[start..], PAYLOAD_END.as_bytes())? + start + PAYLOAD_END.len();
    Some((start, end))
}
