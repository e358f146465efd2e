//! PTY channel abstraction for interactive sessions.

use std::future::Future;
use std::time::Duration;

use futures_util::FutureExt;
use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Error, Result};

/// Byte-level duplex under a [`PtyChannel`].
///
/// Implemented for russh session channels; tests substitute a scripted peer.
pub trait Wire: Send {
    /// Write bytes to the peer.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next chunk of output. `None` means the peer closed.
    fn recv(&mut self) -> impl Future<Output = Option<Vec<u8>>> + Send;

    /// Close the write side.
    fn shutdown(&mut self) -> impl Future<Output = Result<()>> + Send;
}

impl Wire for Channel<Msg> {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.wait().await? {
                ChannelMsg::Data { ref data } => return Some(data.to_vec()),
                ChannelMsg::ExtendedData { ref data, .. } => return Some(data.to_vec()),
                ChannelMsg::Eof | ChannelMsg::Close => return None,
                _ => {}
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.eof().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

/// High-level PTY channel for interactive device sessions.
///
/// Provides pattern-based reads with a deadline, answering pager prompts
/// along the way.
pub struct PtyChannel<W = Channel<Msg>> {
    wire: W,

    /// Pattern buffer for accumulating output.
    buffer: PatternBuffer,
}

impl<W: Wire> PtyChannel<W> {
    /// Wrap a wire with the given tail search depth.
    pub fn new(wire: W, search_depth: usize) -> Self {
        Self {
            wire,
            buffer: PatternBuffer::new(search_depth),
        }
    }

    /// Send a line of input (newline appended).
    pub async fn send(&mut self, input: &str) -> Result<()> {
        trace!("send: {:?}", input);
        let mut line = Vec::with_capacity(input.len() + 1);
        line.extend_from_slice(input.as_bytes());
        line.push(b'\n');
        self.wire.write(&line).await
    }

    /// Write raw bytes without a trailing newline.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.wire.write(data).await
    }

    /// Read until `prompt` appears in the tail of the buffer.
    ///
    /// Whenever `pager` matches first, the marker is dropped from the buffer
    /// and a space is written to request the next page. Returns everything up
    /// to and including the prompt.
    pub async fn read_until_pattern(
        &mut self,
        prompt: &Regex,
        pager: Option<&Regex>,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(pager) = pager
                && let Some((start, end)) = self.buffer.search_tail(pager)
            {
                trace!("pager marker at {start}..{end}, requesting next page");
                self.buffer.remove(start, end);
                self.wire.write(b" ").await?;
                continue;
            }

            if let Some((_, end)) = self.buffer.search_tail(prompt) {
                let data = self.buffer.split_to(end);
                return Ok(String::from_utf8_lossy(&data).into_owned());
            }

            match tokio::time::timeout_at(deadline, self.wire.recv()).await {
                Ok(Some(chunk)) => self.buffer.extend(&chunk),
                Ok(None) => return Err(ChannelError::Closed.into()),
                Err(_) => return Err(Error::Timeout(timeout)),
            }
        }
    }

    /// Drain whatever output is ready without waiting.
    pub async fn read_available(&mut self) -> Result<String> {
        loop {
            match self.wire.recv().now_or_never() {
                Some(Some(chunk)) => self.buffer.extend(&chunk),
                Some(None) if self.buffer.is_empty() => return Err(ChannelError::Closed.into()),
                Some(None) | None => break,
            }
        }
        let data = self.buffer.take();
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Discard any buffered output.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Close the write side of the channel.
    pub async fn close(&mut self) -> Result<()> {
        self.wire.shutdown().await
    }
}
