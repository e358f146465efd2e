//! NETCONF 1.0 client over an SSH subsystem channel.
//!
//! Messages are framed with the `]]>]]>` end-of-message marker. Only the
//! operations the read-only getters need are implemented: `<get>` with a
//! subtree filter and `<close-session/>`.

mod xml;

pub use xml::{XmlElement, text_value};

use std::time::Duration;

use bytes::{Buf, BytesMut};
use log::{debug, trace};
use memchr::memmem;
use russh::Channel;
use russh::client::Msg;
use tokio::time::{Instant, timeout_at};

use crate::channel::Wire;
use crate::error::{ChannelError, Error, NetconfError, Result};

/// Base capability advertised in the client hello.
pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";

/// SSH subsystem name.
pub const SUBSYSTEM: &str = "netconf";

const END_OF_MESSAGE: &[u8] = b"]]>]]>";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// An established NETCONF session.
pub struct NetconfSession<W = Channel<Msg>> {
    host: String,
    wire: W,
    buffer: BytesMut,
    timeout: Duration,
    message_id: u64,
    session_id: Option<u64>,
}

impl<W: Wire> NetconfSession<W> {
    /// Exchange hellos. The server must advertise base:1.0.
    pub async fn start(host: impl Into<String>, wire: W, timeout: Duration) -> Result<Self> {
        let mut session = Self {
            host: host.into(),
            wire,
            buffer: BytesMut::with_capacity(8192),
            timeout,
            message_id: 0,
            session_id: None,
        };

        let hello = format!(
            "{XML_DECLARATION}<hello xmlns=\"{BASE_1_0}\"><capabilities>\
             <capability>{BASE_1_0}</capability></capabilities></hello>"
        );
        session.send_message(&hello).await?;

        let reply = session.read_message().await?;
        let server_hello = XmlElement::parse(&reply)?;
        if server_hello.name != "hello" {
            return Err(NetconfError::Hello(format!("expected <hello>, got <{}>", server_hello.name)).into());
        }
        let has_base = server_hello
            .descendants("capability")
            .iter()
            .any(|c| c.text.trim() == BASE_1_0);
        if !has_base {
            return Err(NetconfError::Hello("server does not support base:1.0".to_string()).into());
        }
        session.session_id = text_value(&server_hello, "session-id", "").parse().ok();

        debug!(
            "{}: NETCONF session {:?} established",
            session.host, session.session_id
        );
        Ok(session)
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session_id
    }

    async fn send_message(&mut self, body: &str) -> Result<()> {
        trace!("{}: netconf send: {}", self.host, body);
        let mut framed = Vec::with_capacity(body.len() + END_OF_MESSAGE.len());
        framed.extend_from_slice(body.as_bytes());
        framed.extend_from_slice(END_OF_MESSAGE);
        self.wire.write(&framed).await
    }

    /// Read one framed message within the session timeout.
    async fn read_message(&mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(end) = memmem::find(&self.buffer, END_OF_MESSAGE) {
                let message = self.buffer.split_to(end);
                self.buffer.advance(END_OF_MESSAGE.len());
                let text = String::from_utf8_lossy(&message).trim().to_string();
                trace!("{}: netconf recv: {}", self.host, text);
                return Ok(text);
            }

            match timeout_at(deadline, self.wire.recv()).await {
                Ok(Some(chunk)) => self.buffer.extend_from_slice(&chunk),
                Ok(None) => return Err(ChannelError::Closed.into()),
                Err(_) => return Err(Error::Timeout(self.timeout)),
            }
        }
    }

    /// Send one `<rpc>` and return the parsed `<rpc-reply>`.
    pub async fn rpc(&mut self, operation: &str) -> Result<XmlElement> {
        self.message_id += 1;
        let request = format!(
            "{XML_DECLARATION}<rpc message-id=\"{}\" xmlns=\"{BASE_1_0}\">{operation}</rpc>",
            self.message_id
        );
        self.send_message(&request).await?;

        let reply = XmlElement::parse(&self.read_message().await?)?;
        if reply.name != "rpc-reply" {
            return Err(NetconfError::Malformed(format!("expected <rpc-reply>, got <{}>", reply.name)).into());
        }
        if let Some(error) = reply.descendant("rpc-error") {
            let message = error
                .find("error-message")
                .map(|m| m.text.trim().to_string())
                .unwrap_or_else(|| text_value(error, "error-tag", "unknown error"));
            return Err(NetconfError::Rpc(message).into());
        }
        Ok(reply)
    }

    /// `<get>` with a subtree filter. Returns the `<data>` element.
    pub async fn get(&mut self, filter: &str) -> Result<XmlElement> {
        debug!("{}: netconf get {}", self.host, filter);
        let reply = self
            .rpc(&format!("<get><filter type=\"subtree\">{filter}</filter></get>"))
            .await?;
        Ok(reply.child("data").cloned().unwrap_or_default())
    }

    /// Send `<close-session/>` and close the channel.
    ///
    /// The reply is awaited but a missing one is not an error.
    pub async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.rpc("<close-session/>").await {
            debug!("{}: close-session: {}", self.host, e);
        }
        self.wire.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ScriptedWire;

    const SERVER_HELLO: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><capabilities>\
<capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>\
<session-id>42</session-id></hello>]]>]]>";

    #[tokio::test]
    async fn test_hello_and_get() {
        let wire = ScriptedWire::with_chunks(&[
            SERVER_HELLO,
            b"<rpc-reply message-id=\"1\"><data><system-info>",
            b"<hostname>GRS1042-CORE</hostname></system-info></data></rpc-reply>]]>]]>",
        ]);
        let written = wire.clone();

        let mut session = NetconfSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(session.session_id(), Some(42));

        let data = session.get("<system-info/>").await.unwrap();
        assert_eq!(text_value(&data, ".//hostname", ""), "GRS1042-CORE");

        let sent = written.written();
        assert!(sent.contains("<capability>urn:ietf:params:netconf:base:1.0</capability>"));
        assert!(sent.contains("<filter type=\"subtree\"><system-info/></filter>"));
        assert_eq!(sent.matches("]]>]]>").count(), 2);
    }

    #[tokio::test]
    async fn test_rpc_error() {
        let wire = ScriptedWire::with_chunks(&[
            SERVER_HELLO,
            b"<rpc-reply message-id=\"1\"><rpc-error><error-tag>operation-not-supported</error-tag>\
<error-message>filter not supported</error-message></rpc-error></rpc-reply>]]>]]>",
        ]);
        let mut session = NetconfSession::start("sw1", wire, Duration::from_secs(1))
            .await
            .unwrap();

        let err = session.get("<snmp/>").await.unwrap_err();
        assert!(matches!(err, Error::Netconf(NetconfError::Rpc(ref m)) if m == "filter not supported"));
    }

    #[tokio::test]
    async fn test_hello_without_base_capability() {
        let wire = ScriptedWire::with_chunks(&[b"<hello><capabilities>\
<capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>]]>]]>"]);
        let result = NetconfSession::start("sw1", wire, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::Netconf(NetconfError::Hello(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_server_times_out() {
        let wire = ScriptedWire::with_chunks(&[]);
        let result = NetconfSession::start("sw1", wire, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
