use anyhow::{Context, Result, bail};
use bytes::Bytes;
use lovelens_core::{ControlMessage, LinkId, PeerId};
use lovelens_server::{ControlChannel, PeerEndpoint, PeerEvent, Switchboard};
use std::time::Duration;

/// Timeout for a single broker event (ms, virtual time).
pub const EVENT_TIMEOUT_MS: u64 = 5_000;

/// A bare peer driven by the test, used to observe the wire protocol
/// without a camera session in between.
pub struct ProbePeer {
    endpoint: PeerEndpoint,
    channel: Option<ControlChannel>,
}

impl ProbePeer {
    pub fn register(board: &Switchboard, id: PeerId) -> Result<Self> {
        let endpoint = board.register(id).context("Failed to register probe")?;
        Ok(Self {
            endpoint,
            channel: None,
        })
    }

    pub fn id(&self) -> &PeerId {
        self.endpoint.id()
    }

    pub fn link(&self) -> Option<LinkId> {
        self.channel.as_ref().map(ControlChannel::link)
    }

    async fn next_event(&mut self) -> Result<PeerEvent> {
        tokio::time::timeout(
            Duration::from_millis(EVENT_TIMEOUT_MS),
            self.endpoint.next_event(),
        )
        .await
        .context("Timeout waiting for broker event")?
        .context("Probe was unregistered")
    }

    /// Dials `host` and waits until the link is open.
    pub async fn connect(&mut self, host: &PeerId) -> Result<()> {
        let channel = ControlChannel::dial(&self.endpoint, host).context("Dial failed")?;
        let link = channel.link();
        self.channel = Some(channel);

        loop {
            match self.next_event().await? {
                PeerEvent::ConnectionOpen { link: open } if open == link => break,
                _ => continue,
            }
        }
        if let Some(channel) = self.channel.as_mut() {
            channel.mark_open();
        }
        Ok(())
    }

    pub fn send(&self, message: &ControlMessage) -> Result<()> {
        let channel = self.channel.as_ref().context("Not connected")?;
        channel.send(message).context("Send failed")
    }

    /// Sends bytes that bypass message encoding.
    pub fn send_raw(&self, payload: &'static [u8]) -> Result<()> {
        let link = self.link().context("Not connected")?;
        self.endpoint
            .switchboard()
            .send(self.endpoint.id(), link, Bytes::from_static(payload))
            .context("Send failed")
    }

    /// Next control message from the host.
    pub async fn next_message(&mut self) -> Result<ControlMessage> {
        loop {
            match self.next_event().await? {
                PeerEvent::Data { payload, .. } => {
                    return ControlMessage::decode(&payload).context("Undecodable message");
                }
                PeerEvent::ConnectionClosed { .. } => bail!("Link closed while waiting for message"),
                _ => continue,
            }
        }
    }

    /// Waits until the host closes the link.
    pub async fn wait_closed(&mut self) -> Result<()> {
        loop {
            if let PeerEvent::ConnectionClosed { link } = self.next_event().await? {
                if Some(link) == self.link() {
                    if let Some(channel) = self.channel.as_mut() {
                        channel.mark_closed();
                    }
                    return Ok(());
                }
            }
        }
    }
}
