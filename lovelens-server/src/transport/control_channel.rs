use crate::signaling::{PeerEndpoint, Switchboard};
use lovelens_core::{ControlMessage, Direction, LensError, LinkId, PeerId, ProtocolError, Slot};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// One end of a control link between a camera and the host.
///
/// Messages can only be sent once the link reported open. Dropping the
/// channel closes the link on both ends.
pub struct ControlChannel {
    link: LinkId,
    local: PeerId,
    remote: PeerId,
    inbound: Direction,
    state: ChannelState,
    declared: Option<Slot>,
    switchboard: Switchboard,
}

impl ControlChannel {
    /// Camera side: dials `remote`. Fails with `PeerUnavailable` when no peer
    /// is registered under that identifier.
    pub fn dial(endpoint: &PeerEndpoint, remote: &PeerId) -> Result<Self, LensError> {
        let link = endpoint.connect(remote)?;
        Ok(Self {
            link,
            local: endpoint.id().clone(),
            remote: remote.clone(),
            inbound: Direction::HostToCamera,
            state: ChannelState::Connecting,
            declared: None,
            switchboard: endpoint.switchboard().clone(),
        })
    }

    /// Host side: wraps a link dialed by `remote`.
    pub fn accept(endpoint: &PeerEndpoint, link: LinkId, remote: PeerId) -> Self {
        Self {
            link,
            local: endpoint.id().clone(),
            remote,
            inbound: Direction::CameraToHost,
            state: ChannelState::Connecting,
            declared: None,
            switchboard: endpoint.switchboard().clone(),
        }
    }

    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn remote(&self) -> &PeerId {
        &self.remote
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn mark_open(&mut self) {
        if self.state == ChannelState::Connecting {
            self.state = ChannelState::Open;
        }
    }

    /// Slot the remote announced with HELLO.
    pub fn declared(&self) -> Option<Slot> {
        self.declared
    }

    pub fn declare(&mut self, slot: Slot) {
        self.declared = Some(slot);
    }

    pub fn send(&self, message: &ControlMessage) -> Result<(), LensError> {
        if self.state != ChannelState::Open {
            return Err(LensError::ChannelNotOpen);
        }
        let payload = message.encode()?;
        self.switchboard.send(&self.local, self.link, payload)
    }

    /// Decodes an inbound payload, rejecting messages sent the wrong way.
    pub fn receive(&self, payload: &[u8]) -> Result<ControlMessage, ProtocolError> {
        ControlMessage::decode_expecting(payload, self.inbound)
    }

    /// The remote end went away; nothing left to tear down.
    pub fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
    }

    pub fn close(&mut self) {
        if self.state == ChannelState::Closed {
            return;
        }
        self.state = ChannelState::Closed;
        self.switchboard.disconnect(self.link);
        debug!("Control link {} to {} closed", self.link, self.remote);
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        self.close();
    }
}
