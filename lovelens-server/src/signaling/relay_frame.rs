use lovelens_core::{CallId, ControlMessage, LinkId, PeerId};
use serde::{Deserialize, Serialize};

/// JSON frames exchanged with remote peers over the relay WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum RelayFrame {
    // client -> relay
    Connect { to: PeerId },
    Send { link: LinkId, message: ControlMessage },
    Close { link: LinkId },
    Call { to: PeerId },
    HangUp { call: CallId },

    // relay -> client
    Open { id: PeerId },
    Connecting { link: LinkId, to: PeerId },
    Connection { link: LinkId, remote: PeerId },
    ConnectionOpen { link: LinkId },
    Message { link: LinkId, message: ControlMessage },
    ConnectionClosed { link: LinkId },
    Calling { call: CallId },
    CallAnswered { call: CallId },
    CallClosed { call: CallId },
    Error { kind: RelayErrorKind, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelayErrorKind {
    PeerUnavailable,
    UnavailableId,
    ChannelClosed,
    Malformed,
}

impl RelayFrame {
    pub fn error(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        RelayFrame::Error {
            kind,
            message: message.into(),
        }
    }
}

/// One video frame uploaded by a relay peer on an outgoing call.
/// Sent as a binary WebSocket message, postcard encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPacket {
    pub call: CallId,
    pub width: u32,
    pub height: u32,
    #[serde(with = "serde_bytes")]
    pub jpeg: Vec<u8>,
}

impl MediaPacket {
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(data)
    }
}
