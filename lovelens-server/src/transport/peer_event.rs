use crate::media::MediaStream;
use bytes::Bytes;
use lovelens_core::{CallId, LinkId, PeerId};

/// Everything the broker can tell a registered peer.
#[derive(Debug)]
pub enum PeerEvent {
    /// Registration accepted; the peer is reachable under this id.
    Open(PeerId),

    /// A remote peer dialed us.
    Connection { link: LinkId, remote: PeerId },

    /// The link is usable for data in both directions.
    ConnectionOpen { link: LinkId },

    Data { link: LinkId, payload: Bytes },

    ConnectionClosed { link: LinkId },

    /// Incoming media call carrying the caller's stream.
    Call {
        call: CallId,
        remote: PeerId,
        stream: MediaStream,
    },

    CallAnswered { call: CallId },

    CallClosed { call: CallId },
}
