use crate::model::PeerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LensError {
    #[error("invalid room code {0:?}: expected 3-8 letters or digits")]
    InvalidRoomCode(String),

    #[error("unknown {0} {1:?}")]
    UnknownValue(&'static str, String),

    #[error("peer id {0} is already registered")]
    IdTaken(PeerId),

    /// The target identifier is not registered. For a camera this means the
    /// host is unreachable; it is retried, never fatal.
    #[error("peer {0} is unavailable")]
    PeerUnavailable(PeerId),

    #[error("camera access was denied")]
    MediaPermissionDenied,

    #[error("capture device failed: {0}")]
    CaptureFailed(String),

    #[error("channel closed")]
    ChannelClosed,

    #[error("channel is not open yet")]
    ChannelNotOpen,

    #[error("no active video feed")]
    NoActiveFeed,

    #[error("an analysis is already running")]
    AnalysisInProgress,

    #[error("inference failed: {0}")]
    InferenceFailure(String),

    #[error("session has ended")]
    SessionEnded,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed control message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0} sent in the wrong direction")]
    WrongDirection(&'static str),
}

impl LensError {
    /// Errors the operator must see; everything else is retried or replaced.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            LensError::MediaPermissionDenied | LensError::NoActiveFeed | LensError::InvalidRoomCode(_)
        )
    }
}
