use crate::error::ProtocolError;
use crate::model::mode::{Layout, Mode};
use crate::model::peer::Slot;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HostToCamera,
    CameraToHost,
}

/// Messages carried by a control link, encoded as JSON tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// First message a camera sends once the link is open.
    #[serde(rename = "HELLO")]
    Hello { source: Slot },

    /// Current mode, pushed on open and on every change.
    #[serde(rename = "STATUS")]
    Status { mode: Mode },

    /// Operator asked the host to switch its layout.
    #[serde(rename = "COMMAND")]
    Command { source: Slot, layout: Layout },
}

impl ControlMessage {
    pub fn direction(&self) -> Direction {
        match self {
            ControlMessage::Status { .. } => Direction::HostToCamera,
            ControlMessage::Hello { .. } | ControlMessage::Command { .. } => {
                Direction::CameraToHost
            }
        }
    }

    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Decodes and rejects messages travelling the wrong way.
    pub fn decode_expecting(data: &[u8], direction: Direction) -> Result<Self, ProtocolError> {
        let message = Self::decode(data)?;
        if message.direction() != direction {
            return Err(ProtocolError::WrongDirection(message.type_name()));
        }
        Ok(message)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ControlMessage::Hello { .. } => "HELLO",
            ControlMessage::Status { .. } => "STATUS",
            ControlMessage::Command { .. } => "COMMAND",
        }
    }
}
