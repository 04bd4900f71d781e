use crate::model::peer::{DEFAULT_NAMESPACE, PeerId, Role, Slot};
use crate::model::room::RoomCode;
use uuid::Uuid;

const HOST_MARKER: &str = "host";
const SUFFIX_LEN: usize = 8;

/// Derives peer identifiers for one room.
///
/// The host identifier is a pure function of the room code, so cameras can
/// find the host without any lookup. Camera identifiers get a fresh random
/// suffix on every call, which lets a refreshed camera rejoin while its
/// previous identifier is still registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomIdentity {
    namespace: String,
    room: RoomCode,
}

impl RoomIdentity {
    pub fn new(namespace: impl Into<String>, room: RoomCode) -> Self {
        Self {
            namespace: namespace.into(),
            room,
        }
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn host_id(&self) -> PeerId {
        PeerId(format!("{}-{}-{}", self.namespace, self.room, HOST_MARKER))
    }

    pub fn camera_id(&self, slot: Slot) -> PeerId {
        let suffix = Uuid::new_v4().simple().to_string();
        PeerId(format!(
            "{}-{}-{}-{}",
            self.namespace,
            self.room,
            slot.marker(),
            &suffix[..SUFFIX_LEN]
        ))
    }

    pub fn peer_id(&self, role: Role) -> PeerId {
        match role {
            Role::Host => self.host_id(),
            Role::Camera(slot) => self.camera_id(slot),
        }
    }
}

pub fn host_identifier(room: &RoomCode) -> PeerId {
    RoomIdentity::new(DEFAULT_NAMESPACE, room.clone()).host_id()
}

pub fn camera_identifier(room: &RoomCode, slot: Slot) -> PeerId {
    RoomIdentity::new(DEFAULT_NAMESPACE, room.clone()).camera_id(slot)
}
