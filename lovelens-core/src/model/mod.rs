mod commentary;
mod control;
mod identity;
mod link;
mod mode;
mod peer;
mod room;

pub use commentary::{Commentary, Mood};
pub use control::{ControlMessage, Direction};
pub use identity::{RoomIdentity, camera_identifier, host_identifier};
pub use link::{CallId, LinkId, StreamId};
pub use mode::{Language, Layout, Mode};
pub use peer::{DEFAULT_NAMESPACE, PeerId, Role, Slot};
pub use room::RoomCode;
