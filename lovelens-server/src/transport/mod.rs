mod connection_registry;
mod control_channel;
mod media_bridge;
mod peer_event;

pub use connection_registry::*;
pub use control_channel::*;
pub use media_bridge::*;
pub use peer_event::*;
