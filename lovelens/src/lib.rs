pub use lovelens_core::model::{Layout, Mode, PeerId, RoomCode, Slot};
pub use lovelens_core::{LensError, ProtocolError};

pub mod model {
    pub use lovelens_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use lovelens_server::*;
}
