use lovelens_core::{DEFAULT_NAMESPACE, RoomCode, RoomIdentity};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix of every registered identifier.
    pub namespace: String,
    /// Wait between camera connection attempts.
    pub retry_delay: Duration,
    /// How long commentary stays on screen.
    pub commentary_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            retry_delay: Duration::from_secs(3),
            commentary_ttl: Duration::from_secs(8),
        }
    }
}

impl SessionConfig {
    pub fn identity(&self, room: RoomCode) -> RoomIdentity {
        RoomIdentity::new(self.namespace.clone(), room)
    }
}
