use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every identifier the application registers.
pub const DEFAULT_NAMESPACE: &str = "lovelens";

/// One of the two fixed camera positions.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "CAM_1")]
    Cam1,
    #[serde(rename = "CAM_2")]
    Cam2,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Cam1, Slot::Cam2];

    /// Substring embedded in a camera identifier.
    pub fn marker(self) -> &'static str {
        match self {
            Slot::Cam1 => "cam1",
            Slot::Cam2 => "cam2",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::Cam1 => 0,
            Slot::Cam2 => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Role {
    Host,
    Camera(Slot),
}

/// Identifier a peer registers under on the switchboard.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True iff the identifier carries the slot's marker, whatever its suffix.
    pub fn matches_slot(&self, slot: Slot) -> bool {
        self.0.contains(slot.marker())
    }

    pub fn slot(&self) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| self.matches_slot(*slot))
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
