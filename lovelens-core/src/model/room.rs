use crate::error::LensError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_CODE_LEN: usize = 3;
pub const MAX_CODE_LEN: usize = 8;

const GENERATED_CODE_LEN: usize = 4;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short shared token naming a room. Always stored uppercase.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Parses a user-entered code. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, LensError> {
        let code = raw.trim();

        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LensError::InvalidRoomCode(raw.to_owned()));
        }
        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len()) {
            return Err(LensError::InvalidRoomCode(raw.to_owned()));
        }

        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Random 4-character code for a host that did not pick one.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..GENERATED_CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = LensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
