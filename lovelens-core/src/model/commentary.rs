use crate::error::LensError;
use crate::model::mode::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

const FALLBACK_TEXT: &str = "Technical difficulties! But the party goes on!";
const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Romantic,
    Funny,
    Hype,
    Awkward,
    Party,
    Spilled,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Romantic => "romantic",
            Mood::Funny => "funny",
            Mood::Hype => "hype",
            Mood::Awkward => "awkward",
            Mood::Party => "party",
            Mood::Spilled => "spilled",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short announcer line shown over the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    pub text: String,
    pub mood: Mood,
    pub score: u8,
}

impl Commentary {
    /// Neutral record shown whenever the inference service lets us down.
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_owned(),
            mood: Mood::Funny,
            score: 0,
        }
    }

    /// Checks a record against what `mode` allows.
    pub fn validate(self, mode: Mode) -> Result<Self, LensError> {
        if self.text.trim().is_empty() {
            return Err(LensError::InferenceFailure("empty commentary text".into()));
        }
        if self.score > MAX_SCORE {
            return Err(LensError::InferenceFailure(format!(
                "score {} out of range",
                self.score
            )));
        }
        if !mode.moods().contains(&self.mood) {
            return Err(LensError::InferenceFailure(format!(
                "mood {} not allowed in {} mode",
                self.mood, mode
            )));
        }
        Ok(self)
    }
}
