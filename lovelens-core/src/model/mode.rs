use crate::error::LensError;
use crate::model::commentary::Mood;
use crate::model::peer::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Party theme. The host owns it and pushes it to every camera.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Kiss,
    Drink,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Kiss => Mode::Drink,
            Mode::Drink => Mode::Kiss,
        }
    }

    /// Moods the inference service may answer with in this mode.
    pub fn moods(self) -> &'static [Mood] {
        match self {
            Mode::Kiss => &[Mood::Romantic, Mood::Funny, Mood::Hype, Mood::Awkward],
            Mode::Drink => &[Mood::Party, Mood::Funny, Mood::Hype, Mood::Spilled],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Kiss => "KISS",
            Mode::Drink => "DRINK",
        }
    }
}

impl FromStr for Mode {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KISS" => Ok(Mode::Kiss),
            "DRINK" => Ok(Mode::Drink),
            _ => Err(LensError::UnknownValue("mode", s.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which feed(s) the host displays.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "full_cam1")]
    FullCam1,
    #[serde(rename = "full_cam2")]
    FullCam2,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Split, Layout::FullCam1, Layout::FullCam2];

    pub fn full(slot: Slot) -> Self {
        match slot {
            Slot::Cam1 => Layout::FullCam1,
            Slot::Cam2 => Layout::FullCam2,
        }
    }

    /// The slot shown fullscreen, if any.
    pub fn focused_slot(self) -> Option<Slot> {
        match self {
            Layout::Split => None,
            Layout::FullCam1 => Some(Slot::Cam1),
            Layout::FullCam2 => Some(Slot::Cam2),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Split => "split",
            Layout::FullCam1 => "full_cam1",
            Layout::FullCam2 => "full_cam2",
        }
    }
}

impl FromStr for Layout {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "split" => Ok(Layout::Split),
            "full_cam1" | "cam1" => Ok(Layout::FullCam1),
            "full_cam2" | "cam2" => Ok(Layout::FullCam2),
            _ => Err(LensError::UnknownValue("layout", s.to_owned())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language the commentary is requested in.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    Th,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Th => Language::En,
            Language::En => Language::Th,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Th => "TH",
            Language::En => "EN",
        }
    }
}

impl FromStr for Language {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TH" => Ok(Language::Th),
            "EN" => Ok(Language::En),
            _ => Err(LensError::UnknownValue("language", s.to_owned())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
