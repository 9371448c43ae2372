//! Core enums used throughout the application.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account class that determines resource ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Default tier for every session.
    #[default]
    Free,
    /// Paid tier with higher ceilings and a longer processing timeout.
    Premium,
}

impl Tier {
    /// All tiers, in ascending order of capability.
    pub const ALL: [Tier; 2] = [Tier::Free, Tier::Premium];

    /// Get the display name for this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Premium => "Premium",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            other => Err(format!("unknown tier '{}' (expected 'free' or 'premium')", other)),
        }
    }
}

/// Which generation feature a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Expand each uploaded image into a run of interpolated frames.
    #[default]
    Interpolation,
    /// Turn a single sketch plus a text prompt into an image.
    SketchToImage,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Interpolation => write!(f, "frame interpolation"),
            JobKind::SketchToImage => write!(f, "sketch to image"),
        }
    }
}
