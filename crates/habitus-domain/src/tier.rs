//! Tier module - named bands over the 0-199 level scale

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Highest representable level (habit difficulty, expertise and overall)
pub const MAX_LEVEL: u32 = 199;

/// Width of one tier band
const TIER_WIDTH: u32 = 40;

/// Tier of a 0-199 level
///
/// Levels are grouped into five bands of 40:
/// - Novice: 0-39
/// - Apprentice: 40-79
/// - Adept: 80-119
/// - Expert: 120-159
/// - Master: 160-199
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    /// 0-39
    Novice,

    /// 40-79
    Apprentice,

    /// 80-119
    Adept,

    /// 120-159
    Expert,

    /// 160-199
    Master,
}

impl LevelTier {
    /// Classify a level; values above [`MAX_LEVEL`] are treated as the top band
    pub fn classify(level: u32) -> Self {
        match level.min(MAX_LEVEL) / TIER_WIDTH {
            0 => LevelTier::Novice,
            1 => LevelTier::Apprentice,
            2 => LevelTier::Adept,
            3 => LevelTier::Expert,
            _ => LevelTier::Master,
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelTier::Novice => "novice",
            LevelTier::Apprentice => "apprentice",
            LevelTier::Adept => "adept",
            LevelTier::Expert => "expert",
            LevelTier::Master => "master",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "novice" => Some(LevelTier::Novice),
            "apprentice" => Some(LevelTier::Apprentice),
            "adept" => Some(LevelTier::Adept),
            "expert" => Some(LevelTier::Expert),
            "master" => Some(LevelTier::Master),
            _ => None,
        }
    }

    /// Lowest level belonging to this tier
    pub fn min_level(&self) -> u32 {
        *self as u32 * TIER_WIDTH
    }

    /// Highest level belonging to this tier
    pub fn max_level(&self) -> u32 {
        (self.min_level() + TIER_WIDTH - 1).min(MAX_LEVEL)
    }

    /// Get the next tier up
    pub fn next(&self) -> Option<Self> {
        match self {
            LevelTier::Novice => Some(LevelTier::Apprentice),
            LevelTier::Apprentice => Some(LevelTier::Adept),
            LevelTier::Adept => Some(LevelTier::Expert),
            LevelTier::Expert => Some(LevelTier::Master),
            LevelTier::Master => None,
        }
    }
}

impl std::str::FromStr for LevelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tier: {}", s))
    }
}

/// Floor a raw level and clamp it into [0, 199]
///
/// NaN and negative values map to 0. Flooring happens before clamping.
pub fn clamp_level(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    let floored = raw.floor();
    if floored >= MAX_LEVEL as f64 {
        MAX_LEVEL
    } else {
        floored as u32
    }
}

/// Reject a level outside [0, `MAX_LEVEL`] with a range error
pub fn check_level(field: &str, level: i64) -> Result<u32, DomainError> {
    if (0..=MAX_LEVEL as i64).contains(&level) {
        Ok(level as u32)
    } else {
        Err(DomainError::Range {
            field: field.to_string(),
            value: level as f64,
            min: 0.0,
            max: MAX_LEVEL as f64,
        })
    }
}
