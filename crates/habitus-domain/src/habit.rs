//! Habit metadata and completion events, supplied read-only by persistence

use crate::ids::{HabitId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often a habit is meant to be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Three times per week
    ThreePerWeek,
    /// Once per week
    Weekly,
    /// Once every two weeks
    Biweekly,
    /// Once per month
    Monthly,
}

impl Frequency {
    /// Expected number of days between completions
    pub fn expected_gap_days(&self) -> f64 {
        match self {
            Frequency::Daily => 1.0,
            Frequency::ThreePerWeek => 7.0 / 3.0,
            Frequency::Weekly => 7.0,
            Frequency::Biweekly => 14.0,
            Frequency::Monthly => 30.0,
        }
    }

    /// Expected completions over a window of `days`
    pub fn expected_completions(&self, days: u32) -> f64 {
        days as f64 / self.expected_gap_days()
    }

    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::ThreePerWeek => "3x/week",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Parse from the label or snake_case name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "3x/week" | "three_per_week" => Some(Frequency::ThreePerWeek),
            "weekly" => Some(Frequency::Weekly),
            "biweekly" => Some(Frequency::Biweekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}

/// A tracked habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Habit id
    pub id: HabitId,

    /// Owner
    pub user_id: UserId,

    /// Display name (e.g. "Run 30 minutes every morning")
    pub name: String,

    /// Planned frequency
    pub frequency: Frequency,

    /// Planned minutes per occurrence
    pub duration_minutes: u32,

    /// Planned completions per 30 days (0 = derive from frequency)
    pub target_count: u32,

    /// Current difficulty level (0-199), weights streaks
    pub level: u32,

    /// Expertise domains this habit trains
    pub domains: Vec<String>,
}

impl Habit {
    /// Planned completions over a 30-day window
    pub fn expected_completions_30d(&self) -> f64 {
        if self.target_count > 0 {
            self.target_count as f64
        } else {
            self.frequency.expected_completions(30)
        }
    }
}

/// A single completion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Habit completed
    pub habit_id: HabitId,

    /// When it was completed
    pub completed_at: DateTime<Utc>,
}
