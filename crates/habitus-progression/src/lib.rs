//! Habitus Progression
//!
//! Pure formulas over a user's habits and completions:
//!
//! | Metric | Formula |
//! |--------|---------|
//! | Habit continuity power | `0.4·weightedStreak + 0.3·completion30d + 0.3·activeRatio` |
//! | Resilience | `0.5·recoveryRate + 0.3·bounceBack + 0.2·streakRecoveryRatio` |
//! | Overall level | `floor(clamp(0.5·topExpertiseAvg + 0.25·continuity + 0.25·resilience, 0, 199))` |
//! | Experience multiplier | piecewise on `min(500, 100·actual/target)` |
//!
//! Nothing here performs I/O or logs; callers feed in habits and timestamps
//! read from the store.

#![warn(missing_docs)]

mod calculator;
mod config;
mod error;
mod level;
mod metrics;
mod streak;

pub use calculator::{ProgressionCalculator, ProgressionSnapshot};
pub use config::{MultiplierTier, ProgressionConfig};
pub use error::ProgressionError;
pub use level::{
    completion_rate, experience_multiplier, is_valid_level, overall_level, overall_level_raw,
    top_expertise_average,
};
pub use metrics::{
    continuity_power, resilience_score, ContinuityBreakdown, HabitActivity, ResilienceBreakdown,
};
pub use streak::{calculate_streaks, current_streak, StreakStats};
