//! Trait definitions for external interactions
//!
//! These traits are the small read/write contract between the pure engines
//! and persistence. Implementations live in other crates (habitus-store).

use crate::{
    Completion, ExpertiseDomain, Habit, HabitId, LevelEstimate, LevelHistoryRecord, LevelUpdate,
    RecordId, UserId, UserLevel,
};
use chrono::{DateTime, Utc};

/// Read access to habits and their assessments
///
/// Implemented by the infrastructure layer (habitus-store)
pub trait HabitStore {
    /// Error type for store operations
    type Error;

    /// Get a habit by ID
    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, Self::Error>;

    /// All habits owned by a user
    fn habits_for_user(&self, user: UserId) -> Result<Vec<Habit>, Self::Error>;

    /// Most recent estimate recorded for a habit
    fn latest_estimate(&self, id: HabitId) -> Result<Option<LevelEstimate>, Self::Error>;

    /// Record a new estimate (estimates are never edited)
    fn record_estimate(&mut self, estimate: LevelEstimate) -> Result<RecordId, Self::Error>;

    /// Completions of a habit at or after `since`
    fn completions(&self, id: HabitId, since: DateTime<Utc>) -> Result<Vec<Completion>, Self::Error>;
}

/// Read/write access to progression state
///
/// Implemented by the infrastructure layer (habitus-store). Callers rely on
/// at most one concurrent recalculation per user; `commit` must apply the
/// whole update or nothing.
pub trait ProgressionStore {
    /// Error type for store operations
    type Error;

    /// Users with any progression state
    fn users(&self) -> Result<Vec<UserId>, Self::Error>;

    /// Current level of a user
    fn user_level(&self, user: UserId) -> Result<Option<UserLevel>, Self::Error>;

    /// Expertise domains of a user
    fn expertise_domains(&self, user: UserId) -> Result<Vec<ExpertiseDomain>, Self::Error>;

    /// Level history of a user, oldest first
    fn history(&self, user: UserId) -> Result<Vec<LevelHistoryRecord>, Self::Error>;

    /// Atomically write new state and append history
    fn commit(&mut self, update: LevelUpdate) -> Result<(), Self::Error>;
}
