//! Habitus Storage Layer
//!
//! Implements the `HabitStore` and `ProgressionStore` traits in memory.
//!
//! # Architecture
//!
//! - Habits, estimates and completions keyed by habit
//! - User levels and expertise domains keyed by user
//! - Level history as one append-only list
//! - `commit` validates the whole update before touching any state
//! - The full state round-trips through JSON for fixtures and backups
//!
//! # Examples
//!
//! ```
//! use habitus_domain::{Frequency, Habit, HabitId, UserId};
//! use habitus_domain::traits::HabitStore;
//! use habitus_store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let habit = Habit {
//!     id: HabitId::new(),
//!     user_id: UserId::new(),
//!     name: "Read 20 pages".to_string(),
//!     frequency: Frequency::Daily,
//!     duration_minutes: 30,
//!     target_count: 0,
//!     level: 0,
//!     domains: vec!["mind".to_string()],
//! };
//! let id = store.put_habit(habit).unwrap();
//! assert!(store.get_habit(id).unwrap().is_some());
//! ```

#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use habitus_domain::traits::{HabitStore, ProgressionStore};
use habitus_domain::{
    ChangeType, Completion, ExpertiseDomain, Habit, HabitId, LevelEstimate, LevelHistoryRecord,
    LevelUpdate, RecordId, UserId, UserLevel, MAX_LEVEL,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced entity is absent
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up
        kind: &'static str,
        /// Its id
        id: String,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A history record with this id already exists
    #[error("Duplicate history record: {0}")]
    DuplicateRecord(RecordId),

    /// Snapshot (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// In-memory implementation of the store traits
///
/// Not synchronized: wrap it in a lock to share it between tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    habits: BTreeMap<HabitId, Habit>,
    estimates: BTreeMap<HabitId, Vec<LevelEstimate>>,
    completions: BTreeMap<HabitId, Vec<DateTime<Utc>>>,
    levels: BTreeMap<UserId, UserLevel>,
    domains: BTreeMap<UserId, Vec<ExpertiseDomain>>,
    history: Vec<LevelHistoryRecord>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a habit
    pub fn put_habit(&mut self, habit: Habit) -> Result<HabitId, StoreError> {
        if habit.level > MAX_LEVEL {
            return Err(StoreError::InvalidData(format!(
                "habit level {} exceeds {}",
                habit.level, MAX_LEVEL
            )));
        }
        if habit.name.trim().is_empty() {
            return Err(StoreError::InvalidData("habit name cannot be empty".to_string()));
        }
        let id = habit.id;
        self.habits.insert(id, habit);
        Ok(id)
    }

    /// Record a completion of a stored habit
    pub fn record_completion(&mut self, habit_id: HabitId, completed_at: DateTime<Utc>) -> Result<(), StoreError> {
        if !self.habits.contains_key(&habit_id) {
            return Err(StoreError::NotFound {
                kind: "habit",
                id: habit_id.to_string(),
            });
        }
        let completions = self.completions.entry(habit_id).or_default();
        let at = completions.partition_point(|ts| *ts <= completed_at);
        completions.insert(at, completed_at);
        Ok(())
    }

    /// Number of history records across all users
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Serialize the whole state to JSON
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a state serialized with [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    fn check_update(&self, update: &LevelUpdate) -> Result<(), StoreError> {
        let user = update.user_id;

        if let Some(level) = &update.user_level {
            if level.user_id != user {
                return Err(StoreError::InvalidData(format!(
                    "user level belongs to {}, update to {}",
                    level.user_id, user
                )));
            }
            if level.overall_level > MAX_LEVEL {
                return Err(StoreError::InvalidData(format!(
                    "overall level {} exceeds {}",
                    level.overall_level, MAX_LEVEL
                )));
            }
        }

        let mut codes = BTreeSet::new();
        for domain in &update.domains {
            if domain.user_id != user {
                return Err(StoreError::InvalidData(format!(
                    "domain {} belongs to {}, update to {}",
                    domain.domain_code, domain.user_id, user
                )));
            }
            if domain.expertise_level > MAX_LEVEL || domain.pre_decay_level > MAX_LEVEL {
                return Err(StoreError::InvalidData(format!(
                    "domain {} level out of range",
                    domain.domain_code
                )));
            }
            if !codes.insert(&domain.domain_code) {
                return Err(StoreError::InvalidData(format!(
                    "domain {} appears twice in one update",
                    domain.domain_code
                )));
            }
        }

        let mut ids = BTreeSet::new();
        for record in &update.history {
            if record.user_id != user {
                return Err(StoreError::InvalidData(format!(
                    "history record {} belongs to {}, update to {}",
                    record.id, record.user_id, user
                )));
            }
            if (record.change_type == ChangeType::Expertise) != record.domain_code.is_some() {
                return Err(StoreError::InvalidData(format!(
                    "history record {} has an inconsistent domain code",
                    record.id
                )));
            }
            if !ids.insert(record.id) || self.history.iter().any(|r| r.id == record.id) {
                return Err(StoreError::DuplicateRecord(record.id));
            }
        }

        Ok(())
    }
}

impl HabitStore for MemoryStore {
    type Error = StoreError;

    fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, Self::Error> {
        Ok(self.habits.get(&id).cloned())
    }

    fn habits_for_user(&self, user: UserId) -> Result<Vec<Habit>, Self::Error> {
        Ok(self
            .habits
            .values()
            .filter(|h| h.user_id == user)
            .cloned()
            .collect())
    }

    fn latest_estimate(&self, id: HabitId) -> Result<Option<LevelEstimate>, Self::Error> {
        Ok(self
            .estimates
            .get(&id)
            .and_then(|list| list.iter().max_by_key(|e| (e.created_at, e.id)))
            .cloned())
    }

    fn record_estimate(&mut self, estimate: LevelEstimate) -> Result<RecordId, Self::Error> {
        let habit_id = estimate
            .habit_id
            .ok_or_else(|| StoreError::InvalidData("estimate has no habit id".to_string()))?;
        if !self.habits.contains_key(&habit_id) {
            return Err(StoreError::NotFound {
                kind: "habit",
                id: habit_id.to_string(),
            });
        }
        let id = estimate.id;
        self.estimates.entry(habit_id).or_default().push(estimate);
        Ok(id)
    }

    fn completions(&self, id: HabitId, since: DateTime<Utc>) -> Result<Vec<Completion>, Self::Error> {
        Ok(self
            .completions
            .get(&id)
            .map(|list| {
                list.iter()
                    .filter(|ts| **ts >= since)
                    .map(|ts| Completion {
                        habit_id: id,
                        completed_at: *ts,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ProgressionStore for MemoryStore {
    type Error = StoreError;

    fn users(&self) -> Result<Vec<UserId>, Self::Error> {
        let users: BTreeSet<UserId> = self.levels.keys().chain(self.domains.keys()).copied().collect();
        Ok(users.into_iter().collect())
    }

    fn user_level(&self, user: UserId) -> Result<Option<UserLevel>, Self::Error> {
        Ok(self.levels.get(&user).cloned())
    }

    fn expertise_domains(&self, user: UserId) -> Result<Vec<ExpertiseDomain>, Self::Error> {
        Ok(self.domains.get(&user).cloned().unwrap_or_default())
    }

    fn history(&self, user: UserId) -> Result<Vec<LevelHistoryRecord>, Self::Error> {
        Ok(self
            .history
            .iter()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect())
    }

    fn commit(&mut self, update: LevelUpdate) -> Result<(), Self::Error> {
        self.check_update(&update)?;

        let LevelUpdate {
            user_id,
            user_level,
            domains,
            history,
        } = update;

        if let Some(level) = user_level {
            self.levels.insert(user_id, level);
        }

        let stored = self.domains.entry(user_id).or_default();
        for domain in domains {
            match stored.iter_mut().find(|d| d.domain_code == domain.domain_code) {
                Some(existing) => *existing = domain,
                None => stored.push(domain),
            }
        }
        stored.sort_by(|a, b| a.domain_code.cmp(&b.domain_code));

        self.history.extend(history);
        Ok(())
    }
}
