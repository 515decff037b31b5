//! Progression state - user level, expertise domains and level history

use crate::error::{DomainError, IssueCode, ValidationIssue};
use crate::ids::{RecordId, UserId};
use crate::tier::LevelTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code of an expertise domain (a life area such as "fitness")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainCode(String);

impl DomainCode {
    /// Reserved code for activities without a classification
    pub const GENERAL: &'static str = "general";

    /// Create a domain code
    ///
    /// # Errors
    /// Returns error if the code is empty after trimming
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err("Domain code cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// The reserved general/unclassified domain
    pub fn general() -> Self {
        Self(Self::GENERAL.to_string())
    }

    /// Get the code as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate level of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLevel {
    /// Owner
    pub user_id: UserId,

    /// Overall level (0-199)
    pub overall_level: u32,

    /// Tier of the overall level
    pub tier: LevelTier,

    /// Habit continuity power (0-100)
    pub continuity_power: u32,

    /// Resilience score (0-100)
    pub resilience_score: u32,

    /// Total experience across all domains
    pub total_experience: u64,

    /// When the level was last recalculated
    pub last_calculated_at: DateTime<Utc>,
}

/// Experience accumulated in one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertiseDomain {
    /// Owner
    pub user_id: UserId,

    /// Domain code
    pub domain_code: DomainCode,

    /// Experience points (never negative)
    pub experience_points: u64,

    /// Current expertise level (0-199), possibly decayed
    pub expertise_level: u32,

    /// Level at the last activity; decay is measured against it
    pub pre_decay_level: u32,

    /// Last activity in this domain; resets the inactivity clock
    pub last_activity_at: DateTime<Utc>,
}

impl ExpertiseDomain {
    /// A fresh domain with no experience
    pub fn empty(user_id: UserId, domain_code: DomainCode, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            domain_code,
            experience_points: 0,
            expertise_level: 0,
            pre_decay_level: 0,
            last_activity_at: now,
        }
    }
}

/// Which level a history record tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Overall user level
    Overall,
    /// Expertise level of one domain
    Expertise,
    /// Habit continuity power
    Continuity,
    /// Resilience score
    Resilience,
}

impl ChangeType {
    /// Get the change type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Overall => "overall",
            ChangeType::Expertise => "expertise",
            ChangeType::Continuity => "continuity",
            ChangeType::Resilience => "resilience",
        }
    }
}

/// What caused a level transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// Periodic or event-driven recalculation
    Recalculation,
    /// Experience was awarded for an activity
    ExperienceAwarded,
    /// Inactivity decay
    InactivityDecay,
}

/// Metrics at the time of a transition
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Overall level
    pub overall_level: u32,
    /// Continuity power
    pub continuity_power: f64,
    /// Resilience score
    pub resilience_score: f64,
    /// Mean of the top expertise levels
    pub top_expertise_average: f64,
    /// Total experience
    pub total_experience: u64,
}

/// An immutable record of one level transition
///
/// Append-only: never mutated or deleted once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelHistoryRecord {
    /// Record id
    pub id: RecordId,

    /// Owner
    pub user_id: UserId,

    /// Which level changed
    pub change_type: ChangeType,

    /// Domain code, present iff `change_type` is `Expertise`
    pub domain_code: Option<DomainCode>,

    /// Previous level, `None` for the first record
    pub old_level: Option<u32>,

    /// New level
    pub new_level: u32,

    /// Cause of the change
    pub reason: ChangeReason,

    /// Metrics at the time of the change
    pub snapshot: MetricsSnapshot,

    /// When the change was recorded
    pub recorded_at: DateTime<Utc>,
}

impl LevelHistoryRecord {
    /// Create a record, enforcing the domain-code rule
    ///
    /// # Errors
    /// Returns a validation error if an expertise record lacks a domain code or
    /// a non-expertise record carries one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        change_type: ChangeType,
        domain_code: Option<DomainCode>,
        old_level: Option<u32>,
        new_level: u32,
        reason: ChangeReason,
        snapshot: MetricsSnapshot,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        match (change_type, &domain_code) {
            (ChangeType::Expertise, None) => {
                return Err(DomainError::Validation(vec![ValidationIssue::new(
                    "domain_code",
                    "expertise records require a domain code",
                    IssueCode::MissingEntries,
                )]));
            }
            (other, Some(code)) if other != ChangeType::Expertise => {
                return Err(DomainError::Validation(vec![ValidationIssue::new(
                    "domain_code",
                    format!("{} records must not carry domain code '{}'", other.as_str(), code),
                    IssueCode::Inconsistent,
                )]));
            }
            _ => {}
        }

        Ok(Self {
            id: RecordId::new(),
            user_id,
            change_type,
            domain_code,
            old_level,
            new_level,
            reason,
            snapshot,
            recorded_at,
        })
    }
}

/// Everything one recalculation writes, applied atomically by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUpdate {
    /// User being updated
    pub user_id: UserId,

    /// New user level, if it was recalculated
    pub user_level: Option<UserLevel>,

    /// Domains whose state changed
    pub domains: Vec<ExpertiseDomain>,

    /// History records to append
    pub history: Vec<LevelHistoryRecord>,
}

impl LevelUpdate {
    /// An update that writes nothing
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            user_level: None,
            domains: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Whether the update carries any write
    pub fn is_empty(&self) -> bool {
        self.user_level.is_none() && self.domains.is_empty() && self.history.is_empty()
    }
}
