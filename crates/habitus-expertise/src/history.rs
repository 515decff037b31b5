//! Level history recording
//!
//! Engines describe what moved as [`LevelChange`]s; the [`HistoryRecorder`]
//! filters them through the recording rules and stamps the survivors with
//! one metrics snapshot.

use crate::ExpertiseError;
use chrono::{DateTime, Utc};
use habitus_domain::{
    ChangeReason, ChangeType, DomainCode, LevelHistoryRecord, MetricsSnapshot, UserId,
};

/// One level transition, before the recording rules are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    /// Which level moved
    pub change_type: ChangeType,
    /// Domain, for expertise changes
    pub domain_code: Option<DomainCode>,
    /// Previous value, `None` if there was none
    pub old_level: Option<u32>,
    /// New value
    pub new_level: u32,
    /// Cause
    pub reason: ChangeReason,
}

impl LevelChange {
    /// An expertise change in `domain_code`
    pub fn expertise(
        domain_code: DomainCode,
        old_level: Option<u32>,
        new_level: u32,
        reason: ChangeReason,
    ) -> Self {
        Self {
            change_type: ChangeType::Expertise,
            domain_code: Some(domain_code),
            old_level,
            new_level,
            reason,
        }
    }

    /// An overall, continuity or resilience change
    pub fn user(change_type: ChangeType, old_level: Option<u32>, new_level: u32, reason: ChangeReason) -> Self {
        Self {
            change_type,
            domain_code: None,
            old_level,
            new_level,
            reason,
        }
    }
}

/// Whether a transition deserves a history record
///
/// The first value is always recorded. Continuity needs a move of more
/// than `continuity_threshold`; every other type records any change.
pub fn should_record(change_type: ChangeType, old: Option<u32>, new: u32, continuity_threshold: u32) -> bool {
    match old {
        None => true,
        Some(old) if change_type == ChangeType::Continuity => old.abs_diff(new) > continuity_threshold,
        Some(old) => old != new,
    }
}

/// Collects history records for one commit
#[derive(Debug)]
pub struct HistoryRecorder {
    user_id: UserId,
    snapshot: MetricsSnapshot,
    recorded_at: DateTime<Utc>,
    continuity_threshold: u32,
    records: Vec<LevelHistoryRecord>,
}

impl HistoryRecorder {
    /// Start recording for `user_id` with the metrics at `recorded_at`
    pub fn new(
        user_id: UserId,
        snapshot: MetricsSnapshot,
        recorded_at: DateTime<Utc>,
        continuity_threshold: u32,
    ) -> Self {
        Self {
            user_id,
            snapshot,
            recorded_at,
            continuity_threshold,
            records: Vec::new(),
        }
    }

    /// Record a change if it qualifies; returns whether it did
    pub fn record(&mut self, change: LevelChange) -> Result<bool, ExpertiseError> {
        if !should_record(
            change.change_type,
            change.old_level,
            change.new_level,
            self.continuity_threshold,
        ) {
            return Ok(false);
        }

        let record = LevelHistoryRecord::new(
            self.user_id,
            change.change_type,
            change.domain_code,
            change.old_level,
            change.new_level,
            change.reason,
            self.snapshot,
            self.recorded_at,
        )?;
        self.records.push(record);
        Ok(true)
    }

    /// Record every qualifying change
    pub fn record_all(&mut self, changes: impl IntoIterator<Item = LevelChange>) -> Result<(), ExpertiseError> {
        for change in changes {
            self.record(change)?;
        }
        Ok(())
    }

    /// Records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing qualified
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take the records
    pub fn finish(self) -> Vec<LevelHistoryRecord> {
        self.records
    }
}
