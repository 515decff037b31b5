//! User-level recalculation
//!
//! [`Recalculator`] turns a progression snapshot into a new [`UserLevel`] and
//! the level changes against the previous one. [`RecalculationService`]
//! performs the read, compute and write against a store as one commit.

use crate::award::{award_experience, merge_domains, ExperienceAward};
use crate::history::{HistoryRecorder, LevelChange};
use crate::{ExpertiseConfig, ExpertiseError};
use chrono::{DateTime, Duration, Utc};
use habitus_domain::{
    ChangeReason, ChangeType, DomainCode, ExpertiseDomain, HabitId, HabitStore, LevelTier,
    LevelUpdate, MetricsSnapshot, ProgressionStore, UserId, UserLevel,
};
use habitus_progression::{
    HabitActivity, ProgressionCalculator, ProgressionConfig, ProgressionSnapshot,
};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// A recalculated user level and what changed
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    /// New aggregate level
    pub user_level: UserLevel,
    /// Overall, continuity and resilience changes
    pub changes: Vec<LevelChange>,
}

/// Metrics snapshot stored alongside history records, taken from the stored level
pub fn metrics_snapshot(level: &UserLevel, top_expertise_average: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        overall_level: level.overall_level,
        continuity_power: f64::from(level.continuity_power),
        resilience_score: f64::from(level.resilience_score),
        top_expertise_average,
        total_experience: level.total_experience,
    }
}

/// Computes user levels under one progression and expertise configuration
#[derive(Debug, Clone)]
pub struct Recalculator {
    calculator: ProgressionCalculator,
    config: ExpertiseConfig,
}

impl Recalculator {
    /// Create a recalculator, validating both configurations
    pub fn new(progression: ProgressionConfig, config: ExpertiseConfig) -> Result<Self, ExpertiseError> {
        config.validate().map_err(ExpertiseError::Config)?;
        Ok(Self {
            calculator: ProgressionCalculator::new(progression)?,
            config,
        })
    }

    /// Progression calculator in use
    pub fn calculator(&self) -> &ProgressionCalculator {
        &self.calculator
    }

    /// Expertise configuration in use
    pub fn config(&self) -> &ExpertiseConfig {
        &self.config
    }

    /// Progression snapshot over habits and the current domain levels
    pub fn snapshot(
        &self,
        activities: &[HabitActivity],
        domains: &[ExpertiseDomain],
        now: DateTime<Utc>,
    ) -> ProgressionSnapshot {
        let levels: Vec<u32> = domains.iter().map(|d| d.expertise_level).collect();
        self.calculator.snapshot(activities, &levels, now)
    }

    /// New user level from `snapshot`, with changes against `previous`
    ///
    /// Continuity and resilience are stored as whole numbers; the overall level
    /// is the weighted sum of exactly those stored values.
    pub fn recalculate(
        &self,
        user_id: UserId,
        previous: Option<&UserLevel>,
        snapshot: &ProgressionSnapshot,
        total_experience: u64,
        now: DateTime<Utc>,
    ) -> Recalculation {
        let continuity_power = snapshot.continuity.continuity_power.round().clamp(0.0, 100.0) as u32;
        let resilience_score = snapshot.resilience.resilience_score.round().clamp(0.0, 100.0) as u32;
        let overall_level = self.calculator.overall_from_average(
            snapshot.top_expertise_average,
            f64::from(continuity_power),
            f64::from(resilience_score),
        );

        let user_level = UserLevel {
            user_id,
            overall_level,
            tier: LevelTier::classify(overall_level),
            continuity_power,
            resilience_score,
            total_experience,
            last_calculated_at: now,
        };

        let reason = ChangeReason::Recalculation;
        let changes = vec![
            LevelChange::user(
                ChangeType::Overall,
                previous.map(|p| p.overall_level),
                user_level.overall_level,
                reason,
            ),
            LevelChange::user(
                ChangeType::Continuity,
                previous.map(|p| p.continuity_power),
                user_level.continuity_power,
                reason,
            ),
            LevelChange::user(
                ChangeType::Resilience,
                previous.map(|p| p.resilience_score),
                user_level.resilience_score,
                reason,
            ),
        ];

        Recalculation { user_level, changes }
    }
}

/// Store-backed recalculation and experience awards
///
/// Every public operation reads the current state, computes, and writes the
/// result with a single [`ProgressionStore::commit`]. Callers must not run two
/// operations for the same user concurrently.
pub struct RecalculationService<S> {
    store: S,
    recalculator: Recalculator,
}

impl<S> RecalculationService<S>
where
    S: HabitStore + ProgressionStore,
    <S as HabitStore>::Error: Display,
    <S as ProgressionStore>::Error: Display,
{
    /// Create a service over `store`
    pub fn new(store: S, progression: ProgressionConfig, config: ExpertiseConfig) -> Result<Self, ExpertiseError> {
        Ok(Self {
            store,
            recalculator: Recalculator::new(progression, config)?,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the store back
    pub fn into_store(self) -> S {
        self.store
    }

    /// Recalculator in use
    pub fn recalculator(&self) -> &Recalculator {
        &self.recalculator
    }

    /// Recalculate a user's level from their habits and domains
    pub fn recalculate_user(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<LevelUpdate, ExpertiseError> {
        let activities = self.activities(user_id, now)?;
        let domains = self.domains(user_id)?;
        self.commit_recalculation(user_id, &activities, domains, Vec::new(), Vec::new(), now)
    }

    /// Award experience for one completion of `habit_id`, then recalculate
    ///
    /// The multiplier comes from the habit's completion rate over the last 30
    /// days. The completion itself should already be in the store.
    pub fn record_activity(
        &mut self,
        habit_id: HabitId,
        base_points: u64,
        now: DateTime<Utc>,
    ) -> Result<LevelUpdate, ExpertiseError> {
        let habit = HabitStore::get_habit(&self.store, habit_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?
            .ok_or_else(|| ExpertiseError::NotFound {
                kind: "habit",
                id: habit_id.to_string(),
            })?;

        let activities = self.activities(habit.user_id, now)?;
        let month_start = now - Duration::days(30);
        let actual = activities
            .iter()
            .find(|a| a.habit.id == habit_id)
            .map(|a| a.completed_since(month_start, now))
            .unwrap_or(0);
        let target = habit.expected_completions_30d().round() as u32;
        let multiplier = self
            .recalculator
            .calculator()
            .multiplier(u32::try_from(actual).unwrap_or(u32::MAX), target);

        let mut domain_codes = Vec::new();
        for raw in &habit.domains {
            match DomainCode::new(raw.as_str()) {
                Ok(code) => domain_codes.push(code),
                Err(e) => warn!("Ignoring domain '{}' of habit {}: {}", raw, habit_id, e),
            }
        }

        let award = ExperienceAward {
            user_id: habit.user_id,
            base_points,
            multiplier,
            domains: domain_codes,
            occurred_at: now,
        };
        let state = self.domains(habit.user_id)?;
        let outcome = award_experience(&state, &award, self.recalculator.config())?;
        debug!(
            "Habit {}: {} x {:.1} = {} xp over {} domain(s)",
            habit_id,
            base_points,
            multiplier,
            outcome.points_awarded,
            outcome.domains.len()
        );

        let merged = merge_domains(&state, &outcome.domains);
        self.commit_recalculation(
            habit.user_id,
            &activities,
            merged,
            outcome.domains,
            outcome.changes,
            now,
        )
    }

    fn commit_recalculation(
        &mut self,
        user_id: UserId,
        activities: &[HabitActivity],
        all_domains: Vec<ExpertiseDomain>,
        touched: Vec<ExpertiseDomain>,
        mut changes: Vec<LevelChange>,
        now: DateTime<Utc>,
    ) -> Result<LevelUpdate, ExpertiseError> {
        let previous = ProgressionStore::user_level(&self.store, user_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;
        let total_experience: u64 = all_domains.iter().map(|d| d.experience_points).sum();

        let snapshot = self.recalculator.snapshot(activities, &all_domains, now);
        let recalculation =
            self.recalculator
                .recalculate(user_id, previous.as_ref(), &snapshot, total_experience, now);
        changes.extend(recalculation.changes);
        let level = recalculation.user_level;

        let mut recorder = HistoryRecorder::new(
            user_id,
            metrics_snapshot(&level, snapshot.top_expertise_average),
            now,
            self.recalculator.config().continuity_history_threshold,
        );
        recorder.record_all(changes)?;

        let update = LevelUpdate {
            user_id,
            user_level: Some(level.clone()),
            domains: touched,
            history: recorder.finish(),
        };

        ProgressionStore::commit(&mut self.store, update.clone())
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;

        info!(
            "User {} at overall level {} ({}), {} history record(s)",
            user_id,
            level.overall_level,
            level.tier.as_str(),
            update.history.len()
        );
        Ok(update)
    }

    fn domains(&self, user_id: UserId) -> Result<Vec<ExpertiseDomain>, ExpertiseError> {
        ProgressionStore::expertise_domains(&self.store, user_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))
    }

    fn activities(&self, user_id: UserId, now: DateTime<Utc>) -> Result<Vec<HabitActivity>, ExpertiseError> {
        let since = now - Duration::days(i64::from(self.recalculator.config().activity_lookback_days));
        let habits = HabitStore::habits_for_user(&self.store, user_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;

        habits
            .into_iter()
            .map(|habit| -> Result<HabitActivity, ExpertiseError> {
                let completions = HabitStore::completions(&self.store, habit.id, since)
                    .map_err(|e| ExpertiseError::Store(e.to_string()))?
                    .into_iter()
                    .map(|c| c.completed_at)
                    .filter(|ts| *ts <= now)
                    .collect();
                Ok(HabitActivity::new(habit, completions))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use habitus_progression::{ContinuityBreakdown, ResilienceBreakdown};

    fn snapshot(average: f64, continuity: f64, resilience: f64) -> ProgressionSnapshot {
        ProgressionSnapshot {
            continuity: ContinuityBreakdown {
                continuity_power: continuity,
                ..Default::default()
            },
            resilience: ResilienceBreakdown {
                resilience_score: resilience,
                ..Default::default()
            },
            top_expertise_average: average,
            overall_raw: 0.5 * average + 0.25 * continuity + 0.25 * resilience,
            overall_level: habitus_progression::overall_level(average, continuity, resilience),
        }
    }

    fn recalculator() -> Recalculator {
        Recalculator::new(ProgressionConfig::default(), ExpertiseConfig::default()).unwrap()
    }

    #[test]
    fn test_first_recalculation_has_no_previous() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let user = UserId::new();
        let result = recalculator().recalculate(user, None, &snapshot(44.0, 99.6, 70.2), 500, now);

        // 0.5·44 + 0.25·100 + 0.25·70 = 64.5
        assert_eq!(result.user_level.overall_level, 64);
        assert_eq!(result.user_level.tier, LevelTier::Apprentice);
        assert_eq!(result.user_level.continuity_power, 100);
        assert_eq!(result.user_level.resilience_score, 70);
        assert_eq!(result.user_level.total_experience, 500);
        assert_eq!(result.changes.len(), 3);
        assert!(result.changes.iter().all(|c| c.old_level.is_none() && c.domain_code.is_none()));
    }

    #[test]
    fn test_changes_carry_previous_values() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let recalculator = recalculator();
        let user = UserId::new();
        let first = recalculator.recalculate(user, None, &snapshot(0.0, 50.0, 70.0), 0, now);
        let second = recalculator.recalculate(user, Some(&first.user_level), &snapshot(4.0, 53.0, 70.0), 0, now);

        let overall = &second.changes[0];
        assert_eq!((overall.old_level, overall.new_level), (Some(30), 32));
        let continuity = &second.changes[1];
        assert_eq!((continuity.old_level, continuity.new_level), (Some(50), 53));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ExpertiseConfig {
            decay_cap_ratio: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            Recalculator::new(ProgressionConfig::default(), config),
            Err(ExpertiseError::Config(_))
        ));
    }

    #[test]
    fn test_overall_follows_stored_metrics() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        // Raw 0.8 overall; the stored 2 and 2 give exactly 1
        let result = recalculator().recalculate(UserId::new(), None, &snapshot(0.0, 1.6, 1.6), 0, now);

        let level = &result.user_level;
        assert_eq!((level.continuity_power, level.resilience_score), (2, 2));
        assert_eq!(
            level.overall_level,
            habitus_progression::overall_level(
                0.0,
                f64::from(level.continuity_power),
                f64::from(level.resilience_score)
            )
        );
        assert_eq!(level.overall_level, 1);
    }

    #[test]
    fn test_metrics_snapshot() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let result = recalculator().recalculate(UserId::new(), None, &snapshot(20.0, 89.6, 70.0), 1234, now);
        let snap = metrics_snapshot(&result.user_level, 20.0);
        // 0.5·20 + 0.25·90 + 0.25·70 = 50
        assert_eq!(snap.overall_level, 50);
        assert_eq!(snap.continuity_power, 90.0);
        assert_eq!(snap.top_expertise_average, 20.0);
        assert_eq!(snap.total_experience, 1234);
    }
}
