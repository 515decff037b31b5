//! Scheduled inactivity decay across all users

use crate::decay::decayed_level;
use crate::history::{HistoryRecorder, LevelChange};
use crate::{ExpertiseConfig, ExpertiseError, SweepMetrics};
use chrono::{DateTime, Utc};
use habitus_domain::{
    ChangeReason, ChangeType, ExpertiseDomain, LevelTier, LevelUpdate, MetricsSnapshot,
    ProgressionStore, UserId,
};
use habitus_progression::{top_expertise_average, ProgressionCalculator};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info};

/// Applies inactivity decay to every user's expertise domains
///
/// Each user's decay, the overall level it implies and the matching history
/// are written with one commit. The overall level is recomputed from the
/// stored continuity and resilience values.
///
/// # Examples
///
/// ```
/// use habitus_domain::ProgressionStore;
/// use habitus_expertise::{DecaySweeper, ExpertiseConfig, ExpertiseError};
///
/// fn nightly<S>(store: &mut S) -> Result<(), ExpertiseError>
/// where
///     S: ProgressionStore,
///     S::Error: std::fmt::Display,
/// {
///     let mut sweeper = DecaySweeper::new(ExpertiseConfig::default());
///     let metrics = sweeper.sweep(store, chrono::Utc::now())?;
///     println!("{}", metrics.summary());
///     Ok(())
/// }
/// ```
pub struct DecaySweeper {
    config: ExpertiseConfig,
    calculator: ProgressionCalculator,
    metrics: SweepMetrics,
}

impl DecaySweeper {
    /// Create a sweeper with the default progression weights
    pub fn new(config: ExpertiseConfig) -> Self {
        Self::with_calculator(config, ProgressionCalculator::default())
    }

    /// Create a sweeper with explicit progression weights
    pub fn with_calculator(config: ExpertiseConfig, calculator: ProgressionCalculator) -> Self {
        Self {
            config,
            calculator,
            metrics: SweepMetrics::new(),
        }
    }

    /// Create a sweeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ExpertiseConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &ExpertiseConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Decay every inactive domain as of `now`
    ///
    /// Returns the updated metrics after the sweep. In dry-run mode nothing
    /// is written.
    pub fn sweep<S>(&mut self, store: &mut S, now: DateTime<Utc>) -> Result<SweepMetrics, ExpertiseError>
    where
        S: ProgressionStore,
        S::Error: Display,
    {
        let start = Instant::now();

        let users = store.users().map_err(|e| ExpertiseError::Store(e.to_string()))?;
        for user_id in users {
            self.sweep_user(store, user_id, now)?;
        }

        self.metrics.record_sweep();
        self.metrics.total_runtime_ms += start.elapsed().as_millis() as u64;

        Ok(self.metrics.clone())
    }

    fn sweep_user<S>(&mut self, store: &mut S, user_id: UserId, now: DateTime<Utc>) -> Result<(), ExpertiseError>
    where
        S: ProgressionStore,
        S::Error: Display,
    {
        let domains = store
            .expertise_domains(user_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;
        self.metrics.record_scan(domains.len());

        let mut decayed: Vec<ExpertiseDomain> = Vec::new();
        let mut changes = Vec::new();
        for domain in &domains {
            let Some(level) = decayed_level(domain, now, &self.config) else {
                continue;
            };
            changes.push(LevelChange::expertise(
                domain.domain_code.clone(),
                Some(domain.expertise_level),
                level,
                ChangeReason::InactivityDecay,
            ));
            decayed.push(ExpertiseDomain {
                expertise_level: level,
                ..domain.clone()
            });
        }

        if decayed.is_empty() {
            return Ok(());
        }

        if self.config.dry_run {
            for change in &changes {
                info!(
                    "DRY RUN: Would decay {:?} for user {} from {:?} to {}",
                    change.domain_code.as_ref().map(|c| c.as_str()),
                    user_id,
                    change.old_level,
                    change.new_level
                );
            }
            self.metrics.dry_run_skipped += decayed.len();
            return Ok(());
        }

        let levels: Vec<u32> = domains
            .iter()
            .map(|d| {
                decayed
                    .iter()
                    .find(|u| u.domain_code == d.domain_code)
                    .map_or(d.expertise_level, |u| u.expertise_level)
            })
            .collect();
        let average = top_expertise_average(&levels, self.calculator.config().top_expertise_count);
        let total_experience: u64 = domains.iter().map(|d| d.experience_points).sum();

        let previous = store
            .user_level(user_id)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;
        let user_level = previous.as_ref().map(|p| {
            let overall = self.calculator.overall_level(
                &levels,
                f64::from(p.continuity_power),
                f64::from(p.resilience_score),
            );
            let mut level = p.clone();
            level.overall_level = overall;
            level.tier = LevelTier::classify(overall);
            level.last_calculated_at = now;
            level
        });

        if let (Some(p), Some(n)) = (&previous, &user_level) {
            if n.overall_level != p.overall_level {
                self.metrics.overall_changes += 1;
            }
            changes.push(LevelChange::user(
                ChangeType::Overall,
                Some(p.overall_level),
                n.overall_level,
                ChangeReason::InactivityDecay,
            ));
        }

        let snapshot = MetricsSnapshot {
            overall_level: user_level.as_ref().map_or(0, |l| l.overall_level),
            continuity_power: previous.as_ref().map_or(0.0, |l| f64::from(l.continuity_power)),
            resilience_score: previous.as_ref().map_or(0.0, |l| f64::from(l.resilience_score)),
            top_expertise_average: average,
            total_experience,
        };
        let mut recorder =
            HistoryRecorder::new(user_id, snapshot, now, self.config.continuity_history_threshold);
        recorder.record_all(changes.iter().cloned())?;
        let recorded = recorder.len();

        let update = LevelUpdate {
            user_id,
            user_level,
            domains: decayed,
            history: recorder.finish(),
        };
        debug!(
            "Decaying {} domain(s) for user {}",
            update.domains.len(),
            user_id
        );
        store
            .commit(update)
            .map_err(|e| ExpertiseError::Store(e.to_string()))?;

        self.metrics.history_recorded += recorded;
        for change in &changes {
            if let (Some(code), Some(old)) = (&change.domain_code, change.old_level) {
                self.metrics.record_decay(code, old.saturating_sub(change.new_level));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use habitus_domain::{DomainCode, LevelHistoryRecord, UserLevel};
    use std::collections::HashMap;

    // Mock store for testing
    #[derive(Default)]
    struct MockStore {
        levels: HashMap<UserId, UserLevel>,
        domains: HashMap<UserId, Vec<ExpertiseDomain>>,
        history: Vec<LevelHistoryRecord>,
        commits: usize,
    }

    impl ProgressionStore for MockStore {
        type Error = String;

        fn users(&self) -> Result<Vec<UserId>, Self::Error> {
            Ok(self.domains.keys().copied().collect())
        }

        fn user_level(&self, user: UserId) -> Result<Option<UserLevel>, Self::Error> {
            Ok(self.levels.get(&user).cloned())
        }

        fn expertise_domains(&self, user: UserId) -> Result<Vec<ExpertiseDomain>, Self::Error> {
            Ok(self.domains.get(&user).cloned().unwrap_or_default())
        }

        fn history(&self, user: UserId) -> Result<Vec<LevelHistoryRecord>, Self::Error> {
            Ok(self.history.iter().filter(|r| r.user_id == user).cloned().collect())
        }

        fn commit(&mut self, update: LevelUpdate) -> Result<(), Self::Error> {
            if let Some(level) = update.user_level {
                self.levels.insert(update.user_id, level);
            }
            let domains = self.domains.entry(update.user_id).or_default();
            for domain in update.domains {
                domains.retain(|d| d.domain_code != domain.domain_code);
                domains.push(domain);
            }
            self.history.extend(update.history);
            self.commits += 1;
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 3, 0, 0).unwrap()
    }

    fn domain(user_id: UserId, code: &str, level: u32, inactive_days: i64) -> ExpertiseDomain {
        ExpertiseDomain {
            user_id,
            domain_code: DomainCode::new(code).unwrap(),
            experience_points: 1000,
            expertise_level: level,
            pre_decay_level: level,
            last_activity_at: now() - Duration::days(inactive_days),
        }
    }

    fn store_with(user_id: UserId, domains: Vec<ExpertiseDomain>) -> MockStore {
        let mut store = MockStore::default();
        store.domains.insert(user_id, domains);
        store.levels.insert(
            user_id,
            UserLevel {
                user_id,
                overall_level: 50,
                tier: LevelTier::Apprentice,
                continuity_power: 80,
                resilience_score: 70,
                total_experience: 2000,
                last_calculated_at: now() - Duration::days(40),
            },
        );
        store
    }

    #[test]
    fn test_sweeper_creation() {
        let sweeper = DecaySweeper::default_config();
        assert_eq!(sweeper.metrics().sweep_count, 0);
        assert!(!sweeper.config().dry_run);
    }

    #[test]
    fn test_sweep_decays_inactive_domains() {
        let user = UserId::new();
        let mut store = store_with(user, vec![domain(user, "fitness", 60, 35), domain(user, "mind", 40, 3)]);
        let mut sweeper = DecaySweeper::default_config();

        let metrics = sweeper.sweep(&mut store, now()).unwrap();
        assert_eq!(metrics.total_decayed(), 1);
        assert_eq!(metrics.total_levels_removed(), 3);
        assert_eq!(metrics.users_scanned, 1);
        assert_eq!(metrics.domains_scanned, 2);

        let fitness = store.domains[&user]
            .iter()
            .find(|d| d.domain_code.as_str() == "fitness")
            .unwrap();
        assert_eq!(fitness.expertise_level, 57);
        assert_eq!(fitness.pre_decay_level, 60);

        // Top levels 57 and 40 average 48.5: 24.25 + 20 + 17.5 = 61.75
        assert_eq!(store.levels[&user].overall_level, 61);

        let reasons: Vec<ChangeReason> = store.history.iter().map(|r| r.reason).collect();
        assert!(reasons.iter().all(|r| *r == ChangeReason::InactivityDecay));
        assert_eq!(store.history.len(), 2);
        assert_eq!(store.commits, 1);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let user = UserId::new();
        let mut store = store_with(user, vec![domain(user, "fitness", 60, 35)]);
        let mut sweeper = DecaySweeper::default_config();

        sweeper.sweep(&mut store, now()).unwrap();
        sweeper.sweep(&mut store, now()).unwrap();

        assert_eq!(store.commits, 1);
        assert_eq!(sweeper.metrics().sweep_count, 2);
        assert_eq!(sweeper.metrics().total_decayed(), 1);
    }

    #[test]
    fn test_sweep_respects_dry_run() {
        let user = UserId::new();
        let mut store = store_with(user, vec![domain(user, "fitness", 60, 35)]);
        let config = ExpertiseConfig {
            dry_run: true,
            ..Default::default()
        };
        let mut sweeper = DecaySweeper::new(config);

        let metrics = sweeper.sweep(&mut store, now()).unwrap();
        assert_eq!(metrics.dry_run_skipped, 1);
        assert_eq!(metrics.total_decayed(), 0);
        assert_eq!(store.commits, 0);
        assert_eq!(store.domains[&user][0].expertise_level, 60);
    }

    #[test]
    fn test_sweep_without_user_level() {
        let user = UserId::new();
        let mut store = MockStore::default();
        store.domains.insert(user, vec![domain(user, "fitness", 100, 1000)]);
        let mut sweeper = DecaySweeper::default_config();

        sweeper.sweep(&mut store, now()).unwrap();
        assert_eq!(store.domains[&user][0].expertise_level, 80);
        assert!(store.levels.is_empty());
        assert_eq!(store.history.len(), 1);
        assert_eq!(store.history[0].domain_code.as_ref().map(|c| c.as_str()), Some("fitness"));
    }

    #[test]
    fn test_metrics_reset() {
        let mut sweeper = DecaySweeper::default_config();
        let mut store = MockStore::default();
        sweeper.sweep(&mut store, now()).unwrap();
        assert_eq!(sweeper.metrics().sweep_count, 1);

        sweeper.reset_metrics();
        assert_eq!(sweeper.metrics().sweep_count, 0);
    }
}
