//! Configured progression calculator

use crate::level::{completion_rate, experience_multiplier, overall_level_raw, top_expertise_average};
use crate::metrics::{continuity_power, resilience_score, ContinuityBreakdown, HabitActivity, ResilienceBreakdown};
use crate::{ProgressionConfig, ProgressionError};
use chrono::{DateTime, Utc};
use habitus_domain::clamp_level;

/// All progression metrics of a user at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionSnapshot {
    /// Continuity power and its parts
    pub continuity: ContinuityBreakdown,

    /// Resilience score and its parts
    pub resilience: ResilienceBreakdown,

    /// Mean of the top expertise levels
    pub top_expertise_average: f64,

    /// Overall level before flooring
    pub overall_raw: f64,

    /// Overall level (0-199)
    pub overall_level: u32,
}

/// Computes progression metrics under one configuration
#[derive(Debug, Clone, Default)]
pub struct ProgressionCalculator {
    config: ProgressionConfig,
}

impl ProgressionCalculator {
    /// Create a calculator, rejecting an invalid configuration
    pub fn new(config: ProgressionConfig) -> Result<Self, ProgressionError> {
        config.validate().map_err(ProgressionError::Config)?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Habit continuity power
    pub fn continuity(&self, activities: &[HabitActivity], now: DateTime<Utc>) -> ContinuityBreakdown {
        continuity_power(activities, now, &self.config)
    }

    /// Resilience score
    pub fn resilience(&self, activities: &[HabitActivity], now: DateTime<Utc>) -> ResilienceBreakdown {
        resilience_score(activities, now, &self.config)
    }

    /// Overall level from expertise levels and the two 0-100 metrics
    pub fn overall_level(&self, expertise_levels: &[u32], continuity: f64, resilience: f64) -> u32 {
        let average = top_expertise_average(expertise_levels, self.config.top_expertise_count);
        self.overall_from_average(average, continuity, resilience)
    }

    /// Overall level from an already computed top-expertise average
    pub fn overall_from_average(&self, average: f64, continuity: f64, resilience: f64) -> u32 {
        clamp_level(self.overall_raw(average, continuity, resilience))
    }

    fn overall_raw(&self, average: f64, continuity: f64, resilience: f64) -> f64 {
        overall_level_raw(
            average,
            continuity.clamp(0.0, 100.0),
            resilience.clamp(0.0, 100.0),
            (
                self.config.expertise_weight,
                self.config.continuity_weight,
                self.config.resilience_weight,
            ),
        )
    }

    /// Experience multiplier for `actual` completions against `target`
    pub fn multiplier(&self, actual: u32, target: u32) -> f64 {
        experience_multiplier(completion_rate(actual, target), &self.config.multiplier_tiers)
    }

    /// Every metric at once
    pub fn snapshot(
        &self,
        activities: &[HabitActivity],
        expertise_levels: &[u32],
        now: DateTime<Utc>,
    ) -> ProgressionSnapshot {
        let continuity = self.continuity(activities, now);
        let resilience = self.resilience(activities, now);
        let average = top_expertise_average(expertise_levels, self.config.top_expertise_count);
        let overall_raw = self.overall_raw(
            average,
            continuity.continuity_power,
            resilience.resilience_score,
        );

        ProgressionSnapshot {
            continuity,
            resilience,
            top_expertise_average: average,
            overall_raw,
            overall_level: clamp_level(overall_raw),
        }
    }
}
