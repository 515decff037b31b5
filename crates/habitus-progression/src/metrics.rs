//! Habit continuity power and resilience score
//!
//! Both metrics are on a 0-100 scale and are recomputed from scratch from a
//! user's habits and completion timestamps.

use crate::streak::current_streak;
use crate::ProgressionConfig;
use chrono::{DateTime, Duration, Utc};
use habitus_domain::Habit;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A habit together with its completion timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct HabitActivity {
    /// Habit metadata
    pub habit: Habit,

    /// Completion timestamps, any order
    pub completions: Vec<DateTime<Utc>>,
}

impl HabitActivity {
    /// Bundle a habit with its completions
    pub fn new(habit: Habit, completions: Vec<DateTime<Utc>>) -> Self {
        Self { habit, completions }
    }

    /// Completions inside `[since, now]`
    pub fn completed_since(&self, since: DateTime<Utc>, now: DateTime<Utc>) -> usize {
        self.completions
            .iter()
            .filter(|ts| **ts >= since && **ts <= now)
            .count()
    }
}

/// Components and total of habit continuity power
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContinuityBreakdown {
    /// Level-weighted streak, 0-100
    pub weighted_streak: f64,
    /// Completion rate over the streak window, 0-100
    pub completion_rate: f64,
    /// Share of habits active in the active window, 0-100
    pub active_ratio: f64,
    /// Weighted sum, 0-100
    pub continuity_power: f64,
}

/// Components and total of the resilience score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResilienceBreakdown {
    /// Breaks observed, resumed or not
    pub breaks: u32,
    /// Breaks after which the habit resumed
    pub recoveries: u32,
    /// Recovery speed, 0-100
    pub recovery_rate: f64,
    /// Bounce-back credit, 0-100
    pub bounce_back: f64,
    /// Share of broken streaks rebuilt, 0-100
    pub streak_recovery_ratio: f64,
    /// Weighted sum, 0-100
    pub resilience_score: f64,
}

/// Habit continuity power
///
/// `0.4·weightedStreak + 0.3·completion30d + 0.3·activeRatio` with the
/// weights and windows taken from `config`. Streaks are weighted by habit
/// level; when every habit is at level 0 they count equally.
pub fn continuity_power(
    activities: &[HabitActivity],
    now: DateTime<Utc>,
    config: &ProgressionConfig,
) -> ContinuityBreakdown {
    if activities.is_empty() {
        return ContinuityBreakdown::default();
    }

    let window = config.streak_window_days as f64;
    let today = now.date_naive();

    let total_weight: f64 = activities.iter().map(|a| a.habit.level as f64 / 100.0).sum();
    let weight_of = |activity: &HabitActivity| {
        if total_weight > 0.0 {
            activity.habit.level as f64 / 100.0
        } else {
            1.0
        }
    };
    let weight_sum = if total_weight > 0.0 {
        total_weight
    } else {
        activities.len() as f64
    };
    let streak_sum: f64 = activities
        .iter()
        .map(|a| {
            let streak = current_streak(&a.completions, today).min(config.streak_window_days);
            streak as f64 * weight_of(a)
        })
        .sum();
    let weighted_streak = (streak_sum / (window * weight_sum) * 100.0).clamp(0.0, 100.0);

    let window_start = now - Duration::days(i64::from(config.streak_window_days));
    let actual: usize = activities.iter().map(|a| a.completed_since(window_start, now)).sum();
    let expected: f64 = activities
        .iter()
        .map(|a| {
            if a.habit.target_count > 0 {
                a.habit.target_count as f64 * window / 30.0
            } else {
                a.habit.frequency.expected_completions(config.streak_window_days)
            }
        })
        .sum();
    let completion_rate = if expected > 0.0 {
        (actual as f64 / expected * 100.0).min(100.0)
    } else {
        0.0
    };

    let active_start = now - Duration::days(i64::from(config.active_window_days));
    let active = activities
        .iter()
        .filter(|a| a.completed_since(active_start, now) > 0)
        .count();
    let active_ratio = active as f64 / activities.len() as f64 * 100.0;

    let continuity_power = (config.streak_weight * weighted_streak
        + config.completion_weight * completion_rate
        + config.active_weight * active_ratio)
        .clamp(0.0, 100.0);

    ContinuityBreakdown {
        weighted_streak,
        completion_rate,
        active_ratio,
        continuity_power,
    }
}

/// Resilience score
///
/// A break is a gap between completions longer than `break_multiplier`
/// times the habit's expected gap; a gap still open at `now` counts as an
/// unresumed break. For each resumed break the recovery time is the gap
/// minus the expected gap, and the streak counts as rebuilt when the run of
/// on-schedule completions after the break is at least as long as the run
/// before it.
pub fn resilience_score(
    activities: &[HabitActivity],
    now: DateTime<Utc>,
    config: &ProgressionConfig,
) -> ResilienceBreakdown {
    let mut breaks = 0u32;
    let mut recoveries = 0u32;
    let mut rebuilt = 0u32;
    let mut recovery_days = 0.0;

    for activity in activities {
        let mut times: Vec<DateTime<Utc>> = activity
            .completions
            .iter()
            .copied()
            .filter(|ts| *ts <= now)
            .collect();
        times.sort();
        let Some(last) = times.last().copied() else {
            continue;
        };

        let expected_gap = activity.habit.frequency.expected_gap_days();
        let threshold = config.break_multiplier * expected_gap;
        let gap_days = |a: DateTime<Utc>, b: DateTime<Utc>| (b - a).num_seconds() as f64 / SECONDS_PER_DAY;

        // Lengths of on-schedule runs, split at breaks
        let mut runs = vec![1u32];
        for pair in times.windows(2) {
            let gap = gap_days(pair[0], pair[1]);
            if gap > threshold {
                breaks += 1;
                recoveries += 1;
                recovery_days += (gap - expected_gap).max(0.0);
                runs.push(1);
            } else if let Some(run) = runs.last_mut() {
                *run += 1;
            }
        }
        rebuilt += runs
            .windows(2)
            .filter(|pair| pair[1] >= pair[0])
            .count() as u32;

        if gap_days(last, now) > threshold {
            breaks += 1;
        }
    }

    let recovery_rate = if breaks == 0 {
        100.0
    } else if recoveries == 0 {
        0.0
    } else {
        let average = recovery_days / recoveries as f64;
        ((7.0 - average) / 6.0 * 100.0).clamp(0.0, 100.0)
    };
    let bounce_back = (recoveries as f64 * 10.0).min(100.0);
    let streak_recovery_ratio = if breaks == 0 {
        100.0
    } else {
        rebuilt as f64 / breaks as f64 * 100.0
    };

    let resilience_score = (config.recovery_weight * recovery_rate
        + config.bounce_back_weight * bounce_back
        + config.streak_recovery_weight * streak_recovery_ratio)
        .clamp(0.0, 100.0);

    ResilienceBreakdown {
        breaks,
        recoveries,
        recovery_rate,
        bounce_back,
        streak_recovery_ratio,
        resilience_score,
    }
}
