//! Habitus Expertise
//!
//! Experience, expertise levels and their decay.
//!
//! # Overview
//!
//! - **Scaling**: `level = floor(10·log2(xp/100 + 1))`, clamped to 0-199
//! - **Distribution**: an activity's points split evenly over its domains,
//!   remainder to the first; unclassified activities feed `general`
//! - **Decay**: after a 14-day grace period, one level per full week of
//!   inactivity, never more than 20% of the pre-decay level
//! - **History**: every qualifying level transition is appended once
//! - **Recalculation**: the overall user level, written atomically with the
//!   history it produces
//!
//! | Inactive days | Level 100 decays to |
//! |---------------|---------------------|
//! | 0-20 | 100 |
//! | 21-27 | 99 |
//! | 28-34 | 98 |
//! | 154+ | 80 (cap) |
//!
//! # Usage
//!
//! ## Awarding experience
//!
//! ```
//! use chrono::Utc;
//! use habitus_domain::{DomainCode, UserId};
//! use habitus_expertise::{award_experience, ExperienceAward, ExpertiseConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let award = ExperienceAward {
//!     user_id: UserId::new(),
//!     base_points: 200,
//!     multiplier: 1.0,
//!     domains: vec![DomainCode::new("fitness")?, DomainCode::new("health")?],
//!     occurred_at: Utc::now(),
//! };
//!
//! let outcome = award_experience(&[], &award, &ExpertiseConfig::default())?;
//! assert_eq!(outcome.domains[0].expertise_level, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Background decay
//!
//! ```no_run
//! use habitus_domain::ProgressionStore;
//! use habitus_expertise::{DecayWorker, ExpertiseConfig, ExpertiseError};
//!
//! async fn serve<S>(store: S) -> Result<(), ExpertiseError>
//! where
//!     S: ProgressionStore,
//!     S::Error: std::fmt::Display,
//! {
//!     DecayWorker::new(ExpertiseConfig::default()).run(store).await
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! grace_period_days = 14
//! decay_cap_ratio = 0.2
//! continuity_history_threshold = 5
//! sweep_interval_minutes = 1440
//! general_domain_code = "general"
//! activity_lookback_days = 180
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod award;
mod config;
mod decay;
mod error;
mod history;
mod metrics;
mod recalculate;
mod scaling;
mod sweeper;
mod worker;

pub use award::{award_experience, merge_domains, AwardOutcome, ExperienceAward};
pub use config::ExpertiseConfig;
pub use decay::{decay_amount, decay_cap, decayed_level};
pub use error::ExpertiseError;
pub use history::{should_record, HistoryRecorder, LevelChange};
pub use metrics::SweepMetrics;
pub use recalculate::{metrics_snapshot, Recalculation, RecalculationService, Recalculator};
pub use scaling::{distribute_experience, expertise_level};
pub use sweeper::DecaySweeper;
pub use worker::DecayWorker;
