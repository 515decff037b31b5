//! Habitus Baby-Step
//!
//! Remediation plans that make a habit easier to keep. Each habit gets two
//! plans:
//!
//! | Plan | Target level | Extra |
//! |------|--------------|-------|
//! | **Lv50** | half of the current level | frequency/duration workload deltas |
//! | **Lv10** | fixed at 10 | two-minute minimal habit |
//!
//! Variables are lowered greedily in a fixed priority order (frequency,
//! duration, complexity, setup/cleanup, travel distance, tools/resources,
//! interruptions) and every new score is snapped back to the discrete grid.
//!
//! # Examples
//!
//! ```
//! use habitus_babystep::{calculate_lv10_target, calculate_lv50_target};
//!
//! assert_eq!(calculate_lv50_target(73), 36);
//! assert_eq!(calculate_lv10_target(73), 10);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod minimal;
mod planner;
mod service;
pub mod tables;

pub use config::BabyStepConfig;
pub use error::PlanError;
pub use minimal::{build_minimal_habit, strip_quantifiers};
pub use planner::{
    calculate_lv10_target, calculate_lv50_target, current_level, difficulty_descriptor,
    reduce_variables, BabySteps, Planner, ReductionOutcome,
};
pub use service::BabyStepService;
