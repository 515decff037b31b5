//! Habitus Domain Layer
//!
//! This crate contains the data model and the leaf primitives shared by the
//! assessment and progression engines. It carries no engine logic beyond the
//! primitives; engines live in their own crates and depend on this one.
//!
//! ## Key Concepts
//!
//! - **DiscreteScore**: the 7-value score grid every THLI-24 variable lives on
//! - **Stoplight**: green/yellow/red classification of a variable score
//! - **LevelTier**: named band of a 0-199 level
//! - **Fact / Variable**: collaborator-supplied evidence about a habit
//! - **LevelEstimate**: the bounded, auditable difficulty assessment
//! - **UserLevel / ExpertiseDomain / LevelHistoryRecord**: progression state
//!
//! ## Architecture
//!
//! - Pure value types and deterministic primitives only
//! - Persistence is reached through the traits in [`traits`]; implementations
//!   live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod estimate;
pub mod fact;
pub mod habit;
pub mod ids;
pub mod plan;
pub mod progression;
pub mod score;
pub mod tier;
pub mod traits;
pub mod variable;

// Re-exports for convenience
pub use error::{DomainError, IssueCode, ValidationIssue};
pub use estimate::{ExpectedRange, FirewallDecision, FirewallReason, LevelEstimate, VoiQuestion};
pub use fact::{EvidenceTier, Fact, FactId, FactValue, Provenance, UncertaintyTier};
pub use habit::{Completion, Frequency, Habit};
pub use ids::{HabitId, RecordId, UserId};
pub use plan::{
    BabyStepPlan, DifficultyDescriptor, MinimalHabit, PlanKind, VariableReduction, WorkloadDelta,
};
pub use progression::{
    ChangeReason, ChangeType, DomainCode, ExpertiseDomain, LevelHistoryRecord, LevelUpdate,
    MetricsSnapshot, UserLevel,
};
pub use score::{DiscreteScore, Stoplight};
pub use tier::{clamp_level, check_level, LevelTier, MAX_LEVEL};
pub use traits::{HabitStore, ProgressionStore};
pub use variable::{Variable, VariableDomain, VariableId};
