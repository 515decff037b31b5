//! Variable module - the 24 THLI-24 load variables

use crate::fact::FactId;
use crate::score::{DiscreteScore, Stoplight};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Load domain a variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableDomain {
    /// Mental effort
    Cognitive,
    /// Bodily effort and material resources
    Physical,
    /// Time and scheduling
    Temporal,
    /// Other people
    Social,
}

impl VariableDomain {
    /// Get the domain name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableDomain::Cognitive => "cognitive",
            VariableDomain::Physical => "physical",
            VariableDomain::Temporal => "temporal",
            VariableDomain::Social => "social",
        }
    }
}

/// Canonical THLI-24 variable identifiers, six per domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableId {
    // Temporal
    /// Occurrences per period
    Frequency,
    /// Length of one occurrence
    Duration,
    /// Preparation and cleanup
    SetupCleanup,
    /// Travel before starting
    TravelDistance,
    /// Fit with the daily rhythm
    TimeOfDayFit,
    /// How rigid the schedule is
    ScheduleRigidity,

    // Physical
    /// Bodily exertion
    PhysicalIntensity,
    /// Recovery time needed
    FatigueRecovery,
    /// Equipment and resources
    ToolsResources,
    /// Comfort of the environment
    EnvironmentComfort,
    /// Health and readiness of the body
    BodyReadiness,
    /// Effect on sleep
    SleepImpact,

    // Cognitive
    /// Number of steps and their intricacy
    Complexity,
    /// Skill still to be acquired
    LearningCurve,
    /// Decisions needed per occurrence
    DecisionLoad,
    /// Sustained concentration
    FocusDemand,
    /// Distance between intent and motivation
    MotivationGap,
    /// Competing habits in the same slot
    HabitCompetition,

    // Social
    /// External interruptions
    Interruptions,
    /// Reliance on other people
    SocialDependency,
    /// Social pressure against the habit
    SocialPressure,
    /// Missing accountability
    AccountabilityGap,
    /// Family or care obligations
    FamilyObligations,
    /// Discomfort of being seen
    PublicExposure,
}

impl VariableId {
    /// Every variable id in canonical order
    pub const ALL: [VariableId; 24] = [
        VariableId::Frequency,
        VariableId::Duration,
        VariableId::SetupCleanup,
        VariableId::TravelDistance,
        VariableId::TimeOfDayFit,
        VariableId::ScheduleRigidity,
        VariableId::PhysicalIntensity,
        VariableId::FatigueRecovery,
        VariableId::ToolsResources,
        VariableId::EnvironmentComfort,
        VariableId::BodyReadiness,
        VariableId::SleepImpact,
        VariableId::Complexity,
        VariableId::LearningCurve,
        VariableId::DecisionLoad,
        VariableId::FocusDemand,
        VariableId::MotivationGap,
        VariableId::HabitCompetition,
        VariableId::Interruptions,
        VariableId::SocialDependency,
        VariableId::SocialPressure,
        VariableId::AccountabilityGap,
        VariableId::FamilyObligations,
        VariableId::PublicExposure,
    ];

    /// Domain this variable belongs to
    pub fn domain(&self) -> VariableDomain {
        use VariableId::*;
        match self {
            Frequency | Duration | SetupCleanup | TravelDistance | TimeOfDayFit
            | ScheduleRigidity => VariableDomain::Temporal,
            PhysicalIntensity | FatigueRecovery | ToolsResources | EnvironmentComfort
            | BodyReadiness | SleepImpact => VariableDomain::Physical,
            Complexity | LearningCurve | DecisionLoad | FocusDemand | MotivationGap
            | HabitCompetition => VariableDomain::Cognitive,
            Interruptions | SocialDependency | SocialPressure | AccountabilityGap
            | FamilyObligations | PublicExposure => VariableDomain::Social,
        }
    }

    /// Get the variable id as a string
    pub fn as_str(&self) -> &'static str {
        use VariableId::*;
        match self {
            Frequency => "frequency",
            Duration => "duration",
            SetupCleanup => "setup_cleanup",
            TravelDistance => "travel_distance",
            TimeOfDayFit => "time_of_day_fit",
            ScheduleRigidity => "schedule_rigidity",
            PhysicalIntensity => "physical_intensity",
            FatigueRecovery => "fatigue_recovery",
            ToolsResources => "tools_resources",
            EnvironmentComfort => "environment_comfort",
            BodyReadiness => "body_readiness",
            SleepImpact => "sleep_impact",
            Complexity => "complexity",
            LearningCurve => "learning_curve",
            DecisionLoad => "decision_load",
            FocusDemand => "focus_demand",
            MotivationGap => "motivation_gap",
            HabitCompetition => "habit_competition",
            Interruptions => "interruptions",
            SocialDependency => "social_dependency",
            SocialPressure => "social_pressure",
            AccountabilityGap => "accountability_gap",
            FamilyObligations => "family_obligations",
            PublicExposure => "public_exposure",
        }
    }

    /// Parse a variable id from a string
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored THLI-24 variable
///
/// `domain` and `stoplight` are derived from `id` and `score`; the validator
/// rejects a variable whose stored values disagree with the derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Canonical id
    pub id: VariableId,

    /// Domain (derived from `id`)
    pub domain: VariableDomain,

    /// Score on the discrete grid
    pub score: DiscreteScore,

    /// Stoplight (derived from `score`)
    pub stoplight: Stoplight,

    /// Why the score was given
    pub rationale: String,

    /// Facts that caused this score
    pub caused_by: Vec<FactId>,
}

impl Variable {
    /// Create a variable, deriving domain and stoplight
    pub fn new(id: VariableId, score: DiscreteScore, rationale: impl Into<String>, caused_by: Vec<FactId>) -> Self {
        Self {
            id,
            domain: id.domain(),
            score,
            stoplight: score.stoplight(),
            rationale: rationale.into(),
            caused_by,
        }
    }

    /// Copy of this variable with a new score (stoplight re-derived)
    pub fn with_score(&self, score: DiscreteScore) -> Self {
        Self {
            score,
            stoplight: score.stoplight(),
            ..self.clone()
        }
    }
}
