//! Fact module - collaborator-supplied observations about a habit
//!
//! A fact is a single answer to one of 16 canonical questions, tagged with how
//! certain it is and where it came from. Facts are immutable once recorded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical fact identifiers
///
/// 14 of the 16 ids are "core" and count towards the Information Completeness
/// Index. `TargetOutcome` describes a goal rather than an observation and
/// `ContextNotes` is free-form commentary; neither is core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactId {
    /// How often the habit is performed
    Frequency,
    /// Minutes per occurrence
    DurationMinutes,
    /// When in the day it happens
    TimeOfDay,
    /// Where it happens
    Location,
    /// Distance to travel before starting
    TravelDistance,
    /// Equipment or resources needed
    ToolsRequired,
    /// Preparation and cleanup effort
    SetupCleanup,
    /// Prior experience with the activity
    PriorExperience,
    /// Physical exertion involved
    PhysicalIntensity,
    /// Mental effort involved
    CognitiveLoad,
    /// Reliance on other people
    SocialDependency,
    /// Typical interruptions
    Interruptions,
    /// How movable the schedule is
    ScheduleFlexibility,
    /// Health constraints relevant to the habit
    HealthConstraints,
    /// Desired outcome (a target, not an observation)
    TargetOutcome,
    /// Free-form context
    ContextNotes,
}

impl FactId {
    /// Every fact id in canonical order
    pub const ALL: [FactId; 16] = [
        FactId::Frequency,
        FactId::DurationMinutes,
        FactId::TimeOfDay,
        FactId::Location,
        FactId::TravelDistance,
        FactId::ToolsRequired,
        FactId::SetupCleanup,
        FactId::PriorExperience,
        FactId::PhysicalIntensity,
        FactId::CognitiveLoad,
        FactId::SocialDependency,
        FactId::Interruptions,
        FactId::ScheduleFlexibility,
        FactId::HealthConstraints,
        FactId::TargetOutcome,
        FactId::ContextNotes,
    ];

    /// Number of core facts (the ICI denominator)
    pub const CORE_COUNT: usize = 14;

    /// Facts that may only be stated by the user, never inferred
    pub const NO_INFERENCE: [FactId; 4] = [
        FactId::Frequency,
        FactId::DurationMinutes,
        FactId::PriorExperience,
        FactId::HealthConstraints,
    ];

    /// Whether this fact counts towards the completeness index
    pub fn is_core(&self) -> bool {
        !matches!(self, FactId::TargetOutcome | FactId::ContextNotes)
    }

    /// Whether this fact must carry uncertainty tier U0
    pub fn requires_user_statement(&self) -> bool {
        Self::NO_INFERENCE.contains(self)
    }

    /// Core fact ids in canonical order
    pub fn core() -> impl Iterator<Item = FactId> {
        Self::ALL.into_iter().filter(FactId::is_core)
    }

    /// Get the fact id as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FactId::Frequency => "frequency",
            FactId::DurationMinutes => "duration_minutes",
            FactId::TimeOfDay => "time_of_day",
            FactId::Location => "location",
            FactId::TravelDistance => "travel_distance",
            FactId::ToolsRequired => "tools_required",
            FactId::SetupCleanup => "setup_cleanup",
            FactId::PriorExperience => "prior_experience",
            FactId::PhysicalIntensity => "physical_intensity",
            FactId::CognitiveLoad => "cognitive_load",
            FactId::SocialDependency => "social_dependency",
            FactId::Interruptions => "interruptions",
            FactId::ScheduleFlexibility => "schedule_flexibility",
            FactId::HealthConstraints => "health_constraints",
            FactId::TargetOutcome => "target_outcome",
            FactId::ContextNotes => "context_notes",
        }
    }

    /// Parse a fact id from a string
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Question that would confirm this fact directly with the user
    pub fn question(&self) -> &'static str {
        match self {
            FactId::Frequency => "How many times per week do you plan to do this?",
            FactId::DurationMinutes => "How many minutes does one session take?",
            FactId::TimeOfDay => "At what time of day will you do it?",
            FactId::Location => "Where will you do it?",
            FactId::TravelDistance => "How far do you need to travel to start?",
            FactId::ToolsRequired => "What equipment or resources do you need?",
            FactId::SetupCleanup => "How long do preparation and cleanup take?",
            FactId::PriorExperience => "Have you done this activity before, and for how long?",
            FactId::PhysicalIntensity => "How physically demanding is one session?",
            FactId::CognitiveLoad => "How much concentration does it require?",
            FactId::SocialDependency => "Does it depend on anyone else being available?",
            FactId::Interruptions => "What usually interrupts you while doing it?",
            FactId::ScheduleFlexibility => "Can you move it to another time if something comes up?",
            FactId::HealthConstraints => "Do you have any health conditions that affect this activity?",
            FactId::TargetOutcome => "What result do you want to achieve?",
            FactId::ContextNotes => "Is there anything else we should know?",
        }
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How certain a fact is, from U0 (stated by the user) to U4 (unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UncertaintyTier {
    /// Stated directly by the user
    U0,
    /// Strongly implied by user statements
    U1,
    /// Inferred from context
    U2,
    /// Weak guess
    U3,
    /// Unknown
    U4,
}

impl UncertaintyTier {
    /// Get the tier as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            UncertaintyTier::U0 => "U0",
            UncertaintyTier::U1 => "U1",
            UncertaintyTier::U2 => "U2",
            UncertaintyTier::U3 => "U3",
            UncertaintyTier::U4 => "U4",
        }
    }
}

/// Strength of the evidence behind a fact, from E0 (direct) to E3 (none)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvidenceTier {
    /// Direct, verifiable evidence
    E0,
    /// Consistent user report
    E1,
    /// Indirect evidence
    E2,
    /// No evidence
    E3,
}

/// Where a fact value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The user said it
    UserStated,
    /// The extractor inferred it
    Inferred,
    /// A default was filled in
    Default,
}

impl Provenance {
    /// Whether this value is an assumption rather than a statement
    pub fn is_assumption(&self) -> bool {
        !matches!(self, Provenance::UserStated)
    }
}

/// Value carried by a fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Boolean answer
    Bool(bool),
    /// Numeric answer
    Number(f64),
    /// Free text answer
    Text(String),
}

impl FactValue {
    /// Numeric view of the value, if it is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the value, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A single observation about a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Canonical id
    pub id: FactId,

    /// Observed value
    pub value: FactValue,

    /// Uncertainty tier
    pub uncertainty: UncertaintyTier,

    /// Evidence tier
    pub evidence: EvidenceTier,

    /// Origin of the value
    pub provenance: Provenance,
}

impl Fact {
    /// Create a fact stated directly by the user (U0 / E1 / user_stated)
    pub fn stated(id: FactId, value: FactValue) -> Self {
        Self {
            id,
            value,
            uncertainty: UncertaintyTier::U0,
            evidence: EvidenceTier::E1,
            provenance: Provenance::UserStated,
        }
    }

    /// Create a fact inferred by the extractor
    pub fn inferred(id: FactId, value: FactValue, uncertainty: UncertaintyTier) -> Self {
        Self {
            id,
            value,
            uncertainty,
            evidence: EvidenceTier::E2,
            provenance: Provenance::Inferred,
        }
    }

    /// Whether the user confirmed this fact directly
    pub fn is_confirmed(&self) -> bool {
        self.uncertainty == UncertaintyTier::U0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_catalogue() {
        assert_eq!(FactId::core().count(), FactId::CORE_COUNT);
        assert!(!FactId::TargetOutcome.is_core());
        assert!(!FactId::ContextNotes.is_core());
        // No-inference facts are a subset of the core set
        assert!(FactId::NO_INFERENCE.iter().all(FactId::is_core));
    }

    #[test]
    fn test_parse_round_trip() {
        for id in FactId::ALL {
            assert_eq!(FactId::parse(id.as_str()), Some(id));
        }
        assert_eq!(FactId::parse("mood"), None);
    }

    #[test]
    fn test_fact_serde_shape() {
        let fact = Fact::stated(FactId::DurationMinutes, FactValue::Number(30.0));
        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["id"], "duration_minutes");
        assert_eq!(json["uncertainty"], "U0");
        assert_eq!(json["provenance"], "user_stated");
        assert_eq!(json["value"], 30.0);
    }

    #[test]
    fn test_provenance_assumption() {
        assert!(!Provenance::UserStated.is_assumption());
        assert!(Provenance::Inferred.is_assumption());
        assert!(Provenance::Default.is_assumption());
    }
}
