//! Level estimate module - the auditable difficulty assessment of a habit

use crate::fact::FactId;
use crate::ids::{HabitId, RecordId};
use crate::tier::LevelTier;
use crate::variable::Variable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expected level range [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRange {
    /// Lower bound
    pub min: u32,
    /// Upper bound
    pub max: u32,
}

impl ExpectedRange {
    /// Create a new range
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Get the midpoint of the range
    pub fn midpoint(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    /// Get the width of the range (uncertainty measure)
    pub fn width(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }

    /// Check if the range contains a level
    pub fn contains(&self, level: u32) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Why the firewall withheld a trusted score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FirewallReason {
    /// Too few core facts confirmed by the user
    LowCompleteness {
        /// Computed ICI
        ici: f64,
        /// Required minimum
        minimum: f64,
    },

    /// Too many assumed values
    AssumptionBudgetExceeded {
        /// Assumptions used
        used: u32,
        /// Allowed maximum
        maximum: u32,
    },

    /// A present fact is completely unknown (U4)
    UnknownFact {
        /// The fact
        fact: FactId,
    },

    /// A no-inference fact was not stated by the user
    InferredRestrictedFact {
        /// The fact
        fact: FactId,
    },
}

/// Outcome of the firewall check
///
/// Not an error: callers branch on `triggered` and ask for more facts instead
/// of trusting the score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FirewallDecision {
    /// Whether the estimate must be treated as provisional
    pub triggered: bool,

    /// Every condition that fired
    pub reasons: Vec<FirewallReason>,
}

impl FirewallDecision {
    /// Build a decision from the list of fired conditions
    pub fn from_reasons(reasons: Vec<FirewallReason>) -> Self {
        Self {
            triggered: !reasons.is_empty(),
            reasons,
        }
    }

    /// A decision with nothing fired
    pub fn clear() -> Self {
        Self::default()
    }
}

/// Value-of-information question surfaced while the firewall is up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiQuestion {
    /// Fact the answer would confirm
    pub fact: FactId,

    /// Question text
    pub question: String,

    /// Number of variables citing this fact
    pub impact: usize,
}

/// The difficulty assessment of one habit
///
/// Immutable once recorded; a re-assessment produces a new estimate.
/// Invariants (checked by the gatekeeper): optimistic <= expected.min,
/// expected.max <= conservative, all levels in [0, 199], exactly 24 variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEstimate {
    /// Record id
    pub id: RecordId,

    /// Habit this estimate belongs to, if persisted
    pub habit_id: Option<HabitId>,

    /// Best-case level
    pub optimistic: u32,

    /// Expected range
    pub expected: ExpectedRange,

    /// Worst-case level
    pub conservative: u32,

    /// Tier of the expected lower bound
    pub tier: LevelTier,

    /// The 24 scored variables
    pub variables: Vec<Variable>,

    /// Information Completeness Index in [0, 1]
    pub ici: f64,

    /// Number of assumed (non user-stated) facts
    pub assumption_budget_used: u32,

    /// Firewall outcome
    pub firewall: FirewallDecision,

    /// Questions to ask when the firewall is up
    pub voi_questions: Vec<VoiQuestion>,

    /// Version of the extraction prompt that produced the judgments
    pub prompt_version: String,

    /// When the estimate was produced
    pub created_at: DateTime<Utc>,
}

impl LevelEstimate {
    /// Sum of all variable scores
    pub fn variable_total(&self) -> f64 {
        self.variables.iter().map(|v| v.score.value()).sum()
    }

    /// Whether the score may be trusted
    pub fn is_trusted(&self) -> bool {
        !self.firewall.triggered
    }
}
