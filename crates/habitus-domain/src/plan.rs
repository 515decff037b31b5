//! Baby-step plan module - remediation plans that simplify a habit

use crate::score::DiscreteScore;
use crate::variable::VariableId;
use serde::{Deserialize, Serialize};

/// Which remediation plan this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Half of the current level
    Lv50,
    /// The smallest form of the habit (fixed level 10)
    Lv10,
}

impl PlanKind {
    /// Get the plan kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Lv50 => "lv50",
            PlanKind::Lv10 => "lv10",
        }
    }
}

/// Label describing how much lighter the plan is than the current habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyDescriptor {
    /// Target is at most the first breakpoint of the current level
    Minimal,
    /// Target is at most the second breakpoint
    GreatlyReduced,
    /// Target is at most the third breakpoint
    Halved,
    /// Target is at most the fourth breakpoint
    SlightlyReduced,
    /// Target is above every breakpoint
    Similar,
}

impl DifficultyDescriptor {
    /// User-facing label
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyDescriptor::Minimal => "最小限の負荷",
            DifficultyDescriptor::GreatlyReduced => "大幅に軽減",
            DifficultyDescriptor::Halved => "半分程度",
            DifficultyDescriptor::SlightlyReduced => "やや軽減",
            DifficultyDescriptor::Similar => "ほぼ同等",
        }
    }
}

/// One variable lowered by the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableReduction {
    /// Variable lowered
    pub variable: VariableId,

    /// Score before
    pub before: DiscreteScore,

    /// Score after
    pub after: DiscreteScore,

    /// Points the greedy walk asked for
    pub requested: f64,

    /// Points actually removed after snapping to the grid
    pub actual: f64,
}

/// Human-readable before/after change of a real-world quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDelta {
    /// Variable the change applies to
    pub variable: VariableId,

    /// Workload before (e.g. "daily", "60 min")
    pub before: String,

    /// Workload after (e.g. "3x/week", "30 min")
    pub after: String,

    /// Score change from the transformation table (negative)
    pub points: f64,
}

/// The smallest version of a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalHabit {
    /// What triggers the action
    pub cue: String,

    /// The action itself, two minutes or less
    pub action: String,

    /// When to stop
    pub stop_condition: String,

    /// What to do on a bad day
    pub fallback: String,
}

/// A remediation plan for one habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyStepPlan {
    /// Plan kind
    pub kind: PlanKind,

    /// Level before the plan
    pub current_level: u32,

    /// Requested level
    pub target_level: u32,

    /// Level after applying every reduction
    pub achieved_level: u32,

    /// Simplified habit name
    pub simplified_name: String,

    /// Variables lowered, in priority order
    pub reductions: Vec<VariableReduction>,

    /// Before/after workload descriptions
    pub workload_deltas: Vec<WorkloadDelta>,

    /// Summary of what changed
    pub explanation: String,

    /// How much lighter the plan is
    pub difficulty: DifficultyDescriptor,

    /// Present on the Lv10 plan only
    pub minimal_habit: Option<MinimalHabit>,
}

impl BabyStepPlan {
    /// Total points removed across all reductions
    pub fn total_reduction(&self) -> f64 {
        self.reductions.iter().map(|r| r.actual).sum()
    }
}
