//! Fixed reduction order and workload transformation tables

use habitus_domain::{Frequency, VariableId};

/// Variables the greedy reducer lowers, most interpretable first
pub const REDUCTION_PRIORITY: [VariableId; 7] = [
    VariableId::Frequency,
    VariableId::Duration,
    VariableId::Complexity,
    VariableId::SetupCleanup,
    VariableId::TravelDistance,
    VariableId::ToolsResources,
    VariableId::Interruptions,
];

/// One row of the frequency table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyStep {
    /// Frequency before
    pub from: Frequency,
    /// Frequency after
    pub to: Frequency,
    /// Score points removed
    pub points: f64,
}

/// Frequency transformations, applied in order
pub const FREQUENCY_STEPS: [FrequencyStep; 3] = [
    FrequencyStep {
        from: Frequency::Daily,
        to: Frequency::ThreePerWeek,
        points: 2.8,
    },
    FrequencyStep {
        from: Frequency::ThreePerWeek,
        to: Frequency::Weekly,
        points: 1.4,
    },
    FrequencyStep {
        from: Frequency::Weekly,
        to: Frequency::Biweekly,
        points: 1.4,
    },
];

/// The table row starting at `from`, if any
pub fn frequency_step(from: Frequency) -> Option<FrequencyStep> {
    FREQUENCY_STEPS.iter().copied().find(|step| step.from == from)
}

/// One duration transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationStep {
    /// Minutes before
    pub from: u32,
    /// Minutes after
    pub to: u32,
    /// Score points removed
    pub points: f64,
}

/// The duration transformation for a session of `minutes`
///
/// 60+ minutes drop to 30 (2.8 points), 30 to 15 and 15 to 5 (1.4 points
/// each). Between 30 and 60 minutes the drop to 30 removes a share of 2.8
/// proportional to the distance from 30. Five minutes or less has no row.
pub fn duration_step(minutes: u32) -> Option<DurationStep> {
    let (to, points) = match minutes {
        m if m >= 60 => (30, 2.8),
        m if m > 30 => (30, 2.8 * (m - 30) as f64 / 30.0),
        m if m > 15 => (15, 1.4),
        m if m > 5 => (5, 1.4),
        _ => return None,
    };

    Some(DurationStep {
        from: minutes,
        to,
        points,
    })
}
