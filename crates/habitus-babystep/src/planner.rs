//! Greedy baby-step planner
//!
//! Walks the fixed priority list and lowers each variable until the habit's
//! level reaches the target. Every reduced score is snapped to the nearest
//! member of the discrete grid, so the removed points may differ from what
//! was asked for. Only the actual difference counts against the points still
//! owed.

use crate::minimal::{build_minimal_habit, strip_quantifiers};
use crate::tables::{duration_step, frequency_step, REDUCTION_PRIORITY};
use crate::{BabyStepConfig, PlanError};
use habitus_domain::{
    check_level, clamp_level, BabyStepPlan, DifficultyDescriptor, DiscreteScore, Frequency, Habit,
    PlanKind, Variable, VariableId, VariableReduction, WorkloadDelta,
};

const EPSILON: f64 = 1e-9;

/// Lv50 target for a habit at `current_level`: half, rounded down
pub fn calculate_lv50_target(current_level: u32) -> u32 {
    current_level / 2
}

/// Lv10 target: always 10, whatever the current level
pub fn calculate_lv10_target(_current_level: u32) -> u32 {
    10
}

/// Habit level implied by a set of variable scores
pub fn current_level(variables: &[Variable]) -> u32 {
    clamp_level(variables.iter().map(|v| v.score.value()).sum())
}

/// Variables after a greedy reduction pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionOutcome {
    /// Applied reductions, in priority order
    pub reductions: Vec<VariableReduction>,

    /// The full variable set with reduced scores
    pub variables: Vec<Variable>,
}

impl ReductionOutcome {
    /// Points actually removed
    pub fn total(&self) -> f64 {
        self.reductions.iter().map(|r| r.actual).sum()
    }
}

/// Greedily remove `points_to_reduce` points from the priority variables
///
/// Each variable gives up to the points still owed, then lands on the nearest
/// grid member. The removed total can overshoot the request by at most half
/// a grid step. Scores never increase.
pub fn reduce_variables(variables: &[Variable], points_to_reduce: f64) -> ReductionOutcome {
    let mut remaining = points_to_reduce.max(0.0);
    let mut reduced = variables.to_vec();
    let mut reductions = Vec::new();

    for id in REDUCTION_PRIORITY {
        if remaining <= EPSILON {
            break;
        }
        let Some(variable) = reduced.iter_mut().find(|v| v.id == id) else {
            continue;
        };

        let before = variable.score;
        let score = before.value();
        if score <= 0.0 {
            continue;
        }

        let requested = score.min(remaining);
        let after = DiscreteScore::round(score - requested);
        let actual = score - after.value();
        if actual <= EPSILON {
            continue;
        }

        *variable = variable.with_score(after);
        remaining -= actual;
        reductions.push(VariableReduction {
            variable: id,
            before,
            after,
            requested,
            actual,
        });
    }

    ReductionOutcome {
        reductions,
        variables: reduced,
    }
}

/// Label for how much lighter `target` is than `current`
///
/// `breakpoints` are ascending upper bounds of the target/current ratio.
pub fn difficulty_descriptor(current: u32, target: u32, breakpoints: &[f64; 4]) -> DifficultyDescriptor {
    if current == 0 {
        return DifficultyDescriptor::Similar;
    }

    let ratio = target as f64 / current as f64;
    let labels = [
        DifficultyDescriptor::Minimal,
        DifficultyDescriptor::GreatlyReduced,
        DifficultyDescriptor::Halved,
        DifficultyDescriptor::SlightlyReduced,
    ];
    breakpoints
        .iter()
        .zip(labels)
        .find(|(limit, _)| ratio <= **limit)
        .map(|(_, label)| label)
        .unwrap_or(DifficultyDescriptor::Similar)
}

/// Frequency change matching `actual` removed points
///
/// Table rows are applied while their cumulative points fit in `actual`.
fn frequency_delta(from: Frequency, actual: f64) -> Option<WorkloadDelta> {
    let mut to = from;
    let mut points = 0.0;
    while let Some(step) = frequency_step(to) {
        if points + step.points > actual + EPSILON {
            break;
        }
        points += step.points;
        to = step.to;
    }

    (points > 0.0).then(|| WorkloadDelta {
        variable: VariableId::Frequency,
        before: from.label().to_string(),
        after: to.label().to_string(),
        points: -points,
    })
}

/// Duration change matching `actual` removed points
fn duration_delta(from: u32, actual: f64) -> Option<WorkloadDelta> {
    let mut to = from;
    let mut points = 0.0;
    while let Some(step) = duration_step(to) {
        if points + step.points > actual + EPSILON {
            break;
        }
        points += step.points;
        to = step.to;
    }

    (to != from).then(|| WorkloadDelta {
        variable: VariableId::Duration,
        before: format!("{} min", from),
        after: format!("{} min", to),
        points: -points,
    })
}

fn workload_deltas(habit: &Habit, reductions: &[VariableReduction]) -> Vec<WorkloadDelta> {
    reductions
        .iter()
        .filter_map(|reduction| match reduction.variable {
            VariableId::Frequency => frequency_delta(habit.frequency, reduction.actual),
            VariableId::Duration => duration_delta(habit.duration_minutes, reduction.actual),
            _ => None,
        })
        .collect()
}

/// Lv50 and Lv10 plans of one habit
#[derive(Debug, Clone, PartialEq)]
pub struct BabySteps {
    /// Plan at half the current level
    pub lv50: BabyStepPlan,

    /// Plan at the fixed minimal level
    pub lv10: BabyStepPlan,
}

/// Builds baby-step plans
pub struct Planner {
    config: BabyStepConfig,
}

impl Planner {
    /// Create a planner, rejecting an invalid configuration
    pub fn new(config: BabyStepConfig) -> Result<Self, PlanError> {
        config.validate().map_err(PlanError::Config)?;
        Ok(Self { config })
    }

    /// Create a planner with default configuration
    pub fn default_config() -> Self {
        Self {
            config: BabyStepConfig::default(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &BabyStepConfig {
        &self.config
    }

    /// Lv50 target under the configured ratio
    pub fn lv50_target(&self, current_level: u32) -> u32 {
        clamp_level(current_level as f64 * self.config.lv50_ratio)
    }

    /// Lv10 target under the configuration
    pub fn lv10_target(&self) -> u32 {
        self.config.lv10_level
    }

    /// Both plans for a habit
    pub fn plans(&self, habit: &Habit, variables: &[Variable]) -> Result<BabySteps, PlanError> {
        let level = current_level(variables);
        Ok(BabySteps {
            lv50: self.plan(PlanKind::Lv50, habit, variables, i64::from(self.lv50_target(level)))?,
            lv10: self.plan(PlanKind::Lv10, habit, variables, i64::from(self.lv10_target()))?,
        })
    }

    /// Plan towards an explicit target level
    ///
    /// Fails with a range error if `target` is outside [0, 199].
    pub fn plan(
        &self,
        kind: PlanKind,
        habit: &Habit,
        variables: &[Variable],
        target: i64,
    ) -> Result<BabyStepPlan, PlanError> {
        let target = check_level("target_level", target)?;
        let total: f64 = variables.iter().map(|v| v.score.value()).sum();
        let current = clamp_level(total);

        let outcome = reduce_variables(variables, (total - target as f64).max(0.0));
        let achieved = clamp_level(total - outcome.total());
        let workload_deltas = workload_deltas(habit, &outcome.reductions);

        let minimal_habit = match kind {
            PlanKind::Lv10 => Some(build_minimal_habit(&habit.name)),
            PlanKind::Lv50 => None,
        };
        let simplified_name = match &minimal_habit {
            Some(minimal) => minimal.action.clone(),
            None => simplified_name(habit, &workload_deltas),
        };

        Ok(BabyStepPlan {
            kind,
            current_level: current,
            target_level: target,
            achieved_level: achieved,
            simplified_name,
            explanation: explanation(current, target, achieved, &outcome.reductions),
            difficulty: difficulty_descriptor(current, target, &self.config.difficulty_breakpoints),
            reductions: outcome.reductions,
            workload_deltas,
            minimal_habit,
        })
    }
}

fn simplified_name(habit: &Habit, deltas: &[WorkloadDelta]) -> String {
    let core = strip_quantifiers(&habit.name);
    if deltas.is_empty() || core.is_empty() {
        return habit.name.clone();
    }

    let workload: Vec<&str> = deltas.iter().map(|d| d.after.as_str()).collect();
    format!("{} ({})", core, workload.join(", "))
}

fn explanation(current: u32, target: u32, achieved: u32, reductions: &[VariableReduction]) -> String {
    if reductions.is_empty() {
        return format!(
            "Level {} is already within reach of target {}; nothing to lower",
            current, target
        );
    }

    let changes: Vec<String> = reductions
        .iter()
        .map(|r| format!("{} {} -> {}", r.variable, r.before, r.after))
        .collect();
    format!(
        "Lowered {}: level {} -> {} (target {})",
        changes.join(", "),
        current,
        achieved,
        target
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitus_domain::{DomainError, HabitId, UserId};

    fn habit(name: &str, frequency: Frequency, duration_minutes: u32) -> Habit {
        Habit {
            id: HabitId::new(),
            user_id: UserId::new(),
            name: name.to_string(),
            frequency,
            duration_minutes,
            target_count: 0,
            level: 0,
            domains: vec![],
        }
    }

    fn variables_with(base: f64, overrides: &[(VariableId, f64)]) -> Vec<Variable> {
        VariableId::ALL
            .iter()
            .map(|id| {
                let score = overrides
                    .iter()
                    .find(|(o, _)| o == id)
                    .map(|(_, s)| *s)
                    .unwrap_or(base);
                Variable::new(*id, DiscreteScore::round(score), "", vec![])
            })
            .collect()
    }

    #[test]
    fn test_targets() {
        assert_eq!(calculate_lv50_target(73), 36);
        assert_eq!(calculate_lv50_target(0), 0);
        assert_eq!(calculate_lv10_target(150), 10);
        assert_eq!(calculate_lv10_target(3), 10);
    }

    #[test]
    fn test_reduce_walks_priority_list() {
        let variables = variables_with(2.8, &[(VariableId::Frequency, 8.3)]);
        let outcome = reduce_variables(&variables, 36.0);

        let ids: Vec<VariableId> = outcome.reductions.iter().map(|r| r.variable).collect();
        assert_eq!(ids, REDUCTION_PRIORITY.to_vec());
        assert!(outcome.reductions.iter().all(|r| r.after == DiscreteScore::ZERO));
        assert!((outcome.total() - 25.1).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_snaps_to_grid() {
        let variables = variables_with(2.8, &[(VariableId::Frequency, 8.3)]);
        let outcome = reduce_variables(&variables, 3.0);

        assert_eq!(outcome.reductions.len(), 1);
        let reduction = &outcome.reductions[0];
        assert_eq!(reduction.requested, 3.0);
        assert_eq!(reduction.after.value(), 5.5);
        assert!((reduction.actual - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_rounds_to_nearest() {
        // 8.3 - 2.2 = 6.1 sits nearer 5.5 than 6.9
        let variables = variables_with(2.8, &[(VariableId::Frequency, 8.3)]);
        let outcome = reduce_variables(&variables, 2.2);

        assert_eq!(outcome.reductions.len(), 1);
        let reduction = &outcome.reductions[0];
        assert_eq!(reduction.after.value(), 5.5);
        assert!((reduction.requested - 2.2).abs() < 1e-9);
        assert!((reduction.actual - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_skips_variables_rounding_back() {
        // 0.3 owed: 2.8 - 0.3 rounds back to 2.8 everywhere
        let variables = variables_with(2.8, &[]);
        let outcome = reduce_variables(&variables, 0.3);
        assert!(outcome.reductions.is_empty());
        assert_eq!(outcome.variables, variables);
    }

    #[test]
    fn test_reduce_skips_zero_scores() {
        let variables = variables_with(0.0, &[(VariableId::Complexity, 4.1)]);
        let outcome = reduce_variables(&variables, 10.0);
        assert_eq!(outcome.reductions.len(), 1);
        assert_eq!(outcome.reductions[0].variable, VariableId::Complexity);
        assert_eq!(
            outcome.variables.iter().find(|v| v.id == VariableId::Complexity).unwrap().score,
            DiscreteScore::ZERO
        );
    }

    #[test]
    fn test_difficulty_descriptor() {
        let breakpoints = BabyStepConfig::default().difficulty_breakpoints;
        assert_eq!(difficulty_descriptor(100, 10, &breakpoints), DifficultyDescriptor::Minimal);
        assert_eq!(difficulty_descriptor(100, 25, &breakpoints), DifficultyDescriptor::GreatlyReduced);
        assert_eq!(difficulty_descriptor(72, 36, &breakpoints), DifficultyDescriptor::Halved);
        assert_eq!(difficulty_descriptor(100, 70, &breakpoints), DifficultyDescriptor::SlightlyReduced);
        assert_eq!(difficulty_descriptor(100, 90, &breakpoints), DifficultyDescriptor::Similar);
        assert_eq!(difficulty_descriptor(0, 0, &breakpoints), DifficultyDescriptor::Similar);
    }

    #[test]
    fn test_lv50_plan() {
        let habit = habit("Run 60 minutes daily", Frequency::Daily, 60);
        let variables = variables_with(2.8, &[(VariableId::Frequency, 8.3)]);
        let plans = Planner::default_config().plans(&habit, &variables).unwrap();

        let lv50 = &plans.lv50;
        assert_eq!(lv50.kind, PlanKind::Lv50);
        assert_eq!(lv50.current_level, 72);
        assert_eq!(lv50.target_level, 36);
        assert_eq!(lv50.achieved_level, 47);
        assert_eq!(lv50.difficulty, DifficultyDescriptor::Halved);
        assert!(lv50.minimal_habit.is_none());

        assert_eq!(lv50.workload_deltas.len(), 2);
        let frequency = &lv50.workload_deltas[0];
        assert_eq!(frequency.before, "daily");
        assert_eq!(frequency.after, "biweekly");
        assert!((frequency.points + 5.6).abs() < 1e-9);
        let duration = &lv50.workload_deltas[1];
        assert_eq!(duration.before, "60 min");
        assert_eq!(duration.after, "30 min");
        assert_eq!(lv50.simplified_name, "run (biweekly, 30 min)");
    }

    #[test]
    fn test_lv10_plan_has_minimal_habit() {
        let habit = habit("Read 30 pages every day", Frequency::Daily, 45);
        let variables = variables_with(4.1, &[]);
        let plans = Planner::default_config().plans(&habit, &variables).unwrap();

        let lv10 = &plans.lv10;
        assert_eq!(lv10.current_level, 98);
        assert_eq!(lv10.target_level, 10);
        // 10 / 98 sits just above the first breakpoint
        assert_eq!(lv10.difficulty, DifficultyDescriptor::GreatlyReduced);
        let minimal = lv10.minimal_habit.as_ref().unwrap();
        assert_eq!(minimal.action, "Open the book and read one page");
        assert_eq!(lv10.simplified_name, minimal.action);
        assert!(lv10.total_reduction() <= (lv10.current_level - lv10.target_level) as f64);
    }

    #[test]
    fn test_small_gap_reaches_target() {
        let habit = habit("Stretch", Frequency::Weekly, 45);
        let variables = variables_with(0.0, &[(VariableId::Duration, 2.8), (VariableId::Complexity, 8.3)]);
        // 11.1 - 10 = 1.1 owed; duration 2.8 - 1.1 = 1.7 rounds to 1.4
        let plan = Planner::default_config()
            .plan(PlanKind::Lv10, &habit, &variables, 10)
            .unwrap();
        assert_eq!(plan.current_level, 11);
        assert_eq!(plan.reductions.len(), 1);
        assert_eq!(plan.reductions[0].variable, VariableId::Duration);
        assert_eq!(plan.reductions[0].after.value(), 1.4);
        assert_eq!(plan.achieved_level, 9);
        assert!(plan.achieved_level <= plan.target_level);
    }

    #[test]
    fn test_partial_frequency_reduction_has_no_table_row() {
        // Daily at 2.8, lowered by 1.4: the first row would claim 2.8
        assert_eq!(frequency_delta(Frequency::Daily, 1.4), None);

        let delta = frequency_delta(Frequency::Daily, 4.2).unwrap();
        assert_eq!(delta.after, "weekly");
        assert!((delta.points + 4.2).abs() < 1e-9);

        let habit = habit("Journal daily", Frequency::Daily, 10);
        let variables = variables_with(0.0, &[(VariableId::Frequency, 2.8)]);
        let plan = Planner::default_config()
            .plan(PlanKind::Lv50, &habit, &variables, 1)
            .unwrap();
        assert_eq!(plan.reductions.len(), 1);
        assert!((plan.reductions[0].actual - 1.4).abs() < 1e-9);
        assert!(plan.workload_deltas.is_empty());
    }

    #[test]
    fn test_already_below_target() {
        let habit = habit("Floss", Frequency::Daily, 2);
        let variables = variables_with(0.0, &[(VariableId::Frequency, 1.4)]);
        let plan = Planner::default_config()
            .plan(PlanKind::Lv10, &habit, &variables, 10)
            .unwrap();
        assert!(plan.reductions.is_empty());
        assert!(plan.workload_deltas.is_empty());
        assert_eq!(plan.achieved_level, 1);
    }

    #[test]
    fn test_target_out_of_range() {
        let habit = habit("Walk", Frequency::Daily, 20);
        let variables = variables_with(1.4, &[]);
        let planner = Planner::default_config();

        let err = planner.plan(PlanKind::Lv50, &habit, &variables, 200).unwrap_err();
        assert!(matches!(err, PlanError::Domain(DomainError::Range { .. })));
        assert!(planner.plan(PlanKind::Lv50, &habit, &variables, -1).is_err());
    }
}
