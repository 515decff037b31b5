//! Level estimate assembly
//!
//! Turns a validated fact set and 24 quantized variables into a
//! [`LevelEstimate`]. Uncertain variables widen the range: each one is
//! stepped along the discrete grid according to the worst uncertainty of the
//! facts it cites.

use crate::completeness::{
    assumption_budget_used, evaluate_firewall, information_completeness, select_voi_questions,
    variable_uncertainty,
};
use crate::intake::{parse_fact_set, parse_variable_judgments};
use crate::{Gatekeeper, GatekeeperConfig, GatekeeperError};
use chrono::{DateTime, Utc};
use habitus_domain::{
    clamp_level, ExpectedRange, Fact, LevelEstimate, LevelTier, RecordId, UncertaintyTier,
    Variable,
};
use tracing::{debug, info, warn};

/// Grid steps applied to the expected range
fn expected_steps(tier: UncertaintyTier) -> u8 {
    match tier {
        UncertaintyTier::U0 | UncertaintyTier::U1 => 0,
        UncertaintyTier::U2 | UncertaintyTier::U3 | UncertaintyTier::U4 => 1,
    }
}

/// Grid steps applied to the optimistic and conservative bounds
fn outer_steps(tier: UncertaintyTier) -> u8 {
    match tier {
        UncertaintyTier::U0 => 0,
        UncertaintyTier::U1 | UncertaintyTier::U2 => 1,
        UncertaintyTier::U3 | UncertaintyTier::U4 => 2,
    }
}

#[derive(Default)]
struct LevelSums {
    optimistic: f64,
    expected_min: f64,
    expected_max: f64,
    conservative: f64,
}

/// Assembles level estimates behind the gatekeeper
pub struct Assessor {
    gatekeeper: Gatekeeper,
}

impl Assessor {
    /// Create an assessor, rejecting an invalid configuration
    pub fn new(config: GatekeeperConfig) -> Result<Self, GatekeeperError> {
        config.validate().map_err(GatekeeperError::Config)?;
        Ok(Self {
            gatekeeper: Gatekeeper::new(config),
        })
    }

    /// Create an assessor with default configuration
    pub fn default_config() -> Self {
        Self {
            gatekeeper: Gatekeeper::new(GatekeeperConfig::default()),
        }
    }

    /// The gatekeeper used for validation
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// Build an estimate from facts and quantized variables
    ///
    /// Fails with every fact and variable issue at once. A triggered firewall
    /// is not a failure; it is reported on the estimate together with the
    /// questions worth asking next.
    pub fn assess(
        &self,
        facts: &[Fact],
        mut variables: Vec<Variable>,
        now: DateTime<Utc>,
    ) -> Result<LevelEstimate, GatekeeperError> {
        let mut issues = self.gatekeeper.validate_facts(facts).issues;
        issues.extend(self.gatekeeper.validate_variables(&variables).issues);
        if !issues.is_empty() {
            warn!("Assessment rejected with {} issue(s)", issues.len());
            return Err(issues.into());
        }

        variables.sort_by_key(|variable| variable.id);

        let mut sums = LevelSums::default();
        for variable in &variables {
            let tier = variable_uncertainty(variable, facts);
            let inner = expected_steps(tier);
            let outer = outer_steps(tier);

            sums.optimistic += variable.score.step_down(outer).value();
            sums.expected_min += variable.score.step_down(inner).value();
            sums.expected_max += variable.score.step_up(inner).value();
            sums.conservative += variable.score.step_up(outer).value();
        }

        let expected = ExpectedRange::new(
            clamp_level(sums.expected_min),
            clamp_level(sums.expected_max),
        );

        let config = self.gatekeeper.config();
        let ici = information_completeness(facts);
        let budget = assumption_budget_used(facts);
        let firewall = evaluate_firewall(facts, budget, config);
        let voi_questions = if firewall.triggered {
            select_voi_questions(facts, &variables, config.max_voi_questions)
        } else {
            Vec::new()
        };

        let estimate = LevelEstimate {
            id: RecordId::new(),
            habit_id: None,
            optimistic: clamp_level(sums.optimistic),
            expected,
            conservative: clamp_level(sums.conservative),
            tier: LevelTier::classify(expected.min),
            variables,
            ici,
            assumption_budget_used: budget,
            firewall,
            voi_questions,
            prompt_version: config.prompt_version.clone(),
            created_at: now,
        };

        self.gatekeeper.validate_estimate(&estimate).into_result()?;

        if estimate.firewall.triggered {
            debug!("Firewall reasons: {:?}", estimate.firewall.reasons);
        }
        info!(
            "Assessed level {}-{} ({}), ICI {:.2}, firewall {}",
            estimate.expected.min,
            estimate.expected.max,
            estimate.tier.as_str(),
            estimate.ici,
            estimate.firewall.triggered
        );

        Ok(estimate)
    }

    /// Parse the extractor's JSON output and assess it
    pub fn assess_raw(
        &self,
        facts_json: &str,
        judgments_json: &str,
        now: DateTime<Utc>,
    ) -> Result<LevelEstimate, GatekeeperError> {
        let facts = parse_fact_set(facts_json)?;
        let variables = parse_variable_judgments(judgments_json)?;

        let mut issues = facts.issues;
        issues.extend(variables.issues);
        if !issues.is_empty() {
            warn!("Extractor output rejected with {} issue(s)", issues.len());
            return Err(issues.into());
        }

        self.assess(&facts.accepted, variables.accepted, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitus_domain::{
        DiscreteScore, FactId, FactValue, FirewallReason, IssueCode, VariableId,
    };

    fn confirmed_facts(count: usize) -> Vec<Fact> {
        FactId::core()
            .take(count)
            .map(|id| Fact::stated(id, FactValue::Bool(true)))
            .collect()
    }

    fn uniform_variables(score: f64) -> Vec<Variable> {
        VariableId::ALL
            .iter()
            .map(|id| Variable::new(*id, DiscreteScore::round(score), "", vec![]))
            .collect()
    }

    #[test]
    fn test_certain_inputs_collapse_range() {
        let assessor = Assessor::default_config();
        let estimate = assessor
            .assess(&confirmed_facts(14), uniform_variables(1.4), Utc::now())
            .unwrap();

        assert_eq!(estimate.optimistic, 33);
        assert_eq!(estimate.expected, ExpectedRange::new(33, 33));
        assert_eq!(estimate.conservative, 33);
        assert_eq!(estimate.tier, LevelTier::Novice);
        assert_eq!(estimate.ici, 1.0);
        assert!(estimate.is_trusted());
        assert!(estimate.voi_questions.is_empty());
        assert_eq!(estimate.prompt_version, "thli24-v1");
    }

    #[test]
    fn test_missing_cited_fact_widens_range() {
        let facts: Vec<Fact> = confirmed_facts(14)
            .into_iter()
            .filter(|fact| fact.id != FactId::TravelDistance)
            .collect();

        let mut variables = uniform_variables(1.4);
        variables[3] = Variable::new(
            VariableId::TravelDistance,
            DiscreteScore::round(2.8),
            "commute unknown",
            vec![FactId::TravelDistance],
        );

        let assessor = Assessor::default_config();
        let estimate = assessor.assess(&facts, variables, Utc::now()).unwrap();

        // 23 × 1.4 = 32.2, plus 2.8 stepped one or two grid positions
        assert_eq!(estimate.optimistic, 32);
        assert_eq!(estimate.expected, ExpectedRange::new(33, 36));
        assert_eq!(estimate.conservative, 37);
        assert!(estimate.is_trusted());
    }

    #[test]
    fn test_low_completeness_triggers_firewall_with_zero_budget() {
        let facts = confirmed_facts(7);
        let assessor = Assessor::default_config();
        let estimate = assessor.assess(&facts, uniform_variables(2.8), Utc::now()).unwrap();

        assert_eq!(estimate.ici, 0.5);
        assert_eq!(estimate.assumption_budget_used, 0);
        assert!(estimate.firewall.triggered);
        assert!(matches!(
            estimate.firewall.reasons[0],
            FirewallReason::LowCompleteness { .. }
        ));
        assert_eq!(estimate.voi_questions.len(), 3);
        assert!(estimate.voi_questions.iter().all(|q| q.fact.is_core()));
    }

    #[test]
    fn test_variables_sorted_canonically() {
        let mut variables = uniform_variables(0.0);
        variables.reverse();

        let assessor = Assessor::default_config();
        let estimate = assessor.assess(&confirmed_facts(14), variables, Utc::now()).unwrap();
        let ids: Vec<VariableId> = estimate.variables.iter().map(|v| v.id).collect();
        assert_eq!(ids, VariableId::ALL.to_vec());
        assert_eq!(estimate.expected, ExpectedRange::new(0, 0));
    }

    #[test]
    fn test_invalid_inputs_report_all_issues() {
        let mut facts = confirmed_facts(14);
        facts.push(facts[0].clone());
        let mut variables = uniform_variables(1.4);
        variables.pop();

        let assessor = Assessor::default_config();
        let err = assessor.assess(&facts, variables, Utc::now()).unwrap_err();
        let codes: Vec<IssueCode> = err.issues().iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::DuplicateId));
        assert!(codes.contains(&IssueCode::MissingEntries));
    }

    #[test]
    fn test_assess_raw() {
        let facts_json: String = format!(
            "[{}]",
            FactId::core()
                .map(|id| format!(
                    r#"{{"id": "{}", "value": true, "uncertainty": "U0", "evidence": "E1", "provenance": "user_stated"}}"#,
                    id
                ))
                .collect::<Vec<_>>()
                .join(",")
        );
        let judgments_json = format!(
            "```json\n[{}]\n```",
            VariableId::ALL
                .iter()
                .map(|id| format!(r#"{{"id": "{}", "score": 2.7, "rationale": "r"}}"#, id))
                .collect::<Vec<_>>()
                .join(",")
        );

        let assessor = Assessor::default_config();
        let estimate = assessor.assess_raw(&facts_json, &judgments_json, Utc::now()).unwrap();

        // 2.7 quantizes to 2.8; 24 × 2.8 = 67.2
        assert_eq!(estimate.expected, ExpectedRange::new(67, 67));
        assert_eq!(estimate.tier, LevelTier::Apprentice);
    }

    #[test]
    fn test_assess_raw_rejects_bad_entries() {
        let assessor = Assessor::default_config();
        let err = assessor
            .assess_raw(r#"[{"id": "weather"}]"#, "[]", Utc::now())
            .unwrap_err();
        assert_eq!(err.issues()[0].code, IssueCode::UnknownId);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GatekeeperConfig {
            min_ici: 1.5,
            ..Default::default()
        };
        assert!(matches!(Assessor::new(config), Err(GatekeeperError::Config(_))));
        assert!(Assessor::new(GatekeeperConfig::strict()).is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use habitus_domain::{DiscreteScore, FactId, FactValue, VariableId};
    use proptest::prelude::*;

    fn tier_from(n: u8) -> UncertaintyTier {
        match n {
            0 => UncertaintyTier::U0,
            1 => UncertaintyTier::U1,
            2 => UncertaintyTier::U2,
            3 => UncertaintyTier::U3,
            _ => UncertaintyTier::U4,
        }
    }

    proptest! {
        /// Property: optimistic <= expected.min <= expected.max <= conservative
        #[test]
        fn test_level_ordering(
            scores in proptest::collection::vec(0usize..7, 24),
            tiers in proptest::collection::vec(0u8..5, 10),
        ) {
            // Restricted facts stay confirmed so the fact set validates
            let facts: Vec<Fact> = FactId::core()
                .filter(|id| !id.requires_user_statement())
                .zip(&tiers)
                .map(|(id, tier)| {
                    let tier = tier_from(*tier);
                    if tier == UncertaintyTier::U0 {
                        Fact::stated(id, FactValue::Bool(true))
                    } else {
                        Fact::inferred(id, FactValue::Bool(true), tier)
                    }
                })
                .collect();
            let cited: Vec<FactId> = facts.iter().map(|f| f.id).collect();

            let variables: Vec<Variable> = VariableId::ALL
                .iter()
                .zip(&scores)
                .enumerate()
                .map(|(i, (id, idx))| {
                    let score = DiscreteScore::ZERO.step_up(*idx as u8);
                    Variable::new(*id, score, "", vec![cited[i % cited.len()]])
                })
                .collect();

            let assessor = Assessor::default_config();
            let estimate = assessor.assess(&facts, variables, Utc::now()).unwrap();
            prop_assert!(estimate.optimistic <= estimate.expected.min);
            prop_assert!(estimate.expected.min <= estimate.expected.max);
            prop_assert!(estimate.expected.max <= estimate.conservative);
        }
    }
}
