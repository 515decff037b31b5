//! Information completeness and firewall evaluation
//!
//! Pure functions of their inputs; nothing here logs or fails.

use crate::GatekeeperConfig;
use habitus_domain::{
    Fact, FactId, FirewallDecision, FirewallReason, UncertaintyTier, Variable, VoiQuestion,
};
use std::collections::{HashMap, HashSet};

/// Fraction of the 14 core facts confirmed by the user (tier U0)
pub fn information_completeness(facts: &[Fact]) -> f64 {
    let confirmed: HashSet<FactId> = facts
        .iter()
        .filter(|fact| fact.id.is_core() && fact.is_confirmed())
        .map(|fact| fact.id)
        .collect();

    confirmed.len() as f64 / FactId::CORE_COUNT as f64
}

/// Number of facts whose value was inferred or defaulted
pub fn assumption_budget_used(facts: &[Fact]) -> u32 {
    facts.iter().filter(|fact| fact.provenance.is_assumption()).count() as u32
}

/// Decide whether an estimate built from `facts` must be treated as provisional
///
/// Every firing condition is reported, not just the first.
pub fn evaluate_firewall(
    facts: &[Fact],
    assumption_budget_used: u32,
    config: &GatekeeperConfig,
) -> FirewallDecision {
    let mut reasons = Vec::new();

    let ici = information_completeness(facts);
    if ici < config.min_ici {
        reasons.push(FirewallReason::LowCompleteness {
            ici,
            minimum: config.min_ici,
        });
    }

    if assumption_budget_used > config.max_assumption_budget {
        reasons.push(FirewallReason::AssumptionBudgetExceeded {
            used: assumption_budget_used,
            maximum: config.max_assumption_budget,
        });
    }

    for fact in facts {
        if fact.uncertainty == UncertaintyTier::U4 {
            reasons.push(FirewallReason::UnknownFact { fact: fact.id });
        }
        if fact.id.requires_user_statement() && fact.uncertainty != UncertaintyTier::U0 {
            reasons.push(FirewallReason::InferredRestrictedFact { fact: fact.id });
        }
    }

    FirewallDecision::from_reasons(reasons)
}

/// Worst uncertainty among the facts a variable cites
///
/// A cited fact that is absent from the set counts as U4. A variable citing
/// nothing carries no fact uncertainty (U0).
pub fn variable_uncertainty(variable: &Variable, facts: &[Fact]) -> UncertaintyTier {
    variable
        .caused_by
        .iter()
        .map(|id| {
            facts
                .iter()
                .find(|fact| fact.id == *id)
                .map(|fact| fact.uncertainty)
                .unwrap_or(UncertaintyTier::U4)
        })
        .max()
        .unwrap_or(UncertaintyTier::U0)
}

/// Questions whose answers would raise completeness the most
///
/// Candidates are core facts not yet confirmed, ranked by how many variables
/// cite them, ties broken by canonical fact order.
pub fn select_voi_questions(facts: &[Fact], variables: &[Variable], max: usize) -> Vec<VoiQuestion> {
    let mut impact: HashMap<FactId, usize> = HashMap::new();
    for variable in variables {
        for id in &variable.caused_by {
            *impact.entry(*id).or_insert(0) += 1;
        }
    }

    let confirmed: HashSet<FactId> = facts
        .iter()
        .filter(|fact| fact.is_confirmed())
        .map(|fact| fact.id)
        .collect();

    let mut candidates: Vec<VoiQuestion> = FactId::core()
        .filter(|id| !confirmed.contains(id))
        .map(|id| VoiQuestion {
            fact: id,
            question: id.question().to_string(),
            impact: impact.get(&id).copied().unwrap_or(0),
        })
        .collect();

    // Stable sort keeps canonical order among equal impacts
    candidates.sort_by(|a, b| b.impact.cmp(&a.impact));
    candidates.truncate(max);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitus_domain::{DiscreteScore, FactValue, Provenance, VariableId};

    fn confirmed_facts(count: usize) -> Vec<Fact> {
        FactId::core()
            .take(count)
            .map(|id| Fact::stated(id, FactValue::Bool(true)))
            .collect()
    }

    #[test]
    fn test_ici_counts_core_confirmed_only() {
        let mut facts = confirmed_facts(7);
        facts.push(Fact::stated(FactId::TargetOutcome, FactValue::Text("run 5k".into())));
        assert_eq!(information_completeness(&facts), 0.5);

        assert_eq!(information_completeness(&confirmed_facts(14)), 1.0);
        assert_eq!(information_completeness(&[]), 0.0);
    }

    #[test]
    fn test_ici_ignores_duplicates() {
        let mut facts = confirmed_facts(1);
        facts.push(facts[0].clone());
        assert_eq!(information_completeness(&facts), 1.0 / 14.0);
    }

    #[test]
    fn test_firewall_clear_when_complete() {
        let facts = confirmed_facts(14);
        let decision = evaluate_firewall(&facts, 0, &GatekeeperConfig::default());
        assert!(!decision.triggered);
    }

    #[test]
    fn test_firewall_low_ici_even_with_zero_budget() {
        let facts = confirmed_facts(7);
        let decision = evaluate_firewall(&facts, 0, &GatekeeperConfig::default());
        assert!(decision.triggered);
        assert!(matches!(decision.reasons[0], FirewallReason::LowCompleteness { .. }));
    }

    #[test]
    fn test_firewall_budget_and_unknown() {
        let mut facts = confirmed_facts(14);
        facts[5] = Fact::inferred(facts[5].id, FactValue::Bool(false), UncertaintyTier::U4);

        let decision = evaluate_firewall(&facts, 7, &GatekeeperConfig::default());
        assert!(decision.triggered);
        assert!(decision
            .reasons
            .contains(&FirewallReason::AssumptionBudgetExceeded { used: 7, maximum: 6 }));
        assert!(decision
            .reasons
            .contains(&FirewallReason::UnknownFact { fact: facts[5].id }));
    }

    #[test]
    fn test_firewall_restricted_fact() {
        let mut facts = confirmed_facts(14);
        facts[0] = Fact::inferred(FactId::Frequency, FactValue::Text("daily".into()), UncertaintyTier::U1);

        let decision = evaluate_firewall(&facts, 1, &GatekeeperConfig::default());
        assert!(decision.reasons.contains(&FirewallReason::InferredRestrictedFact {
            fact: FactId::Frequency
        }));
    }

    #[test]
    fn test_assumption_budget() {
        let mut facts = confirmed_facts(3);
        facts.push(Fact::inferred(FactId::Location, FactValue::Text("home".into()), UncertaintyTier::U2));
        facts.push(Fact {
            provenance: Provenance::Default,
            ..Fact::stated(FactId::ToolsRequired, FactValue::Bool(false))
        });
        assert_eq!(assumption_budget_used(&facts), 2);
    }

    #[test]
    fn test_variable_uncertainty() {
        let facts = vec![
            Fact::stated(FactId::DurationMinutes, FactValue::Number(30.0)),
            Fact::inferred(FactId::Location, FactValue::Text("gym".into()), UncertaintyTier::U2),
        ];
        let score = DiscreteScore::round(2.8);

        let cited = Variable::new(VariableId::Duration, score, "", vec![FactId::DurationMinutes, FactId::Location]);
        assert_eq!(variable_uncertainty(&cited, &facts), UncertaintyTier::U2);

        let missing = Variable::new(VariableId::TravelDistance, score, "", vec![FactId::TravelDistance]);
        assert_eq!(variable_uncertainty(&missing, &facts), UncertaintyTier::U4);

        let uncited = Variable::new(VariableId::SleepImpact, score, "", vec![]);
        assert_eq!(variable_uncertainty(&uncited, &facts), UncertaintyTier::U0);
    }

    #[test]
    fn test_voi_ranked_by_impact() {
        let facts = vec![Fact::stated(FactId::Frequency, FactValue::Text("daily".into()))];
        let score = DiscreteScore::round(1.4);
        let variables = vec![
            Variable::new(VariableId::Interruptions, score, "", vec![FactId::Interruptions]),
            Variable::new(VariableId::FocusDemand, score, "", vec![FactId::Interruptions, FactId::CognitiveLoad]),
            Variable::new(VariableId::Frequency, score, "", vec![FactId::Frequency]),
        ];

        let questions = select_voi_questions(&facts, &variables, 3);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].fact, FactId::Interruptions);
        assert_eq!(questions[0].impact, 2);
        assert_eq!(questions[1].fact, FactId::CognitiveLoad);
        // Zero-impact ties fall back to canonical order
        assert_eq!(questions[2].fact, FactId::DurationMinutes);
        assert!(questions.iter().all(|q| q.fact != FactId::Frequency));
    }
}
