//! Fact, variable and estimate validation
//!
//! Validation never repairs anything. Each check appends to a shared issue
//! list so the caller sees every failing invariant at once.

use crate::GatekeeperConfig;
use habitus_domain::{
    DiscreteScore, Fact, FactId, IssueCode, LevelEstimate, LevelTier, UncertaintyTier,
    ValidationIssue, Variable, VariableId, MAX_LEVEL,
};
use std::collections::HashSet;

/// Result of a validation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Whether the input passed validation
    pub status: ValidationStatus,

    /// Every failed invariant
    pub issues: Vec<ValidationIssue>,
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Input accepted
    Accepted,

    /// Input rejected
    Rejected,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let status = if issues.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };
        Self { status, issues }
    }

    /// Whether the input was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }

    /// Convert into a `Result`, carrying the issues on rejection
    pub fn into_result(self) -> Result<(), Vec<ValidationIssue>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}

/// The Gatekeeper validates assessment inputs and outputs
pub struct Gatekeeper {
    config: GatekeeperConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: GatekeeperConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(GatekeeperConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Validate a (possibly partial) fact set
    ///
    /// Checks:
    /// 1. At most 16 entries
    /// 2. No duplicate ids
    /// 3. No-inference facts carry tier U0
    /// 4. Numeric values are finite and non-negative
    pub fn validate_facts(&self, facts: &[Fact]) -> ValidationReport {
        let mut issues = Vec::new();
        self.check_facts(facts, &mut issues);
        ValidationReport::from_issues(issues)
    }

    /// Validate a complete 24-variable set
    pub fn validate_variables(&self, variables: &[Variable]) -> ValidationReport {
        let mut issues = Vec::new();
        self.check_variables(variables, &mut issues);
        ValidationReport::from_issues(issues)
    }

    /// Validate a complete level estimate
    ///
    /// Checks the 24 variables, ICI bounds, level bounds and ordering
    /// (optimistic <= expected.min <= expected.max <= conservative), tier and
    /// firewall consistency.
    pub fn validate_estimate(&self, estimate: &LevelEstimate) -> ValidationReport {
        let mut issues = Vec::new();

        self.check_variables(&estimate.variables, &mut issues);

        if !estimate.ici.is_finite() || !(0.0..=1.0).contains(&estimate.ici) {
            issues.push(ValidationIssue::new(
                "ici",
                format!("ICI {} is outside [0, 1]", estimate.ici),
                IssueCode::OutOfRange,
            ));
        }

        let levels = [
            ("optimistic", estimate.optimistic),
            ("expected.min", estimate.expected.min),
            ("expected.max", estimate.expected.max),
            ("conservative", estimate.conservative),
        ];
        for (field, level) in levels {
            if level > MAX_LEVEL {
                issues.push(ValidationIssue::new(
                    field,
                    format!("level {} exceeds {}", level, MAX_LEVEL),
                    IssueCode::OutOfRange,
                ));
            }
        }
        for pair in levels.windows(2) {
            let (lower_field, lower) = pair[0];
            let (upper_field, upper) = pair[1];
            if lower > upper {
                issues.push(ValidationIssue::new(
                    upper_field,
                    format!("{} ({}) must not exceed {} ({})", lower_field, lower, upper_field, upper),
                    IssueCode::LevelOrdering,
                ));
            }
        }

        let expected_tier = LevelTier::classify(estimate.expected.min);
        if estimate.tier != expected_tier {
            issues.push(ValidationIssue::new(
                "tier",
                format!(
                    "tier {} does not match expected.min {} ({})",
                    estimate.tier.as_str(),
                    estimate.expected.min,
                    expected_tier.as_str()
                ),
                IssueCode::Inconsistent,
            ));
        }

        if estimate.firewall.triggered == estimate.firewall.reasons.is_empty() {
            issues.push(ValidationIssue::new(
                "firewall",
                "firewall flag disagrees with its reasons",
                IssueCode::Inconsistent,
            ));
        }

        if estimate.prompt_version.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "prompt_version",
                "prompt version is empty",
                IssueCode::MissingEntries,
            ));
        }

        ValidationReport::from_issues(issues)
    }

    fn check_facts(&self, facts: &[Fact], issues: &mut Vec<ValidationIssue>) {
        if facts.len() > FactId::ALL.len() {
            issues.push(ValidationIssue::new(
                "facts",
                format!("{} facts supplied, at most {} allowed", facts.len(), FactId::ALL.len()),
                IssueCode::TooManyEntries,
            ));
        }

        let mut seen = HashSet::new();
        for (idx, fact) in facts.iter().enumerate() {
            if !seen.insert(fact.id) {
                issues.push(ValidationIssue::new(
                    format!("facts[{}].id", idx),
                    format!("fact '{}' appears more than once", fact.id),
                    IssueCode::DuplicateId,
                ));
            }

            if fact.id.requires_user_statement() && fact.uncertainty != UncertaintyTier::U0 {
                issues.push(ValidationIssue::new(
                    format!("facts[{}].uncertainty", idx),
                    format!(
                        "fact '{}' must be stated by the user (U0), got {}",
                        fact.id,
                        fact.uncertainty.as_str()
                    ),
                    IssueCode::InferenceNotAllowed,
                ));
            }

            if let Some(number) = fact.value.as_number() {
                if !number.is_finite() || number < 0.0 {
                    issues.push(ValidationIssue::new(
                        format!("facts[{}].value", idx),
                        format!("fact '{}' has invalid numeric value {}", fact.id, number),
                        IssueCode::OutOfRange,
                    ));
                }
            }
        }
    }

    fn check_variables(&self, variables: &[Variable], issues: &mut Vec<ValidationIssue>) {
        if variables.len() != VariableId::ALL.len() {
            issues.push(ValidationIssue::new(
                "variables",
                format!("expected {} variables, got {}", VariableId::ALL.len(), variables.len()),
                if variables.len() > VariableId::ALL.len() {
                    IssueCode::TooManyEntries
                } else {
                    IssueCode::MissingEntries
                },
            ));
        }

        let mut seen = HashSet::new();
        for (idx, variable) in variables.iter().enumerate() {
            if !seen.insert(variable.id) {
                issues.push(ValidationIssue::new(
                    format!("variables[{}].id", idx),
                    format!("variable '{}' appears more than once", variable.id),
                    IssueCode::DuplicateId,
                ));
            }

            if !DiscreteScore::is_member(variable.score.value()) {
                issues.push(ValidationIssue::new(
                    format!("variables[{}].score", idx),
                    format!("score {} is not on the discrete grid", variable.score.value()),
                    IssueCode::OffGridScore,
                ));
            }

            if variable.stoplight != variable.score.stoplight() {
                issues.push(ValidationIssue::new(
                    format!("variables[{}].stoplight", idx),
                    format!(
                        "stoplight {} does not match score {}",
                        variable.stoplight.as_str(),
                        variable.score
                    ),
                    IssueCode::Inconsistent,
                ));
            }

            if variable.domain != variable.id.domain() {
                issues.push(ValidationIssue::new(
                    format!("variables[{}].domain", idx),
                    format!(
                        "variable '{}' belongs to {}, not {}",
                        variable.id,
                        variable.id.domain().as_str(),
                        variable.domain.as_str()
                    ),
                    IssueCode::Inconsistent,
                ));
            }
        }

        let missing: Vec<&str> = VariableId::ALL
            .iter()
            .filter(|id| !seen.contains(*id))
            .map(|id| id.as_str())
            .collect();
        if !missing.is_empty() {
            issues.push(ValidationIssue::new(
                "variables",
                format!("missing variables: {}", missing.join(", ")),
                IssueCode::MissingEntries,
            ));
        }
    }
}
