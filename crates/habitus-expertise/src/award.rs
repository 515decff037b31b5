//! Experience awards

use crate::history::LevelChange;
use crate::scaling::{distribute_experience, expertise_level};
use crate::{ExpertiseConfig, ExpertiseError};
use chrono::{DateTime, Utc};
use habitus_domain::{ChangeReason, DomainCode, ExpertiseDomain, UserId, MAX_LEVEL};

/// Experience earned by one activity
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceAward {
    /// Who earned it
    pub user_id: UserId,
    /// Points before the multiplier
    pub base_points: u64,
    /// Completion-rate multiplier
    pub multiplier: f64,
    /// Domains the activity trains, in priority order
    pub domains: Vec<DomainCode>,
    /// When the activity happened
    pub occurred_at: DateTime<Utc>,
}

impl ExperienceAward {
    /// Points after the multiplier, floored
    pub fn points(&self) -> u64 {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return 0;
        }
        (self.base_points as f64 * self.multiplier).floor() as u64
    }
}

/// Domains touched by an award and the level changes it caused
#[derive(Debug, Clone, PartialEq)]
pub struct AwardOutcome {
    /// Points actually distributed
    pub points_awarded: u64,
    /// New state of every touched domain
    pub domains: Vec<ExpertiseDomain>,
    /// One change per touched domain, recorded or not by the history rules
    pub changes: Vec<LevelChange>,
}

/// Apply an award to a user's current domains
///
/// Points are split with [`distribute_experience`]. Levels gained from the
/// added experience stack on the current level, so a decayed domain keeps its
/// decay while still growing. Every touched domain gets its inactivity clock
/// reset and its decay baseline moved to the new level.
pub fn award_experience(
    state: &[ExpertiseDomain],
    award: &ExperienceAward,
    config: &ExpertiseConfig,
) -> Result<AwardOutcome, ExpertiseError> {
    let general = DomainCode::new(config.general_domain_code.as_str()).map_err(ExpertiseError::Config)?;
    let points_awarded = award.points();

    let mut domains = Vec::new();
    let mut changes = Vec::new();

    for (code, points) in distribute_experience(points_awarded, &award.domains, &general) {
        let existing = state
            .iter()
            .find(|d| d.user_id == award.user_id && d.domain_code == code);
        let previous_level = existing.map(|d| d.expertise_level);
        let mut domain = existing
            .cloned()
            .unwrap_or_else(|| ExpertiseDomain::empty(award.user_id, code.clone(), award.occurred_at));

        let before = expertise_level(domain.experience_points);
        domain.experience_points = domain.experience_points.saturating_add(points);
        let gained = expertise_level(domain.experience_points).saturating_sub(before);

        domain.expertise_level = (domain.expertise_level + gained).min(MAX_LEVEL);
        domain.pre_decay_level = domain.expertise_level;
        domain.last_activity_at = domain.last_activity_at.max(award.occurred_at);

        changes.push(LevelChange::expertise(
            code,
            previous_level,
            domain.expertise_level,
            ChangeReason::ExperienceAwarded,
        ));
        domains.push(domain);
    }

    Ok(AwardOutcome {
        points_awarded,
        domains,
        changes,
    })
}

/// Merge updated domains into the current state, replacing by domain code
pub fn merge_domains(state: &[ExpertiseDomain], updated: &[ExpertiseDomain]) -> Vec<ExpertiseDomain> {
    let mut merged: Vec<ExpertiseDomain> = state
        .iter()
        .filter(|d| !updated.iter().any(|u| u.domain_code == d.domain_code))
        .cloned()
        .collect();
    merged.extend(updated.iter().cloned());
    merged.sort_by(|a, b| a.domain_code.cmp(&b.domain_code));
    merged
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: awarding experience never lowers a domain's level
        #[test]
        fn test_award_never_lowers(
            start_xp in 0u64..5_000_000,
            decay in 0u32..20,
            points in 0u64..1_000_000,
        ) {
            let user = UserId::new();
            let full = expertise_level(start_xp);
            let level = full.saturating_sub(decay);
            let domain = ExpertiseDomain {
                user_id: user,
                domain_code: DomainCode::general(),
                experience_points: start_xp,
                expertise_level: level,
                pre_decay_level: full,
                last_activity_at: Utc::now(),
            };
            let award = ExperienceAward {
                user_id: user,
                base_points: points,
                multiplier: 1.0,
                domains: vec![],
                occurred_at: Utc::now(),
            };
            let outcome = award_experience(&[domain], &award, &ExpertiseConfig::default()).unwrap();
            prop_assert!(outcome.domains[0].expertise_level >= level);
        }
    }
}
