//! Inactivity decay of expertise levels

use crate::ExpertiseConfig;
use chrono::{DateTime, Utc};
use habitus_domain::ExpertiseDomain;

/// Levels removed after `inactive_days` without activity
///
/// One level per full week beyond the grace period, never more than
/// `floor(pre_decay_level × cap_ratio)`.
///
/// # Examples
///
/// ```
/// use habitus_expertise::decay_amount;
///
/// // 14-day grace, then one level per full week
/// assert_eq!(decay_amount(100, 14, 14, 0.2), 0);
/// assert_eq!(decay_amount(100, 27, 14, 0.2), 1);
/// assert_eq!(decay_amount(100, 1000, 14, 0.2), 20);
/// ```
pub fn decay_amount(pre_decay_level: u32, inactive_days: i64, grace_days: u32, cap_ratio: f64) -> u32 {
    let beyond_grace = inactive_days - i64::from(grace_days);
    if beyond_grace <= 0 {
        return 0;
    }
    let weeks = u32::try_from(beyond_grace / 7).unwrap_or(u32::MAX);
    weeks.min(decay_cap(pre_decay_level, cap_ratio))
}

/// Largest decay allowed for a level
pub fn decay_cap(pre_decay_level: u32, cap_ratio: f64) -> u32 {
    let cap = (pre_decay_level as f64 * cap_ratio.clamp(0.0, 1.0)).floor();
    (cap as u32).min(pre_decay_level)
}

/// Decayed level of a domain at `now`, or `None` if it would not change
///
/// Measured from `pre_decay_level`, so repeated sweeps converge on the same
/// level instead of compounding. The result never exceeds the current level.
pub fn decayed_level(domain: &ExpertiseDomain, now: DateTime<Utc>, config: &ExpertiseConfig) -> Option<u32> {
    let inactive_days = (now - domain.last_activity_at).num_days();
    let amount = decay_amount(
        domain.pre_decay_level,
        inactive_days,
        config.grace_period_days,
        config.decay_cap_ratio,
    );
    let level = domain
        .pre_decay_level
        .saturating_sub(amount)
        .min(domain.expertise_level);

    (level != domain.expertise_level).then_some(level)
}
