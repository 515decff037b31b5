//! Overall level and experience multiplier

use crate::config::MultiplierTier;
use habitus_domain::{clamp_level, MAX_LEVEL};

/// Mean of the `count` highest expertise levels, 0 if there are none
pub fn top_expertise_average(levels: &[u32], count: usize) -> f64 {
    let mut sorted = levels.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.truncate(count);

    if sorted.is_empty() {
        return 0.0;
    }
    sorted.iter().map(|l| *l as f64).sum::<f64>() / sorted.len() as f64
}

/// Weighted overall level before flooring and clamping
pub fn overall_level_raw(
    expertise_average: f64,
    continuity_power: f64,
    resilience: f64,
    weights: (f64, f64, f64),
) -> f64 {
    weights.0 * expertise_average + weights.1 * continuity_power + weights.2 * resilience
}

/// Overall level with the standard weights (0.5, 0.25, 0.25)
///
/// # Examples
///
/// ```
/// use habitus_progression::overall_level;
///
/// // 0.5·199 + 0.25·100 + 0.25·100 = 149.5
/// assert_eq!(overall_level(199.0, 100.0, 100.0), 149);
/// ```
pub fn overall_level(expertise_average: f64, continuity_power: f64, resilience: f64) -> u32 {
    clamp_level(overall_level_raw(
        expertise_average,
        continuity_power,
        resilience,
        (0.5, 0.25, 0.25),
    ))
}

/// Completion rate in percent, capped at 500
///
/// A target of zero yields 0.
pub fn completion_rate(actual: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (100.0 * actual as f64 / target as f64).min(500.0)
}

/// Experience multiplier for a completion rate
///
/// The band with the highest `min_rate` not above `rate` wins. Adherence to
/// the plan (100-120%) earns the most; overshooting earns less.
pub fn experience_multiplier(rate: f64, tiers: &[MultiplierTier]) -> f64 {
    tiers
        .iter()
        .rev()
        .find(|tier| rate >= tier.min_rate)
        .or(tiers.first())
        .map(|tier| tier.multiplier)
        .unwrap_or(1.0)
}

/// Whether a level is inside [0, 199]
pub fn is_valid_level(level: u32) -> bool {
    level <= MAX_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProgressionConfig;

    #[test]
    fn test_top_expertise_average() {
        assert_eq!(top_expertise_average(&[], 5), 0.0);
        assert_eq!(top_expertise_average(&[10, 30], 5), 20.0);
        assert_eq!(top_expertise_average(&[1, 100, 90, 80, 70, 60, 2], 5), 80.0);
    }

    #[test]
    fn test_overall_weight_sum() {
        let raw = overall_level_raw(199.0, 100.0, 100.0, (0.5, 0.25, 0.25));
        assert!((raw - 149.5).abs() < 1e-9);
        assert_eq!(overall_level(199.0, 100.0, 100.0), 149);
        assert_eq!(overall_level(0.0, 0.0, 0.0), 0);
        assert_eq!(overall_level(500.0, 100.0, 100.0), 199);
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(10, 10), 100.0);
        assert_eq!(completion_rate(100, 10), 500.0);
        assert_eq!(completion_rate(5, 0), 0.0);
    }

    #[test]
    fn test_multiplier_tiers() {
        let tiers = ProgressionConfig::default().multiplier_tiers;
        assert_eq!(experience_multiplier(0.0, &tiers), 0.3);
        assert_eq!(experience_multiplier(49.0, &tiers), 0.3);
        assert_eq!(experience_multiplier(50.0, &tiers), 0.6);
        assert_eq!(experience_multiplier(79.0, &tiers), 0.6);
        assert_eq!(experience_multiplier(80.0, &tiers), 0.8);
        assert_eq!(experience_multiplier(100.0, &tiers), 1.0);
        assert_eq!(experience_multiplier(120.0, &tiers), 1.0);
        assert_eq!(experience_multiplier(121.0, &tiers), 0.9);
        assert_eq!(experience_multiplier(150.0, &tiers), 0.9);
        assert_eq!(experience_multiplier(151.0, &tiers), 0.7);
        assert_eq!(experience_multiplier(500.0, &tiers), 0.7);
    }

    #[test]
    fn test_multiplier_not_monotonic() {
        let tiers = ProgressionConfig::default().multiplier_tiers;
        assert!(experience_multiplier(110.0, &tiers) > experience_multiplier(200.0, &tiers));
    }
}
