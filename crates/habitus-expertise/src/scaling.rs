//! Expertise level scaling and experience distribution

use habitus_domain::{clamp_level, DomainCode};

// Absorbs log2 rounding at exact powers of two (xp = 100, 3100, 102300, ...)
const LOG_EPSILON: f64 = 1e-9;

/// Expertise level for an experience total
///
/// `floor(10·log2(xp/100 + 1))`, clamped to [0, 199]. Monotonic
/// non-decreasing in `xp`.
///
/// # Examples
///
/// ```
/// use habitus_expertise::expertise_level;
///
/// assert_eq!(expertise_level(0), 0);
/// assert_eq!(expertise_level(100), 10);
/// assert_eq!(expertise_level(3100), 50);
/// assert_eq!(expertise_level(102300), 100);
/// ```
pub fn expertise_level(experience_points: u64) -> u32 {
    if experience_points == 0 {
        return 0;
    }
    let raw = 10.0 * (experience_points as f64 / 100.0 + 1.0).log2();
    clamp_level(raw + LOG_EPSILON)
}

/// Split `total` points across `domains`
///
/// Every domain receives `floor(total / n)`; the first listed domain also
/// receives the remainder. Repeated codes count once. An empty list sends
/// everything to `general`.
pub fn distribute_experience(
    total: u64,
    domains: &[DomainCode],
    general: &DomainCode,
) -> Vec<(DomainCode, u64)> {
    let mut unique: Vec<&DomainCode> = Vec::with_capacity(domains.len());
    for code in domains {
        if !unique.contains(&code) {
            unique.push(code);
        }
    }

    if unique.is_empty() {
        return vec![(general.clone(), total)];
    }

    let n = unique.len() as u64;
    let base = total / n;
    let remainder = total % n;

    unique
        .into_iter()
        .enumerate()
        .map(|(i, code)| {
            let points = if i == 0 { base + remainder } else { base };
            (code.clone(), points)
        })
        .collect()
}
