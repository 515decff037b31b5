//! Discrete score module - the fixed grid of THLI-24 variable scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven canonical score values, in ascending order
pub const DISCRETE_SCORES: [f64; 7] = [0.0, 1.4, 2.8, 4.1, 5.5, 6.9, 8.3];

/// Tolerance used when checking whether a raw value sits on the grid
const GRID_EPSILON: f64 = 1e-9;

/// A variable score restricted to the seven canonical values
///
/// Stored as an index into [`DISCRETE_SCORES`], so an off-grid value can never
/// be represented. Serializes as the plain number (e.g. `4.1`) and refuses to
/// deserialize anything that is not a grid member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscreteScore(u8);

impl DiscreteScore {
    /// The lowest score (0.0)
    pub const ZERO: DiscreteScore = DiscreteScore(0);

    /// The highest score (8.3)
    pub const MAX: DiscreteScore = DiscreteScore(6);

    /// All grid members in ascending order
    pub fn all() -> impl Iterator<Item = DiscreteScore> {
        (0..DISCRETE_SCORES.len() as u8).map(DiscreteScore)
    }

    /// Round a raw score to the nearest grid member
    ///
    /// Values below the grid clamp to 0.0, values above clamp to 8.3 and NaN
    /// maps to 0.0. An exact midpoint between two members resolves to the
    /// lower one.
    ///
    /// # Examples
    ///
    /// ```
    /// use habitus_domain::DiscreteScore;
    ///
    /// assert_eq!(DiscreteScore::round(3.0).value(), 2.8);
    /// assert_eq!(DiscreteScore::round(3.6).value(), 4.1);
    /// assert_eq!(DiscreteScore::round(42.0).value(), 8.3);
    /// ```
    pub fn round(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::ZERO;
        }

        let mut best = 0usize;
        let mut best_distance = f64::INFINITY;
        for (idx, candidate) in DISCRETE_SCORES.iter().enumerate() {
            let distance = (raw - candidate).abs();
            if distance < best_distance {
                best = idx;
                best_distance = distance;
            }
        }

        DiscreteScore(best as u8)
    }

    /// Look up an exact grid member, `None` if `value` is off the grid
    pub fn from_value(value: f64) -> Option<Self> {
        DISCRETE_SCORES
            .iter()
            .position(|candidate| (value - candidate).abs() < GRID_EPSILON)
            .map(|idx| DiscreteScore(idx as u8))
    }

    /// Check whether a raw value is a member of the grid
    pub fn is_member(value: f64) -> bool {
        Self::from_value(value).is_some()
    }

    /// Numeric value of this score
    pub fn value(&self) -> f64 {
        DISCRETE_SCORES[self.0 as usize]
    }

    /// Position on the grid (0 for 0.0, 6 for 8.3)
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Move `steps` grid positions down, saturating at 0.0
    pub fn step_down(&self, steps: u8) -> Self {
        DiscreteScore(self.0.saturating_sub(steps))
    }

    /// Move `steps` grid positions up, saturating at 8.3
    pub fn step_up(&self, steps: u8) -> Self {
        DiscreteScore(self.0.saturating_add(steps).min(Self::MAX.0))
    }

    /// Stoplight classification of this score
    pub fn stoplight(&self) -> Stoplight {
        Stoplight::classify(self.value())
    }
}

impl Default for DiscreteScore {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f64> for DiscreteScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| {
            format!("Score {} is not one of {:?}", value, DISCRETE_SCORES)
        })
    }
}

impl From<DiscreteScore> for f64 {
    fn from(score: DiscreteScore) -> Self {
        score.value()
    }
}

impl fmt::Display for DiscreteScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// Green/yellow/red classification of a variable score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stoplight {
    /// Score <= 2.8
    Green,
    /// 2.8 < score <= 5.5
    Yellow,
    /// Score > 5.5
    Red,
}

impl Stoplight {
    /// Classify a raw score
    pub fn classify(score: f64) -> Self {
        if score <= 2.8 {
            Stoplight::Green
        } else if score <= 5.5 {
            Stoplight::Yellow
        } else {
            Stoplight::Red
        }
    }

    /// Get the stoplight name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stoplight::Green => "green",
            Stoplight::Yellow => "yellow",
            Stoplight::Red => "red",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_exact_members() {
        for value in DISCRETE_SCORES {
            assert_eq!(DiscreteScore::round(value).value(), value);
        }
    }

    #[test]
    fn test_round_nearest() {
        assert_eq!(DiscreteScore::round(0.6).value(), 0.0);
        assert_eq!(DiscreteScore::round(0.8).value(), 1.4);
        assert_eq!(DiscreteScore::round(5.0).value(), 5.5);
        assert_eq!(DiscreteScore::round(7.5).value(), 6.9);
        assert_eq!(DiscreteScore::round(7.7).value(), 8.3);
    }

    #[test]
    fn test_round_midpoint_takes_lower() {
        assert_eq!(DiscreteScore::round(0.7), DiscreteScore::ZERO);
    }

    #[test]
    fn test_round_clamps_and_nan() {
        assert_eq!(DiscreteScore::round(-3.0), DiscreteScore::ZERO);
        assert_eq!(DiscreteScore::round(100.0), DiscreteScore::MAX);
        assert_eq!(DiscreteScore::round(f64::NAN), DiscreteScore::ZERO);
    }

    #[test]
    fn test_membership() {
        assert!(DiscreteScore::is_member(4.1));
        assert!(!DiscreteScore::is_member(4.0));
        assert!(!DiscreteScore::is_member(-1.4));
    }

    #[test]
    fn test_steps_saturate() {
        let score = DiscreteScore::round(1.4);
        assert_eq!(score.step_down(3), DiscreteScore::ZERO);
        assert_eq!(score.step_up(1).value(), 2.8);
        assert_eq!(DiscreteScore::MAX.step_up(2), DiscreteScore::MAX);
    }

    #[test]
    fn test_stoplight_boundaries() {
        assert_eq!(Stoplight::classify(2.8), Stoplight::Green);
        assert_eq!(Stoplight::classify(4.1), Stoplight::Yellow);
        assert_eq!(Stoplight::classify(5.5), Stoplight::Yellow);
        assert_eq!(Stoplight::classify(6.9), Stoplight::Red);
    }

    #[test]
    fn test_serde_rejects_off_grid() {
        let score: DiscreteScore = serde_json::from_str("5.5").unwrap();
        assert_eq!(score.value(), 5.5);
        assert!(serde_json::from_str::<DiscreteScore>("5.0").is_err());
        assert_eq!(serde_json::to_string(&score).unwrap(), "5.5");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: rounding always lands on the grid
        #[test]
        fn test_round_is_member(raw in -50.0f64..50.0) {
            let rounded = DiscreteScore::round(raw);
            prop_assert!(DiscreteScore::is_member(rounded.value()));
        }

        /// Property: rounding is idempotent
        #[test]
        fn test_round_idempotent(raw in -50.0f64..50.0) {
            let once = DiscreteScore::round(raw);
            let twice = DiscreteScore::round(once.value());
            prop_assert_eq!(once, twice);
        }

        /// Property: no grid member is strictly closer than the rounded one
        #[test]
        fn test_round_is_nearest(raw in -1.0f64..10.0) {
            let rounded = DiscreteScore::round(raw).value();
            for candidate in DISCRETE_SCORES {
                prop_assert!((raw - rounded).abs() <= (raw - candidate).abs() + 1e-12);
            }
        }
    }
}
