//! Weights and windows of the progression formulas

use serde::{Deserialize, Serialize};

/// One band of the experience multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierTier {
    /// Lowest completion rate (percent) in this band
    pub min_rate: f64,

    /// Experience multiplier for the band
    pub multiplier: f64,
}

/// Progression configuration
///
/// # Examples
///
/// ```
/// use habitus_progression::ProgressionConfig;
///
/// let config = ProgressionConfig::default();
/// assert_eq!(config.streak_window_days, 30);
/// assert_eq!(config.break_multiplier, 3.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Continuity weight of the weighted streak
    /// Default: 0.4
    pub streak_weight: f64,

    /// Continuity weight of the 30-day completion rate
    /// Default: 0.3
    pub completion_weight: f64,

    /// Continuity weight of the active-habit ratio
    /// Default: 0.3
    pub active_weight: f64,

    /// Resilience weight of the recovery rate
    /// Default: 0.5
    pub recovery_weight: f64,

    /// Resilience weight of bounce-backs
    /// Default: 0.3
    pub bounce_back_weight: f64,

    /// Resilience weight of the streak recovery ratio
    /// Default: 0.2
    pub streak_recovery_weight: f64,

    /// Overall-level weight of the top expertise average
    /// Default: 0.5
    pub expertise_weight: f64,

    /// Overall-level weight of continuity power
    /// Default: 0.25
    pub continuity_weight: f64,

    /// Overall-level weight of resilience
    /// Default: 0.25
    pub resilience_weight: f64,

    /// Window for streaks and completion rate (days)
    /// Default: 30
    pub streak_window_days: u32,

    /// Window for counting a habit as active (days)
    /// Default: 7
    pub active_window_days: u32,

    /// A gap longer than this many expected gaps is a break
    /// Default: 3.0
    pub break_multiplier: f64,

    /// How many expertise domains feed the overall level
    /// Default: 5
    pub top_expertise_count: usize,

    /// Experience multiplier bands, ascending by `min_rate`
    #[serde(default = "default_multiplier_tiers")]
    pub multiplier_tiers: Vec<MultiplierTier>,
}

fn default_multiplier_tiers() -> Vec<MultiplierTier> {
    [
        (0.0, 0.3),
        (50.0, 0.6),
        (80.0, 0.8),
        (100.0, 1.0),
        (121.0, 0.9),
        (151.0, 0.7),
    ]
    .into_iter()
    .map(|(min_rate, multiplier)| MultiplierTier { min_rate, multiplier })
    .collect()
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            streak_weight: 0.4,
            completion_weight: 0.3,
            active_weight: 0.3,
            recovery_weight: 0.5,
            bounce_back_weight: 0.3,
            streak_recovery_weight: 0.2,
            expertise_weight: 0.5,
            continuity_weight: 0.25,
            resilience_weight: 0.25,
            streak_window_days: 30,
            active_window_days: 7,
            break_multiplier: 3.0,
            top_expertise_count: 5,
            multiplier_tiers: default_multiplier_tiers(),
        }
    }
}

impl ProgressionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            self.streak_weight,
            self.completion_weight,
            self.active_weight,
            self.recovery_weight,
            self.bounce_back_weight,
            self.streak_recovery_weight,
            self.expertise_weight,
            self.continuity_weight,
            self.resilience_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("weights must be finite and non-negative".to_string());
        }
        if self.streak_window_days == 0 || self.active_window_days == 0 {
            return Err("windows must be at least one day".to_string());
        }
        if self.break_multiplier < 1.0 {
            return Err(format!("break_multiplier {} must be at least 1.0", self.break_multiplier));
        }
        if self.top_expertise_count == 0 {
            return Err("top_expertise_count must be positive".to_string());
        }
        match self.multiplier_tiers.first() {
            Some(first) if first.min_rate <= 0.0 => {}
            _ => return Err("multiplier_tiers must start at a rate of 0".to_string()),
        }
        if !self
            .multiplier_tiers
            .windows(2)
            .all(|w| w[0].min_rate < w[1].min_rate)
        {
            return Err("multiplier_tiers must be ascending by min_rate".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
