//! Configuration for baby-step planning

use habitus_domain::MAX_LEVEL;
use serde::{Deserialize, Serialize};

/// Targets and label thresholds for the plan generator
///
/// # Examples
///
/// ```
/// use habitus_babystep::BabyStepConfig;
///
/// let config = BabyStepConfig::default();
/// assert_eq!(config.lv50_ratio, 0.5);
/// assert_eq!(config.lv10_level, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyStepConfig {
    /// Fraction of the current level targeted by the Lv50 plan
    /// Default: 0.5
    pub lv50_ratio: f64,

    /// Fixed level targeted by the Lv10 plan
    /// Default: 10
    pub lv10_level: u32,

    /// Upper target/current ratios for the difficulty labels, ascending
    /// Default: [0.1, 0.3, 0.5, 0.7]
    #[serde(default = "default_breakpoints")]
    pub difficulty_breakpoints: [f64; 4],
}

fn default_breakpoints() -> [f64; 4] {
    [0.1, 0.3, 0.5, 0.7]
}

impl Default for BabyStepConfig {
    fn default() -> Self {
        Self {
            lv50_ratio: 0.5,
            lv10_level: 10,
            difficulty_breakpoints: default_breakpoints(),
        }
    }
}

impl BabyStepConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.lv50_ratio) {
            return Err(format!("lv50_ratio {} must be within [0.0, 1.0]", self.lv50_ratio));
        }
        if self.lv10_level > MAX_LEVEL {
            return Err(format!("lv10_level {} exceeds {}", self.lv10_level, MAX_LEVEL));
        }
        let ascending = self.difficulty_breakpoints.windows(2).all(|w| w[0] < w[1]);
        let bounded = self
            .difficulty_breakpoints
            .iter()
            .all(|b| *b > 0.0 && *b <= 1.0);
        if !ascending || !bounded {
            return Err(format!(
                "difficulty_breakpoints {:?} must be ascending within (0.0, 1.0]",
                self.difficulty_breakpoints
            ));
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
