//! Configuration for expertise scaling, decay and the decay sweep
//!
//! Defines the grace period, the decay cap and the sweep interval.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the expertise engine
///
/// Controls decay timing, history thresholds and the background sweep.
///
/// # Examples
///
/// ```
/// use habitus_expertise::ExpertiseConfig;
///
/// // Default configuration
/// let config = ExpertiseConfig::default();
/// assert_eq!(config.grace_period_days, 14);
///
/// // Faster decay, frequent sweeps
/// let config = ExpertiseConfig::aggressive();
/// assert_eq!(config.grace_period_days, 7);
///
/// // Slower decay, weekly sweeps
/// let config = ExpertiseConfig::lenient();
/// assert_eq!(config.grace_period_days, 28);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertiseConfig {
    /// Days of inactivity before decay starts
    /// Default: 14 days
    pub grace_period_days: u32,

    /// Maximum share of the pre-decay level that decay may remove
    /// Default: 0.20
    pub decay_cap_ratio: f64,

    /// Minimum continuity change (exclusive) worth a history record
    /// Default: 5
    pub continuity_history_threshold: u32,

    /// How often the decay sweep runs (in minutes)
    /// Default: every 1440 minutes (daily)
    pub sweep_interval_minutes: u64,

    /// Domain that receives experience from unclassified activities
    /// Default: "general"
    #[serde(default = "default_general_domain")]
    pub general_domain_code: String,

    /// How far back completions are read when recalculating a user
    /// Default: 180 days
    #[serde(default = "default_lookback")]
    pub activity_lookback_days: u32,

    /// Dry-run mode: log what would decay without writing
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_general_domain() -> String {
    "general".to_string()
}

fn default_lookback() -> u32 {
    180
}

impl Default for ExpertiseConfig {
    /// Balanced decay policy
    ///
    /// - Grace period: 14 days
    /// - Decay cap: 20% of the pre-decay level
    /// - Sweep interval: daily
    fn default() -> Self {
        Self {
            grace_period_days: 14,
            decay_cap_ratio: 0.20,
            continuity_history_threshold: 5,
            sweep_interval_minutes: 1440,
            general_domain_code: default_general_domain(),
            activity_lookback_days: default_lookback(),
            dry_run: false,
        }
    }
}

impl ExpertiseConfig {
    /// Faster decay with frequent sweeps
    ///
    /// - Grace period: 7 days
    /// - Decay cap: 30%
    /// - Sweep interval: 6 hours
    pub fn aggressive() -> Self {
        Self {
            grace_period_days: 7,
            decay_cap_ratio: 0.30,
            sweep_interval_minutes: 360,
            ..Self::default()
        }
    }

    /// Slower decay with weekly sweeps
    ///
    /// - Grace period: 28 days
    /// - Decay cap: 10%
    /// - Sweep interval: weekly
    pub fn lenient() -> Self {
        Self {
            grace_period_days: 28,
            decay_cap_ratio: 0.10,
            sweep_interval_minutes: 10080,
            ..Self::default()
        }
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }

    /// Get the grace period as a chrono duration
    pub fn grace_period(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.grace_period_days))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.decay_cap_ratio) {
            return Err(format!(
                "decay_cap_ratio {} must be within [0.0, 1.0]",
                self.decay_cap_ratio
            ));
        }
        if self.sweep_interval_minutes == 0 {
            return Err("sweep_interval_minutes must be positive".to_string());
        }
        if self.general_domain_code.trim().is_empty() {
            return Err("general_domain_code cannot be empty".to_string());
        }
        if self.activity_lookback_days == 0 {
            return Err("activity_lookback_days must be positive".to_string());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExpertiseConfig::default();
        assert_eq!(config.grace_period_days, 14);
        assert_eq!(config.decay_cap_ratio, 0.20);
        assert_eq!(config.continuity_history_threshold, 5);
        assert_eq!(config.sweep_interval_minutes, 1440);
        assert_eq!(config.general_domain_code, "general");
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let aggressive = ExpertiseConfig::aggressive();
        let lenient = ExpertiseConfig::lenient();
        let default = ExpertiseConfig::default();
        assert!(aggressive.grace_period_days < default.grace_period_days);
        assert!(lenient.grace_period_days > default.grace_period_days);
        assert!(aggressive.validate().is_ok());
        assert!(lenient.validate().is_ok());
    }

    #[test]
    fn test_duration_conversions() {
        let config = ExpertiseConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(86400));
        assert_eq!(config.grace_period(), chrono::Duration::days(14));
    }

    #[test]
    fn test_invalid_config() {
        let config = ExpertiseConfig {
            decay_cap_ratio: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExpertiseConfig {
            sweep_interval_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_defaults_optional_fields() {
        let toml_str = r#"
            grace_period_days = 21
            decay_cap_ratio = 0.15
            continuity_history_threshold = 5
            sweep_interval_minutes = 60
        "#;
        let config = ExpertiseConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.grace_period_days, 21);
        assert_eq!(config.general_domain_code, "general");
        assert_eq!(config.activity_lookback_days, 180);
        assert!(!config.dry_run);

        let round_trip = ExpertiseConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ExpertiseConfig::aggressive();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ExpertiseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
