//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Thresholds for the firewall and intake rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Minimum Information Completeness Index for a trusted score
    pub min_ici: f64,

    /// Maximum number of assumed facts for a trusted score
    pub max_assumption_budget: u32,

    /// How many VOI questions to surface when the firewall is up
    pub max_voi_questions: usize,

    /// Version tag stamped on every estimate
    pub prompt_version: String,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            min_ici: 0.6,
            max_assumption_budget: 6,
            max_voi_questions: 3,
            prompt_version: "thli24-v1".to_string(),
        }
    }
}

impl GatekeeperConfig {
    /// Stricter gate: more confirmed facts, fewer assumptions
    pub fn strict() -> Self {
        Self {
            min_ici: 0.8,
            max_assumption_budget: 3,
            max_voi_questions: 5,
            ..Self::default()
        }
    }

    /// Looser gate for exploratory sessions
    pub fn permissive() -> Self {
        Self {
            min_ici: 0.4,
            max_assumption_budget: 10,
            max_voi_questions: 2,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_ici) {
            return Err(format!("min_ici {} must be within [0.0, 1.0]", self.min_ici));
        }
        if self.prompt_version.trim().is_empty() {
            return Err("prompt_version cannot be empty".to_string());
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
        let config = GatekeeperConfig::default();
        assert_eq!(config.min_ici, 0.6);
        assert_eq!(config.max_assumption_budget, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(GatekeeperConfig::strict().validate().is_ok());
        assert!(GatekeeperConfig::permissive().validate().is_ok());
        assert!(GatekeeperConfig::strict().min_ici > GatekeeperConfig::default().min_ici);
    }

    #[test]
    fn test_invalid_min_ici() {
        let config = GatekeeperConfig {
            min_ici: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GatekeeperConfig::strict();
        let toml_str = config.to_toml().unwrap();
        let parsed = GatekeeperConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
