//! Habitus Gatekeeper
//!
//! Validates collaborator-supplied facts and variable judgments, computes the
//! Information Completeness Index and decides whether a difficulty score may
//! be trusted.
//!
//! The Gatekeeper provides:
//! - Fact set, variable set and level estimate validation (complete issue lists)
//! - ICI, assumption budget and firewall evaluation
//! - Intake parsing of the extractor's JSON output
//! - Assembly of a validated [`LevelEstimate`](habitus_domain::LevelEstimate)
//!
//! # Architecture
//!
//! ```text
//! extractor JSON → intake → Gatekeeper (validate) → Assessor → LevelEstimate
//!                                                     ↓
//!                                         firewall + VOI questions
//! ```
//!
//! # Examples
//!
//! ```
//! use habitus_gatekeeper::Assessor;
//!
//! let assessor = Assessor::default_config();
//! let result = assessor.assess_raw("[]", "[]", chrono::Utc::now());
//! // An empty judgment set cannot cover the 24 variables
//! assert!(result.is_err());
//! ```

#![warn(missing_docs)]

mod assessor;
mod completeness;
mod config;
mod error;
mod intake;
mod validator;

pub use assessor::Assessor;
pub use completeness::{
    assumption_budget_used, evaluate_firewall, information_completeness, select_voi_questions,
    variable_uncertainty,
};
pub use config::GatekeeperConfig;
pub use error::GatekeeperError;
pub use intake::{parse_fact_set, parse_variable_judgments, Intake};
pub use validator::{Gatekeeper, ValidationReport, ValidationStatus};
