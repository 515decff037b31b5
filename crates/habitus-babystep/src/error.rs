//! Baby-step error types

use habitus_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while planning
#[derive(Error, Debug)]
pub enum PlanError {
    /// Habit or estimate missing
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up
        kind: &'static str,
        /// Identifier used
        id: String,
    },

    /// Target level outside [0, 199] or another domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
