//! Gatekeeper error types

use habitus_domain::{DomainError, ValidationIssue};
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Domain invariant violated (validation list, range, not found)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Collaborator output is not the expected JSON shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatekeeperError {
    /// Validation issues carried by this error, empty for other variants
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            GatekeeperError::Domain(err) => err.issues(),
            _ => &[],
        }
    }
}

impl From<Vec<ValidationIssue>> for GatekeeperError {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        GatekeeperError::Domain(DomainError::Validation(issues))
    }
}
