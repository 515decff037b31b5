//! Error types for expertise operations

use habitus_domain::DomainError;
use habitus_progression::ProgressionError;
use thiserror::Error;

/// Errors that can occur while awarding, recalculating or decaying levels
#[derive(Error, Debug)]
pub enum ExpertiseError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced entity is absent
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up
        kind: &'static str,
        /// Its id
        id: String,
    },

    /// Domain rule violated
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Progression calculator error
    #[error(transparent)]
    Progression(#[from] ProgressionError),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
