//! Progression error types

use thiserror::Error;

/// Errors that can occur when setting up progression calculations
///
/// The formulas themselves never fail; out-of-range inputs are clamped.
#[derive(Error, Debug)]
pub enum ProgressionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
