//! Shared error taxonomy
//!
//! Validators never repair data; they return every failing invariant as a
//! [`ValidationIssue`] so a caller can surface all problems at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable code attached to every validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Referenced fact or variable id is not in the canonical catalogue
    UnknownId,
    /// The same id appears more than once
    DuplicateId,
    /// A no-inference fact carries an uncertainty tier other than U0
    InferenceNotAllowed,
    /// More entries than the catalogue allows
    TooManyEntries,
    /// Required entries are missing
    MissingEntries,
    /// Score is not a member of the discrete set
    OffGridScore,
    /// Value outside its allowed range
    OutOfRange,
    /// Optimistic/expected/conservative ordering violated
    LevelOrdering,
    /// Derived field disagrees with the value it derives from
    Inconsistent,
    /// Entry could not be parsed
    Malformed,
}

impl IssueCode {
    /// Get the code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::UnknownId => "UNKNOWN_ID",
            IssueCode::DuplicateId => "DUPLICATE_ID",
            IssueCode::InferenceNotAllowed => "INFERENCE_NOT_ALLOWED",
            IssueCode::TooManyEntries => "TOO_MANY_ENTRIES",
            IssueCode::MissingEntries => "MISSING_ENTRIES",
            IssueCode::OffGridScore => "OFF_GRID_SCORE",
            IssueCode::OutOfRange => "OUT_OF_RANGE",
            IssueCode::LevelOrdering => "LEVEL_ORDERING",
            IssueCode::Inconsistent => "INCONSISTENT",
            IssueCode::Malformed => "MALFORMED",
        }
    }
}

/// A single failed invariant: which field, what went wrong, and a code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the offending field (e.g. `variables[3].score`)
    pub field: String,

    /// Human-readable description
    pub message: String,

    /// Machine-readable code
    pub code: IssueCode,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: IssueCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.as_str(), self.field, self.message)
    }
}

/// Errors shared by every engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// One or more invariants failed; the list is complete
    #[error("Validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// A level or score lies outside its allowed range
    #[error("{field} = {value} is outside [{min}, {max}]")]
    Range {
        /// Offending field
        field: String,
        /// Offending value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// A referenced habit or domain does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. "habit")
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },
}

impl DomainError {
    /// Validation issues carried by this error, empty for other variants
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            DomainError::Validation(issues) => issues,
            _ => &[],
        }
    }
}
