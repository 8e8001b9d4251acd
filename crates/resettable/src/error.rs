#![forbid(unsafe_code)]

//! Errors returned by checked modifications.
//!
//! Core operations are total; only the `try_*` collection edits report
//! failures, and they do so before anything is recorded.

use std::fmt;

/// Result of a checked modification.
pub type ResettableResult<T> = Result<T, ResettableError>;

/// Errors that can occur during a checked modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResettableError {
    /// Position is out of bounds for the addressed collection.
    PositionOutOfBounds { position: usize, length: usize },
}

impl fmt::Display for ResettableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionOutOfBounds { position, length } => {
                write!(f, "position {position} out of bounds (length {length})")
            }
        }
    }
}

impl std::error::Error for ResettableError {}
