use std::{fmt::Display, sync::PoisonError};

/// Custom Result type for stubdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stubdb
///
/// Message text for `State` errors is part of the contract: callers assert
/// on it, so the strings are fixed.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid arguments: blank identifiers, bad indexes, misuse
    Usage(String),
    /// Operating on a closed or otherwise ineligible object
    State(String),
    /// Failure raised by a caller-supplied handler, caught at the
    /// statement boundary
    Execution(String),
    /// Batch partial failure: per-item counts plus the original cause
    Batch { counts: Vec<i64>, cause: Box<Error> },
    /// Deliberately unimplemented surface (read-only simulation)
    Unsupported(&'static str),
    /// Internal error (lock poisoning, broken invariants)
    Internal(String),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(value: PoisonError<T>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "{}", msg),
            Error::State(msg) => write!(f, "{}", msg),
            Error::Execution(msg) => write!(f, "{}", msg),
            Error::Batch { cause, .. } => write!(f, "Batch execution failed: {}", cause),
            Error::Unsupported(what) => write!(f, "Feature is not supported: {}", what),
            Error::Internal(msg) => write!(f, "internal error {}", msg),
        }
    }
}
