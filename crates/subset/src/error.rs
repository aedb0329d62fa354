//! Subsetting Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A subsetting error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for subsetting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a font this backend can read.
    #[display("invalid font data: {_0}")]
    InvalidFont(#[error(not(source))] String),
    /// No characters were requested, so there is nothing to keep.
    #[display("empty character subset")]
    EmptySubset,
    /// The font was readable but could not be rebuilt.
    #[display("subsetting failed: {_0}")]
    Subset(#[error(not(source))] String),
    /// The blocking subsetting task panicked or was cancelled.
    #[display("subsetting task failed")]
    Runtime,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same font and same characters always give the same answer.
        false
    }
}
