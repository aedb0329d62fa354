//! Loader Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures from the subsetting backend
//! and the filesystem are attached as children of these kinds.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A loader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every kind aborts the whole request; no partially rewritten CSS is ever
/// returned.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration was rejected by validation.
    #[display("invalid configuration")]
    Config,
    /// A path or file name can't be used to store an artifact.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The requested stylesheet could not be read.
    #[display("could not read stylesheet: {}", _0.display())]
    Stylesheet(#[error(not(source))] PathBuf),
    /// A font referenced by the stylesheet could not be read.
    #[display("could not resolve font source: {}", _0.display())]
    Resolution(#[error(not(source))] PathBuf),
    /// The subsetting backend rejected a font.
    #[display("could not subset font: {}", _0.display())]
    Subset(#[error(not(source))] PathBuf),
    /// The output directory or an artifact could not be written.
    #[display("could not write artifact: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Filesystem trouble can be transient; everything else is down to the
        // input files.
        matches!(self, Self::Write(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::Resolution(PathBuf::from("/fonts/a.woff2")).to_string(),
            "could not resolve font source: /fonts/a.woff2"
        );
        assert!(ErrorKind::Write(PathBuf::from("out")).is_retryable());
        assert!(!ErrorKind::Subset(PathBuf::from("a.ttf")).is_retryable());
        assert_eq!(ErrorKind::Config.to_string(), "invalid configuration");
        assert!(!ErrorKind::Config.is_retryable());
    }
}
