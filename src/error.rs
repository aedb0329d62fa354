//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded or is invalid.
    #[display("configuration error")]
    Config,
    /// The loader failed to handle an identifier.
    #[display("could not load module")]
    Load,
    /// A file or directory named on the command line is unusable.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}
