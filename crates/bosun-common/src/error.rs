//! Common error types shared across the bosun crates.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`BosunError`].
pub type BosunResult<T> = Result<T, BosunError>;

/// Common errors across the bosun crates.
#[derive(Error, Diagnostic, Debug)]
pub enum BosunError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(bosun::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(bosun::io))]
    Io(#[from] std::io::Error),

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(bosun::internal),
        help("This is a bug, please report it at https://github.com/bosun-dev/bosun/issues")
    )]
    Internal {
        /// The error message.
        message: String,
    },
}
