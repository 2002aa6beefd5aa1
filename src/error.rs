//! Library error type.

/// Errors raised while configuring formats and pattern sets.
///
/// The auto-continuation filter itself never fails; these only surface
/// from parsing identifiers, compiling custom patterns and reading files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown text format: {0}")]
    UnknownFormat(String),

    #[error("invalid indent unit {0:?}: expected a single tab or space")]
    InvalidIndent(String),

    #[error("invalid prefix pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
