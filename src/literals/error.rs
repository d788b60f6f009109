//! Error kinds raised while trimming a single literal.
//!
//! None of these abort a file: the pipeline logs them and leaves the node untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiteralError {
    /// Delimiters or content of the literal could not be determined.
    #[error("unparsable {kind} literal: {reason}")]
    UnparsableLiteral { kind: &'static str, reason: String },

    /// A truncation cut landed inside an interpolation whose end could not be found.
    #[error("interpolation at byte {offset} has no closing bracket within {limit} bytes")]
    InterpolationBoundaryUnresolvable { offset: usize, limit: usize },

    /// Removing content would not pay for the placeholder documenting it.
    #[error("saving {saved} tokens does not justify a {placeholder}-token placeholder")]
    PlaceholderBelowThreshold { saved: usize, placeholder: usize },

    /// An edit partially overlaps one that is already registered.
    #[error("edit {start}..{end} partially overlaps an existing edit")]
    OverlappingEdit { start: usize, end: usize },

    #[error("unsupported language for extension '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to parse source: {0}")]
    ParseFailed(String),

    #[error("invalid literal options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl LiteralError {
    pub fn unparsable(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::UnparsableLiteral {
            kind,
            reason: reason.into(),
        }
    }
}
