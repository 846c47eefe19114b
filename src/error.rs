//! Error types for grammar induction.

use thiserror::Error;

/// Errors returned by the induction engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The input string contained no tokens.
    #[error("input contains no tokens")]
    InvalidInput,

    /// The digram index and the priority queue disagree.
    ///
    /// This is a bug in the bookkeeping, never a property of the input.
    /// The induction call is aborted rather than returning a corrupted grammar.
    #[error("digram bookkeeping out of sync: {detail}")]
    InternalInconsistency { detail: String },
}

impl GrammarError {
    pub(crate) fn inconsistency(detail: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            detail: detail.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GrammarError>;
