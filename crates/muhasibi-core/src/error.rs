//! Error taxonomy for the Muḥāsibī pipeline.
//!
//! Every variant maps to one entry of the error taxonomy in the
//! specification's error-handling design, and carries an `error_type()`
//! string used in trace records and the machine-readable contract reasons
//! surfaced on a [`FinalResponse`](crate::models::FinalResponse).

use thiserror::Error;

/// Result type alias for Muḥāsibī operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the core pipeline and its external collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty or non-text question reached LISTEN.
    #[error("input malformed: {0}")]
    InputMalformed(String),

    /// Retrieval collaborator I/O failed or timed out.
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Model collaborator I/O failed, timed out, or returned a schema violation.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// ACCOUNT's existence/relevance checks failed.
    #[error("insufficient evidence: {0}")]
    InsufficientEvidence(String),

    /// ACCOUNT's scope checks (fiqh, biography, general-knowledge) fired.
    #[error("out of scope: {0}")]
    OutOfScope(String),

    /// A must-cite sentence could not be resolved to a cited chunk.
    #[error("guardrail failure: {0}")]
    GuardrailFailure(String),

    /// The request's total deadline was exhausted.
    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Serialization/schema (de)coding failure not otherwise classified.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all for invariants that should be unreachable.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// The machine-readable taxonomy tag, used in trace `issues[]` and
    /// `contract_reasons`.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InputMalformed(_) => "input_malformed",
            Self::RetrievalUnavailable(_) => "retrieval_unavailable",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::InsufficientEvidence(_) => "insufficient_evidence",
            Self::OutOfScope(_) => "out_of_scope",
            Self::GuardrailFailure(_) => "guardrail_failure",
            Self::DeadlineExceeded(_) => "deadline_exceeded",
            Self::Serialization(_) => "serialization_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the underlying condition is a transient collaborator failure
    /// that should never be surfaced as a thrown error to a caller — per the
    /// propagation policy, these are always mapped to a safe refusal instead.
    #[must_use]
    pub const fn is_transient_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::RetrievalUnavailable(_) | Self::ModelUnavailable(_) | Self::DeadlineExceeded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_mapping_exhaustive() {
        let cases = [
            (Error::InputMalformed("x".into()), "input_malformed"),
            (
                Error::RetrievalUnavailable("x".into()),
                "retrieval_unavailable",
            ),
            (Error::ModelUnavailable("x".into()), "model_unavailable"),
            (
                Error::InsufficientEvidence("x".into()),
                "insufficient_evidence",
            ),
            (Error::OutOfScope("x".into()), "out_of_scope"),
            (Error::GuardrailFailure("x".into()), "guardrail_failure"),
            (Error::DeadlineExceeded("x".into()), "deadline_exceeded"),
            (Error::Serialization("x".into()), "serialization_error"),
            (Error::Internal("x".into()), "internal_error"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.error_type(), expected);
        }
    }

    #[test]
    fn transient_collaborator_failures_are_marked() {
        assert!(Error::RetrievalUnavailable("x".into()).is_transient_collaborator_failure());
        assert!(Error::ModelUnavailable("x".into()).is_transient_collaborator_failure());
        assert!(Error::DeadlineExceeded("x".into()).is_transient_collaborator_failure());
        assert!(!Error::InputMalformed("x".into()).is_transient_collaborator_failure());
        assert!(!Error::OutOfScope("x".into()).is_transient_collaborator_failure());
    }
}
