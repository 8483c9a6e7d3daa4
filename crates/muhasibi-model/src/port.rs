//! The model interface: the one seam between the pipeline and
//! the out-of-scope foundation-model provider. Every call is schema
//! constrained; a response that fails to parse into its declared schema is
//! a [`ModelError::SchemaViolation`], never a best-effort partial parse.

use async_trait::async_trait;
use thiserror::Error;

use muhasibi_core::models::{Entity, EvidencePacket, Mode};

use crate::schema::{ClassifyIntentResponse, InterpretResponse, PurposePathResponse, RewriteQueryResponse};

/// Failure modes for the model collaborator. All of these map
/// to `model_unavailable`; PURPOSE/RETRIEVE/INTERPRET each have a defined
/// deterministic fallback rather than letting the error escape.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("model backend unavailable: {0}")]
    Unavailable(String),
    #[error("model call timed out")]
    Timeout,
    #[error("model response violated its output schema: {0}")]
    SchemaViolation(String),
}

/// The four-method schema-constrained model interface.
#[async_trait]
pub trait ModelPort: Send + Sync {
    /// PURPOSE/PATH: derive a goal, constraints, a plan, and a difficulty.
    async fn purpose_path(
        &self,
        question: &str,
        entities: &[Entity],
        keywords: &[String],
    ) -> Result<PurposePathResponse, ModelError>;

    /// RETRIEVE's query-rewrite fallback when vector search is too sparse.
    /// The model must not answer; its schema has no free-form field beyond
    /// `rewrites_ar`/`disambiguation_ar`.
    async fn rewrite_query(
        &self,
        question: &str,
        entities: &[Entity],
        keywords: &[String],
    ) -> Result<RewriteQueryResponse, ModelError>;

    /// LISTEN's optional model fallback for intent classification, used
    /// when the deterministic rule set doesn't match.
    async fn classify_intent(
        &self,
        question: &str,
        entities: &[Entity],
        keywords: &[String],
    ) -> Result<ClassifyIntentResponse, ModelError>;

    /// INTERPRET's model-assisted answering path for non-structural intents.
    async fn interpret(
        &self,
        question: &str,
        evidence_packets: &[EvidencePacket],
        entities: &[Entity],
        mode: Mode,
    ) -> Result<InterpretResponse, ModelError>;
}
