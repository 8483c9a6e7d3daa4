//! The retrieval interface: the one seam between the pipeline
//! and the out-of-scope relational/vector store. Everything downstream of
//! RETRIEVE talks to this trait, never to a concrete store.

use async_trait::async_trait;
use thiserror::Error;

use muhasibi_core::models::{Chunk, ChunkId, Edge, Entity, EntityId};

/// A vector-search hit: a chunk paired with its cosine-style score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}

/// A graph-expand hit: a chunk paired with the edge that surfaced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHit {
    pub chunk: Chunk,
    pub edge: Edge,
}

/// A verbatim justification quote attached to an edge, independent of
/// which chunk it was sourced from.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub chunk_id: ChunkId,
    pub char_start: usize,
    pub char_end: usize,
    pub quote_ar: String,
}

/// Failure modes for the retrieval collaborator. RETRIEVE never lets
/// these escape — any error is folded into an empty result set before
/// it reaches ACCOUNT.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("unknown chunk: {0}")]
    UnknownChunk(String),
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
    #[error("retrieval backend unavailable: {0}")]
    Unavailable(String),
    #[error("retrieval timed out")]
    Timeout,
}

/// The six-method retrieval interface. Implementations must
/// be safe for concurrent calls (connection pooling is the
/// collaborator's responsibility); the bundled [`crate::fixture::FixtureRetrieval`]
/// satisfies this trivially by being read-only over an immutable snapshot.
#[async_trait]
pub trait RetrievalPort: Send + Sync {
    /// Resolve normalized keywords against the canonical entity catalog.
    async fn resolve_entities(&self, keywords: &[String]) -> Result<Vec<Entity>, RetrievalError>;

    /// Fetch an entity's definition chunk plus its top-`limit` direct
    /// evidence/commentary chunks.
    async fn lookup_by_entity(
        &self,
        entity_id: &EntityId,
        limit: usize,
    ) -> Result<Vec<Chunk>, RetrievalError>;

    /// Embed `text` and return the top-`limit` chunks by cosine similarity.
    async fn vector_search(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError>;

    /// Traverse approved, justified edges from `entity_ids` up to `depth`,
    /// returning each target entity's definition chunk and any
    /// edge-justification-span chunks. `require_spans` excludes edges that
    /// violate the "no edge without a justification span" invariant.
    async fn expand_graph(
        &self,
        entity_ids: &[EntityId],
        depth: u32,
        require_spans: bool,
    ) -> Result<Vec<GraphHit>, RetrievalError>;

    /// Fetch one chunk by ID.
    async fn get_chunk(&self, chunk_id: &ChunkId) -> Result<Chunk, RetrievalError>;

    /// Fetch the justification spans attached to one edge.
    async fn get_edge_evidence(&self, edge_id: &str) -> Result<Vec<Span>, RetrievalError>;
}
