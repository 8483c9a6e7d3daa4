//! Data model shared across the Muḥāsibī pipeline.
//!
//! Types here are the request-scoped records built up by the eight stages;
//! the hierarchy (`Entity`), immutable corpus (`Chunk`, `Edge`), and
//! per-request projections (`EvidencePacket`, `Citation`, `ArgumentChain`)
//! are all plain, `serde`-derived value types. Nothing here owns I/O.

use serde::{Deserialize, Serialize};

/// Stable identifier for an [`Entity`] (Pillar, Core Value, or Sub Value).
pub type EntityId = String;

/// Stable identifier for a [`Chunk`].
pub type ChunkId = String;

/// Stable identifier for an [`Edge`].
pub type EdgeId = String;

/// Position in the hierarchy: Pillar → Core Value → Sub Value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Pillar,
    CoreValue,
    SubValue,
}

impl EntityKind {
    /// Hierarchy depth used to break matching ties (sub-value > core-value > pillar).
    #[must_use]
    pub const fn depth(self) -> u8 {
        match self {
            Self::Pillar => 0,
            Self::CoreValue => 1,
            Self::SubValue => 2,
        }
    }
}

/// A Pillar, Core Value, or Sub Value in the wellbeing framework.
///
/// Read-only to the core: created by ingestion, never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name_ar: String,
    pub definition_ar: Option<String>,
    pub parent_id: Option<EntityId>,
    pub source_anchor: String,
}

/// The three chunk kinds attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Definition,
    Evidence,
    Commentary,
}

/// An immutable unit of canonical text, attached to one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub entity_id: EntityId,
    pub kind: ChunkKind,
    pub text_ar: String,
    pub source_anchor: String,
    pub scriptural_refs: Vec<String>,
}

/// Where a retrieval hit on a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalSource {
    EntityExact,
    Vector,
    GraphExpand,
}

/// A chunk projection returned from retrieval, scoped to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePacket {
    pub chunk: Chunk,
    pub source: RetrievalSource,
    pub relevance_score: f64,
}

/// Semantic relation label carried by a graph [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationLabel {
    Enables,
    Reinforces,
    ConditionalOn,
    TensionWith,
    ResolvesWith,
    ContrastsWith,
    Complements,
    Contains,
    SupportedBy,
}

/// A verbatim quote in a chunk that justifies a graph edge.
///
/// Invariant: every [`Edge`] carries at least one of these; edges without
/// one are excluded from retrieval (enforced by the retrieval port, not
/// representable here by construction would require a non-empty-vec
/// newtype, which `Edge::justification_spans` provides).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationSpan {
    pub chunk_id: ChunkId,
    pub char_start: usize,
    pub char_end: usize,
    pub quote_ar: String,
}

/// A typed, directed relation between two entities in the framework graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from_entity: EntityId,
    pub to_entity: EntityId,
    pub relation: RelationLabel,
    pub justification_spans: Vec<JustificationSpan>,
    pub approved: bool,
}

impl Edge {
    /// Whether this edge satisfies the "no edge without a justification
    /// span" invariant and is eligible to participate in retrieval.
    #[must_use]
    pub fn is_retrievable(&self) -> bool {
        self.approved && !self.justification_spans.is_empty()
    }
}

/// How a citation's span was (or was not) resolved against its chunk text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Resolved,
    Approximate,
    Unresolved,
}

/// The method used when a span resolved or approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    ExactSubstring,
    TokenOverlap,
    Fallback,
}

/// A reference from an answer sentence to a retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub chunk_id: ChunkId,
    pub source_anchor: String,
    pub scriptural_ref: Option<String>,
    pub status: ResolutionStatus,
    pub method: ResolutionMethod,
}

/// An edge-derived claim surfaced by graph-expand traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentChain {
    pub edge_id: EdgeId,
    pub claim_ar: String,
    pub inference_type: RelationLabel,
    pub boundary_clause_ar: Option<String>,
}

/// Interaction mode, selecting the INTERPRET prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Answer,
    Debate,
    Socratic,
    Judge,
    NaturalChat,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Answer
    }
}

/// Coarse confidence label attached to a [`FinalResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Outcome of FINALIZE's contract enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractOutcome {
    PassFull,
    PassPartial,
    Fail,
}

/// Difficulty label produced by PATH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// The three constraints PURPOSE must always emit, verbatim.
pub const MANDATORY_CONSTRAINTS: [&str; 3] =
    ["evidence_only", "cite_every_claim", "refuse_if_missing"];

/// The response handed back to a request's caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub listen_summary: String,
    pub goal_ar: String,
    pub constraints: Vec<String>,
    pub path_plan: Vec<String>,
    pub answer_ar: String,
    pub citations: Vec<Citation>,
    pub referenced_entities: Vec<EntityId>,
    pub argument_chains: Vec<ArgumentChain>,
    pub difficulty: Difficulty,
    pub not_found: bool,
    pub confidence: Confidence,
    pub contract_outcome: ContractOutcome,
    pub contract_reasons: Vec<String>,
    pub abstain_reason: Option<String>,
}

impl FinalResponse {
    /// Invariant 5: an abstention has empty citations and a
    /// populated abstain reason.
    #[must_use]
    pub fn is_well_formed_abstention(&self) -> bool {
        !self.not_found || (self.citations.is_empty() && self.abstain_reason.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_depth_orders_sub_value_deepest() {
        assert!(EntityKind::SubValue.depth() > EntityKind::CoreValue.depth());
        assert!(EntityKind::CoreValue.depth() > EntityKind::Pillar.depth());
    }

    #[test]
    fn edge_without_spans_is_not_retrievable() {
        let edge = Edge {
            id: "e1".into(),
            from_entity: "a".into(),
            to_entity: "b".into(),
            relation: RelationLabel::Enables,
            justification_spans: vec![],
            approved: true,
        };
        assert!(!edge.is_retrievable());
    }

    #[test]
    fn edge_with_span_and_approval_is_retrievable() {
        let edge = Edge {
            id: "e1".into(),
            from_entity: "a".into(),
            to_entity: "b".into(),
            relation: RelationLabel::Enables,
            justification_spans: vec![JustificationSpan {
                chunk_id: "c1".into(),
                char_start: 0,
                char_end: 4,
                quote_ar: "نص".into(),
            }],
            approved: true,
        };
        assert!(edge.is_retrievable());
    }

    #[test]
    fn abstention_well_formedness() {
        let mut resp = FinalResponse {
            listen_summary: String::new(),
            goal_ar: String::new(),
            constraints: MANDATORY_CONSTRAINTS.iter().map(|s| (*s).to_string()).collect(),
            path_plan: vec![],
            answer_ar: String::new(),
            citations: vec![],
            referenced_entities: vec![],
            argument_chains: vec![],
            difficulty: Difficulty::Hard,
            not_found: true,
            confidence: Confidence::Low,
            contract_outcome: ContractOutcome::Fail,
            contract_reasons: vec!["insufficient_evidence".into()],
            abstain_reason: Some("لا تتوفر أدلة كافية".into()),
        };
        assert!(resp.is_well_formed_abstention());

        resp.abstain_reason = None;
        assert!(!resp.is_well_formed_abstention());
    }
}
