//! The typed, stage-owned output records threaded through the
//! orchestrator: each stage function returns one of these rather than
//! closing over a shared mutable context, and the orchestrator passes
//! the fields it needs forward by hand (`crate::orchestrator::run_pipeline`).

use muhasibi_core::models::{ArgumentChain, Citation, Confidence, Difficulty, EntityId, EvidencePacket};
use muhasibi_model::schema::IntentType;

use muhasibi_retrieval::entity_resolver::EntityMatch;
use muhasibi_retrieval::port::GraphHit;

/// LISTEN's output: normalized text, keywords, ordered entity
/// matches, and the classified intent.
#[derive(Debug, Clone)]
pub struct ListenOutput {
    pub normalized_question: String,
    pub keywords: Vec<String>,
    pub entities: Vec<EntityMatch>,
    pub entity_ids: Vec<EntityId>,
    pub intent: IntentType,
    pub in_scope: bool,
}

/// PURPOSE's output: goal plus the mandatory-and-then-some
/// constraint set.
#[derive(Debug, Clone)]
pub struct PurposeOutput {
    pub goal_ar: String,
    pub constraints: Vec<String>,
}

/// PATH's output: the plan and its difficulty label.
#[derive(Debug, Clone)]
pub struct PathOutput {
    pub plan: Vec<String>,
    pub difficulty: Difficulty,
}

/// RETRIEVE's output: the merged, ranked, deduplicated
/// evidence packets, plus the raw graph-expand hits INTERPRET needs to
/// build argument chains (the merge into `packets` loses the originating
/// edge).
#[derive(Debug, Clone, Default)]
pub struct RetrieveOutput {
    pub packets: Vec<EvidencePacket>,
    pub graph_hits: Vec<GraphHit>,
}

/// ACCOUNT's output: the refusal-policy verdict.
#[derive(Debug, Clone)]
pub struct AccountStageOutput {
    pub outcome: muhasibi_guard::AccountOutcome,
    pub reasons: Vec<String>,
}

/// INTERPRET's output: the bound answer plus its citations,
/// referenced entities, and any argument chains.
#[derive(Debug, Clone)]
pub struct InterpretOutput {
    pub answer_ar: String,
    pub citations: Vec<Citation>,
    pub referenced_entities: Vec<EntityId>,
    pub argument_chains: Vec<ArgumentChain>,
    pub not_found: bool,
    pub confidence: Confidence,
    pub contract_reasons: Vec<String>,
    pub is_definitional_intent: bool,
}

/// REFLECT's output: the (possibly annotated/reformatted)
/// final answer text, with its citation set unchanged.
#[derive(Debug, Clone)]
pub struct ReflectOutput {
    pub answer_ar: String,
}
