//! Strict request/response DTOs for the four model calls.
//!
//! Every field here is part of the declared output schema: a response that
//! doesn't deserialize into these exact shapes is a schema violation, not a
//! partially-accepted best effort.

use serde::{Deserialize, Serialize};

use muhasibi_core::models::{Citation, Difficulty, EntityId};

/// `classify_intent`'s coarse intent taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    ListPillars,
    ListCoreValuesInPillar,
    ListSubValuesInCoreValue,
    Definition,
    DefinitionWithEvidence,
    Comparison,
    ConnectAcrossPillars,
    PracticalGuidance,
    FiqhRuling,
    Biography,
    GeneralKnowledge,
    Ambiguous,
}

impl IntentType {
    /// Whether INTERPRET may skip the model and build the answer by direct
    /// projection over the retrieved entity set.
    #[must_use]
    pub const fn is_deterministic_structural(self) -> bool {
        matches!(
            self,
            Self::ListPillars | Self::ListCoreValuesInPillar | Self::ListSubValuesInCoreValue
        )
    }
}

/// `purpose_path(question, entities, keywords) -> {goal_ar, constraints[], path[], difficulty}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurposePathResponse {
    pub goal_ar: String,
    pub constraints: Vec<String>,
    pub path: Vec<String>,
    pub difficulty: Difficulty,
}

/// `rewrite_query(question, entities, keywords) -> {rewrites_ar[<=5], disambiguation_ar|null}`.
///
/// No free-form fields beyond `rewrites_ar`/`disambiguation_ar`: the model
/// must not answer (query rewriting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteQueryResponse {
    pub rewrites_ar: Vec<String>,
    pub disambiguation_ar: Option<String>,
}

/// `classify_intent(question, entities, keywords) -> {intent_type, in_scope, confidence, target_entity, suggested_queries_ar[], clarification_ar|null}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyIntentResponse {
    pub intent_type: IntentType,
    pub in_scope: bool,
    pub confidence: f64,
    pub target_entity: Option<EntityId>,
    pub suggested_queries_ar: Vec<String>,
    pub clarification_ar: Option<String>,
}

/// `interpret(question, evidence_packets, entities, mode) -> {answer_ar, citations[], entities[], not_found, confidence}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub answer_ar: String,
    pub citations: Vec<Citation>,
    pub entities: Vec<EntityId>,
    pub not_found: bool,
    pub confidence: muhasibi_core::models::Confidence,
}
