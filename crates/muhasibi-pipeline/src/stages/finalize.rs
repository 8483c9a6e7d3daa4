//! FINALIZE: assemble the `FinalResponse`, assign the
//! pre-invariant-check `contract_outcome` from the reasons accumulated by
//! earlier stages, then run `muhasibi_guard::finalize` for invariant
//! enforcement — the last thing that can still force a refusal.

use muhasibi_core::models::{
    ArgumentChain, ChunkId, Citation, Confidence, ContractOutcome, Difficulty, FinalResponse,
};
use muhasibi_guard::finalize as enforce_invariants;

#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn run_finalize(
    listen_summary: String,
    goal_ar: String,
    constraints: Vec<String>,
    path_plan: Vec<String>,
    answer_ar: String,
    citations: Vec<Citation>,
    referenced_entities: Vec<String>,
    argument_chains: Vec<ArgumentChain>,
    difficulty: Difficulty,
    not_found: bool,
    confidence: Confidence,
    mut contract_reasons: Vec<String>,
    abstain_reason: Option<String>,
    retrieved_chunk_ids: &[ChunkId],
) -> FinalResponse {
    let contract_outcome = if not_found {
        ContractOutcome::Fail
    } else if contract_reasons.iter().any(|r| r == "downgraded_to_partial") {
        ContractOutcome::PassPartial
    } else {
        ContractOutcome::PassFull
    };
    if !contract_reasons.contains(&"sufficient".to_string()) && !not_found {
        contract_reasons.push("sufficient".to_string());
    }

    let response = FinalResponse {
        listen_summary,
        goal_ar,
        constraints,
        path_plan,
        answer_ar,
        citations,
        referenced_entities,
        argument_chains,
        difficulty,
        not_found,
        confidence,
        contract_outcome,
        contract_reasons,
        abstain_reason,
    };

    enforce_invariants(response, retrieved_chunk_ids)
}
