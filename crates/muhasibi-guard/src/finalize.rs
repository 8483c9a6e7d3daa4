//! FINALIZE: schema validation, citation hydration checks, and
//! fail-closed substitution. This module enforces the §3 invariants as a
//! pure function over an already-built [`FinalResponse`] — it never
//! performs I/O, so it is trivially idempotent (round-trip law).

use muhasibi_core::models::{ChunkId, ContractOutcome, FinalResponse, MANDATORY_CONSTRAINTS};

/// Generic Arabic refusal message substituted when FINALIZE force-refuses
/// a response that violated an invariant.
const GENERIC_REFUSAL_AR: &str =
    "نعتذر، لا تتوفر أدلة كافية للإجابة عن هذا السؤال ضمن الإطار المعتمد.";

/// Validate and repair `response` against the §3 invariants, given the set
/// of chunk IDs actually retrieved for this request. Returns the corrected
/// response; running this function again on its own output changes
/// nothing further (idempotent).
#[must_use]
pub fn finalize(mut response: FinalResponse, retrieved_chunk_ids: &[ChunkId]) -> FinalResponse {
    let was_refusal_already = response.not_found;

    // Invariant 2: drop citations referencing an unknown chunk ID.
    let retrieved: std::collections::HashSet<&ChunkId> = retrieved_chunk_ids.iter().collect();
    let before_len = response.citations.len();
    response.citations.retain(|c| retrieved.contains(&c.chunk_id));
    if response.citations.len() != before_len {
        response.contract_reasons.push("unknown_chunk_id_dropped".to_string());
    }

    // Invariant 1: not_found=false must carry non-empty citations.
    let mut force_refused = false;
    if !response.not_found && response.citations.is_empty() {
        response.not_found = true;
        response.contract_reasons.push("missing_citations".to_string());
        if response.abstain_reason.is_none() {
            response.abstain_reason = Some(GENERIC_REFUSAL_AR.to_string());
        }
        force_refused = true;
    }

    // Invariant 5: an abstention must have empty citations and a reason.
    if response.not_found {
        if !response.citations.is_empty() {
            response.citations.clear();
            response.contract_reasons.push("abstention_citations_cleared".to_string());
        }
        if response.abstain_reason.is_none() {
            response.abstain_reason = Some(GENERIC_REFUSAL_AR.to_string());
        }
    }

    // Invariant 3: the three mandatory constraints are always present.
    for mandatory in MANDATORY_CONSTRAINTS {
        if !response.constraints.iter().any(|c| c == mandatory) {
            response.constraints.push(mandatory.to_string());
            response.contract_reasons.push("mandatory_constraint_injected".to_string());
        }
    }

    // If FINALIZE itself had to force a refusal that wasn't already one,
    // the contract has failed outright rather than degraded.
    if force_refused && !was_refusal_already {
        response.contract_outcome = ContractOutcome::Fail;
    }

    response
}
