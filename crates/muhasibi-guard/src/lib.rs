//! ACCOUNT refusal policy, INTERPRET guardrails, and FINALIZE invariant
//! enforcement across ACCOUNT, INTERPRET, and FINALIZE.

#![forbid(unsafe_code)]

pub mod account;
pub mod citation;
pub mod finalize;
pub mod guardrails;
pub mod must_cite;
pub mod span;

pub use account::{run_account, AccountOutcome, AccountResult};
pub use citation::{hydrate_citations, hydration_is_stable};
pub use finalize::finalize;
pub use guardrails::{evaluate_guardrails, GuardrailEvaluation};
pub use must_cite::{is_must_cite_sentence, split_sentences};
pub use span::{best_resolution, resolve_sentence_span, resolved_by_construction};
