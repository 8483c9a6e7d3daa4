//! ACCOUNT: thin orchestrator wrapper over
//! `muhasibi_guard::run_account`, the refusal-policy implementation.

use muhasibi_core::config::Config;
use muhasibi_core::models::{EntityId, EvidencePacket};
use muhasibi_guard::run_account;

use crate::context::AccountStageOutput;

#[must_use]
pub fn run(
    raw_question: &str,
    keywords: &[String],
    entity_ids: &[EntityId],
    packets: &[EvidencePacket],
    classifier_out_of_scope: bool,
    config: &Config,
) -> AccountStageOutput {
    let result = run_account(
        raw_question,
        keywords,
        entity_ids,
        packets,
        classifier_out_of_scope,
        config,
    );
    AccountStageOutput {
        outcome: result.outcome,
        reasons: result.reasons,
    }
}
