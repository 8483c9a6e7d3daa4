//! ACCOUNT: the refusal-policy gate.
//!
//! The most failure-sensitive stage. `run_account` evaluates the four
//! checks in a fixed order — fiqh scope, classifier-marked scope,
//! existence, relevance — and returns one of the three outcomes the
//! orchestrator needs to decide whether to proceed to INTERPRET or jump
//! straight to FINALIZE with a refusal.

use muhasibi_core::arabic::normalize;
use muhasibi_core::config::{Config, ScopeMarkers};
use muhasibi_core::models::{EntityId, EvidencePacket};

/// ACCOUNT's verdict on whether INTERPRET may proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountOutcome {
    /// All checks passed; INTERPRET may run.
    Sufficient,
    /// Existence or relevance failed; refuse with no reframing.
    InsufficientRefuse,
    /// A scope check fired; refuse, optionally with a reframing suggestion.
    OutOfScopeRefuse { suggestion_ar: Option<String> },
}

/// The outcome plus the machine-readable reasons FINALIZE surfaces in
/// `contract_reasons`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountResult {
    pub outcome: AccountOutcome,
    pub reasons: Vec<String>,
}

/// A question is a fiqh ruling if it contains any fiqh marker *and* any
/// worship/ritual term (check 3), tested against normalized text
/// so diacritics and letter variants don't defeat the marker match.
fn is_fiqh_question(normalized_question: &str, markers: &ScopeMarkers) -> bool {
    let has_fiqh_marker = markers
        .fiqh_markers
        .iter()
        .any(|m| normalized_question.contains(normalize(m).as_str()));
    let has_worship_term = markers
        .worship_terms
        .iter()
        .any(|t| normalized_question.contains(normalize(t).as_str()));
    has_fiqh_marker && has_worship_term
}

/// The Arabic reframing suggestion attached to a fiqh refusal, pointing to
/// the framework-level (tazkiyah) analog rather than issuing a ruling.
const FIQH_REFRAMING_SUGGESTION: &str = "هذا السؤال يطلب حكمًا فقهيًا، وهو خارج نطاق هذا الإطار؛ يمكن النظر إلى الجانب المرتبط بالتزكية كإطار للحياة الطيبة بدلاً من إصدار حكم شرعي.";

/// Run the four ACCOUNT checks in order and produce a verdict.
///
/// `entity_ids` are the entities LISTEN detected (already deduplicated);
/// `classifier_out_of_scope` is the scope flag LISTEN/PURPOSE attached for
/// biography/trivia/general-knowledge questions.
#[must_use]
pub fn run_account(
    raw_question: &str,
    keywords: &[String],
    entity_ids: &[EntityId],
    packets: &[EvidencePacket],
    classifier_out_of_scope: bool,
    config: &Config,
) -> AccountResult {
    let normalized_question = normalize(raw_question);

    if is_fiqh_question(&normalized_question, &config.scope_markers) {
        return AccountResult {
            outcome: AccountOutcome::OutOfScopeRefuse {
                suggestion_ar: Some(FIQH_REFRAMING_SUGGESTION.to_string()),
            },
            reasons: vec!["out_of_scope".to_string(), "fiqh_ruling".to_string()],
        };
    }

    if classifier_out_of_scope {
        return AccountResult {
            outcome: AccountOutcome::OutOfScopeRefuse { suggestion_ar: None },
            reasons: vec!["out_of_scope".to_string()],
        };
    }

    if packets.is_empty() {
        return AccountResult {
            outcome: AccountOutcome::InsufficientRefuse,
            reasons: vec![
                "insufficient_evidence".to_string(),
                "existence_check_failed".to_string(),
            ],
        };
    }

    if !relevance_check_passes(keywords, entity_ids, packets, config) {
        return AccountResult {
            outcome: AccountOutcome::InsufficientRefuse,
            reasons: vec![
                "insufficient_evidence".to_string(),
                "relevance_check_failed".to_string(),
            ],
        };
    }

    AccountResult {
        outcome: AccountOutcome::Sufficient,
        reasons: vec!["sufficient".to_string()],
    }
}

/// Check 2: at least `account.min_keyword_match` extracted keywords appear
/// in the concatenated normalized packet text, and for multi-entity
/// questions, every detected entity is touched by at least one packet
/// (a packet carrying that entity's own chunk — including its definition
/// chunk — always counts).
fn relevance_check_passes(
    keywords: &[String],
    entity_ids: &[EntityId],
    packets: &[EvidencePacket],
    config: &Config,
) -> bool {
    let concatenated: String = packets
        .iter()
        .map(|p| normalize(&p.chunk.text_ar))
        .collect::<Vec<_>>()
        .join(" ");

    let keyword_hits = keywords
        .iter()
        .filter(|k| !k.is_empty() && concatenated.contains(k.as_str()))
        .count();
    let min_match = config.account_min_keyword_match.max(1);
    if keyword_hits < min_match {
        return false;
    }

    if entity_ids.len() >= 2 {
        for entity_id in entity_ids {
            let touched = packets.iter().any(|p| &p.chunk.entity_id == entity_id);
            if !touched {
                return false;
            }
        }
    }

    true
}
