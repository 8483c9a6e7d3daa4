//! INTERPRET's post-generation guardrails: every must-cite
//! sentence needs a resolved-or-approximate match against a cited chunk's
//! text, or the contract degrades — and, for definitional intents, the
//! answer is fail-closed to a refusal.

use muhasibi_core::models::{ChunkId, ResolutionStatus};

use crate::must_cite::{is_must_cite_sentence, split_sentences};
use crate::span::best_resolution;
use muhasibi_core::arabic::normalize;

/// The result of running guardrails over one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardrailEvaluation {
    pub must_cite_total: usize,
    pub must_cite_unresolved: usize,
}

impl GuardrailEvaluation {
    /// Whether at least one must-cite sentence failed to resolve.
    #[must_use]
    pub const fn has_unresolved(&self) -> bool {
        self.must_cite_unresolved > 0
    }

    /// Any unresolved must-cite sentence degrades the
    /// contract outcome to PASS_PARTIAL.
    #[must_use]
    pub const fn should_downgrade_to_partial(&self) -> bool {
        self.has_unresolved()
    }

    /// An unresolved must-cite sentence on a definitional
    /// intent is fail-closed — escalate all the way to a refusal.
    #[must_use]
    pub const fn should_escalate_to_refusal(&self, is_definitional_intent: bool) -> bool {
        self.has_unresolved() && is_definitional_intent
    }
}

/// Evaluate every must-cite sentence in `answer_ar` against the text of
/// the chunks actually cited (`cited_chunk_texts`, chunk ID paired with its
/// canonical text).
#[must_use]
pub fn evaluate_guardrails(answer_ar: &str, cited_chunk_texts: &[(ChunkId, String)]) -> GuardrailEvaluation {
    let texts: Vec<&str> = cited_chunk_texts.iter().map(|(_, t)| t.as_str()).collect();

    let mut must_cite_total = 0usize;
    let mut must_cite_unresolved = 0usize;

    for sentence in split_sentences(answer_ar) {
        let normalized = normalize(sentence);
        if !is_must_cite_sentence(&normalized) {
            continue;
        }
        must_cite_total += 1;
        let (status, _) = best_resolution(sentence, texts.iter().copied());
        if status == ResolutionStatus::Unresolved {
            must_cite_unresolved += 1;
        }
    }

    GuardrailEvaluation {
        must_cite_total,
        must_cite_unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_resolved_answer_has_no_unresolved_sentences() {
        let answer = "التزكية هي تطهير النفس من الرذائل. قال تعالى قد أفلح من زكاها.";
        let chunks = vec![
            ("c1".to_string(), "التزكية تطهير النفس من الرذائل ورفعها بالطاعات.".to_string()),
            ("c2".to_string(), "قد أفلح من زكاها وقد خاب من دساها.".to_string()),
        ];
        let eval = evaluate_guardrails(answer, &chunks);
        assert_eq!(eval.must_cite_total, 2);
        assert_eq!(eval.must_cite_unresolved, 0);
        assert!(!eval.should_downgrade_to_partial());
    }

    #[test]
    fn unsupported_claim_downgrades_to_partial() {
        let answer = "التزكية هي إتقان سبع لغات عالمية.";
        let chunks = vec![("c1".to_string(), "التزكية تطهير النفس من الرذائل.".to_string())];
        let eval = evaluate_guardrails(answer, &chunks);
        assert!(eval.has_unresolved());
        assert!(eval.should_downgrade_to_partial());
    }

    #[test]
    fn unresolved_on_definitional_intent_escalates_to_refusal() {
        let answer = "التزكية هي إتقان سبع لغات عالمية.";
        let chunks = vec![("c1".to_string(), "التزكية تطهير النفس من الرذائل.".to_string())];
        let eval = evaluate_guardrails(answer, &chunks);
        assert!(eval.should_escalate_to_refusal(true));
        assert!(!eval.should_escalate_to_refusal(false));
    }

    #[test]
    fn plain_answer_without_claims_has_no_must_cite_sentences() {
        let answer = "شكرا لسؤالك عن هذا الموضوع.";
        let eval = evaluate_guardrails(answer, &[]);
        assert_eq!(eval.must_cite_total, 0);
        assert!(!eval.should_downgrade_to_partial());
    }
}
