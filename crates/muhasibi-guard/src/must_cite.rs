//! Must-cite sentence detection (spec glossary, §4.6 guardrails): a
//! sentence containing a factual-claim marker — a definition verb, a
//! scriptural term, or a quantifier — must resolve to a cited chunk or
//! the contract degrades.

/// Arabic copular/definitional verbs and particles that introduce a claim.
const DEFINITION_MARKERS: &[&str] = &[
    "هو", "هي", "يعني", "تعني", "يعرف", "تعرف", "المقصود", "يقصد",
];

/// Scriptural-term markers: presence signals the sentence quotes or refers
/// to revealed text, which always needs a citation.
const SCRIPTURAL_MARKERS: &[&str] = &[
    "قال الله", "قال تعالى", "قال رسول الله", "صلى الله عليه وسلم", "القران",
    "اية", "سوره", "حديث",
];

/// Quantifier words: numerals or totalizers that state a specific count or
/// extent, which is a factual claim that needs grounding.
const QUANTIFIER_MARKERS: &[&str] = &[
    "كل", "جميع", "معظم", "بعض", "خمس", "ثلاث", "اربع", "ست", "سبع", "ثمان", "تسع", "عشر",
];

/// Split Arabic text into sentences on `.`, `؟`, `!`, `؛`, dropping empties.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '؟', '!', '؛'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether `normalized_sentence` (already normalized) carries a
/// factual-claim marker and therefore must resolve to a cited chunk.
#[must_use]
pub fn is_must_cite_sentence(normalized_sentence: &str) -> bool {
    let has = |set: &[&str]| set.iter().any(|m| normalized_sentence.contains(m));
    has(DEFINITION_MARKERS) || has(SCRIPTURAL_MARKERS) || has(QUANTIFIER_MARKERS)
}
