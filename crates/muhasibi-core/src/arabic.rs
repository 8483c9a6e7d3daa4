//! Arabic text normalization shared by LISTEN, RETRIEVE, and ACCOUNT.
//!
//! [`normalize`] applies the fixed-order transform from the
//! specification's LISTEN contract; [`match_key`] additionally strips
//! stopwords and leading particles for use as an entity/keyword matching
//! key. The two are kept separate because RETRIEVE's display text and
//! ACCOUNT's relevance check both need the *normalized* form, while only
//! entity matching needs the stripped-down key.

/// Arabic stopwords removed during keyword extraction.
const STOPWORDS: &[&str] = &[
    "في", "من", "على", "إلى", "عن", "مع", "هذا", "هذه", "ذلك", "التي", "الذي", "كما", "أو", "ثم",
    "قد", "لقد", "كان", "كانت", "هو", "هي", "لا", "ما", "لم", "لن",
];

/// Leading particles stripped for match keys only (not for display text).
const PREFIX_PARTICLES: &[char] = &['و', 'ف', 'ب', 'ك', 'ل'];

/// Strip diacritics (tashkīl) and tatweel from a string.
fn strip_diacritics(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(*c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06DC}' | '\u{06DF}'..='\u{06E8}' | '\u{06EA}'..='\u{06ED}' | '\u{0640}'))
        .collect()
}

fn unify_letters(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'أ' | 'إ' | 'آ' => 'ا',
            'ى' => 'ي',
            'ة' => 'ه',
            other => other,
        })
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize Arabic text in a fixed order:
/// strip diacritics, unify hamza variants, unify yā/alif-maqṣūra, unify
/// tā-marbūṭa/hā, collapse whitespace. The caller is expected to retain the
/// original string separately for display.
#[must_use]
pub fn normalize(input: &str) -> String {
    let stripped = strip_diacritics(input);
    let unified = unify_letters(&stripped);
    collapse_whitespace(&unified).trim().to_string()
}

/// Whether `token` (already normalized) is an Arabic stopword.
#[must_use]
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Strip a single leading particle (و، ف، ب، ك، ل) from a normalized token,
/// for use as a match key. Only strips one particle — "وال" keeps "ال"
/// as a particle stack is rare in canonical entity names.
#[must_use]
pub fn strip_prefix_particle(token: &str) -> &str {
    let mut chars = token.chars();
    if let Some(first) = chars.next() {
        if PREFIX_PARTICLES.contains(&first) {
            let rest: &str = &token[first.len_utf8()..];
            if let Some(stripped) = rest.strip_prefix("ال") {
                return stripped;
            }
            return rest;
        }
    }
    token.strip_prefix("ال").unwrap_or(token)
}

/// Build a match key from a normalized token: strip one leading particle.
/// Used for entity/keyword matching, never for display.
#[must_use]
pub fn match_key(normalized_token: &str) -> String {
    strip_prefix_particle(normalized_token).to_string()
}

/// Split normalized text into whitespace-delimited tokens.
#[must_use]
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Extract keyword candidates from a raw question: normalize, tokenize,
/// drop stopwords, keep everything else as a match-key candidate.
#[must_use]
pub fn extract_keywords(raw_question: &str) -> Vec<String> {
    let normalized = normalize(raw_question);
    tokenize(&normalized)
        .into_iter()
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(match_key)
        .filter(|k| !k.is_empty())
        .collect()
}

/// Token-overlap ratio between two normalized strings, used for
/// approximate span resolution (`method=token-overlap`). Returns the
/// fraction of `needle`'s tokens present in `haystack`.
#[must_use]
pub fn token_overlap_ratio(needle: &str, haystack: &str) -> f64 {
    let needle_tokens: Vec<&str> = tokenize(needle);
    if needle_tokens.is_empty() {
        return 0.0;
    }
    let haystack_tokens: std::collections::HashSet<&str> = tokenize(haystack).into_iter().collect();
    let hits = needle_tokens
        .iter()
        .filter(|t| haystack_tokens.contains(*t))
        .count();
    hits as f64 / needle_tokens.len() as f64
}
