//! Entity Resolver: Arabic normalization + fuzzy match against canonical
//! entity names (cross-cutting component, §4.1 LISTEN contract).

use muhasibi_core::arabic::{extract_keywords, match_key, normalize, tokenize};
use muhasibi_core::models::{Entity, EntityId};

/// One resolved entity, with the confidence and type needed by LISTEN's
/// output contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMatch {
    pub entity_id: EntityId,
    pub name_ar: String,
    pub confidence: f64,
    pub depth: u8,
}

const CONTAINMENT_MIN_LEN: usize = 3;
const EXACT_CONFIDENCE: f64 = 1.0;
const CONTAINMENT_CONFIDENCE: f64 = 0.7;
const NOISE_TOKEN_PENALTY: f64 = 0.1;

/// Resolve detected entities from a raw Arabic question against a
/// canonical entity catalog, with a two-pass algorithm:
/// exact normalized-name match first, then token-containment (min length
/// 3), with confidence reduced per extra noise token and ties broken by
/// hierarchy depth (sub-value > core-value > pillar).
#[must_use]
pub fn resolve_entities(raw_question: &str, catalog: &[Entity]) -> Vec<EntityMatch> {
    let normalized_question = normalize(raw_question);
    let question_tokens: Vec<&str> = tokenize(&normalized_question);
    let noise_token_count = question_tokens
        .iter()
        .filter(|t| !muhasibi_core::arabic::is_stopword(t))
        .count();

    let mut matches: Vec<EntityMatch> = Vec::new();

    // Pass (a): exact normalized match against canonical entity names.
    for entity in catalog {
        let normalized_name = normalize(&entity.name_ar);
        if normalized_question.contains(&normalized_name) {
            matches.push(EntityMatch {
                entity_id: entity.id.clone(),
                name_ar: entity.name_ar.clone(),
                confidence: EXACT_CONFIDENCE,
                depth: entity.kind.depth(),
            });
        }
    }

    // Pass (b): token-containment match (only for entities not already
    // matched exactly), with a minimum-length-3 filter on the match key.
    let matched_ids: std::collections::HashSet<&EntityId> =
        matches.iter().map(|m| &m.entity_id).collect();
    for entity in catalog {
        if matched_ids.contains(&entity.id) {
            continue;
        }
        let name_key = match_key(&normalize(&entity.name_ar));
        if name_key.chars().count() < CONTAINMENT_MIN_LEN {
            continue;
        }
        let contained = question_tokens
            .iter()
            .any(|tok| match_key(tok) == name_key || tok.contains(&name_key));
        if contained {
            let penalty = NOISE_TOKEN_PENALTY * (noise_token_count.saturating_sub(1) as f64);
            let confidence = (CONTAINMENT_CONFIDENCE - penalty).max(0.0);
            matches.push(EntityMatch {
                entity_id: entity.id.clone(),
                name_ar: entity.name_ar.clone(),
                confidence,
                depth: entity.kind.depth(),
            });
        }
    }

    // Tie-break: deeper entities (sub-value > core-value > pillar) first,
    // then confidence descending, then entity ID ascending for determinism.
    matches.sort_by(|a, b| {
        b.depth
            .cmp(&a.depth)
            .then_with(|| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    matches
}

/// Extract normalized, stopword-filtered keywords from a raw question,
/// reusing the shared tokenizer (keyword extraction).
#[must_use]
pub fn keywords_for(raw_question: &str) -> Vec<String> {
    extract_keywords(raw_question)
}
