//! Citation hydration: when the model omits citations on a
//! non-refusal answer, hydrate them from the top-ranked retrieved packets,
//! one per distinct entity touched by the answer.

use muhasibi_core::models::{Citation, EntityId, EvidencePacket, ResolutionMethod, ResolutionStatus};

/// Build placeholder citations (status `unresolved`, to be refined by span
/// resolution) for `referenced_entities`, one per entity, taking each
/// entity's highest-ranked packet (packets are assumed pre-sorted by
/// RETRIEVE's merge & rank). Falls back to the single top-ranked packet
/// overall if no entities are known.
#[must_use]
pub fn hydrate_citations(packets: &[EvidencePacket], referenced_entities: &[EntityId]) -> Vec<Citation> {
    if referenced_entities.is_empty() {
        return packets
            .first()
            .map(|p| vec![placeholder_citation(p)])
            .unwrap_or_default();
    }

    let mut seen = std::collections::HashSet::new();
    let mut citations = Vec::new();
    for entity_id in referenced_entities {
        if !seen.insert(entity_id.clone()) {
            continue;
        }
        if let Some(packet) = packets.iter().find(|p| &p.chunk.entity_id == entity_id) {
            citations.push(placeholder_citation(packet));
        }
    }
    citations
}

fn placeholder_citation(packet: &EvidencePacket) -> Citation {
    Citation {
        chunk_id: packet.chunk.id.clone(),
        source_anchor: packet.chunk.source_anchor.clone(),
        scriptural_ref: packet.chunk.scriptural_refs.first().cloned(),
        status: ResolutionStatus::Unresolved,
        method: ResolutionMethod::Fallback,
    }
}

/// Whether `citations` references are a stable fixed point: applying
/// hydration again to an already-hydrated set (same packets, same
/// referenced entities) adds or removes nothing (round-trip law).
#[must_use]
pub fn hydration_is_stable(
    citations: &[Citation],
    packets: &[EvidencePacket],
    referenced_entities: &[EntityId],
) -> bool {
    let rehydrated = hydrate_citations(packets, referenced_entities);
    let mut original_ids: Vec<&str> = citations.iter().map(|c| c.chunk_id.as_str()).collect();
    let mut rehydrated_ids: Vec<&str> = rehydrated.iter().map(|c| c.chunk_id.as_str()).collect();
    original_ids.sort_unstable();
    rehydrated_ids.sort_unstable();
    original_ids == rehydrated_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use muhasibi_core::models::{Chunk, ChunkKind, RetrievalSource};

    fn packet(id: &str, entity_id: &str) -> EvidencePacket {
        EvidencePacket {
            chunk: Chunk {
                id: id.into(),
                entity_id: entity_id.into(),
                kind: ChunkKind::Definition,
                text_ar: "نص".into(),
                source_anchor: "src".into(),
                scriptural_refs: vec![],
            },
            source: RetrievalSource::EntityExact,
            relevance_score: 1.0,
        }
    }

    #[test]
    fn hydrates_one_citation_per_distinct_entity() {
        let packets = vec![
            packet("c1", "cv.tazkiyah"),
            packet("c2", "cv.muraqaba"),
            packet("c3", "cv.tazkiyah"),
        ];
        let entities = vec!["cv.tazkiyah".to_string(), "cv.muraqaba".to_string()];
        let citations = hydrate_citations(&packets, &entities);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].chunk_id, "c1");
        assert_eq!(citations[1].chunk_id, "c2");
    }

    #[test]
    fn empty_entities_falls_back_to_top_packet() {
        let packets = vec![packet("c1", "cv.tazkiyah")];
        let citations = hydrate_citations(&packets, &[]);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].chunk_id, "c1");
    }

    #[test]
    fn repeated_hydration_is_stable() {
        let packets = vec![packet("c1", "cv.tazkiyah")];
        let entities = vec!["cv.tazkiyah".to_string()];
        let citations = hydrate_citations(&packets, &entities);
        assert!(hydration_is_stable(&citations, &packets, &entities));
    }
}
