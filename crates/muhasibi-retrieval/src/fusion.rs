//! Deterministic merge & rank for RETRIEVE's hybrid procedure.
//! Adapted from a reciprocal-rank-fusion scheme: each source
//! contributes `weight * 1/(k + rank)`, except entity-exact hits, which
//! are strictly dominant — sorted ahead of every non-entity-exact hit
//! regardless of relative weight.

use std::cmp::Ordering;

use muhasibi_core::config::RetrievalWeights;
use muhasibi_core::models::{Chunk, ChunkId, EvidencePacket, RetrievalSource};

/// RRF constant k; small compared to typical candidate pool sizes so
/// rank differences still separate scores meaningfully.
const RRF_K: f64 = 60.0;

/// One chunk's per-source hit information prior to fusion.
#[derive(Debug, Clone, Default)]
struct Contribution {
    chunk: Option<Chunk>,
    entity_exact: bool,
    vector_rank: Option<usize>,
    graph_expand: bool,
    /// Earliest source that introduced this chunk, for provenance.
    first_source: Option<RetrievalSource>,
}

fn rrf_term(rank: Option<usize>) -> f64 {
    rank.map_or(0.0, |r| 1.0 / (RRF_K + r as f64))
}

/// Merge entity-exact hits, vector-ranked hits, and graph-expand hits
/// into a deduplicated, deterministically ordered list of evidence
/// packets, capped at `cap`.
#[must_use]
pub fn merge_and_rank(
    entity_exact: &[Chunk],
    vector_ranked: &[Chunk],
    graph_expand: &[Chunk],
    weights: RetrievalWeights,
    cap: usize,
) -> Vec<EvidencePacket> {
    let mut by_id: std::collections::BTreeMap<ChunkId, Contribution> = std::collections::BTreeMap::new();

    for chunk in entity_exact {
        let entry = by_id.entry(chunk.id.clone()).or_default();
        entry.chunk.get_or_insert_with(|| chunk.clone());
        entry.entity_exact = true;
        entry.first_source.get_or_insert(RetrievalSource::EntityExact);
    }
    for (rank, chunk) in vector_ranked.iter().enumerate() {
        let entry = by_id.entry(chunk.id.clone()).or_default();
        entry.chunk.get_or_insert_with(|| chunk.clone());
        entry.vector_rank = Some(entry.vector_rank.map_or(rank + 1, |r| r.min(rank + 1)));
        entry.first_source.get_or_insert(RetrievalSource::Vector);
    }
    for chunk in graph_expand {
        let entry = by_id.entry(chunk.id.clone()).or_default();
        entry.chunk.get_or_insert_with(|| chunk.clone());
        entry.graph_expand = true;
        entry.first_source.get_or_insert(RetrievalSource::GraphExpand);
    }

    let mut packets: Vec<(f64, EvidencePacket)> = by_id
        .into_iter()
        .filter_map(|(_, c)| {
            let chunk = c.chunk?;
            let score = weights.entity * f64::from(u8::from(c.entity_exact))
                + weights.vector * rrf_term(c.vector_rank)
                + weights.graph * f64::from(u8::from(c.graph_expand));
            let source = c.first_source.unwrap_or(RetrievalSource::Vector);
            Some((
                score,
                EvidencePacket {
                    chunk,
                    source,
                    relevance_score: score,
                },
            ))
        })
        .collect();

    // Entity-exact strictly dominant, then score descending, then chunk ID
    // ascending for full reproducibility under a fixed seed.
    packets.sort_by(|(score_a, a), (score_b, b)| {
        let a_exact = a.source == RetrievalSource::EntityExact;
        let b_exact = b.source == RetrievalSource::EntityExact;
        b_exact
            .cmp(&a_exact)
            .then_with(|| score_b.partial_cmp(score_a).unwrap_or(Ordering::Equal))
            .then_with(|| a.chunk.id.cmp(&b.chunk.id))
    });

    packets.truncate(cap.max(1));
    packets.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use muhasibi_core::models::ChunkKind;

    fn chunk(id: &str) -> Chunk {
        Chunk {
            id: id.into(),
            entity_id: "e1".into(),
            kind: ChunkKind::Evidence,
            text_ar: "نص".into(),
            source_anchor: "src".into(),
            scriptural_refs: vec![],
        }
    }

    #[test]
    fn entity_exact_is_strictly_dominant() {
        let entity_exact = vec![chunk("low-vector-score")];
        let vector_ranked = vec![chunk("high-vector-score")];
        let packets = merge_and_rank(
            &entity_exact,
            &vector_ranked,
            &[],
            RetrievalWeights::default(),
            10,
        );
        assert_eq!(packets[0].chunk.id, "low-vector-score");
    }

    #[test]
    fn dedup_merges_overlapping_sources() {
        let entity_exact = vec![chunk("shared")];
        let vector_ranked = vec![chunk("shared")];
        let packets = merge_and_rank(&entity_exact, &vector_ranked, &[], RetrievalWeights::default(), 10);
        assert_eq!(packets.len(), 1);
    }

    #[test]
    fn cap_truncates_results() {
        let entity_exact: Vec<Chunk> = (0..5).map(|i| chunk(&format!("c{i}"))).collect();
        let packets = merge_and_rank(&entity_exact, &[], &[], RetrievalWeights::default(), 2);
        assert_eq!(packets.len(), 2);
    }

    #[test]
    fn determinism_across_runs() {
        let entity_exact = vec![chunk("a"), chunk("b")];
        let vector_ranked = vec![chunk("c"), chunk("d")];
        let first = merge_and_rank(&entity_exact, &vector_ranked, &[], RetrievalWeights::default(), 10);
        for _ in 0..20 {
            let again = merge_and_rank(&entity_exact, &vector_ranked, &[], RetrievalWeights::default(), 10);
            assert_eq!(
                first.iter().map(|p| p.chunk.id.clone()).collect::<Vec<_>>(),
                again.iter().map(|p| p.chunk.id.clone()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let packets = merge_and_rank(&[], &[], &[], RetrievalWeights::default(), 10);
        assert!(packets.is_empty());
    }
}
