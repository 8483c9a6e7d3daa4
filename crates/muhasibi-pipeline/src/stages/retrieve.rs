//! RETRIEVE: the hybrid entity-exact / vector-nearest /
//! graph-expand procedure, with a model-assisted query rewrite when
//! vector search comes back too sparse. Every collaborator call is
//! bounded with `asupersync::time::timeout`; a failed or timed-out call
//! folds to an empty result for its source rather than failing the
//! stage.

use std::time::Duration;

use asupersync::time::{timeout, wall_now};

use muhasibi_core::arabic::extract_keywords;
use muhasibi_core::config::RetrievalWeights;
use muhasibi_core::models::{Chunk, Entity, EntityId};
use muhasibi_model::port::ModelPort;
use muhasibi_retrieval::fusion::merge_and_rank;
use muhasibi_retrieval::port::{GraphHit, RetrievalPort};

use crate::context::RetrieveOutput;

/// Tunables RETRIEVE needs from `Config`, passed explicitly so this
/// module has no dependency on `muhasibi-core::Config` beyond its
/// fields.
pub struct RetrieveParams {
    pub entity_topk: usize,
    pub vector_topk: usize,
    pub graph_depth: u32,
    pub rewrite_threshold: usize,
    pub cap: usize,
    pub weights: RetrievalWeights,
    pub retrieval_timeout: Duration,
    pub model_timeout: Duration,
}

/// Run RETRIEVE. `entity_ids`/`entities` come from LISTEN; `normalized_question`
/// is RETRIEVE's vector-search input.
pub async fn run_retrieve(
    normalized_question: &str,
    entity_ids: &[EntityId],
    entities: &[Entity],
    keywords: &[String],
    retrieval: &dyn RetrievalPort,
    model: &dyn ModelPort,
    params: &RetrieveParams,
) -> RetrieveOutput {
    let (mut entity_exact, mut vector_ranked, mut graph_hits) =
        run_hybrid_sweep(normalized_question, entity_ids, retrieval, params).await;

    if vector_ranked.len() < params.rewrite_threshold {
        if let Ok(Ok(resp)) = timeout(
            wall_now(),
            params.model_timeout,
            Box::pin(model.rewrite_query(normalized_question, entities, keywords)),
        )
        .await
        {
            let mut seen_entity_ids: std::collections::HashSet<EntityId> = entity_ids.iter().cloned().collect();
            for rewrite in resp.rewrites_ar.iter().take(5) {
                // Step 2 (vector-nearest) re-run with the rewrite.
                if let Ok(Ok(hits)) = timeout(
                    wall_now(),
                    params.retrieval_timeout,
                    Box::pin(retrieval.vector_search(rewrite, params.vector_topk)),
                )
                .await
                {
                    for hit in hits {
                        if !vector_ranked.iter().any(|c| c.id == hit.chunk.id) {
                            vector_ranked.push(hit.chunk);
                        }
                    }
                }

                // Steps 1 and 3 (entity-exact, graph-expand) re-run for any
                // newly resolved entity the rewrite surfaces ("Re-run steps
                // 1-3 with each rewrite", spec §4.4).
                let rewrite_keywords = extract_keywords(rewrite);
                let Ok(Ok(rewrite_entities)) = timeout(
                    wall_now(),
                    params.retrieval_timeout,
                    Box::pin(retrieval.resolve_entities(&rewrite_keywords)),
                )
                .await
                else {
                    continue;
                };
                let new_ids: Vec<EntityId> = rewrite_entities
                    .into_iter()
                    .map(|e| e.id)
                    .filter(|id| seen_entity_ids.insert(id.clone()))
                    .collect();
                if new_ids.is_empty() {
                    continue;
                }
                for id in &new_ids {
                    if let Ok(Ok(chunks)) = timeout(
                        wall_now(),
                        params.retrieval_timeout,
                        Box::pin(retrieval.lookup_by_entity(id, params.entity_topk)),
                    )
                    .await
                    {
                        entity_exact.extend(chunks);
                    }
                }
                if let Ok(Ok(hits)) = timeout(
                    wall_now(),
                    params.retrieval_timeout,
                    Box::pin(retrieval.expand_graph(&new_ids, params.graph_depth, true)),
                )
                .await
                {
                    for hit in hits {
                        if !graph_hits.iter().any(|h| h.chunk.id == hit.chunk.id && h.edge.id == hit.edge.id) {
                            graph_hits.push(hit);
                        }
                    }
                }
            }
        }
    }

    let graph_expand: Vec<Chunk> = graph_hits.iter().map(|h| h.chunk.clone()).collect();

    let packets = merge_and_rank(
        &entity_exact,
        &vector_ranked,
        &graph_expand,
        params.weights,
        params.cap,
    );
    RetrieveOutput { packets, graph_hits }
}

/// The entity-exact, vector, and graph-expand sweep, run as sequential bounded
/// calls (see `DESIGN.md` for why this isn't a concurrent join).
async fn run_hybrid_sweep(
    normalized_question: &str,
    entity_ids: &[EntityId],
    retrieval: &dyn RetrievalPort,
    params: &RetrieveParams,
) -> (Vec<Chunk>, Vec<Chunk>, Vec<GraphHit>) {
    let mut entity_exact = Vec::new();
    for id in entity_ids {
        if let Ok(Ok(chunks)) = timeout(
            wall_now(),
            params.retrieval_timeout,
            Box::pin(retrieval.lookup_by_entity(id, params.entity_topk)),
        )
        .await
        {
            entity_exact.extend(chunks);
        }
    }

    let vector_ranked = match timeout(
        wall_now(),
        params.retrieval_timeout,
        Box::pin(retrieval.vector_search(normalized_question, params.vector_topk)),
    )
    .await
    {
        Ok(Ok(hits)) => hits.into_iter().map(|h| h.chunk).collect(),
        _ => Vec::new(),
    };

    let graph_hits = match timeout(
        wall_now(),
        params.retrieval_timeout,
        Box::pin(retrieval.expand_graph(entity_ids, params.graph_depth, true)),
    )
    .await
    {
        Ok(Ok(hits)) => hits,
        _ => Vec::new(),
    };

    (entity_exact, vector_ranked, graph_hits)
}
