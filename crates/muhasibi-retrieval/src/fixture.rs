//! A deterministic, in-memory [`RetrievalPort`] implementation over a
//! [`Catalog`] snapshot — stands in for the out-of-scope relational/vector
//! store in tests and the offline CLI.

use std::sync::Arc;

use async_trait::async_trait;

use muhasibi_core::arabic::{match_key, normalize, tokenize};
use muhasibi_core::models::{Chunk, ChunkId, Edge, Entity, EntityId};

use crate::catalog::Catalog;
use crate::port::{GraphHit, RetrievalError, RetrievalPort, ScoredChunk, Span};

/// Retrieval backed by an immutable, shared [`Catalog`].
pub struct FixtureRetrieval {
    catalog: Arc<Catalog>,
}

impl FixtureRetrieval {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Deterministic stand-in for a real embedding cosine score: the
    /// token-overlap ratio between the normalized query and normalized
    /// chunk text. Real deployments swap this for an actual embedder
    /// behind the same trait.
    fn pseudo_cosine(query_normalized: &str, chunk: &Chunk) -> f64 {
        let chunk_normalized = normalize(&chunk.text_ar);
        let query_tokens: std::collections::HashSet<&str> = tokenize(query_normalized).into_iter().collect();
        let chunk_tokens: Vec<&str> = tokenize(&chunk_normalized);
        if chunk_tokens.is_empty() || query_tokens.is_empty() {
            return 0.0;
        }
        let hits = chunk_tokens.iter().filter(|t| query_tokens.contains(*t)).count();
        hits as f64 / (chunk_tokens.len() as f64).sqrt()
    }

    fn bfs_expand(&self, roots: &[EntityId], depth: u32) -> Vec<(Entity, Edge)> {
        let mut frontier: Vec<EntityId> = roots.to_vec();
        let mut visited: std::collections::HashSet<EntityId> = roots.iter().cloned().collect();
        let mut hits: Vec<(Entity, Edge)> = Vec::new();

        for _ in 0..depth {
            let mut next_frontier = Vec::new();
            for entity_id in &frontier {
                for edge in self.catalog.retrievable_edges_from(entity_id) {
                    if visited.contains(&edge.to_entity) {
                        continue;
                    }
                    if let Some(target) = self.catalog.entity(&edge.to_entity) {
                        hits.push((target.clone(), edge.clone()));
                        visited.insert(edge.to_entity.clone());
                        next_frontier.push(edge.to_entity.clone());
                    }
                }
            }
            frontier = next_frontier;
            if frontier.is_empty() {
                break;
            }
        }
        hits
    }
}

#[async_trait]
impl RetrievalPort for FixtureRetrieval {
    async fn resolve_entities(&self, keywords: &[String]) -> Result<Vec<Entity>, RetrievalError> {
        // `keywords` are match keys (`muhasibi_core::arabic::extract_keywords`
        // output), already stripped of a leading particle; compare against
        // the entity name run through the same `match_key` so "التزكية" and
        // the keyword "تزكية" it produces still match.
        let keyword_keys: std::collections::HashSet<String> =
            keywords.iter().map(|k| match_key(&normalize(k))).collect();
        Ok(self
            .catalog
            .all_entities()
            .iter()
            .filter(|e| keyword_keys.contains(&match_key(&normalize(&e.name_ar))))
            .cloned()
            .collect())
    }

    async fn lookup_by_entity(
        &self,
        entity_id: &EntityId,
        limit: usize,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        if self.catalog.entity(entity_id).is_none() {
            return Err(RetrievalError::UnknownEntity(entity_id.clone()));
        }
        let mut out: Vec<Chunk> = Vec::new();
        if let Some(def) = self.catalog.definition_chunk(entity_id) {
            out.push(def.clone());
        }
        out.extend(
            self.catalog
                .evidence_chunks_for_entity(entity_id, limit)
                .into_iter()
                .cloned(),
        );
        Ok(out)
    }

    async fn vector_search(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let query_normalized = normalize(text);
        let mut scored: Vec<ScoredChunk> = self
            .catalog
            .all_chunks()
            .iter()
            .map(|c| ScoredChunk {
                chunk: c.clone(),
                score: Self::pseudo_cosine(&query_normalized, c),
            })
            .filter(|sc| sc.score > 0.0)
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn expand_graph(
        &self,
        entity_ids: &[EntityId],
        depth: u32,
        require_spans: bool,
    ) -> Result<Vec<GraphHit>, RetrievalError> {
        let hits = self.bfs_expand(entity_ids, depth);
        let mut out = Vec::new();
        for (entity, edge) in hits {
            if require_spans && edge.justification_spans.is_empty() {
                continue;
            }
            if let Some(def) = self.catalog.definition_chunk(&entity.id) {
                out.push(GraphHit {
                    chunk: def.clone(),
                    edge: edge.clone(),
                });
            }
            for span in &edge.justification_spans {
                if let Some(chunk) = self.catalog.chunk(&span.chunk_id) {
                    out.push(GraphHit {
                        chunk: chunk.clone(),
                        edge: edge.clone(),
                    });
                }
            }
        }
        Ok(out)
    }

    async fn get_chunk(&self, chunk_id: &ChunkId) -> Result<Chunk, RetrievalError> {
        self.catalog
            .chunk(chunk_id)
            .cloned()
            .ok_or_else(|| RetrievalError::UnknownChunk(chunk_id.clone()))
    }

    async fn get_edge_evidence(&self, edge_id: &str) -> Result<Vec<Span>, RetrievalError> {
        let edge = self
            .catalog
            .edge(edge_id)
            .ok_or_else(|| RetrievalError::UnknownEdge(edge_id.to_string()))?;
        Ok(edge
            .justification_spans
            .iter()
            .map(|s| Span {
                chunk_id: s.chunk_id.clone(),
                char_start: s.char_start,
                char_end: s.char_end,
                quote_ar: s.quote_ar.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bundled_catalog;

    fn port() -> FixtureRetrieval {
        FixtureRetrieval::new(Arc::new(bundled_catalog()))
    }

    #[test]
    fn lookup_by_entity_returns_definition_first() {
        let port = port();
        let chunks = pollster::block_on(port.lookup_by_entity(&"pillar.spiritual".to_string(), 5)).unwrap();
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].kind, muhasibi_core::models::ChunkKind::Definition);
    }

    #[test]
    fn resolve_entities_matches_a_particle_stripped_keyword() {
        let port = port();
        let keywords = muhasibi_core::arabic::extract_keywords("تعريف التزكية");
        let matches = pollster::block_on(port.resolve_entities(&keywords)).unwrap();
        assert!(matches.iter().any(|e| e.id == "cv.tazkiyah"));
    }

    #[test]
    fn unknown_entity_errors() {
        let port = port();
        let result = pollster::block_on(port.lookup_by_entity(&"does.not.exist".to_string(), 5));
        assert!(result.is_err());
    }

    #[test]
    fn vector_search_ranks_by_overlap_deterministically() {
        let port = port();
        let first = pollster::block_on(port.vector_search("التزكية وتطهير النفس", 5)).unwrap();
        let second = pollster::block_on(port.vector_search("التزكية وتطهير النفس", 5)).unwrap();
        assert_eq!(
            first.iter().map(|h| h.chunk.id.clone()).collect::<Vec<_>>(),
            second.iter().map(|h| h.chunk.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn expand_graph_respects_require_spans() {
        let port = port();
        let hits = pollster::block_on(port.expand_graph(&["cv.tazkiyah".to_string()], 2, true)).unwrap();
        assert!(!hits.is_empty());
    }
}
