//! The read-only snapshot of entities, chunks, and edges a request sees:
//! the entity catalog and edge graph are an immutable snapshot within a
//! request.

use std::collections::HashMap;

use muhasibi_core::models::{Chunk, ChunkId, ChunkKind, Edge, Entity, EntityId};

/// An immutable, indexed view over the canonical corpus.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<Entity>,
    entities_by_id: HashMap<EntityId, usize>,
    chunks: Vec<Chunk>,
    chunks_by_id: HashMap<ChunkId, usize>,
    chunks_by_entity: HashMap<EntityId, Vec<usize>>,
    edges: Vec<Edge>,
    edges_from: HashMap<EntityId, Vec<usize>>,
}

impl Catalog {
    /// Build an indexed catalog from flat entity/chunk/edge lists.
    #[must_use]
    pub fn new(entities: Vec<Entity>, chunks: Vec<Chunk>, edges: Vec<Edge>) -> Self {
        let entities_by_id = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        let chunks_by_id = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let mut chunks_by_entity: HashMap<EntityId, Vec<usize>> = HashMap::new();
        for (i, c) in chunks.iter().enumerate() {
            chunks_by_entity.entry(c.entity_id.clone()).or_default().push(i);
        }

        let mut edges_from: HashMap<EntityId, Vec<usize>> = HashMap::new();
        for (i, e) in edges.iter().enumerate() {
            edges_from.entry(e.from_entity.clone()).or_default().push(i);
        }

        Self {
            entities,
            entities_by_id,
            chunks,
            chunks_by_id,
            chunks_by_entity,
            edges,
            edges_from,
        }
    }

    #[must_use]
    pub fn all_entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities_by_id.get(id).map(|&i| &self.entities[i])
    }

    #[must_use]
    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.chunks_by_id.get(id).map(|&i| &self.chunks[i])
    }

    /// The definition chunk for an entity, if one exists.
    #[must_use]
    pub fn definition_chunk(&self, entity_id: &str) -> Option<&Chunk> {
        self.chunks_for_entity(entity_id)
            .into_iter()
            .find(|c| c.kind == ChunkKind::Definition)
    }

    /// All chunks attached to an entity, in catalog order (deterministic).
    #[must_use]
    pub fn chunks_for_entity(&self, entity_id: &str) -> Vec<&Chunk> {
        self.chunks_by_entity
            .get(entity_id)
            .map(|idxs| idxs.iter().map(|&i| &self.chunks[i]).collect())
            .unwrap_or_default()
    }

    /// Evidence/commentary chunks attached to an entity, capped at `limit`.
    #[must_use]
    pub fn evidence_chunks_for_entity(&self, entity_id: &str, limit: usize) -> Vec<&Chunk> {
        self.chunks_for_entity(entity_id)
            .into_iter()
            .filter(|c| c.kind != ChunkKind::Definition)
            .take(limit)
            .collect()
    }

    #[must_use]
    pub fn all_chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Retrievable (approved + justified) outgoing edges from an entity.
    #[must_use]
    pub fn retrievable_edges_from(&self, entity_id: &str) -> Vec<&Edge> {
        self.edges_from
            .get(entity_id)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| &self.edges[i])
                    .filter(|e| e.is_retrievable())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }
}
