//! INTERPRET: deterministic structural answers for the three
//! list intents; a model-assisted answer for everything else, followed by
//! citation hydration, span resolution, guardrails, and a deterministic
//! fallback when the model call fails outright.

use std::time::Duration;

use asupersync::time::{timeout, wall_now};

use muhasibi_core::models::{
    ArgumentChain, ChunkKind, Citation, Confidence, Entity, EntityId, EntityKind, EvidencePacket, Mode,
    ResolutionMethod, ResolutionStatus,
};
use muhasibi_guard::{
    evaluate_guardrails, hydrate_citations, resolve_sentence_span, resolved_by_construction, split_sentences,
};
use muhasibi_model::port::ModelPort;
use muhasibi_model::schema::IntentType;
use muhasibi_retrieval::catalog::Catalog;
use muhasibi_retrieval::port::GraphHit;

use crate::context::InterpretOutput;

#[allow(clippy::too_many_arguments)]
pub async fn run_interpret(
    question: &str,
    intent: IntentType,
    is_definitional_intent: bool,
    entity_ids: &[EntityId],
    entities: &[Entity],
    packets: &[EvidencePacket],
    graph_hits: &[GraphHit],
    catalog: &Catalog,
    mode: Mode,
    model: &dyn ModelPort,
    model_timeout: Duration,
) -> InterpretOutput {
    if intent.is_deterministic_structural() {
        return build_structural_answer(intent, entity_ids, catalog);
    }

    let call = Box::pin(model.interpret(question, packets, entities, mode));
    match timeout(wall_now(), model_timeout, call).await {
        Ok(Ok(resp)) if resp.not_found => InterpretOutput {
            answer_ar: resp.answer_ar,
            citations: Vec::new(),
            referenced_entities: resp.entities,
            argument_chains: Vec::new(),
            not_found: true,
            confidence: resp.confidence,
            contract_reasons: vec!["model_abstained".to_string()],
            is_definitional_intent,
        },
        Ok(Ok(resp)) => finish_model_assisted(resp, packets, graph_hits, catalog, is_definitional_intent),
        Ok(Err(_)) | Err(_) => deterministic_fallback(entity_ids, packets, is_definitional_intent),
    }
}

/// Build the bulleted, directly-projected answer for list intents (spec
/// §4.6 "Deterministic structural answering"). No model call.
fn build_structural_answer(intent: IntentType, entity_ids: &[EntityId], catalog: &Catalog) -> InterpretOutput {
    let targets = structural_targets(intent, entity_ids, catalog);

    if targets.is_empty() {
        return InterpretOutput {
            answer_ar: String::new(),
            citations: Vec::new(),
            referenced_entities: Vec::new(),
            argument_chains: Vec::new(),
            not_found: true,
            confidence: Confidence::Low,
            contract_reasons: vec!["deterministic_structural_empty".to_string()],
            is_definitional_intent: false,
        };
    }

    let answer_ar = targets
        .iter()
        .map(|e| format!("• {}", e.name_ar))
        .collect::<Vec<_>>()
        .join("\n");

    let mut citations = Vec::new();
    let mut referenced_entities = Vec::new();
    for entity in &targets {
        referenced_entities.push(entity.id.clone());
        if let Some(chunk) = catalog.definition_chunk(&entity.id) {
            let (status, method) = resolved_by_construction();
            citations.push(Citation {
                chunk_id: chunk.id.clone(),
                source_anchor: chunk.source_anchor.clone(),
                scriptural_ref: chunk.scriptural_refs.first().cloned(),
                status,
                method,
            });
        }
    }

    InterpretOutput {
        answer_ar,
        citations,
        referenced_entities,
        argument_chains: Vec::new(),
        not_found: false,
        confidence: Confidence::High,
        contract_reasons: vec!["deterministic_structural".to_string()],
        is_definitional_intent: false,
    }
}

fn structural_targets<'a>(intent: IntentType, entity_ids: &[EntityId], catalog: &'a Catalog) -> Vec<&'a Entity> {
    match intent {
        IntentType::ListPillars => catalog
            .all_entities()
            .iter()
            .filter(|e| e.kind == EntityKind::Pillar)
            .collect(),
        IntentType::ListCoreValuesInPillar => {
            let Some(pillar_id) = entity_ids
                .iter()
                .find(|id| catalog.entity(id).is_some_and(|e| e.kind == EntityKind::Pillar))
            else {
                return Vec::new();
            };
            catalog
                .all_entities()
                .iter()
                .filter(|e| e.kind == EntityKind::CoreValue && e.parent_id.as_deref() == Some(pillar_id.as_str()))
                .collect()
        }
        IntentType::ListSubValuesInCoreValue => {
            let Some(cv_id) = entity_ids
                .iter()
                .find(|id| catalog.entity(id).is_some_and(|e| e.kind == EntityKind::CoreValue))
            else {
                return Vec::new();
            };
            catalog
                .all_entities()
                .iter()
                .filter(|e| e.kind == EntityKind::SubValue && e.parent_id.as_deref() == Some(cv_id.as_str()))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Post-generation processing for the model-assisted path: hydrate,
/// resolve spans, run guardrails, build argument chains.
fn finish_model_assisted(
    resp: muhasibi_model::schema::InterpretResponse,
    packets: &[EvidencePacket],
    graph_hits: &[GraphHit],
    catalog: &Catalog,
    is_definitional_intent: bool,
) -> InterpretOutput {
    let mut reasons = Vec::new();

    let mut citations = resp.citations;
    if citations.is_empty() {
        citations = hydrate_citations(packets, &resp.entities);
        reasons.push("citation_hydrated".to_string());
    }

    let sentences = split_sentences(&resp.answer_ar);
    for citation in &mut citations {
        let Some(chunk_text) = chunk_text_for(&citation.chunk_id, packets, catalog) else {
            continue;
        };
        let (status, method) = best_span_across_sentences(&sentences, &chunk_text);
        citation.status = status;
        citation.method = method;
    }

    let cited_chunk_texts: Vec<(String, String)> = citations
        .iter()
        .filter_map(|c| chunk_text_for(&c.chunk_id, packets, catalog).map(|t| (c.chunk_id.clone(), t)))
        .collect();
    let guardrails = evaluate_guardrails(&resp.answer_ar, &cited_chunk_texts);

    let mut not_found = false;
    if guardrails.should_escalate_to_refusal(is_definitional_intent) {
        not_found = true;
        citations.clear();
        reasons.push("escalated_to_refusal".to_string());
    } else if guardrails.should_downgrade_to_partial() {
        reasons.push("downgraded_to_partial".to_string());
    }

    let argument_chains = build_argument_chains(&citations, graph_hits);

    InterpretOutput {
        answer_ar: resp.answer_ar,
        citations,
        referenced_entities: resp.entities,
        argument_chains,
        not_found,
        confidence: resp.confidence,
        contract_reasons: reasons,
        is_definitional_intent,
    }
}

/// Best span resolution for one citation's chunk text across every
/// sentence of the answer, preferring an exact match over approximate
/// over unresolved ("Span resolution").
fn best_span_across_sentences(sentences: &[&str], chunk_text: &str) -> (ResolutionStatus, ResolutionMethod) {
    let mut best = (ResolutionStatus::Unresolved, ResolutionMethod::Fallback);
    for sentence in sentences {
        let candidate = resolve_sentence_span(sentence, chunk_text);
        if candidate.0 == ResolutionStatus::Resolved {
            return candidate;
        }
        if candidate.0 == ResolutionStatus::Approximate && best.0 == ResolutionStatus::Unresolved {
            best = candidate;
        }
    }
    best
}

fn chunk_text_for(chunk_id: &str, packets: &[EvidencePacket], catalog: &Catalog) -> Option<String> {
    packets
        .iter()
        .find(|p| p.chunk.id == chunk_id)
        .map(|p| p.chunk.text_ar.clone())
        .or_else(|| catalog.chunk(chunk_id).map(|c| c.text_ar.clone()))
}

/// One ArgumentChain per graph-expand chunk that ended up cited (spec
/// §4.6 "Argument-chain construction").
fn build_argument_chains(citations: &[Citation], graph_hits: &[GraphHit]) -> Vec<ArgumentChain> {
    let cited: std::collections::HashSet<&str> = citations.iter().map(|c| c.chunk_id.as_str()).collect();
    graph_hits
        .iter()
        .filter(|hit| cited.contains(hit.chunk.id.as_str()))
        .filter_map(|hit| {
            hit.edge.justification_spans.first().map(|span| ArgumentChain {
                edge_id: hit.edge.id.clone(),
                claim_ar: span.quote_ar.clone(),
                inference_type: hit.edge.relation,
                boundary_clause_ar: None,
            })
        })
        .collect()
}

/// Spec §4.6's deterministic fallback: if the model call fails outright
/// and at least one definition packet exists, synthesize a two-section
/// answer from the top definition and top evidence chunk, verbatim.
fn deterministic_fallback(
    entity_ids: &[EntityId],
    packets: &[EvidencePacket],
    is_definitional_intent: bool,
) -> InterpretOutput {
    let definition = entity_ids
        .iter()
        .find_map(|id| packets.iter().find(|p| p.chunk.entity_id == *id && p.chunk.kind == ChunkKind::Definition))
        .or_else(|| packets.iter().find(|p| p.chunk.kind == ChunkKind::Definition));

    let Some(definition) = definition else {
        return InterpretOutput {
            answer_ar: String::new(),
            citations: Vec::new(),
            referenced_entities: Vec::new(),
            argument_chains: Vec::new(),
            not_found: true,
            confidence: Confidence::Low,
            contract_reasons: vec!["model_unavailable".to_string(), "no_fallback_evidence".to_string()],
            is_definitional_intent,
        };
    };

    let evidence = packets
        .iter()
        .find(|p| p.chunk.entity_id == definition.chunk.entity_id && p.chunk.kind != ChunkKind::Definition);

    let mut answer = format!("التعريف:\n{}", definition.chunk.text_ar);
    let mut citations = vec![fallback_citation(definition)];
    if let Some(evidence) = evidence {
        answer.push_str(&format!("\n\nالدليل/التأصيل:\n{}", evidence.chunk.text_ar));
        citations.push(fallback_citation(evidence));
    }

    InterpretOutput {
        answer_ar: answer,
        citations,
        referenced_entities: vec![definition.chunk.entity_id.clone()],
        argument_chains: Vec::new(),
        not_found: false,
        confidence: Confidence::Medium,
        contract_reasons: vec!["model_unavailable".to_string(), "deterministic_fallback".to_string()],
        is_definitional_intent,
    }
}

fn fallback_citation(packet: &EvidencePacket) -> Citation {
    let (status, method) = resolved_by_construction();
    Citation {
        chunk_id: packet.chunk.id.clone(),
        source_anchor: packet.chunk.source_anchor.clone(),
        scriptural_ref: packet.chunk.scriptural_refs.first().cloned(),
        status,
        method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muhasibi_core::models::{Chunk, Edge, JustificationSpan, RelationLabel, RetrievalSource};
    use muhasibi_model::fixture::FixtureModelClient;
    use muhasibi_model::port::ModelError;

    fn catalog() -> Catalog {
        let entities = vec![
            Entity {
                id: "pillar.spiritual".into(),
                kind: EntityKind::Pillar,
                name_ar: "الروحية".into(),
                definition_ar: None,
                parent_id: None,
                source_anchor: "fixture".into(),
            },
            Entity {
                id: "cv.tazkiyah".into(),
                kind: EntityKind::CoreValue,
                name_ar: "التزكية".into(),
                definition_ar: None,
                parent_id: Some("pillar.spiritual".into()),
                source_anchor: "fixture".into(),
            },
            Entity {
                id: "cv.muraqaba".into(),
                kind: EntityKind::CoreValue,
                name_ar: "المراقبة".into(),
                definition_ar: None,
                parent_id: Some("pillar.spiritual".into()),
                source_anchor: "fixture".into(),
            },
        ];
        let chunks = vec![
            Chunk {
                id: "chunk.def.tazkiyah".into(),
                entity_id: "cv.tazkiyah".into(),
                kind: ChunkKind::Definition,
                text_ar: "التزكية تطهير النفس من الرذائل".into(),
                source_anchor: "fixture".into(),
                scriptural_refs: vec![],
            },
            Chunk {
                id: "chunk.ev.tazkiyah".into(),
                entity_id: "cv.tazkiyah".into(),
                kind: ChunkKind::Evidence,
                text_ar: "قد أفلح من زكاها".into(),
                source_anchor: "fixture".into(),
                scriptural_refs: vec!["الشمس: 9".into()],
            },
        ];
        Catalog::new(entities, chunks, Vec::<Edge>::new())
    }

    fn packet(chunk: &Chunk) -> EvidencePacket {
        EvidencePacket {
            chunk: chunk.clone(),
            source: RetrievalSource::EntityExact,
            relevance_score: 3.0,
        }
    }

    #[test]
    fn list_pillars_builds_bulleted_answer_with_citations() {
        let catalog = catalog();
        let out = pollster::block_on(run_interpret(
            "ما هي الركائز الخمس؟",
            IntentType::ListPillars,
            false,
            &[],
            &[],
            &[],
            &[],
            &catalog,
            Mode::Answer,
            &FixtureModelClient,
            Duration::from_secs(1),
        ));
        assert!(!out.not_found);
        assert!(out.answer_ar.contains("الروحية"));
        assert!(!out.citations.is_empty());
    }

    #[test]
    fn list_core_values_in_pillar_filters_by_parent() {
        let catalog = catalog();
        let out = pollster::block_on(run_interpret(
            "ما هي قيم الروحية؟",
            IntentType::ListCoreValuesInPillar,
            false,
            &["pillar.spiritual".to_string()],
            &[],
            &[],
            &[],
            &catalog,
            Mode::Answer,
            &FixtureModelClient,
            Duration::from_secs(1),
        ));
        assert!(!out.not_found);
        assert!(out.referenced_entities.contains(&"cv.tazkiyah".to_string()));
        assert!(out.referenced_entities.contains(&"cv.muraqaba".to_string()));
    }

    #[test]
    fn model_failure_falls_back_to_definition_and_evidence() {
        struct AlwaysFails;
        #[async_trait::async_trait]
        impl ModelPort for AlwaysFails {
            async fn purpose_path(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::PurposePathResponse, ModelError> {
                unreachable!()
            }
            async fn rewrite_query(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::RewriteQueryResponse, ModelError> {
                unreachable!()
            }
            async fn classify_intent(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::ClassifyIntentResponse, ModelError> {
                unreachable!()
            }
            async fn interpret(
                &self,
                _q: &str,
                _p: &[EvidencePacket],
                _e: &[Entity],
                _m: Mode,
            ) -> Result<muhasibi_model::schema::InterpretResponse, ModelError> {
                Err(ModelError::Unavailable("down".into()))
            }
        }

        let catalog = catalog();
        let def_chunk = catalog.chunk("chunk.def.tazkiyah").unwrap().clone();
        let ev_chunk = catalog.chunk("chunk.ev.tazkiyah").unwrap().clone();
        let packets = vec![packet(&def_chunk), packet(&ev_chunk)];

        let out = pollster::block_on(run_interpret(
            "عرف التزكية",
            IntentType::Definition,
            true,
            &["cv.tazkiyah".to_string()],
            &[],
            &packets,
            &[],
            &catalog,
            Mode::Answer,
            &AlwaysFails,
            Duration::from_secs(1),
        ));
        assert!(!out.not_found);
        assert!(out.answer_ar.contains("التعريف"));
        assert!(out.answer_ar.contains("الدليل"));
        assert_eq!(out.citations.len(), 2);
    }

    #[test]
    fn model_failure_with_no_definition_packet_yields_refusal() {
        let catalog = catalog();
        struct AlwaysFails;
        #[async_trait::async_trait]
        impl ModelPort for AlwaysFails {
            async fn purpose_path(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::PurposePathResponse, ModelError> {
                unreachable!()
            }
            async fn rewrite_query(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::RewriteQueryResponse, ModelError> {
                unreachable!()
            }
            async fn classify_intent(
                &self,
                _q: &str,
                _e: &[Entity],
                _k: &[String],
            ) -> Result<muhasibi_model::schema::ClassifyIntentResponse, ModelError> {
                unreachable!()
            }
            async fn interpret(
                &self,
                _q: &str,
                _p: &[EvidencePacket],
                _e: &[Entity],
                _m: Mode,
            ) -> Result<muhasibi_model::schema::InterpretResponse, ModelError> {
                Err(ModelError::Unavailable("down".into()))
            }
        }

        let out = pollster::block_on(run_interpret(
            "سؤال",
            IntentType::PracticalGuidance,
            false,
            &[],
            &[],
            &[],
            &[],
            &catalog,
            Mode::Answer,
            &AlwaysFails,
            Duration::from_secs(1),
        ));
        assert!(out.not_found);
    }

    #[test]
    fn argument_chain_is_built_for_cited_graph_hit() {
        let catalog = catalog();
        let target_chunk = catalog.chunk("chunk.ev.tazkiyah").unwrap().clone();
        let edge = Edge {
            id: "edge.1".into(),
            from_entity: "cv.tazkiyah".into(),
            to_entity: "cv.muraqaba".into(),
            relation: RelationLabel::Reinforces,
            justification_spans: vec![JustificationSpan {
                chunk_id: target_chunk.id.clone(),
                char_start: 0,
                char_end: 3,
                quote_ar: "قد أفلح".into(),
            }],
            approved: true,
        };
        let hits = vec![GraphHit {
            chunk: target_chunk.clone(),
            edge,
        }];
        let citations = vec![Citation {
            chunk_id: target_chunk.id.clone(),
            source_anchor: target_chunk.source_anchor.clone(),
            scriptural_ref: None,
            status: ResolutionStatus::Resolved,
            method: ResolutionMethod::ExactSubstring,
        }];
        let chains = build_argument_chains(&citations, &hits);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].inference_type, RelationLabel::Reinforces);
        let _ = catalog;
    }
}
