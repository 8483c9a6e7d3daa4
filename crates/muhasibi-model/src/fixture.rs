//! A deterministic, table-driven [`ModelPort`] implementation — stands in
//! for the out-of-scope foundation-model provider in tests and the
//! offline CLI. It never calls out to a network and always returns the
//! same output for the same input.

use async_trait::async_trait;

use muhasibi_core::arabic::token_overlap_ratio;
use muhasibi_core::models::{
    Citation, Confidence, Difficulty, Entity, EvidencePacket, Mode, ResolutionMethod,
    ResolutionStatus, MANDATORY_CONSTRAINTS,
};

use crate::port::{ModelError, ModelPort};
use crate::schema::{
    ClassifyIntentResponse, InterpretResponse, IntentType, PurposePathResponse, RewriteQueryResponse,
};

const DEFAULT_PLAN: [&str; 4] = [
    "استخلاص الكيانات ذات الصلة",
    "استرجاع التعريفات والأدلة",
    "التحقق من تغطية الأدلة",
    "صياغة الإجابة مع الاستشهادات",
];

/// Deterministic stand-in for the foundation model, grounded entirely in
/// the entities and evidence packets it is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureModelClient;

impl FixtureModelClient {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn difficulty_for(entities: &[Entity]) -> Difficulty {
        match entities.len() {
            0 => Difficulty::Hard,
            1 => Difficulty::Medium,
            _ => Difficulty::Easy,
        }
    }

    fn goal_for(entities: &[Entity]) -> String {
        if entities.is_empty() {
            "الإجابة عن السؤال المطروح ضمن إطار القيم".to_string()
        } else {
            let names: Vec<&str> = entities.iter().map(|e| e.name_ar.as_str()).collect();
            format!("بيان وتوضيح الأدلة المتعلقة بـ {}", names.join(" و"))
        }
    }
}

#[async_trait]
impl ModelPort for FixtureModelClient {
    async fn purpose_path(
        &self,
        _question: &str,
        entities: &[Entity],
        _keywords: &[String],
    ) -> Result<PurposePathResponse, ModelError> {
        Ok(PurposePathResponse {
            goal_ar: Self::goal_for(entities),
            constraints: MANDATORY_CONSTRAINTS.iter().map(|s| (*s).to_string()).collect(),
            path: DEFAULT_PLAN.iter().map(|s| (*s).to_string()).collect(),
            difficulty: Self::difficulty_for(entities),
        })
    }

    async fn rewrite_query(
        &self,
        question: &str,
        entities: &[Entity],
        keywords: &[String],
    ) -> Result<RewriteQueryResponse, ModelError> {
        let mut rewrites: Vec<String> = Vec::new();
        for entity in entities.iter().take(3) {
            rewrites.push(format!("{} {}", entity.name_ar, question));
        }
        for keyword in keywords.iter().take(5 - rewrites.len().min(5)) {
            let candidate = format!("تعريف {keyword}");
            if !rewrites.contains(&candidate) {
                rewrites.push(candidate);
            }
        }
        rewrites.truncate(5);
        Ok(RewriteQueryResponse {
            rewrites_ar: rewrites,
            disambiguation_ar: None,
        })
    }

    async fn classify_intent(
        &self,
        _question: &str,
        entities: &[Entity],
        keywords: &[String],
    ) -> Result<ClassifyIntentResponse, ModelError> {
        let has = |w: &str| keywords.iter().any(|k| k.contains(w));
        let intent_type = if has("ركائز") && has("خمس") {
            IntentType::ListPillars
        } else if entities.len() >= 2 {
            IntentType::Comparison
        } else if entities.len() == 1 {
            IntentType::Definition
        } else {
            IntentType::Ambiguous
        };
        Ok(ClassifyIntentResponse {
            intent_type,
            in_scope: !matches!(intent_type, IntentType::Ambiguous) || !entities.is_empty(),
            confidence: if entities.is_empty() { 0.2 } else { 0.6 },
            target_entity: entities.first().map(|e| e.id.clone()),
            suggested_queries_ar: Vec::new(),
            clarification_ar: None,
        })
    }

    async fn interpret(
        &self,
        _question: &str,
        evidence_packets: &[EvidencePacket],
        _entities: &[Entity],
        _mode: Mode,
    ) -> Result<InterpretResponse, ModelError> {
        if evidence_packets.is_empty() {
            return Ok(InterpretResponse {
                answer_ar: String::new(),
                citations: Vec::new(),
                entities: Vec::new(),
                not_found: true,
                confidence: Confidence::Low,
            });
        }

        let definition = evidence_packets
            .iter()
            .find(|p| p.chunk.kind == muhasibi_core::models::ChunkKind::Definition);
        let evidence = evidence_packets
            .iter()
            .find(|p| p.chunk.kind == muhasibi_core::models::ChunkKind::Evidence);

        let mut sections: Vec<String> = Vec::new();
        if let Some(def) = definition {
            sections.push(format!("التعريف: {}", def.chunk.text_ar));
        }
        if let Some(ev) = evidence {
            sections.push(format!("الدليل: {}", ev.chunk.text_ar));
        }
        let answer_ar = sections.join("\n");

        let mut citations = Vec::new();
        let mut referenced_entities = Vec::new();
        for packet in [definition, evidence].into_iter().flatten() {
            let status = if answer_ar.contains(&packet.chunk.text_ar) {
                ResolutionStatus::Resolved
            } else if token_overlap_ratio(&answer_ar, &packet.chunk.text_ar) >= 0.6 {
                ResolutionStatus::Approximate
            } else {
                ResolutionStatus::Unresolved
            };
            let method = if status == ResolutionStatus::Resolved {
                ResolutionMethod::ExactSubstring
            } else {
                ResolutionMethod::TokenOverlap
            };
            citations.push(Citation {
                chunk_id: packet.chunk.id.clone(),
                source_anchor: packet.chunk.source_anchor.clone(),
                scriptural_ref: packet.chunk.scriptural_refs.first().cloned(),
                status,
                method,
            });
            if !referenced_entities.contains(&packet.chunk.entity_id) {
                referenced_entities.push(packet.chunk.entity_id.clone());
            }
        }

        let confidence = if citations.len() >= 2 {
            Confidence::High
        } else if citations.is_empty() {
            Confidence::Low
        } else {
            Confidence::Medium
        };

        Ok(InterpretResponse {
            answer_ar,
            citations,
            entities: referenced_entities,
            not_found: false,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muhasibi_core::models::{ChunkKind, EntityKind, RetrievalSource};

    fn entity(id: &str, name_ar: &str) -> Entity {
        Entity {
            id: id.into(),
            kind: EntityKind::CoreValue,
            name_ar: name_ar.into(),
            definition_ar: None,
            parent_id: None,
            source_anchor: "fixture".into(),
        }
    }

    fn packet(id: &str, kind: ChunkKind, text: &str) -> EvidencePacket {
        EvidencePacket {
            chunk: muhasibi_core::models::Chunk {
                id: id.into(),
                entity_id: "cv.tazkiyah".into(),
                kind,
                text_ar: text.into(),
                source_anchor: "fixture".into(),
                scriptural_refs: vec!["الشمس:9".into()],
            },
            source: RetrievalSource::EntityExact,
            relevance_score: 1.0,
        }
    }

    #[test]
    fn purpose_path_synthesizes_goal_from_entities() {
        let client = FixtureModelClient::new();
        let entities = vec![entity("cv.tazkiyah", "التزكية")];
        let resp = pollster::block_on(client.purpose_path("سؤال", &entities, &[])).unwrap();
        assert!(resp.goal_ar.contains("التزكية"));
        assert_eq!(
            resp.constraints,
            MANDATORY_CONSTRAINTS.iter().map(|s| (*s).to_string()).collect::<Vec<_>>()
        );
        assert_eq!(resp.difficulty, Difficulty::Medium);
    }

    #[test]
    fn interpret_returns_not_found_on_empty_packets() {
        let client = FixtureModelClient::new();
        let resp = pollster::block_on(client.interpret("سؤال", &[], &[], Mode::Answer)).unwrap();
        assert!(resp.not_found);
        assert!(resp.citations.is_empty());
    }

    #[test]
    fn interpret_cites_definition_and_evidence() {
        let client = FixtureModelClient::new();
        let packets = vec![
            packet("chunk.def.1", ChunkKind::Definition, "تطهير النفس من الرذائل"),
            packet("chunk.ev.1", ChunkKind::Evidence, "قد أفلح من زكاها"),
        ];
        let resp = pollster::block_on(client.interpret("سؤال", &packets, &[], Mode::Answer)).unwrap();
        assert!(!resp.not_found);
        assert_eq!(resp.citations.len(), 2);
        assert!(resp.citations.iter().all(|c| c.status == ResolutionStatus::Resolved));
    }
}
