//! A small, hand-authored corpus spanning the five pillars, used by unit
//! tests and the offline CLI driver in lieu of the out-of-scope ingestion
//! pipeline and document store.

use muhasibi_core::models::{
    Chunk, ChunkKind, Edge, Entity, EntityKind, JustificationSpan, RelationLabel,
};

use crate::catalog::Catalog;

fn entity(id: &str, kind: EntityKind, name_ar: &str, definition_ar: &str, parent_id: Option<&str>) -> Entity {
    Entity {
        id: id.into(),
        kind,
        name_ar: name_ar.into(),
        definition_ar: Some(definition_ar.into()),
        parent_id: parent_id.map(str::to_string),
        source_anchor: "framework.v1".into(),
    }
}

fn chunk(id: &str, entity_id: &str, kind: ChunkKind, text_ar: &str, refs: &[&str]) -> Chunk {
    Chunk {
        id: id.into(),
        entity_id: entity_id.into(),
        kind,
        text_ar: text_ar.into(),
        source_anchor: "framework.v1".into(),
        scriptural_refs: refs.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn edge(
    id: &str,
    from_entity: &str,
    to_entity: &str,
    relation: RelationLabel,
    span_chunk: &str,
    quote_ar: &str,
) -> Edge {
    Edge {
        id: id.into(),
        from_entity: from_entity.into(),
        to_entity: to_entity.into(),
        relation,
        justification_spans: vec![JustificationSpan {
            chunk_id: span_chunk.into(),
            char_start: 0,
            char_end: quote_ar.chars().count(),
            quote_ar: quote_ar.into(),
        }],
        approved: true,
    }
}

/// Build the bundled five-pillar catalog: each pillar has one or two core
/// values, each core value has a definition chunk plus at least one
/// evidence chunk carrying a scriptural reference, and at least one
/// retrievable edge per pillar connects two core values.
#[must_use]
pub fn bundled_catalog() -> Catalog {
    let entities = vec![
        entity("pillar.spiritual", EntityKind::Pillar, "الروحية", "الصلة بالله والارتقاء الروحي", None),
        entity("cv.tazkiyah", EntityKind::CoreValue, "التزكية", "تطهير النفس من الرذائل", Some("pillar.spiritual")),
        entity("cv.muraqaba", EntityKind::CoreValue, "المراقبة", "استشعار مراقبة الله في السر والعلن", Some("pillar.spiritual")),
        entity("sv.dhikr", EntityKind::SubValue, "الذكر", "ذكر الله باللسان والقلب", Some("cv.tazkiyah")),
        entity("pillar.emotional", EntityKind::Pillar, "العاطفية", "اتزان الانفعالات والمشاعر", None),
        entity("cv.sabr", EntityKind::CoreValue, "الصبر", "حبس النفس عن الجزع عند الشدائد", Some("pillar.emotional")),
        entity("pillar.intellectual", EntityKind::Pillar, "الفكرية", "طلب العلم وإعمال العقل", None),
        entity("cv.tafakkur", EntityKind::CoreValue, "التفكر", "التأمل في خلق الله وآياته", Some("pillar.intellectual")),
        entity("pillar.physical", EntityKind::Pillar, "الجسدية", "رعاية الجسد وحفظ الصحة", None),
        entity("cv.itidal", EntityKind::CoreValue, "الاعتدال", "التوسط في المطعم والمشرب والراحة", Some("pillar.physical")),
        entity("pillar.social", EntityKind::Pillar, "الاجتماعية", "حسن المعاملة وصلة الأرحام", None),
        entity("cv.birr", EntityKind::CoreValue, "البر", "الإحسان إلى الوالدين والأقارب", Some("pillar.social")),
    ];

    let chunks = vec![
        chunk(
            "chunk.def.pillar.spiritual",
            "pillar.spiritual",
            ChunkKind::Definition,
            "الركيزة الروحية هي صلة العبد بربه، وتشمل التزكية والمراقبة والذكر.",
            &[],
        ),
        chunk(
            "chunk.def.tazkiyah",
            "cv.tazkiyah",
            ChunkKind::Definition,
            "التزكية تطهير النفس من الرذائل ورفعها بالطاعات.",
            &[],
        ),
        chunk(
            "chunk.ev.tazkiyah.1",
            "cv.tazkiyah",
            ChunkKind::Evidence,
            "قد أفلح من زكاها وقد خاب من دساها.",
            &["الشمس:9-10"],
        ),
        chunk(
            "chunk.com.tazkiyah.1",
            "cv.tazkiyah",
            ChunkKind::Commentary,
            "تدل الآية على أن فلاح النفس منوط بتزكيتها لا بإهمالها.",
            &[],
        ),
        chunk(
            "chunk.def.muraqaba",
            "cv.muraqaba",
            ChunkKind::Definition,
            "المراقبة استشعار القلب اطلاع الله عليه في كل حال.",
            &[],
        ),
        chunk(
            "chunk.ev.muraqaba.1",
            "cv.muraqaba",
            ChunkKind::Evidence,
            "الذي يراك حين تقوم وتقلبك في الساجدين.",
            &["الشعراء:218-219"],
        ),
        chunk(
            "chunk.def.dhikr",
            "sv.dhikr",
            ChunkKind::Definition,
            "الذكر استحضار القلب معاني أسماء الله وصفاته باللسان والجَنان.",
            &[],
        ),
        chunk(
            "chunk.ev.dhikr.1",
            "sv.dhikr",
            ChunkKind::Evidence,
            "الذين آمنوا وتطمئن قلوبهم بذكر الله ألا بذكر الله تطمئن القلوب.",
            &["الرعد:28"],
        ),
        chunk(
            "chunk.def.pillar.emotional",
            "pillar.emotional",
            ChunkKind::Definition,
            "الركيزة العاطفية اتزان الانفعالات وضبطها عند الرخاء والشدة.",
            &[],
        ),
        chunk(
            "chunk.def.sabr",
            "cv.sabr",
            ChunkKind::Definition,
            "الصبر حبس النفس عن الجزع وحبس اللسان عن التسخط.",
            &[],
        ),
        chunk(
            "chunk.ev.sabr.1",
            "cv.sabr",
            ChunkKind::Evidence,
            "واستعينوا بالصبر والصلاة إن الله مع الصابرين.",
            &["البقرة:153"],
        ),
        chunk(
            "chunk.def.pillar.intellectual",
            "pillar.intellectual",
            ChunkKind::Definition,
            "الركيزة الفكرية طلب العلم وإعمال العقل في التدبر.",
            &[],
        ),
        chunk(
            "chunk.def.tafakkur",
            "cv.tafakkur",
            ChunkKind::Definition,
            "التفكر تأمل العقل في آيات الله الكونية والشرعية.",
            &[],
        ),
        chunk(
            "chunk.ev.tafakkur.1",
            "cv.tafakkur",
            ChunkKind::Evidence,
            "إن في خلق السماوات والأرض واختلاف الليل والنهار لآيات لأولي الألباب.",
            &["آل عمران:190"],
        ),
        chunk(
            "chunk.def.pillar.physical",
            "pillar.physical",
            ChunkKind::Definition,
            "الركيزة الجسدية رعاية الجسد وحفظ الصحة والاعتدال في أسبابها.",
            &[],
        ),
        chunk(
            "chunk.def.itidal",
            "cv.itidal",
            ChunkKind::Definition,
            "الاعتدال التوسط بلا إفراط ولا تفريط في المطعم والمشرب والراحة.",
            &[],
        ),
        chunk(
            "chunk.ev.itidal.1",
            "cv.itidal",
            ChunkKind::Evidence,
            "كلوا واشربوا ولا تسرفوا إنه لا يحب المسرفين.",
            &["الأعراف:31"],
        ),
        chunk(
            "chunk.def.pillar.social",
            "pillar.social",
            ChunkKind::Definition,
            "الركيزة الاجتماعية حسن المعاملة وصلة الأرحام وبر الوالدين.",
            &[],
        ),
        chunk(
            "chunk.def.birr",
            "cv.birr",
            ChunkKind::Definition,
            "البر الإحسان إلى الوالدين والأقارب وصلتهم بالمعروف.",
            &[],
        ),
        chunk(
            "chunk.ev.birr.1",
            "cv.birr",
            ChunkKind::Evidence,
            "وقضى ربك ألا تعبدوا إلا إياه وبالوالدين إحسانا.",
            &["الإسراء:23"],
        ),
    ];

    let edges = vec![
        edge(
            "edge.tazkiyah.muraqaba",
            "cv.tazkiyah",
            "cv.muraqaba",
            RelationLabel::Reinforces,
            "chunk.ev.tazkiyah.1",
            "قد أفلح من زكاها",
        ),
        edge(
            "edge.tazkiyah.dhikr",
            "cv.tazkiyah",
            "sv.dhikr",
            RelationLabel::Contains,
            "chunk.ev.dhikr.1",
            "ألا بذكر الله تطمئن القلوب",
        ),
        edge(
            "edge.tazkiyah.pillar",
            "cv.tazkiyah",
            "pillar.spiritual",
            RelationLabel::SupportedBy,
            "chunk.ev.tazkiyah.1",
            "قد أفلح من زكاها",
        ),
        edge(
            "edge.muraqaba.tazkiyah",
            "cv.muraqaba",
            "cv.tazkiyah",
            RelationLabel::SupportedBy,
            "chunk.ev.muraqaba.1",
            "الذي يراك حين تقوم",
        ),
        edge(
            "edge.sabr.pillar",
            "cv.sabr",
            "pillar.emotional",
            RelationLabel::SupportedBy,
            "chunk.ev.sabr.1",
            "واستعينوا بالصبر والصلاة",
        ),
        edge(
            "edge.tafakkur.pillar",
            "cv.tafakkur",
            "pillar.intellectual",
            RelationLabel::SupportedBy,
            "chunk.ev.tafakkur.1",
            "إن في خلق السماوات والأرض",
        ),
        edge(
            "edge.itidal.pillar",
            "cv.itidal",
            "pillar.physical",
            RelationLabel::SupportedBy,
            "chunk.ev.itidal.1",
            "كلوا واشربوا ولا تسرفوا",
        ),
        edge(
            "edge.birr.pillar",
            "cv.birr",
            "pillar.social",
            RelationLabel::SupportedBy,
            "chunk.ev.birr.1",
            "وبالوالدين إحسانا",
        ),
    ];

    Catalog::new(entities, chunks, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_core_value_has_a_definition_chunk() {
        let catalog = bundled_catalog();
        for id in ["cv.tazkiyah", "cv.muraqaba", "sv.dhikr", "cv.sabr", "cv.tafakkur", "cv.itidal", "cv.birr"] {
            assert!(catalog.definition_chunk(id).is_some(), "missing definition for {id}");
        }
    }

    #[test]
    fn every_pillar_has_at_least_one_retrievable_outgoing_or_incoming_edge() {
        let catalog = bundled_catalog();
        for id in [
            "pillar.spiritual",
            "pillar.emotional",
            "pillar.intellectual",
            "pillar.physical",
            "pillar.social",
        ] {
            let outgoing = !catalog.retrievable_edges_from(id).is_empty();
            let incoming = ["cv.tazkiyah", "cv.muraqaba", "cv.sabr", "cv.tafakkur", "cv.itidal", "cv.birr"]
                .iter()
                .any(|cv| catalog.retrievable_edges_from(cv).iter().any(|e| e.to_entity == *id));
            assert!(outgoing || incoming, "no retrievable edge touches {id}");
        }
    }

    #[test]
    fn catalog_has_twelve_entities() {
        assert_eq!(bundled_catalog().all_entities().len(), 12);
    }
}
