//! REFLECT: an optional closing annotation drawn only from
//! the answer's own vocabulary, or (in `natural_chat` mode) a reflow of
//! the answer into prose — either way the cited chunk set must not
//! change and no factual sentence may be added or removed.
//!
//! The orchestrator keeps INTERPRET's `citations` untouched across
//! REFLECT — this stage only ever receives and returns answer text, so
//! "the cited chunk set doesn't change" holds by construction rather
//! than by a runtime check.

use muhasibi_core::models::Mode;

use crate::context::ReflectOutput;

/// Run REFLECT over INTERPRET's answer text. `referenced_entity_names`
/// are the Arabic names of the entities the final answer actually
/// touched, used only to decide whether an annotation clause is safe to
/// append (every token it adds must already occur in `answer_ar`).
#[must_use]
pub fn run_reflect(answer_ar: &str, mode: Mode, not_found: bool, referenced_entity_names: &[String]) -> ReflectOutput {
    if not_found || answer_ar.is_empty() {
        return ReflectOutput {
            answer_ar: answer_ar.to_string(),
        };
    }

    let mut answer_ar = answer_ar.to_string();
    if let Some(annotation) = build_annotation(&answer_ar, referenced_entity_names) {
        answer_ar.push_str("\n\n");
        answer_ar.push_str(&annotation);
    }

    let answer_ar = if mode == Mode::NaturalChat {
        reflow_to_prose(&answer_ar)
    } else {
        answer_ar
    };

    ReflectOutput { answer_ar }
}

/// A single closing annotation clause joining the distinct entity names
/// the answer touched on — only when every one of those names already
/// occurs verbatim in `answer_ar`, so the clause introduces no token not
/// already present in the answer (spec §4.7). Silently omitted (returns
/// `None`) when fewer than two entities are referenced, since a
/// single-entity answer has nothing distinct to connect.
fn build_annotation(answer_ar: &str, referenced_entity_names: &[String]) -> Option<String> {
    let mut distinct: Vec<&String> = Vec::new();
    for name in referenced_entity_names {
        if !name.is_empty() && !distinct.contains(&name) {
            distinct.push(name);
        }
    }
    if distinct.len() < 2 {
        return None;
    }
    if !distinct.iter().all(|name| answer_ar.contains(name.as_str())) {
        return None;
    }
    Some(distinct.iter().map(std::string::String::as_str).collect::<Vec<_>>().join("، "))
}

/// `natural_chat` reflow: join bullet/line-broken segments into a single
/// flowing sentence — reorders/merges lines but never drops one, so no
/// factual sentence is added or removed (see `DESIGN.md`).
fn reflow_to_prose(answer_ar: &str) -> String {
    let segments: Vec<&str> = answer_ar
        .lines()
        .map(|l| l.trim_start_matches('•').trim())
        .filter(|l| !l.is_empty())
        .collect();
    if segments.len() <= 1 {
        return answer_ar.to_string();
    }
    segments.join("، ")
}
