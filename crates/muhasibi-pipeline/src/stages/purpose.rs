//! PURPOSE: derive `{goal_ar, constraints}`, falling back to a
//! deterministic template when the model is unavailable or malformed.

use std::time::Duration;

use asupersync::time::{timeout, wall_now};

use muhasibi_core::models::{Entity, MANDATORY_CONSTRAINTS};
use muhasibi_model::port::ModelPort;

use crate::context::PurposeOutput;

/// Run PURPOSE. `entities` are the already-resolved catalog entities for
/// this request, in LISTEN's match order; `model_timeout` bounds the
/// single `purpose_path` call.
pub async fn run_purpose(
    question: &str,
    entities: &[Entity],
    keywords: &[String],
    model: &dyn ModelPort,
    model_timeout: Duration,
) -> PurposeOutput {
    let call = Box::pin(model.purpose_path(question, entities, keywords));
    match timeout(wall_now(), model_timeout, call).await {
        Ok(Ok(resp)) => {
            let mut constraints = MANDATORY_CONSTRAINTS
                .iter()
                .map(|c| (*c).to_string())
                .collect::<Vec<_>>();
            for extra in resp.constraints {
                if !constraints.contains(&extra) {
                    constraints.push(extra);
                }
            }
            PurposeOutput {
                goal_ar: resp.goal_ar,
                constraints,
            }
        }
        Ok(Err(_)) | Err(_) => deterministic_fallback(entities),
    }
}

/// Template goal synthesized from the detected entities alone (spec
/// §4.2's fallback), with only the three mandatory constraints.
fn deterministic_fallback(entities: &[Entity]) -> PurposeOutput {
    let mandatory = MANDATORY_CONSTRAINTS
        .iter()
        .map(|c| (*c).to_string())
        .collect::<Vec<_>>();

    if entities.is_empty() {
        return PurposeOutput {
            goal_ar: "بيان الإجابة ضمن الإطار المعتمد".to_string(),
            constraints: mandatory,
        };
    }

    let verb = if entities.len() >= 2 { "مقارنة" } else { "بيان/توضيح" };
    let names = entities
        .iter()
        .map(|e| e.name_ar.as_str())
        .collect::<Vec<_>>()
        .join("، ");

    PurposeOutput {
        goal_ar: format!("{verb} {names}"),
        constraints: mandatory,
    }
}
