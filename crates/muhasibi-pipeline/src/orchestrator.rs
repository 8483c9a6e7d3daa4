//! The orchestrator: wires LISTEN → PURPOSE → PATH → RETRIEVE → ACCOUNT →
//! INTERPRET → REFLECT → FINALIZE in strict sequential order,
//! building the `TraceBundle` as it goes and appending the run record at
//! the end (FINALIZE's trace-append is the third suspension point, §5).
//!
//! Per-call timeouts are derived from `Config::timeouts`, clamped to
//! whatever remains of `timeouts.total` since the request started — a
//! call issued with no budget left times out immediately and its
//! stage's deterministic fallback takes over, which is how the total
//! deadline cascades without a dedicated cancellation signal (see
//! `DESIGN.md` for why no `Cx`-style budget type is threaded here).

use std::time::{Duration, Instant};

use muhasibi_core::config::Config;
use muhasibi_core::error::Error;
use muhasibi_core::models::{Confidence, EntityId, FinalResponse, Mode};
use muhasibi_core::trace::{Stage, TraceBundle, TraceCounts, TraceEvent};
use muhasibi_model::port::ModelPort;
use muhasibi_retrieval::catalog::Catalog;
use muhasibi_retrieval::port::RetrievalPort;

use crate::stages::{account, finalize, interpret, listen, path, purpose, reflect, retrieve::{self, RetrieveParams}};
use crate::trace_sink::{RequestInputs, RunRecord, StageTimings, TracePort};

/// Run one request through all eight stages.
#[allow(clippy::too_many_arguments)]
pub async fn run_pipeline(
    request_id: impl Into<String>,
    raw_question: &str,
    mode: Mode,
    catalog: &Catalog,
    retrieval: &dyn RetrievalPort,
    model: &dyn ModelPort,
    trace_sink: &dyn TracePort,
    config: &Config,
) -> Result<FinalResponse, Error> {
    let request_id = request_id.into();
    let started = Instant::now();
    let mut trace = TraceBundle {
        request_id: request_id.clone(),
        events: Vec::new(),
    };
    let mut per_stage_s = Vec::new();

    let remaining = |started: Instant| config.timeouts.total.saturating_sub(started.elapsed());

    macro_rules! bail_on_deadline {
        () => {
            if started.elapsed() >= config.timeouts.total {
                let response = deadline_exceeded_response();
                trace = trace.push(finalize_trace_event(mode, 0.0, &response));
                append_trace(
                    trace_sink,
                    &request_id,
                    raw_question,
                    mode,
                    &response,
                    &Vec::new(),
                    &trace,
                    &per_stage_s,
                    started,
                )
                .await;
                return Ok(response);
            }
        };
    }

    // LISTEN — deterministic, CPU-bound, never suspends.
    let stage_start = Instant::now();
    let listen_out = listen::run_listen(raw_question, catalog);
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(TraceEvent {
        state: Stage::Listen,
        mode,
        language: "ar".to_string(),
        elapsed_s: *per_stage_s.last().unwrap(),
        counts: TraceCounts {
            entity_count: listen_out.entity_ids.len(),
            keyword_count: listen_out.keywords.len(),
            packet_count: 0,
            citation_count: 0,
        },
        not_found: None,
        confidence: None,
        issues: Vec::new(),
    });

    let entities: Vec<muhasibi_core::models::Entity> = listen_out
        .entity_ids
        .iter()
        .filter_map(|id| catalog.entity(id).cloned())
        .collect();

    // PURPOSE — model-assisted with a deterministic fallback.
    bail_on_deadline!();
    let stage_start = Instant::now();
    let model_timeout = config.timeouts.model.min(remaining(started));
    let purpose_out = purpose::run_purpose(raw_question, &entities, &listen_out.keywords, model, model_timeout).await;
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(Stage::Purpose, mode, *per_stage_s.last().unwrap(), TraceCounts::default()));

    // PATH — fully deterministic.
    let stage_start = Instant::now();
    let path_out = path::run_path(listen_out.entity_ids.len(), listen_out.intent);
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(Stage::Path, mode, *per_stage_s.last().unwrap(), TraceCounts::default()));

    // RETRIEVE — hybrid entity-exact/vector/graph sweep.
    bail_on_deadline!();
    let stage_start = Instant::now();
    let retrieve_params = RetrieveParams {
        entity_topk: config.retrieval_entity_topk,
        vector_topk: config.retrieval_vector_topk,
        graph_depth: config.retrieval_graph_depth,
        rewrite_threshold: config.retrieval_rewrite_threshold,
        cap: config.retrieval_cap,
        weights: config.retrieval_weights,
        retrieval_timeout: config.timeouts.retrieval.min(remaining(started)),
        model_timeout: config.timeouts.model.min(remaining(started)),
    };
    let retrieve_out = retrieve::run_retrieve(
        &listen_out.normalized_question,
        &listen_out.entity_ids,
        &entities,
        &listen_out.keywords,
        retrieval,
        model,
        &retrieve_params,
    )
    .await;
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(
        Stage::Retrieve,
        mode,
        *per_stage_s.last().unwrap(),
        TraceCounts {
            entity_count: listen_out.entity_ids.len(),
            keyword_count: listen_out.keywords.len(),
            packet_count: retrieve_out.packets.len(),
            citation_count: 0,
        },
    ));

    // ACCOUNT — the refusal-policy gate.
    let stage_start = Instant::now();
    let account_out = account::run(
        raw_question,
        &listen_out.keywords,
        &listen_out.entity_ids,
        &retrieve_out.packets,
        !listen_out.in_scope,
        config,
    );
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(Stage::Account, mode, *per_stage_s.last().unwrap(), TraceCounts::default()));

    let retrieved_chunk_ids: Vec<String> = retrieve_out.packets.iter().map(|p| p.chunk.id.clone()).collect();

    if !matches!(account_out.outcome, muhasibi_guard::AccountOutcome::Sufficient) {
        let abstain_reason = match account_out.outcome {
            muhasibi_guard::AccountOutcome::OutOfScopeRefuse { suggestion_ar } => suggestion_ar,
            _ => None,
        };
        let response = finalize::run_finalize(
            listen_out.normalized_question.clone(),
            purpose_out.goal_ar.clone(),
            purpose_out.constraints.clone(),
            path_out.plan.clone(),
            String::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            path_out.difficulty,
            true,
            Confidence::Low,
            account_out.reasons.clone(),
            abstain_reason,
            &retrieved_chunk_ids,
        );
        trace = trace.push(finalize_trace_event(mode, 0.0, &response));
        append_trace(trace_sink, &request_id, raw_question, mode, &response, &retrieved_chunk_ids, &trace, &per_stage_s, started)
            .await;
        return Ok(response);
    }

    // INTERPRET — structural or model-assisted answer.
    bail_on_deadline!();
    let stage_start = Instant::now();
    let is_definitional_intent = matches!(
        listen_out.intent,
        muhasibi_model::schema::IntentType::Definition | muhasibi_model::schema::IntentType::DefinitionWithEvidence
    );
    let model_timeout = config.timeouts.model.min(remaining(started));
    let interpret_out = interpret::run_interpret(
        raw_question,
        listen_out.intent,
        is_definitional_intent,
        &listen_out.entity_ids,
        &entities,
        &retrieve_out.packets,
        &retrieve_out.graph_hits,
        catalog,
        mode,
        model,
        model_timeout,
    )
    .await;
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(
        Stage::Interpret,
        mode,
        *per_stage_s.last().unwrap(),
        TraceCounts {
            entity_count: listen_out.entity_ids.len(),
            keyword_count: listen_out.keywords.len(),
            packet_count: retrieve_out.packets.len(),
            citation_count: interpret_out.citations.len(),
        },
    ));

    // REFLECT — optional annotation/reflow, citation set untouched (§4.7).
    let stage_start = Instant::now();
    let referenced_entity_names: Vec<String> = interpret_out
        .referenced_entities
        .iter()
        .filter_map(|id| catalog.entity(id))
        .map(|e| e.name_ar.clone())
        .collect();
    let reflect_out = reflect::run_reflect(&interpret_out.answer_ar, mode, interpret_out.not_found, &referenced_entity_names);
    per_stage_s.push(stage_start.elapsed().as_secs_f64());
    trace = trace.push(stage_event(Stage::Reflect, mode, *per_stage_s.last().unwrap(), TraceCounts::default()));

    // FINALIZE — schema/invariant enforcement (§4.8).
    let stage_start = Instant::now();
    let confidence = if interpret_out.not_found { Confidence::Low } else { interpret_out.confidence };
    let response = finalize::run_finalize(
        listen_out.normalized_question.clone(),
        purpose_out.goal_ar.clone(),
        purpose_out.constraints.clone(),
        path_out.plan.clone(),
        reflect_out.answer_ar,
        interpret_out.citations,
        dedup_entities(interpret_out.referenced_entities),
        interpret_out.argument_chains,
        path_out.difficulty,
        interpret_out.not_found,
        confidence,
        interpret_out.contract_reasons,
        None,
        &retrieved_chunk_ids,
    );
    let finalize_elapsed = stage_start.elapsed().as_secs_f64();
    per_stage_s.push(finalize_elapsed);
    trace = trace.push(finalize_trace_event(mode, finalize_elapsed, &response));

    append_trace(trace_sink, &request_id, raw_question, mode, &response, &retrieved_chunk_ids, &trace, &per_stage_s, started)
        .await;

    Ok(response)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use muhasibi_model::fixture::FixtureModelClient;
    use muhasibi_retrieval::fixture::FixtureRetrieval;
    use muhasibi_retrieval::fixtures::bundled_catalog;
    use proptest::prelude::*;
    use std::sync::Arc;

    const QUESTIONS: [&str; 6] = [
        "عرّف التزكية",
        "ما هي ركائز الحياة الطيبة الخمس؟",
        "ما هي القيم الجوهرية ضمن الركيزة الروحية؟",
        "قارن بين التزكية والمراقبة",
        "ما حكم صيام يوم الجمعة؟",
        "من هو مؤلف الإطار؟",
    ];

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

        /// Running any of the scenario questions through the whole
        /// pipeline twice always yields byte-for-byte identical responses:
        /// no hidden nondeterminism anywhere in the chain.
        #[test]
        fn pipeline_is_deterministic_across_scenario_questions(idx in 0..QUESTIONS.len()) {
            let question = QUESTIONS[idx];
            let catalog = bundled_catalog();
            let retrieval = FixtureRetrieval::new(Arc::new(bundled_catalog()));
            let model = FixtureModelClient;
            let config = Config::default();
            let sink = crate::trace_sink::NoopTraceSink;

            let once = pollster::block_on(run_pipeline(
                "p", question, Mode::Answer, &catalog, &retrieval, &model, &sink, &config,
            ))
            .unwrap();
            let twice = pollster::block_on(run_pipeline(
                "p", question, Mode::Answer, &catalog, &retrieval, &model, &sink, &config,
            ))
            .unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Invariant 5 holds for every scenario question: a response is
        /// never a non-refusal with empty citations, and never a refusal
        /// without a populated abstain reason.
        #[test]
        fn every_scenario_question_yields_a_well_formed_response(idx in 0..QUESTIONS.len()) {
            let question = QUESTIONS[idx];
            let catalog = bundled_catalog();
            let retrieval = FixtureRetrieval::new(Arc::new(bundled_catalog()));
            let model = FixtureModelClient;
            let config = Config::default();
            let sink = crate::trace_sink::NoopTraceSink;

            let response = pollster::block_on(run_pipeline(
                "p", question, Mode::Answer, &catalog, &retrieval, &model, &sink, &config,
            ))
            .unwrap();
            prop_assert!(response.is_well_formed_abstention());
            if !response.not_found {
                prop_assert!(!response.citations.is_empty());
            }
        }
    }
}

/// A refusal forced by the total-request budget (§5) rather than by
/// ACCOUNT's refusal policy: `contract_outcome=FAIL`, a single
/// `deadline_exceeded` reason, and the generic abstention shape (§7).
fn deadline_exceeded_response() -> FinalResponse {
    use muhasibi_core::models::{ContractOutcome, Difficulty};

    FinalResponse {
        listen_summary: String::new(),
        goal_ar: String::new(),
        constraints: muhasibi_core::models::MANDATORY_CONSTRAINTS
            .iter()
            .map(|c| (*c).to_string())
            .collect(),
        path_plan: Vec::new(),
        answer_ar: String::new(),
        citations: Vec::new(),
        referenced_entities: Vec::new(),
        argument_chains: Vec::new(),
        difficulty: Difficulty::Hard,
        not_found: true,
        confidence: Confidence::Low,
        contract_outcome: ContractOutcome::Fail,
        contract_reasons: vec!["deadline_exceeded".to_string()],
        abstain_reason: Some(
            "نعتذر، تجاوز الطلب المهلة الزمنية المحددة ولم يكتمل قبل انتهائها.".to_string(),
        ),
    }
}

fn dedup_entities(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn stage_event(stage: Stage, mode: Mode, elapsed_s: f64, counts: TraceCounts) -> TraceEvent {
    TraceEvent {
        state: stage,
        mode,
        language: "ar".to_string(),
        elapsed_s,
        counts,
        not_found: None,
        confidence: None,
        issues: Vec::new(),
    }
}

fn finalize_trace_event(mode: Mode, elapsed_s: f64, response: &FinalResponse) -> TraceEvent {
    TraceEvent {
        state: Stage::Finalize,
        mode,
        language: "ar".to_string(),
        elapsed_s,
        counts: TraceCounts {
            entity_count: response.referenced_entities.len(),
            keyword_count: 0,
            packet_count: 0,
            citation_count: response.citations.len(),
        },
        not_found: Some(response.not_found),
        confidence: Some(response.confidence),
        issues: response.contract_reasons.clone(),
    }
}

#[allow(clippy::too_many_arguments)]
async fn append_trace(
    trace_sink: &dyn TracePort,
    request_id: &str,
    raw_question: &str,
    mode: Mode,
    response: &FinalResponse,
    retrieved_chunk_ids: &[String],
    trace: &TraceBundle,
    per_stage_s: &[f64],
    started: Instant,
) {
    let record = RunRecord {
        request_id: request_id.to_string(),
        inputs: RequestInputs {
            question: raw_question.to_string(),
            language: "ar".to_string(),
            mode,
        },
        final_response: response.clone(),
        retrieval_trace: retrieved_chunk_ids.to_vec(),
        state_trace: trace.clone(),
        timings: StageTimings {
            per_stage_s: per_stage_s.to_vec(),
            total_s: started.elapsed().as_secs_f64(),
        },
    };
    // Trace persistence never fails the request; a sink outage is logged
    // by the caller's `TracePort` implementation, not surfaced here.
    let _ = trace_sink.append_run(record).await;
}
