//! The persistence surface: append-only run/feedback records.
//! FINALIZE's trace-append is the third and last suspension point of a
//! request (§5); cancellation before it completes means nothing is
//! persisted.

use async_trait::async_trait;
use thiserror::Error;

use muhasibi_core::models::{FinalResponse, Mode};
use muhasibi_core::trace::TraceBundle;

/// The question actually asked, recorded alongside its response.
#[derive(Debug, Clone)]
pub struct RequestInputs {
    pub question: String,
    pub language: String,
    pub mode: Mode,
}

/// Wall-clock duration of each stage that ran, in seconds; a request that
/// aborted early has a shorter vector, mirroring the trace bundle prefix.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    pub per_stage_s: Vec<f64>,
    pub total_s: f64,
}

/// One append-only run record.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub request_id: String,
    pub inputs: RequestInputs,
    pub final_response: FinalResponse,
    pub retrieval_trace: Vec<String>,
    pub state_trace: TraceBundle,
    pub timings: StageTimings,
}

/// User feedback on a past request.
#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub request_id: String,
    pub rating: i8,
    pub tags: Vec<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("trace sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only persistence for run and feedback records. Never a
/// read-modify-write surface ("Shared resources").
#[async_trait]
pub trait TracePort: Send + Sync {
    async fn append_run(&self, record: RunRecord) -> Result<(), TraceError>;
    async fn append_feedback(&self, feedback: FeedbackRecord) -> Result<(), TraceError>;
}

/// In-memory sink for tests and the offline CLI: records everything
/// appended, nothing more.
#[derive(Debug, Default)]
pub struct InMemoryTraceSink {
    runs: std::sync::Mutex<Vec<RunRecord>>,
    feedback: std::sync::Mutex<Vec<FeedbackRecord>>,
}

impl InMemoryTraceSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn runs(&self) -> Vec<RunRecord> {
        self.runs.lock().expect("trace sink mutex poisoned").clone()
    }

    #[must_use]
    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.feedback.lock().expect("trace sink mutex poisoned").clone()
    }
}

#[async_trait]
impl TracePort for InMemoryTraceSink {
    async fn append_run(&self, record: RunRecord) -> Result<(), TraceError> {
        self.runs.lock().expect("trace sink mutex poisoned").push(record);
        Ok(())
    }

    async fn append_feedback(&self, feedback: FeedbackRecord) -> Result<(), TraceError> {
        self.feedback.lock().expect("trace sink mutex poisoned").push(feedback);
        Ok(())
    }
}

/// Default sink for callers who don't need persistence (e.g. a one-shot
/// CLI invocation that only prints the response).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTraceSink;

#[async_trait]
impl TracePort for NoopTraceSink {
    async fn append_run(&self, _record: RunRecord) -> Result<(), TraceError> {
        Ok(())
    }

    async fn append_feedback(&self, _feedback: FeedbackRecord) -> Result<(), TraceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muhasibi_core::models::{ContractOutcome, Difficulty};

    fn response() -> FinalResponse {
        FinalResponse {
            listen_summary: "q".into(),
            goal_ar: "g".into(),
            constraints: vec![],
            path_plan: vec![],
            answer_ar: "a".into(),
            citations: vec![],
            referenced_entities: vec![],
            argument_chains: vec![],
            difficulty: Difficulty::Easy,
            not_found: true,
            confidence: muhasibi_core::models::Confidence::Low,
            contract_outcome: ContractOutcome::Fail,
            contract_reasons: vec![],
            abstain_reason: Some("r".into()),
        }
    }

    #[test]
    fn in_memory_sink_records_runs_and_feedback() {
        let sink = InMemoryTraceSink::new();
        let record = RunRecord {
            request_id: "r1".into(),
            inputs: RequestInputs {
                question: "q".into(),
                language: "ar".into(),
                mode: Mode::Answer,
            },
            final_response: response(),
            retrieval_trace: vec!["c1".into()],
            state_trace: TraceBundle::default(),
            timings: StageTimings::default(),
        };
        pollster::block_on(sink.append_run(record)).unwrap();
        assert_eq!(sink.runs().len(), 1);

        pollster::block_on(sink.append_feedback(FeedbackRecord {
            request_id: "r1".into(),
            rating: 1,
            tags: vec!["helpful".into()],
            comment: None,
        }))
        .unwrap();
        assert_eq!(sink.feedback().len(), 1);
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let sink = NoopTraceSink;
        let record = RunRecord {
            request_id: "r1".into(),
            inputs: RequestInputs {
                question: "q".into(),
                language: "ar".into(),
                mode: Mode::Answer,
            },
            final_response: response(),
            retrieval_trace: vec![],
            state_trace: TraceBundle::default(),
            timings: StageTimings::default(),
        };
        assert!(pollster::block_on(sink.append_run(record)).is_ok());
    }
}
