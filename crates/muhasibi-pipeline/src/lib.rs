//! The eight-stage Muḥāsibī orchestrator: LISTEN → PURPOSE →
//! PATH → RETRIEVE → ACCOUNT → INTERPRET → REFLECT → FINALIZE, wired over
//! the [`muhasibi_retrieval`] and [`muhasibi_model`] ports and enforced by
//! [`muhasibi_guard`].
//!
//! Each stage returns a typed output record (`context` module);
//! [`run_pipeline`] is the orchestrator that calls the eight stage
//! functions in order and never lets a later stage's output leak
//! backward into an earlier one.

#![forbid(unsafe_code)]

pub mod context;
pub mod orchestrator;
pub mod stages;
pub mod trace_sink;

pub use context::{
    AccountStageOutput, InterpretOutput, ListenOutput, PathOutput, PurposeOutput, ReflectOutput,
    RetrieveOutput,
};
pub use orchestrator::run_pipeline;
pub use trace_sink::{
    FeedbackRecord, InMemoryTraceSink, NoopTraceSink, RequestInputs, RunRecord, StageTimings,
    TraceError, TracePort,
};
