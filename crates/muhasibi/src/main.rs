//! Muḥāsibī — evidence-only Arabic question-answering engine for a
//! closed wellbeing knowledge framework.
//!
//! This binary is a thin entry point: all of the pipeline logic lives in
//! [`muhasibi_pipeline`], the fixture collaborators and terminal
//! rendering live in [`muhasibi_cli`]. A production deployment replaces
//! [`muhasibi_cli::Engine`]'s bundled [`muhasibi_retrieval::FixtureRetrieval`]
//! and [`muhasibi_model::FixtureModelClient`] with the real relational/
//! vector store and foundation-model provider behind the same
//! [`muhasibi_retrieval::port::RetrievalPort`] and
//! [`muhasibi_model::port::ModelPort`] traits; nothing else in
//! the pipeline changes.

#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    muhasibi_cli::run()
}
