//! `mhsb` — offline terminal driver for the Muhasibi pipeline.
//!
//! Drives the async [`muhasibi_pipeline::run_pipeline`] future with
//! `pollster::block_on` rather than a full `asupersync` runtime: the
//! pipeline itself never threads an `asupersync::Cx`/`Outcome` budget
//! (see `DESIGN.md`), so a one-shot terminal invocation only needs a
//! minimal executor to drive its handful of `timeout(...)` awaits.

#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    muhasibi_cli::run()
}
