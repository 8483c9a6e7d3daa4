//! Core types, configuration, and the trace schema for the Muḥāsibī
//! evidence-bound Arabic QA pipeline.
//!
//! This crate provides:
//! - Arabic normalization and keyword extraction shared by LISTEN, RETRIEVE, ACCOUNT
//! - The data model shared across all eight pipeline stages (`Entity`, `Chunk`, ...)
//! - Environment-driven configuration (`Config`)
//! - The error taxonomy (`Error`)
//! - The redacted trace schema (`TraceEvent`, `TraceBundle`)

#![forbid(unsafe_code)]

pub mod arabic;
pub mod config;
pub mod error;
pub mod models;
pub mod trace;

pub use config::Config;
pub use error::{Error, Result};
