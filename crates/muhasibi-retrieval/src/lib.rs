//! Hybrid retrieval for the RETRIEVE stage: entity-exact
//! lookup, vector-nearest search, and graph-expand traversal behind one
//! [`RetrievalPort`] trait, plus the deterministic merge & rank that
//! fuses their output into the evidence packets ACCOUNT consumes.
//!
//! The real document/vector/graph store is out of scope (spec Non-goals);
//! [`FixtureRetrieval`] stands in for it over an in-memory [`Catalog`].

#![forbid(unsafe_code)]

pub mod catalog;
pub mod entity_resolver;
pub mod fixture;
pub mod fixtures;
pub mod fusion;
pub mod port;

pub use catalog::Catalog;
pub use entity_resolver::{resolve_entities, EntityMatch};
pub use fixture::FixtureRetrieval;
pub use fusion::merge_and_rank;
pub use port::{GraphHit, RetrievalError, RetrievalPort, ScoredChunk, Span};
