//! The schema-constrained model interface: `purpose_path`,
//! `rewrite_query`, `classify_intent`, and `interpret` behind one
//! [`ModelPort`] trait, with a deterministic [`FixtureModelClient`]
//! standing in for the out-of-scope foundation-model provider.

#![forbid(unsafe_code)]

pub mod fixture;
pub mod port;
pub mod schema;

pub use fixture::FixtureModelClient;
pub use port::{ModelError, ModelPort};
pub use schema::{
    ClassifyIntentResponse, InterpretResponse, IntentType, PurposePathResponse, RewriteQueryResponse,
};
