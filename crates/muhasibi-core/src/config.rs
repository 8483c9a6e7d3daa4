//! Runtime configuration for the Muḥāsibī pipeline.
//!
//! Loaded from `MUHASIBI_*` environment variables, following the same
//! per-field `env::var(...).ok().and_then(parse).unwrap_or(default)`
//! pattern common to typed application configs. Every tunable the
//! pipeline's stages read has a field here; there is no
//! other process-global mutable state.

use std::env;
use std::time::Duration;

/// Weights applied to each retrieval source during RETRIEVE's merge & rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalWeights {
    pub entity: f64,
    pub vector: f64,
    pub graph: f64,
}

impl Default for RetrievalWeights {
    fn default() -> Self {
        Self {
            entity: 3.0,
            vector: 1.0,
            graph: 1.0,
        }
    }
}

/// Timeout budget for a request's external calls and its overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub retrieval: Duration,
    pub model: Duration,
    pub total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            retrieval: Duration::from_secs(2),
            model: Duration::from_secs(20),
            total: Duration::from_secs(30),
        }
    }
}

/// ACCOUNT's fiqh-ruling and worship-term marker sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeMarkers {
    pub fiqh_markers: Vec<String>,
    pub worship_terms: Vec<String>,
}

impl Default for ScopeMarkers {
    fn default() -> Self {
        Self {
            fiqh_markers: [
                "ما حكم",
                "حكم",
                "يجوز",
                "لا يجوز",
                "حلال",
                "حرام",
                "مباح",
                "مكروه",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            worship_terms: ["صيام", "صلاة", "زكاة", "حج"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Top-level pipeline configuration. Immutable once built for a process;
/// requests never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub retrieval_entity_topk: usize,
    pub retrieval_vector_topk: usize,
    pub retrieval_graph_depth: u32,
    pub retrieval_rewrite_threshold: usize,
    pub retrieval_cap: usize,
    pub retrieval_weights: RetrievalWeights,
    pub account_min_keyword_match: usize,
    pub scope_markers: ScopeMarkers,
    pub timeouts: Timeouts,
    pub default_mode: crate::models::Mode,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retrieval_entity_topk: 5,
            retrieval_vector_topk: 10,
            retrieval_graph_depth: 2,
            retrieval_rewrite_threshold: 3,
            retrieval_cap: 40,
            retrieval_weights: RetrievalWeights::default(),
            account_min_keyword_match: 1,
            scope_markers: ScopeMarkers::default(),
            timeouts: Timeouts::default(),
            default_mode: crate::models::Mode::Answer,
            log_level: "info".to_string(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parsed::<u64>(key).map(Duration::from_secs)
}

/// A comma-separated env var, split and trimmed into a token list; unset
/// or empty falls through to the caller's default.
fn env_token_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let tokens: Vec<String> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

fn env_mode(key: &str) -> Option<crate::models::Mode> {
    use crate::models::Mode;
    match env::var(key).ok()?.as_str() {
        "answer" => Some(Mode::Answer),
        "debate" => Some(Mode::Debate),
        "socratic" => Some(Mode::Socratic),
        "judge" => Some(Mode::Judge),
        "natural_chat" => Some(Mode::NaturalChat),
        _ => None,
    }
}

impl Config {
    /// Build configuration from the process environment, falling back to
    /// the documented defaults for any unset or unparsable variable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            retrieval_entity_topk: env_parsed("MUHASIBI_RETRIEVAL_ENTITY_TOPK")
                .unwrap_or(defaults.retrieval_entity_topk),
            retrieval_vector_topk: env_parsed("MUHASIBI_RETRIEVAL_VECTOR_TOPK")
                .unwrap_or(defaults.retrieval_vector_topk),
            retrieval_graph_depth: env_parsed("MUHASIBI_RETRIEVAL_GRAPH_DEPTH")
                .unwrap_or(defaults.retrieval_graph_depth),
            retrieval_rewrite_threshold: env_parsed("MUHASIBI_RETRIEVAL_REWRITE_THRESHOLD")
                .unwrap_or(defaults.retrieval_rewrite_threshold),
            retrieval_cap: env_parsed("MUHASIBI_RETRIEVAL_CAP").unwrap_or(defaults.retrieval_cap),
            retrieval_weights: RetrievalWeights {
                entity: env_parsed("MUHASIBI_RETRIEVAL_WEIGHT_ENTITY")
                    .unwrap_or(defaults.retrieval_weights.entity),
                vector: env_parsed("MUHASIBI_RETRIEVAL_WEIGHT_VECTOR")
                    .unwrap_or(defaults.retrieval_weights.vector),
                graph: env_parsed("MUHASIBI_RETRIEVAL_WEIGHT_GRAPH")
                    .unwrap_or(defaults.retrieval_weights.graph),
            },
            account_min_keyword_match: env_parsed("MUHASIBI_ACCOUNT_MIN_KEYWORD_MATCH")
                .unwrap_or(defaults.account_min_keyword_match),
            scope_markers: ScopeMarkers {
                fiqh_markers: env_token_list("MUHASIBI_ACCOUNT_FIQH_MARKERS")
                    .unwrap_or_else(|| defaults.scope_markers.fiqh_markers.clone()),
                worship_terms: env_token_list("MUHASIBI_ACCOUNT_WORSHIP_TERMS")
                    .unwrap_or_else(|| defaults.scope_markers.worship_terms.clone()),
            },
            timeouts: Timeouts {
                retrieval: env_secs("MUHASIBI_TIMEOUT_RETRIEVAL_SECS")
                    .unwrap_or(defaults.timeouts.retrieval),
                model: env_secs("MUHASIBI_TIMEOUT_MODEL_SECS").unwrap_or(defaults.timeouts.model),
                total: env_secs("MUHASIBI_TIMEOUT_TOTAL_SECS").unwrap_or(defaults.timeouts.total),
            },
            default_mode: env_mode("MUHASIBI_DEFAULT_MODE").unwrap_or(defaults.default_mode),
            log_level: env::var("MUHASIBI_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
