//! The Encore recommendation engine.
//!
//! Turns raw similarity data (artists, recordings and release-groups with
//! genre-overlap scores) plus a per-user feedback history into deduplicated,
//! ranked, natural-language-justified suggestions. An LLM completion
//! provider, when configured, refines the candidates; without one the engine
//! falls back to a deterministic score-ranked strategy.
//!
//! The engine holds no mutable state between calls — every operation is a
//! short sequence of store reads followed by at most one batched write
//! against any [`RecommendationStore`](encore_core::store::RecommendationStore).

pub mod error;
pub mod fallback;
pub mod prompt;

mod engine;

pub use engine::{GenerateRequest, Recommender};
pub use error::{Error, Result};
