//! Multi-factor content relevance scoring for ABM personalization.
//!
//! Scores catalog items against a buyer profile with a fixed weighted sum of
//! six sub-scores (industry, persona, journey stage, engagement history,
//! freshness, performance), ranks catalogs deterministically, and layers a
//! recommendation filter (recent-content exclusion, minimum relevance,
//! top-N) on top. Pure computation: no I/O, no shared state, safe to call
//! concurrently.

pub mod error;
pub mod rank;
pub mod score;

pub use error::ScorerError;
pub use rank::{Recommendation, RecommendOptions, ScoredContent};
pub use score::RelevanceScorer;
