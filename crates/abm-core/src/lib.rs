//! Shared domain model and configuration for the ABM personalization engine.
//!
//! Defines the content/profile/signal types consumed by the scorer and
//! journey crates, the typed configuration tables (scoring weights, industry
//! adjacency, stage benchmarks, anomaly thresholds), and the typed trigger
//! predicate tree that replaces free-form trigger condition strings.

pub mod config;
pub mod error;
pub mod trigger;
pub mod types;

pub use config::{
    load_engine_config, AnomalyThresholds, ClassifierWeights, EngineConfig, IndustryAdjacency,
    ScoringWeights, StageBenchmarks,
};
pub use error::ConfigError;
pub use trigger::{Comparison, Metric, Trigger, TriggerContext};
pub use types::{
    Anomaly, AnomalyKind, ContentDepth, ContentItem, ContentType, EngagementMetrics, Interaction,
    Persona, Profile, SignalBundle, Stage, StageAssessment,
};
