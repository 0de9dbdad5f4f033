use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Stage;

/// Fallback benchmark used when a stage has no configured entry.
const NEUTRAL_BENCHMARK_DAYS: i64 = 30;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights for the six relevance sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub industry: f64,
    pub persona: f64,
    pub stage: f64,
    pub history: f64,
    pub freshness: f64,
    pub performance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            industry: 0.25,
            persona: 0.20,
            stage: 0.20,
            history: 0.15,
            freshness: 0.10,
            performance: 0.10,
        }
    }
}

impl ScoringWeights {
    fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("industry", self.industry),
            ("persona", self.persona),
            ("stage", self.stage),
            ("history", self.history),
            ("freshness", self.freshness),
            ("performance", self.performance),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut sum = 0.0;
        for (name, w) in self.as_array() {
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(ConfigError::Validation(format!(
                    "scoring weight '{name}' must be in [0, 1], got {w}"
                )));
            }
            sum += w;
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Validation(format!(
                "scoring weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Partial-credit table for industries adjacent to the profile's industry.
///
/// Lookup is directional: `adjacency[profile_industry][item_tag]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustryAdjacency(pub BTreeMap<String, BTreeMap<String, f64>>);

impl IndustryAdjacency {
    /// Adjacency credit for an item industry tag given the profile's
    /// industry. Missing entries are simply no-adjacency (0.0).
    #[must_use]
    pub fn credit(&self, profile_industry: &str, item_tag: &str) -> f64 {
        self.0
            .get(profile_industry)
            .and_then(|row| row.get(item_tag))
            .copied()
            .unwrap_or(0.0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (industry, row) in &self.0 {
            for (tag, credit) in row {
                if !credit.is_finite() || !(0.0..=1.0).contains(credit) {
                    return Err(ConfigError::Validation(format!(
                        "industry adjacency '{industry}' -> '{tag}' must be in [0, 1], got {credit}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn default_table() -> Self {
        let mut table = BTreeMap::new();
        let mut banking = BTreeMap::new();
        banking.insert("due_diligence".to_string(), 0.6);
        banking.insert("staffing_recruitment".to_string(), 0.3);
        table.insert("b2b_banking".to_string(), banking);

        let mut staffing = BTreeMap::new();
        staffing.insert("b2b_travel".to_string(), 0.4);
        staffing.insert("due_diligence".to_string(), 0.3);
        table.insert("staffing_recruitment".to_string(), staffing);
        Self(table)
    }
}

/// Expected days a buyer spends in each stage before a stall is suspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageBenchmarks(pub BTreeMap<Stage, i64>);

impl Default for StageBenchmarks {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Stage::ProblemAwareness, 21);
        map.insert(Stage::SolutionExploration, 30);
        map.insert(Stage::VendorEvaluation, 45);
        map.insert(Stage::DecisionFinalization, 30);
        map.insert(Stage::PostPurchaseExpansion, 60);
        Self(map)
    }
}

impl StageBenchmarks {
    /// Benchmark duration for a stage. A missing entry degrades to a
    /// neutral 30 days and logs a warning rather than failing the call.
    #[must_use]
    pub fn expected_days(&self, stage: Stage) -> i64 {
        match self.0.get(&stage) {
            Some(days) => *days,
            None => {
                tracing::warn!(
                    stage = %stage,
                    fallback_days = NEUTRAL_BENCHMARK_DAYS,
                    "no benchmark configured for stage, using neutral default"
                );
                NEUTRAL_BENCHMARK_DAYS
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (stage, days) in &self.0 {
            if *days <= 0 {
                return Err(ConfigError::Validation(format!(
                    "stage benchmark for '{stage}' must be positive, got {days}"
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds governing anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThresholds {
    /// A stay longer than `multiplier x benchmark` is a progression stall.
    pub stall_multiplier: f64,
    /// Minimum confidence delta for a stage reversal to count as a
    /// timeline deviation.
    pub reversal_confidence_delta: f64,
    /// Consecutive confidence declines required to flag engagement decline.
    pub decline_consecutive: usize,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            stall_multiplier: 1.5,
            reversal_confidence_delta: 0.3,
            decline_consecutive: 2,
        }
    }
}

impl AnomalyThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.stall_multiplier.is_finite() || self.stall_multiplier <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "stall_multiplier must be positive, got {}",
                self.stall_multiplier
            )));
        }
        if !self.reversal_confidence_delta.is_finite()
            || !(0.0..=1.0).contains(&self.reversal_confidence_delta)
        {
            return Err(ConfigError::Validation(format!(
                "reversal_confidence_delta must be in [0, 1], got {}",
                self.reversal_confidence_delta
            )));
        }
        if self.decline_consecutive == 0 {
            return Err(ConfigError::Validation(
                "decline_consecutive must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-category signal weights and the floor probability for the stage
/// classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierWeights {
    pub content: f64,
    pub behavior: f64,
    pub sales: f64,
    /// Raw score assigned to a stage matched by no indicator, so the
    /// per-bundle probability total is never zero.
    pub floor_probability: f64,
}

impl Default for ClassifierWeights {
    fn default() -> Self {
        Self {
            content: 0.40,
            behavior: 0.35,
            sales: 0.25,
            floor_probability: 0.05,
        }
    }
}

impl ClassifierWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in [
            ("content", self.content),
            ("behavior", self.behavior),
            ("sales", self.sales),
        ] {
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(ConfigError::Validation(format!(
                    "classifier weight '{name}' must be in [0, 1], got {w}"
                )));
            }
        }
        let sum = self.content + self.behavior + self.sales;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Validation(format!(
                "classifier category weights must sum to 1.0, got {sum}"
            )));
        }
        if !self.floor_probability.is_finite() || self.floor_probability <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "floor_probability must be positive, got {}",
                self.floor_probability
            )));
        }
        Ok(())
    }
}

/// Full engine configuration, passed into components at construction.
///
/// Every section is optional in the YAML form; omitted sections take the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring_weights: ScoringWeights,
    /// Age at which freshness decays to zero.
    pub freshness_horizon_days: i64,
    pub industry_adjacency: IndustryAdjacency,
    pub stage_benchmarks: StageBenchmarks,
    pub anomaly_thresholds: AnomalyThresholds,
    pub classifier_weights: ClassifierWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            freshness_horizon_days: 180,
            industry_adjacency: IndustryAdjacency::default_table(),
            stage_benchmarks: StageBenchmarks::default(),
            anomaly_thresholds: AnomalyThresholds::default(),
            classifier_weights: ClassifierWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Validate all sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first offending
    /// entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring_weights.validate()?;
        if self.freshness_horizon_days <= 0 {
            return Err(ConfigError::Validation(format!(
                "freshness_horizon_days must be positive, got {}",
                self.freshness_horizon_days
            )));
        }
        self.industry_adjacency.validate()?;
        self.stage_benchmarks.validate()?;
        self.anomaly_thresholds.validate()?;
        self.classifier_weights.validate()?;
        Ok(())
    }
}

/// Load and validate engine configuration from a YAML file.
///
/// Omitted sections fall back to built-in defaults via serde defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: EngineConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}
