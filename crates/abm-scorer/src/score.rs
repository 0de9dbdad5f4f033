//! The weighted multi-factor relevance model.

use chrono::{DateTime, Utc};

use abm_core::{ContentItem, EngineConfig, IndustryAdjacency, Profile, ScoringWeights};

use crate::error::ScorerError;

/// Sub-score used when a profile field needed by a factor is unknown.
///
/// Items are not penalized for incomplete profiles: an unknown field is
/// neutral, not zero. This is an explicit rule, not null-propagation.
const NEUTRAL_SUBSCORE: f64 = 0.5;

/// Scores content items against buyer profiles.
///
/// Construction clones the configuration it needs; all methods take `&self`
/// and have no side effects, so a single scorer can be shared across
/// threads freely.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
    adjacency: IndustryAdjacency,
    freshness_horizon_days: i64,
}

impl RelevanceScorer {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.scoring_weights.clone(),
            adjacency: config.industry_adjacency.clone(),
            freshness_horizon_days: config.freshness_horizon_days,
        }
    }

    /// Score one item against one profile, on the 0–100 relevance scale.
    ///
    /// `now` anchors the freshness decay; passing it explicitly keeps the
    /// computation deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::InvalidInput`] when the item or profile lacks
    /// required fields (empty `id`, empty `industry`) or carries a
    /// non-finite rate. No-match conditions are valid zero/neutral scores,
    /// never errors.
    pub fn score(
        &self,
        item: &ContentItem,
        profile: &Profile,
        now: DateTime<Utc>,
    ) -> Result<f64, ScorerError> {
        validate_item(item)?;
        validate_profile(profile)?;

        let w = &self.weights;
        let total = w.industry * self.industry_subscore(item, profile)
            + w.persona * persona_subscore(item, profile)
            + w.stage * stage_subscore(item, profile)
            + w.history * history_subscore(item, profile)
            + w.freshness * self.freshness_subscore(item, now)
            + w.performance * performance_subscore(item);

        Ok((total * 100.0).clamp(0.0, 100.0))
    }

    /// Exact tag membership scores 1.0; otherwise the best adjacency-table
    /// credit over the item's tags; otherwise 0.0.
    fn industry_subscore(&self, item: &ContentItem, profile: &Profile) -> f64 {
        if item.industry_tags.contains(&profile.industry) {
            return 1.0;
        }
        item.industry_tags
            .iter()
            .map(|tag| self.adjacency.credit(&profile.industry, tag))
            .fold(0.0, f64::max)
    }

    /// Linear decay from 1.0 (published now) to 0.0 at the horizon,
    /// floored at 0. Future-dated items clamp to 1.0.
    fn freshness_subscore(&self, item: &ContentItem, now: DateTime<Utc>) -> f64 {
        let age_days = (now - item.publish_date).num_days();
        if age_days <= 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let decayed = 1.0 - age_days as f64 / self.freshness_horizon_days as f64;
        decayed.max(0.0)
    }
}

fn persona_subscore(item: &ContentItem, profile: &Profile) -> f64 {
    if item.target_personas.contains(&profile.persona) {
        1.0
    } else {
        0.0
    }
}

/// Exact stage match scores 1.0, adjacent stage 0.5, anything further 0.0.
/// An unknown profile stage is neutral.
fn stage_subscore(item: &ContentItem, profile: &Profile) -> f64 {
    let Some(current) = profile.current_stage else {
        return NEUTRAL_SUBSCORE;
    };
    match item.journey_stage.distance(current) {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    }
}

/// Fraction of the profile's high-completion interactions that share the
/// item's content type or intersect its topic tags. Empty history scores
/// 0.0 — the neutral rule applies to missing profile fields, not to an
/// absent history.
fn history_subscore(item: &ContentItem, profile: &Profile) -> f64 {
    let high: Vec<_> = profile
        .engagement_history
        .iter()
        .filter(|i| i.is_high_completion())
        .collect();
    if high.is_empty() {
        return 0.0;
    }
    let matching = high
        .iter()
        .filter(|i| {
            i.content_type == item.content_type || !i.topic_tags.is_disjoint(&item.topic_tags)
        })
        .count();
    #[allow(clippy::cast_precision_loss)]
    let fraction = matching as f64 / high.len() as f64;
    fraction
}

fn performance_subscore(item: &ContentItem) -> f64 {
    item.engagement_metrics.avg_completion_rate.clamp(0.0, 1.0)
}

fn validate_item(item: &ContentItem) -> Result<(), ScorerError> {
    if item.id.trim().is_empty() {
        return Err(ScorerError::InvalidInput(
            "content item id must be non-empty".to_string(),
        ));
    }
    if !item.engagement_metrics.avg_completion_rate.is_finite() {
        return Err(ScorerError::InvalidInput(format!(
            "content item '{}' has non-finite avg_completion_rate",
            item.id
        )));
    }
    Ok(())
}

fn validate_profile(profile: &Profile) -> Result<(), ScorerError> {
    if profile.industry.trim().is_empty() {
        return Err(ScorerError::InvalidInput(
            "profile industry must be non-empty".to_string(),
        ));
    }
    for interaction in &profile.engagement_history {
        if !interaction.completion_rate.is_finite() {
            return Err(ScorerError::InvalidInput(format!(
                "interaction with '{}' has non-finite completion_rate",
                interaction.content_id
            )));
        }
    }
    Ok(())
}
