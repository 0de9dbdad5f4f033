//! Deterministic ranking and the recommendation layer on top of it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use abm_core::{ContentItem, Profile};

use crate::error::ScorerError;
use crate::score::RelevanceScorer;

/// A catalog item paired with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredContent {
    pub item: ContentItem,
    pub score: f64,
}

/// Knobs for [`RelevanceScorer::recommend`].
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    /// Maximum recommendations returned.
    pub limit: usize,
    /// Minimum relevance on the 0–100 scale.
    pub min_score: f64,
    /// Items the profile consumed within this many days are excluded.
    pub exclude_recent_days: i64,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            limit: 3,
            min_score: 30.0,
            exclude_recent_days: 7,
        }
    }
}

/// A ranked recommendation handed to the delivery collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub content_id: String,
    pub title: String,
    pub score: f64,
    /// Human-readable reasons this item was selected.
    pub reasons: Vec<String>,
}

impl RelevanceScorer {
    /// Rank a catalog against a profile, descending by score.
    ///
    /// Ties break by more recent `publish_date`, then by lexicographically
    /// lower `id`, so identical inputs always yield identical orderings.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::InvalidInput`] if any item or the profile
    /// fails validation; the catalog is scored all-or-nothing.
    pub fn rank(
        &self,
        items: &[ContentItem],
        profile: &Profile,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredContent>, ScorerError> {
        let mut scored = Vec::with_capacity(items.len());
        for item in items {
            let score = self.score(item, profile, now)?;
            scored.push(ScoredContent {
                item: item.clone(),
                score,
            });
        }
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.item.publish_date.cmp(&a.item.publish_date))
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        Ok(scored)
    }

    /// Rank, then filter to actionable recommendations: drop items the
    /// profile consumed within `opts.exclude_recent_days`, drop scores
    /// below `opts.min_score`, keep the top `opts.limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::InvalidInput`] under the same conditions as
    /// [`RelevanceScorer::rank`].
    pub fn recommend(
        &self,
        items: &[ContentItem],
        profile: &Profile,
        now: DateTime<Utc>,
        opts: &RecommendOptions,
    ) -> Result<Vec<Recommendation>, ScorerError> {
        let cutoff = now - Duration::days(opts.exclude_recent_days);
        let fresh: Vec<ContentItem> = items
            .iter()
            .filter(|item| {
                !profile
                    .engagement_history
                    .iter()
                    .any(|i| i.content_id == item.id && i.timestamp > cutoff)
            })
            .cloned()
            .collect();

        let ranked = self.rank(&fresh, profile, now)?;
        let recommendations = ranked
            .into_iter()
            .filter(|sc| sc.score >= opts.min_score)
            .take(opts.limit)
            .map(|sc| {
                let reasons = selection_reasons(&sc.item, profile, sc.score);
                Recommendation {
                    content_id: sc.item.id,
                    title: sc.item.title,
                    score: sc.score,
                    reasons,
                }
            })
            .collect::<Vec<Recommendation>>();
        tracing::debug!(
            candidates = items.len(),
            recommended = recommendations.len(),
            "built recommendations"
        );
        Ok(recommendations)
    }
}

fn selection_reasons(item: &ContentItem, profile: &Profile, score: f64) -> Vec<String> {
    let mut reasons = Vec::new();
    if item.industry_tags.contains(&profile.industry) {
        reasons.push(format!("industry-specific content for {}", profile.industry));
    }
    if item.target_personas.contains(&profile.persona) {
        reasons.push(format!("tailored for {} role", profile.persona));
    }
    if profile.current_stage == Some(item.journey_stage) {
        reasons.push(format!("matches {} stage", item.journey_stage));
    }
    if score > 80.0 {
        reasons.push("high relevance match".to_string());
    } else if score > 60.0 {
        reasons.push("good relevance match".to_string());
    }
    reasons
}
