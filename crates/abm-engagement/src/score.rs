//! Composite engagement scoring.

use chrono::{DateTime, Duration, Utc};

use crate::error::EngagementError;
use crate::types::{EngagementEvent, EngagementEventKind, EngagementSummary, ScoreBreakdown, Trend};
use crate::velocity::engagement_velocity;

const RECENCY_WEIGHT: f64 = 0.20;
const FREQUENCY_WEIGHT: f64 = 0.25;
const QUALITY_WEIGHT: f64 = 0.25;
const DIVERSITY_WEIGHT: f64 = 0.15;
const PROGRESSION_WEIGHT: f64 = 0.15;

/// Duration at which a quality multiplier reaches 1.0; longer engagement
/// keeps multiplying up to 2.0.
const QUALITY_DURATION_UNIT_SECS: f64 = 300.0;

/// Relative change between window halves required to call a trend.
const TREND_CHANGE_THRESHOLD: f64 = 0.15;

/// Score a contact's engagement over the trailing `window_days`.
///
/// Events outside the window are ignored; an empty window yields a zeroed
/// summary with a stable trend rather than an error.
///
/// # Errors
///
/// Returns [`EngagementError::InvalidInput`] when an event carries a
/// non-finite duration, completion rate, or scroll depth.
pub fn score_contact(
    events: &[EngagementEvent],
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<EngagementSummary, EngagementError> {
    validate_events(events)?;

    let cutoff = now - Duration::days(window_days.max(1));
    let mut recent: Vec<EngagementEvent> = events
        .iter()
        .filter(|e| e.timestamp >= cutoff)
        .cloned()
        .collect();
    recent.sort_by_key(|e| e.timestamp);

    if recent.is_empty() {
        return Ok(EngagementSummary {
            score: 0.0,
            trend: Trend::Stable,
            velocity: 0.0,
            breakdown: ScoreBreakdown::default(),
            events_in_window: 0,
        });
    }

    let breakdown = ScoreBreakdown {
        recency: recency_score(&recent, now),
        frequency: frequency_score(recent.len(), window_days),
        quality: quality_score(&recent),
        diversity: diversity_score(&recent),
        progression: progression_score(&recent),
    };

    let score = (RECENCY_WEIGHT * breakdown.recency
        + FREQUENCY_WEIGHT * breakdown.frequency
        + QUALITY_WEIGHT * breakdown.quality
        + DIVERSITY_WEIGHT * breakdown.diversity
        + PROGRESSION_WEIGHT * breakdown.progression)
        .min(100.0);

    let summary = EngagementSummary {
        score,
        trend: trend(&recent),
        velocity: engagement_velocity(&recent),
        breakdown,
        events_in_window: recent.len(),
    };
    tracing::debug!(
        score = summary.score,
        events = summary.events_in_window,
        "scored engagement window"
    );
    Ok(summary)
}

/// Step decay on hours since the most recent event.
fn recency_score(recent: &[EngagementEvent], now: DateTime<Utc>) -> f64 {
    let latest = recent
        .iter()
        .map(|e| e.timestamp)
        .max()
        .unwrap_or(now);
    let hours_since = (now - latest).num_hours();
    match hours_since {
        i64::MIN..=24 => 100.0,
        25..=48 => 80.0,
        49..=72 => 60.0,
        73..=168 => 40.0,
        169..=336 => 20.0,
        _ => 10.0,
    }
}

/// Log-scaled events-per-day so bursts do not swamp the composite.
fn frequency_score(event_count: usize, window_days: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let events_per_day = event_count as f64 / window_days.max(1) as f64;
    (100.0 * (1.0 + events_per_day * 10.0).ln() / 11.0_f64.ln()).min(100.0)
}

/// Mean per-event quality: base kind weight times duration and metadata
/// multipliers.
fn quality_score(recent: &[EngagementEvent]) -> f64 {
    let mut total = 0.0;
    for event in recent {
        let mut quality = event.kind.base_weight();
        if let Some(duration) = event.duration_secs {
            quality *= (duration / QUALITY_DURATION_UNIT_SECS).min(2.0);
        }
        if event.completion_rate.is_some_and(|r| r > 0.8) {
            quality *= 1.3;
        }
        if event.scroll_depth.is_some_and(|d| d > 0.7) {
            quality *= 1.2;
        }
        if event.return_visit {
            quality *= 1.1;
        }
        total += quality;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = total / recent.len() as f64;
    mean.min(100.0)
}

/// Share of distinct event kinds observed, boosted for high-value kinds.
fn diversity_score(recent: &[EngagementEvent]) -> f64 {
    let kinds: std::collections::BTreeSet<EngagementEventKind> =
        recent.iter().map(|e| e.kind).collect();
    #[allow(clippy::cast_precision_loss)]
    let base = 100.0 * kinds.len() as f64 / EngagementEventKind::ALL.len() as f64;
    let high_value = kinds.iter().filter(|k| k.is_high_value()).count();
    #[allow(clippy::cast_precision_loss)]
    let boosted = base * (1.0 + high_value as f64 * 0.1);
    boosted.min(100.0)
}

/// Credit for climbing the engagement hierarchy over time.
fn progression_score(recent: &[EngagementEvent]) -> f64 {
    let mut total_climb = 0u32;
    let mut previous_level = 0u32;
    for event in recent {
        let level = event.kind.hierarchy_level();
        if level > previous_level {
            total_climb += level - previous_level;
            previous_level = level;
        }
    }
    let max_level = EngagementEventKind::PricingInquiry.hierarchy_level();
    (100.0 * f64::from(total_climb) / f64::from(max_level)).min(100.0)
}

/// Compare mean event weight across the window's two halves.
fn trend(recent: &[EngagementEvent]) -> Trend {
    if recent.len() < 3 {
        return Trend::Stable;
    }
    let mid = recent.len() / 2;
    let mean_weight = |events: &[EngagementEvent]| -> f64 {
        if events.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = events.iter().map(|e| e.kind.base_weight()).sum::<f64>() / events.len() as f64;
        mean
    };
    let first = mean_weight(&recent[..mid]);
    let second = mean_weight(&recent[mid..]);
    let relative_change = (second - first) / first.max(1.0);

    if relative_change > TREND_CHANGE_THRESHOLD {
        Trend::Increasing
    } else if relative_change < -TREND_CHANGE_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn validate_events(events: &[EngagementEvent]) -> Result<(), EngagementError> {
    for event in events {
        for (name, value) in [
            ("duration_secs", event.duration_secs),
            ("completion_rate", event.completion_rate),
            ("scroll_depth", event.scroll_depth),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(EngagementError::InvalidInput(format!(
                    "event for '{}' has non-finite {name}",
                    event.contact_id
                )));
            }
        }
    }
    Ok(())
}
