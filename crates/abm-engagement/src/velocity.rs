//! Engagement velocity: the slope of daily event counts.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::types::EngagementEvent;

/// Least-squares slope of events-per-day over the days the contact was
/// active, in events/day per day. Positive means accelerating engagement.
///
/// Returns `0.0` with fewer than two distinct active days (no trend can be
/// established) or when the regression is degenerate.
#[must_use]
pub fn engagement_velocity(events: &[EngagementEvent]) -> f64 {
    let mut daily_counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for event in events {
        *daily_counts.entry(event.timestamp.date_naive()).or_insert(0) += 1;
    }
    if daily_counts.len() < 2 {
        return 0.0;
    }

    let points: Vec<(f64, f64)> = daily_counts
        .iter()
        .map(|(date, count)| (f64::from(date.num_days_from_ce()), f64::from(*count)))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}
