use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of engagement event, ordered roughly by purchase intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementEventKind {
    EmailOpen,
    EmailClick,
    WebsiteVisit,
    ContentDownload,
    SocialShare,
    WebinarAttendance,
    DemoRequest,
    PricingInquiry,
}

impl EngagementEventKind {
    /// All kinds, used for diversity scoring.
    pub const ALL: [EngagementEventKind; 8] = [
        EngagementEventKind::EmailOpen,
        EngagementEventKind::EmailClick,
        EngagementEventKind::WebsiteVisit,
        EngagementEventKind::ContentDownload,
        EngagementEventKind::SocialShare,
        EngagementEventKind::WebinarAttendance,
        EngagementEventKind::DemoRequest,
        EngagementEventKind::PricingInquiry,
    ];

    /// Base quality weight of one event of this kind.
    #[must_use]
    pub fn base_weight(self) -> f64 {
        match self {
            EngagementEventKind::EmailOpen => 5.0,
            EngagementEventKind::EmailClick => 10.0,
            EngagementEventKind::WebsiteVisit => 15.0,
            EngagementEventKind::SocialShare => 20.0,
            EngagementEventKind::ContentDownload => 25.0,
            EngagementEventKind::WebinarAttendance => 30.0,
            EngagementEventKind::PricingInquiry => 45.0,
            EngagementEventKind::DemoRequest => 50.0,
        }
    }

    /// Position in the engagement hierarchy; climbing it signals
    /// progression toward a purchase.
    #[must_use]
    pub fn hierarchy_level(self) -> u32 {
        match self {
            EngagementEventKind::EmailOpen => 1,
            EngagementEventKind::EmailClick => 2,
            EngagementEventKind::WebsiteVisit => 3,
            EngagementEventKind::ContentDownload | EngagementEventKind::SocialShare => 4,
            EngagementEventKind::WebinarAttendance => 5,
            EngagementEventKind::DemoRequest => 6,
            EngagementEventKind::PricingInquiry => 7,
        }
    }

    /// High-value kinds earn a diversity bonus.
    #[must_use]
    pub fn is_high_value(self) -> bool {
        matches!(
            self,
            EngagementEventKind::DemoRequest
                | EngagementEventKind::PricingInquiry
                | EngagementEventKind::ContentDownload
        )
    }
}

/// One observed engagement event for a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub contact_id: String,
    pub kind: EngagementEventKind,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: Option<f64>,
    /// Fraction of the content consumed, in `[0, 1]`, when known.
    pub completion_rate: Option<f64>,
    /// Fraction of the page scrolled, in `[0, 1]`, when known.
    pub scroll_depth: Option<f64>,
    pub return_visit: bool,
}

/// Direction engagement is moving over the scored window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Per-component sub-scores behind a composite engagement score, each on
/// the 0–100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub frequency: f64,
    pub quality: f64,
    pub diversity: f64,
    pub progression: f64,
}

/// Composite engagement result for one contact over a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSummary {
    /// Weighted composite in `[0, 100]`.
    pub score: f64,
    pub trend: Trend,
    /// Interactions per day, slope-based; feeds
    /// `SignalBundle::engagement_velocity`.
    pub velocity: f64,
    pub breakdown: ScoreBreakdown,
    pub events_in_window: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_rise_with_intent() {
        assert!(
            EngagementEventKind::DemoRequest.base_weight()
                > EngagementEventKind::EmailOpen.base_weight()
        );
    }

    #[test]
    fn hierarchy_is_monotone_in_all_order_except_ties() {
        let levels: Vec<u32> = EngagementEventKind::ALL
            .iter()
            .map(|k| k.hierarchy_level())
            .collect();
        for pair in levels.windows(2) {
            assert!(pair[1] >= pair[0], "hierarchy dips: {levels:?}");
        }
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&EngagementEventKind::DemoRequest).unwrap();
        assert_eq!(json, "\"demo_request\"");
    }
}
