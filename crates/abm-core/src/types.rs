use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A buyer's position in the journey toward (and beyond) a purchase decision.
///
/// The five stages form a strictly ordered sequence. `PostPurchaseExpansion`
/// is terminal: it has no forward transition and is re-classified repeatedly
/// as a steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ProblemAwareness,
    SolutionExploration,
    VendorEvaluation,
    DecisionFinalization,
    PostPurchaseExpansion,
}

impl Stage {
    /// All stages in journey order.
    pub const ALL: [Stage; 5] = [
        Stage::ProblemAwareness,
        Stage::SolutionExploration,
        Stage::VendorEvaluation,
        Stage::DecisionFinalization,
        Stage::PostPurchaseExpansion,
    ];

    /// Zero-based position in the ordered sequence.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Stage::ProblemAwareness => 0,
            Stage::SolutionExploration => 1,
            Stage::VendorEvaluation => 2,
            Stage::DecisionFinalization => 3,
            Stage::PostPurchaseExpansion => 4,
        }
    }

    /// Absolute distance between two stages in the ordered sequence.
    #[must_use]
    pub fn distance(self, other: Stage) -> usize {
        self.index().abs_diff(other.index())
    }

    /// The next stage in the journey, or `None` for the terminal stage.
    #[must_use]
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::ProblemAwareness => Some(Stage::SolutionExploration),
            Stage::SolutionExploration => Some(Stage::VendorEvaluation),
            Stage::VendorEvaluation => Some(Stage::DecisionFinalization),
            Stage::DecisionFinalization => Some(Stage::PostPurchaseExpansion),
            Stage::PostPurchaseExpansion => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::ProblemAwareness => "problem_awareness",
            Stage::SolutionExploration => "solution_exploration",
            Stage::VendorEvaluation => "vendor_evaluation",
            Stage::DecisionFinalization => "decision_finalization",
            Stage::PostPurchaseExpansion => "post_purchase_expansion",
        };
        write!(f, "{s}")
    }
}

/// Buyer role archetype targeted by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    CSuiteExecutive,
    TechnicalDirector,
    OperationsManager,
    FinancialDecisionMaker,
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Persona::CSuiteExecutive => "c_suite_executive",
            Persona::TechnicalDirector => "technical_director",
            Persona::OperationsManager => "operations_manager",
            Persona::FinancialDecisionMaker => "financial_decision_maker",
        };
        write!(f, "{s}")
    }
}

/// Format of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Whitepaper,
    CaseStudy,
    RoiCalculator,
    DemoVideo,
    Webinar,
    ImplementationGuide,
    ComparisonChart,
}

/// Rolling-window engagement aggregates for a content item, updated by the
/// external analytics collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub impressions: u64,
    /// Mean completion rate across consumers, in `[0, 1]`.
    pub avg_completion_rate: f64,
    pub avg_time_on_page_secs: f64,
}

/// A catalog entry supplied by the external content feed.
///
/// Immutable once published except `engagement_metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub content_type: ContentType,
    /// Industries this content targets, e.g. `"b2b_banking"`.
    pub industry_tags: BTreeSet<String>,
    pub target_personas: BTreeSet<Persona>,
    pub journey_stage: Stage,
    pub publish_date: DateTime<Utc>,
    pub engagement_metrics: EngagementMetrics,
    /// Topic tags used for engagement-history affinity, e.g. `"automation"`.
    pub topic_tags: BTreeSet<String>,
}

/// One entry in a profile's engagement history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub content_id: String,
    pub content_type: ContentType,
    pub topic_tags: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
    /// Fraction of the content consumed, in `[0, 1]`.
    pub completion_rate: f64,
    pub time_on_page_secs: f64,
}

impl Interaction {
    /// Whether this interaction counts as high-completion for affinity
    /// purposes (completion rate strictly above 0.7).
    #[must_use]
    pub fn is_high_completion(&self) -> bool {
        self.completion_rate > 0.7
    }
}

/// A target recipient, supplied by the external CRM feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub industry: String,
    pub persona: Persona,
    /// `None` when the buyer's stage is not yet known. Scoring treats the
    /// unknown stage as neutral rather than penalizing it.
    pub current_stage: Option<Stage>,
    /// Time-ordered, append-only by contract with the caller.
    pub engagement_history: Vec<Interaction>,
}

/// How deeply the buyer has been consuming content recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDepth {
    Surface,
    Moderate,
    Comprehensive,
}

/// Point-in-time evidence used for stage classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBundle {
    pub content_signals: BTreeSet<String>,
    pub behavior_signals: BTreeSet<String>,
    pub sales_signals: BTreeSet<String>,
    /// Interactions per day, derived by the engagement analytics layer.
    pub engagement_velocity: f64,
    pub content_depth: ContentDepth,
}

impl SignalBundle {
    /// Whether the bundle carries any evidence at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content_signals.is_empty()
            && self.behavior_signals.is_empty()
            && self.sales_signals.is_empty()
    }

    /// Total signal count across all three categories.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.content_signals.len() + self.behavior_signals.len() + self.sales_signals.len()
    }
}

/// Output of one classification call. Produced fresh each call, never
/// mutated; a new assessment supersedes the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageAssessment {
    pub stage: Stage,
    /// Normalized probability of `stage`, in `[0, 1]`.
    pub confidence: f64,
    /// The next two most likely stages, descending by probability.
    pub alternative_stages: Vec<(Stage, f64)>,
    /// Days the buyer has been continuously assessed at `stage`.
    pub time_in_stage_days: i64,
    pub assessed_at: DateTime<Utc>,
}

/// Kind of deviation from expected stage-progression behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ProgressionStall,
    EngagementDecline,
    TimelineDeviation,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnomalyKind::ProgressionStall => "progression_stall",
            AnomalyKind::EngagementDecline => "engagement_decline",
            AnomalyKind::TimelineDeviation => "timeline_deviation",
        };
        write!(f, "{s}")
    }
}

/// A detected stage-progression anomaly, returned alongside (never inside)
/// a [`StageAssessment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Severity in `[0, 1]`.
    pub severity: f64,
    pub detail: String,
}
