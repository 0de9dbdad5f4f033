//! Typed trigger predicates.
//!
//! Replaces free-form condition strings like
//! `"content_completion_rate > 80% AND time_on_page > 3_minutes"` with a
//! composable boolean expression tree over named numeric and stage fields.
//! Evaluation never parses anything at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Stage;

/// Named numeric fields a trigger can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CompletionRate,
    TimeOnPageSecs,
    EngagementVelocity,
    EngagementScore,
    DaysSinceLastTouch,
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Equality within the given absolute tolerance.
    EqualWithin(f64),
}

impl Comparison {
    fn holds(self, observed: f64, value: f64) -> bool {
        match self {
            Comparison::GreaterThan => observed > value,
            Comparison::GreaterOrEqual => observed >= value,
            Comparison::LessThan => observed < value,
            Comparison::LessOrEqual => observed <= value,
            Comparison::EqualWithin(tolerance) => (observed - value).abs() <= tolerance,
        }
    }
}

/// A composable trigger condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// A named metric compared against a constant.
    Threshold {
        metric: Metric,
        cmp: Comparison,
        value: f64,
    },
    /// The context's current stage equals the given stage.
    StageIs(Stage),
    /// The context's current stage is at or past the given stage.
    StageAtLeast(Stage),
    /// All sub-triggers hold. Empty means always true.
    All(Vec<Trigger>),
    /// At least one sub-trigger holds. Empty means always false.
    Any(Vec<Trigger>),
    Not(Box<Trigger>),
}

/// The typed snapshot a trigger is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    metrics: BTreeMap<Metric, f64>,
    current_stage: Option<Stage>,
}

impl TriggerContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.metrics.insert(metric, value);
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.current_stage = Some(stage);
        self
    }

    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }
}

impl Trigger {
    /// Evaluate this trigger against a context.
    ///
    /// A `Threshold` over a metric absent from the context evaluates false:
    /// absence of evidence is not a match, and it is not an error either.
    /// Likewise the stage variants evaluate false when the context carries
    /// no stage.
    #[must_use]
    pub fn evaluate(&self, ctx: &TriggerContext) -> bool {
        match self {
            Trigger::Threshold { metric, cmp, value } => ctx
                .metric(*metric)
                .is_some_and(|observed| cmp.holds(observed, *value)),
            Trigger::StageIs(stage) => ctx.current_stage == Some(*stage),
            Trigger::StageAtLeast(stage) => ctx
                .current_stage
                .is_some_and(|current| current.index() >= stage.index()),
            Trigger::All(triggers) => triggers.iter().all(|t| t.evaluate(ctx)),
            Trigger::Any(triggers) => triggers.iter().any(|t| t.evaluate(ctx)),
            Trigger::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_intent_trigger() -> Trigger {
        // completion_rate > 0.8 AND time_on_page > 180s
        Trigger::All(vec![
            Trigger::Threshold {
                metric: Metric::CompletionRate,
                cmp: Comparison::GreaterThan,
                value: 0.8,
            },
            Trigger::Threshold {
                metric: Metric::TimeOnPageSecs,
                cmp: Comparison::GreaterThan,
                value: 180.0,
            },
        ])
    }

    #[test]
    fn threshold_holds_when_metric_exceeds_value() {
        let ctx = TriggerContext::new().with_metric(Metric::CompletionRate, 0.9);
        let trigger = Trigger::Threshold {
            metric: Metric::CompletionRate,
            cmp: Comparison::GreaterThan,
            value: 0.8,
        };
        assert!(trigger.evaluate(&ctx));
    }

    #[test]
    fn threshold_on_missing_metric_is_false() {
        let ctx = TriggerContext::new();
        let trigger = Trigger::Threshold {
            metric: Metric::EngagementScore,
            cmp: Comparison::GreaterOrEqual,
            value: 0.0,
        };
        assert!(!trigger.evaluate(&ctx));
    }

    #[test]
    fn conjunction_requires_both_conditions() {
        let trigger = high_intent_trigger();

        let both = TriggerContext::new()
            .with_metric(Metric::CompletionRate, 0.85)
            .with_metric(Metric::TimeOnPageSecs, 200.0);
        assert!(trigger.evaluate(&both));

        let one = TriggerContext::new()
            .with_metric(Metric::CompletionRate, 0.85)
            .with_metric(Metric::TimeOnPageSecs, 60.0);
        assert!(!trigger.evaluate(&one));
    }

    #[test]
    fn disjunction_needs_one_condition() {
        let trigger = Trigger::Any(vec![
            Trigger::StageIs(Stage::VendorEvaluation),
            Trigger::Threshold {
                metric: Metric::EngagementVelocity,
                cmp: Comparison::GreaterThan,
                value: 1.0,
            },
        ]);
        let ctx = TriggerContext::new().with_stage(Stage::VendorEvaluation);
        assert!(trigger.evaluate(&ctx));
    }

    #[test]
    fn empty_all_is_true_empty_any_is_false() {
        let ctx = TriggerContext::new();
        assert!(Trigger::All(vec![]).evaluate(&ctx));
        assert!(!Trigger::Any(vec![]).evaluate(&ctx));
    }

    #[test]
    fn negation_inverts() {
        let ctx = TriggerContext::new().with_stage(Stage::ProblemAwareness);
        let inner = Trigger::StageIs(Stage::ProblemAwareness);
        assert!(!Trigger::Not(Box::new(inner)).evaluate(&ctx));
    }

    #[test]
    fn stage_at_least_uses_journey_order() {
        let trigger = Trigger::StageAtLeast(Stage::VendorEvaluation);
        let early = TriggerContext::new().with_stage(Stage::SolutionExploration);
        let late = TriggerContext::new().with_stage(Stage::DecisionFinalization);
        assert!(!trigger.evaluate(&early));
        assert!(trigger.evaluate(&late));
    }

    #[test]
    fn stage_variants_false_without_stage() {
        let ctx = TriggerContext::new();
        assert!(!Trigger::StageIs(Stage::ProblemAwareness).evaluate(&ctx));
        assert!(!Trigger::StageAtLeast(Stage::ProblemAwareness).evaluate(&ctx));
    }

    #[test]
    fn equal_within_tolerance() {
        let ctx = TriggerContext::new().with_metric(Metric::EngagementScore, 49.999);
        let trigger = Trigger::Threshold {
            metric: Metric::EngagementScore,
            cmp: Comparison::EqualWithin(0.01),
            value: 50.0,
        };
        assert!(trigger.evaluate(&ctx));
    }

    #[test]
    fn trigger_round_trips_through_serde() {
        let trigger = high_intent_trigger();
        let json = serde_json::to_string(&trigger).unwrap();
        let back: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(trigger, back);
    }
}
