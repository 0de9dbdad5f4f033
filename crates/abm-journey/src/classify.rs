//! Stage inference from signal bundles.

use chrono::{DateTime, Utc};

use abm_core::{
    Anomaly, ClassifierWeights, ContentDepth, EngineConfig, SignalBundle, Stage, StageAssessment,
};

use crate::anomaly::AnomalyDetector;
use crate::error::JourneyError;
use crate::indicators::{StageIndicators, INDICATORS};

/// Multiplicative fit factors are confined to this band so a poor velocity
/// or depth fit dampens a stage's score without zeroing it.
const FIT_MIN: f64 = 0.5;
const FIT_MAX: f64 = 1.5;
const FIT_NEUTRAL: f64 = 1.0;

/// Infers journey stages from signal bundles.
///
/// Stateless per call: the assessment history only feeds
/// `time_in_stage_days` and anomaly detection, never the classification
/// itself, so any of the five stages can be returned regardless of the
/// previous one (skip-stage by construction).
#[derive(Debug, Clone)]
pub struct StageClassifier {
    weights: ClassifierWeights,
    detector: AnomalyDetector,
}

impl StageClassifier {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.classifier_weights.clone(),
            detector: AnomalyDetector::new(config),
        }
    }

    /// Normalized stage probabilities for a bundle, in journey order.
    ///
    /// Each stage's raw score counts matching signals weighted by category
    /// (content/behavior/sales), scaled by velocity- and depth-fit factors.
    /// Stages matched by no indicator receive the floor probability, so the
    /// total is always positive; the result sums to 1.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::InvalidInput`] when all three signal sets
    /// are empty or the velocity is not finite.
    pub fn stage_probabilities(
        &self,
        bundle: &SignalBundle,
    ) -> Result<[(Stage, f64); 5], JourneyError> {
        validate_bundle(bundle)?;

        let mut raw = [0.0_f64; 5];
        for (slot, profile) in raw.iter_mut().zip(&INDICATORS) {
            *slot = self.raw_stage_score(profile, bundle);
        }
        let total: f64 = raw.iter().sum();

        let mut probabilities = [(Stage::ProblemAwareness, 0.0); 5];
        for (i, (profile, score)) in INDICATORS.iter().zip(raw).enumerate() {
            probabilities[i] = (profile.stage, score / total);
        }
        Ok(probabilities)
    }

    /// Classify a bundle into a fresh [`StageAssessment`].
    ///
    /// `history` must be ordered oldest-first; only the trailing run of
    /// same-stage assessments influences `time_in_stage_days`.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::InvalidInput`] under the same conditions as
    /// [`StageClassifier::stage_probabilities`].
    pub fn classify(
        &self,
        bundle: &SignalBundle,
        history: &[StageAssessment],
        now: DateTime<Utc>,
    ) -> Result<StageAssessment, JourneyError> {
        let mut probabilities = self.stage_probabilities(bundle)?.to_vec();
        probabilities.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let (stage, confidence) = probabilities[0];
        let alternative_stages = probabilities[1..3].to_vec();
        let time_in_stage_days = time_in_stage(stage, history, now);

        tracing::debug!(
            stage = %stage,
            confidence,
            signals = bundle.signal_count(),
            "classified signal bundle"
        );

        Ok(StageAssessment {
            stage,
            confidence,
            alternative_stages,
            time_in_stage_days,
            assessed_at: now,
        })
    }

    /// Classify and run anomaly detection in one call — the composite
    /// operation consumed by the CRM-sync collaborator. Anomalies are
    /// returned alongside the assessment, never folded into it.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::InvalidInput`] under the same conditions as
    /// [`StageClassifier::classify`].
    pub fn classify_with_anomalies(
        &self,
        bundle: &SignalBundle,
        history: &[StageAssessment],
        now: DateTime<Utc>,
    ) -> Result<(StageAssessment, Vec<Anomaly>), JourneyError> {
        let assessment = self.classify(bundle, history, now)?;
        let anomalies = self.detector.detect(&assessment, history);
        Ok((assessment, anomalies))
    }

    /// Anomaly detection against a prior assessment history, separately
    /// callable from classification.
    #[must_use]
    pub fn detect_anomalies(
        &self,
        assessment: &StageAssessment,
        history: &[StageAssessment],
    ) -> Vec<Anomaly> {
        self.detector.detect(assessment, history)
    }

    /// Likelihood that the buyer is transitioning to the successor stage:
    /// the probability mass already on that stage among the alternatives.
    /// Terminal-stage assessments return 0.0.
    #[must_use]
    pub fn transition_likelihood(&self, assessment: &StageAssessment) -> f64 {
        let Some(successor) = assessment.stage.next() else {
            return 0.0;
        };
        assessment
            .alternative_stages
            .iter()
            .find(|(stage, _)| *stage == successor)
            .map_or(0.0, |(_, p)| *p)
    }

    fn raw_stage_score(&self, profile: &StageIndicators, bundle: &SignalBundle) -> f64 {
        let matched = count_matches(&bundle.content_signals, profile.content)
            * self.weights.content
            + count_matches(&bundle.behavior_signals, profile.behavior) * self.weights.behavior
            + count_matches(&bundle.sales_signals, profile.sales) * self.weights.sales;

        if matched == 0.0 {
            return self.weights.floor_probability;
        }
        matched
            * velocity_fit(bundle.engagement_velocity, profile.velocity_range)
            * depth_fit(bundle.content_depth, profile.expected_depth)
    }
}

fn count_matches(signals: &std::collections::BTreeSet<String>, expected: &[&str]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let count = expected
        .iter()
        .filter(|tag| signals.contains(**tag))
        .count() as f64;
    count
}

/// Velocity inside the stage's expected range fits best; within 50% beyond
/// either bound is neutral; anything further dampens.
fn velocity_fit(velocity: f64, (lo, hi): (f64, f64)) -> f64 {
    if (lo..=hi).contains(&velocity) {
        return FIT_MAX;
    }
    let span = hi - lo;
    let slack_lo = (lo - span * 0.5).max(0.0);
    let slack_hi = hi + span * 0.5;
    if (slack_lo..=slack_hi).contains(&velocity) {
        FIT_NEUTRAL
    } else {
        FIT_MIN
    }
}

/// Exact depth match fits best; one step off is neutral; two steps off
/// dampens.
fn depth_fit(observed: ContentDepth, expected: ContentDepth) -> f64 {
    let distance = depth_index(observed).abs_diff(depth_index(expected));
    match distance {
        0 => FIT_MAX,
        1 => FIT_NEUTRAL,
        _ => FIT_MIN,
    }
}

fn depth_index(depth: ContentDepth) -> usize {
    match depth {
        ContentDepth::Surface => 0,
        ContentDepth::Moderate => 1,
        ContentDepth::Comprehensive => 2,
    }
}

/// Days spent continuously at `stage`, measured from the oldest assessment
/// in the trailing same-stage run of `history`. Zero when the run is empty.
fn time_in_stage(stage: Stage, history: &[StageAssessment], now: DateTime<Utc>) -> i64 {
    let mut oldest = None;
    for assessment in history.iter().rev() {
        if assessment.stage != stage {
            break;
        }
        oldest = Some(assessment.assessed_at);
    }
    oldest.map_or(0, |start| (now - start).num_days().max(0))
}

fn validate_bundle(bundle: &SignalBundle) -> Result<(), JourneyError> {
    if bundle.is_empty() {
        return Err(JourneyError::InvalidInput(
            "cannot classify a bundle with zero signals in all categories".to_string(),
        ));
    }
    if !bundle.engagement_velocity.is_finite() {
        return Err(JourneyError::InvalidInput(format!(
            "engagement_velocity must be finite, got {}",
            bundle.engagement_velocity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;

    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn evaluation_bundle() -> SignalBundle {
        SignalBundle {
            content_signals: tags(&["case_study_view", "roi_calculator_use"]),
            behavior_signals: tags(&["pricing_page_visit", "demo_request"]),
            sales_signals: tags(&["demo_completed"]),
            engagement_velocity: 1.2,
            content_depth: ContentDepth::Comprehensive,
        }
    }

    fn awareness_bundle() -> SignalBundle {
        SignalBundle {
            content_signals: tags(&["educational_content", "blog_post_view"]),
            behavior_signals: tags(&["first_touch"]),
            sales_signals: BTreeSet::new(),
            engagement_velocity: 0.2,
            content_depth: ContentDepth::Surface,
        }
    }

    fn classifier() -> StageClassifier {
        StageClassifier::new(&EngineConfig::default())
    }

    fn assessment(stage: Stage, confidence: f64, days_ago: i64, now: DateTime<Utc>) -> StageAssessment {
        StageAssessment {
            stage,
            confidence,
            alternative_stages: vec![],
            time_in_stage_days: 0,
            assessed_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let probs = classifier().stage_probabilities(&evaluation_bundle()).unwrap();
        let sum: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-6, "probabilities sum to {sum}");
    }

    #[test]
    fn evaluation_signals_classify_as_vendor_evaluation() {
        let result = classifier()
            .classify(&evaluation_bundle(), &[], Utc::now())
            .unwrap();
        assert_eq!(result.stage, Stage::VendorEvaluation);
        assert!(result.confidence > 0.5, "confidence {}", result.confidence);
    }

    #[test]
    fn awareness_signals_classify_as_problem_awareness() {
        let result = classifier()
            .classify(&awareness_bundle(), &[], Utc::now())
            .unwrap();
        assert_eq!(result.stage, Stage::ProblemAwareness);
    }

    #[test]
    fn classify_returns_two_alternatives_descending() {
        let result = classifier()
            .classify(&evaluation_bundle(), &[], Utc::now())
            .unwrap();
        assert_eq!(result.alternative_stages.len(), 2);
        assert!(result.alternative_stages[0].1 >= result.alternative_stages[1].1);
        assert!(result.confidence >= result.alternative_stages[0].1);
    }

    #[test]
    fn classify_is_idempotent() {
        let classifier = classifier();
        let now = Utc::now();
        let history = vec![assessment(Stage::VendorEvaluation, 0.6, 10, now)];
        let first = classifier
            .classify(&evaluation_bundle(), &history, now)
            .unwrap();
        let second = classifier
            .classify(&evaluation_bundle(), &history, now)
            .unwrap();
        assert_eq!(first.stage, second.stage);
        assert!((first.confidence - second.confidence).abs() < f64::EPSILON);
        assert_eq!(first.time_in_stage_days, second.time_in_stage_days);
    }

    #[test]
    fn empty_bundle_is_invalid_input() {
        let empty = SignalBundle {
            content_signals: BTreeSet::new(),
            behavior_signals: BTreeSet::new(),
            sales_signals: BTreeSet::new(),
            engagement_velocity: 0.0,
            content_depth: ContentDepth::Surface,
        };
        let result = classifier().classify(&empty, &[], Utc::now());
        assert!(
            matches!(result, Err(JourneyError::InvalidInput(_))),
            "expected InvalidInput, got: {result:?}"
        );
    }

    #[test]
    fn non_finite_velocity_is_invalid_input() {
        let mut bundle = evaluation_bundle();
        bundle.engagement_velocity = f64::NAN;
        let result = classifier().classify(&bundle, &[], Utc::now());
        assert!(
            matches!(result, Err(JourneyError::InvalidInput(_))),
            "expected InvalidInput, got: {result:?}"
        );
    }

    #[test]
    fn unmatched_signals_still_yield_a_distribution() {
        // Tags no stage recognizes: every stage gets the floor, uniform.
        let bundle = SignalBundle {
            content_signals: tags(&["unrecognized_tag"]),
            behavior_signals: BTreeSet::new(),
            sales_signals: BTreeSet::new(),
            engagement_velocity: 0.5,
            content_depth: ContentDepth::Moderate,
        };
        let probs = classifier().stage_probabilities(&bundle).unwrap();
        for (stage, p) in probs {
            assert!((p - 0.2).abs() < 1e-9, "{stage} got {p}, expected 0.2");
        }
    }

    #[test]
    fn history_does_not_constrain_classification() {
        // A long awareness history cannot stop an evaluation-heavy bundle
        // from classifying as vendor evaluation (skip-stage allowed).
        let now = Utc::now();
        let history = vec![
            assessment(Stage::ProblemAwareness, 0.7, 40, now),
            assessment(Stage::ProblemAwareness, 0.7, 20, now),
        ];
        let result = classifier()
            .classify(&evaluation_bundle(), &history, now)
            .unwrap();
        assert_eq!(result.stage, Stage::VendorEvaluation);
    }

    #[test]
    fn time_in_stage_counts_trailing_run_only() {
        let now = Utc::now();
        let history = vec![
            assessment(Stage::VendorEvaluation, 0.5, 90, now),
            assessment(Stage::SolutionExploration, 0.5, 60, now),
            assessment(Stage::VendorEvaluation, 0.6, 30, now),
            assessment(Stage::VendorEvaluation, 0.6, 10, now),
        ];
        // The run is broken at 60 days ago, so only the trailing 30-day run
        // counts.
        assert_eq!(time_in_stage(Stage::VendorEvaluation, &history, now), 30);
        assert_eq!(time_in_stage(Stage::DecisionFinalization, &history, now), 0);
    }

    #[test]
    fn velocity_fit_bands() {
        let range = (0.8, 2.0);
        assert!((velocity_fit(1.0, range) - FIT_MAX).abs() < f64::EPSILON);
        assert!((velocity_fit(2.5, range) - FIT_NEUTRAL).abs() < f64::EPSILON);
        assert!((velocity_fit(10.0, range) - FIT_MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn depth_fit_by_distance() {
        assert!(
            (depth_fit(ContentDepth::Comprehensive, ContentDepth::Comprehensive) - FIT_MAX).abs()
                < f64::EPSILON
        );
        assert!(
            (depth_fit(ContentDepth::Moderate, ContentDepth::Comprehensive) - FIT_NEUTRAL).abs()
                < f64::EPSILON
        );
        assert!(
            (depth_fit(ContentDepth::Surface, ContentDepth::Comprehensive) - FIT_MIN).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn transition_likelihood_reads_successor_probability() {
        let classifier = classifier();
        let result = classifier
            .classify(&evaluation_bundle(), &[], Utc::now())
            .unwrap();
        let likelihood = classifier.transition_likelihood(&result);
        let expected = result
            .alternative_stages
            .iter()
            .find(|(s, _)| *s == Stage::DecisionFinalization)
            .map_or(0.0, |(_, p)| *p);
        assert!((likelihood - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn transition_likelihood_is_zero_for_terminal_stage() {
        let classifier = classifier();
        let terminal = StageAssessment {
            stage: Stage::PostPurchaseExpansion,
            confidence: 0.8,
            alternative_stages: vec![(Stage::DecisionFinalization, 0.1)],
            time_in_stage_days: 5,
            assessed_at: Utc::now(),
        };
        assert!(classifier.transition_likelihood(&terminal).abs() < f64::EPSILON);
    }
}
