//! Stage-progression anomaly detection.
//!
//! Distinct from classification: the detector reads a fresh assessment and
//! the prior history and reports deviations (stalls, engagement decline,
//! timeline reversals) without ever altering the assessment itself.

use abm_core::{Anomaly, AnomalyKind, AnomalyThresholds, EngineConfig, StageAssessment, StageBenchmarks};

/// Detects deviations from expected stage-progression behavior.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    benchmarks: StageBenchmarks,
    thresholds: AnomalyThresholds,
}

impl AnomalyDetector {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            benchmarks: config.stage_benchmarks.clone(),
            thresholds: config.anomaly_thresholds.clone(),
        }
    }

    /// Run all anomaly checks against an assessment and its history.
    ///
    /// `history` is ordered oldest-first and does not include `assessment`.
    /// At most one anomaly of each kind is reported per call, in a fixed
    /// order (stall, decline, deviation) for deterministic output.
    #[must_use]
    pub fn detect(&self, assessment: &StageAssessment, history: &[StageAssessment]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        if let Some(a) = self.progression_stall(assessment) {
            anomalies.push(a);
        }
        if let Some(a) = self.engagement_decline(assessment, history) {
            anomalies.push(a);
        }
        if let Some(a) = self.timeline_deviation(assessment, history) {
            anomalies.push(a);
        }
        anomalies
    }

    /// The buyer has sat in the assessed stage for longer than
    /// `stall_multiplier x benchmark`. Severity scales with the overshoot
    /// beyond the threshold, clamped to 1.
    fn progression_stall(&self, assessment: &StageAssessment) -> Option<Anomaly> {
        let benchmark = self.benchmarks.expected_days(assessment.stage);
        #[allow(clippy::cast_precision_loss)]
        let threshold = self.thresholds.stall_multiplier * benchmark as f64;
        #[allow(clippy::cast_precision_loss)]
        let days = assessment.time_in_stage_days as f64;
        if days <= threshold {
            return None;
        }
        let severity = (days / threshold - 1.0).clamp(0.0, 1.0);
        Some(Anomaly {
            kind: AnomalyKind::ProgressionStall,
            severity,
            detail: format!(
                "{} days in {} against a {benchmark}-day benchmark",
                assessment.time_in_stage_days, assessment.stage
            ),
        })
    }

    /// Confidence for the dominant stage has decreased on
    /// `decline_consecutive` or more consecutive calls while that stage
    /// stayed dominant. Severity is the total confidence drop.
    fn engagement_decline(
        &self,
        assessment: &StageAssessment,
        history: &[StageAssessment],
    ) -> Option<Anomaly> {
        let mut run: Vec<f64> = history
            .iter()
            .rev()
            .take_while(|a| a.stage == assessment.stage)
            .map(|a| a.confidence)
            .collect();
        run.reverse();
        run.push(assessment.confidence);

        let mut declines = 0;
        for pair in run.windows(2).rev() {
            if pair[1] < pair[0] {
                declines += 1;
            } else {
                break;
            }
        }
        if declines < self.thresholds.decline_consecutive {
            return None;
        }
        let drop = run[run.len() - 1 - declines] - run[run.len() - 1];
        Some(Anomaly {
            kind: AnomalyKind::EngagementDecline,
            severity: drop.clamp(0.0, 1.0),
            detail: format!(
                "confidence for {} declined over {declines} consecutive assessments",
                assessment.stage
            ),
        })
    }

    /// The assessment reverses to an earlier stage than the immediately
    /// prior one, with a confidence delta above the threshold. Severity is
    /// proportional to the delta.
    fn timeline_deviation(
        &self,
        assessment: &StageAssessment,
        history: &[StageAssessment],
    ) -> Option<Anomaly> {
        let prior = history.last()?;
        if assessment.stage.index() >= prior.stage.index() {
            return None;
        }
        let delta = (prior.confidence - assessment.confidence).abs();
        if delta <= self.thresholds.reversal_confidence_delta {
            return None;
        }
        Some(Anomaly {
            kind: AnomalyKind::TimelineDeviation,
            severity: delta.clamp(0.0, 1.0),
            detail: format!(
                "stage reversed from {} to {} with confidence delta {delta:.2}",
                prior.stage, assessment.stage
            ),
        })
    }
}
