//! Assessment orchestration
//!
//! This module provides the public API for Mindwell: a one-shot `evaluate`
//! function for callers that only need the score, and a stateful
//! `StressMonitor` that validates input and produces full reports.

use chrono::{DateTime, Utc};

use crate::error::EvalError;
use crate::evaluator::StressEvaluator;
use crate::report::ReportEncoder;
use crate::types::{Assessment, AssessmentReport, Reading, ReadingSource};

/// Evaluate a reading into a score, band, and recommendation.
///
/// Pure and total over finite inputs; callers that accept untrusted values
/// should run [`Reading::validate`] first (or use [`StressMonitor`], which
/// does).
///
/// # Example
/// ```
/// use mindwell::{evaluate, Reading};
///
/// let assessment = evaluate(&Reading::new(60.0, 7.0, 40.0, 100.0));
/// assert_eq!(assessment.score, 0);
/// ```
pub fn evaluate(reading: &Reading) -> Assessment {
    StressEvaluator::evaluate(reading)
}

/// Stateful monitor producing presentation-layer reports.
///
/// Holds the report encoder so every report from one desktop session shares
/// an instance id.
pub struct StressMonitor {
    encoder: ReportEncoder,
}

impl Default for StressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StressMonitor {
    /// Create a new monitor with a fresh encoder instance id
    pub fn new() -> Self {
        Self {
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a monitor with a specific encoder instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            encoder: ReportEncoder::with_instance_id(instance_id),
        }
    }

    /// Validate, evaluate, and encode a reading into a report
    pub fn assess(
        &self,
        reading: &Reading,
        source: ReadingSource,
        observed_at: DateTime<Utc>,
    ) -> Result<AssessmentReport, EvalError> {
        reading.validate()?;
        let assessment = StressEvaluator::evaluate(reading);
        Ok(self.encoder.encode(reading, &assessment, source, observed_at))
    }

    /// Like [`assess`](Self::assess) but returns pretty-printed JSON
    pub fn assess_to_json(
        &self,
        reading: &Reading,
        source: ReadingSource,
        observed_at: DateTime<Utc>,
    ) -> Result<String, EvalError> {
        let report = self.assess(reading, source, observed_at)?;
        serde_json::to_string_pretty(&report).map_err(EvalError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StressLevel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_evaluate_worked_examples() {
        let calm = evaluate(&Reading::new(60.0, 7.0, 40.0, 100.0));
        assert_eq!(calm.score, 0);
        assert_eq!(calm.level, StressLevel::Balanced);

        let strained = evaluate(&Reading::new(40.0, 5.0, 80.0, 250.0));
        assert_eq!(strained.score, 4);
        assert_eq!(strained.level, StressLevel::Critical);
    }

    #[test]
    fn test_monitor_produces_report() {
        let monitor = StressMonitor::with_instance_id("session-1".to_string());
        let reading = Reading::new(98.0, 7.0, 40.0, 100.0);

        let report = monitor
            .assess(&reading, ReadingSource::Manual, Utc::now())
            .unwrap();

        assert_eq!(report.score, 1);
        assert_eq!(report.level, StressLevel::Slight);
        assert_eq!(report.producer.instance_id, "session-1");
    }

    #[test]
    fn test_monitor_rejects_non_finite_input() {
        let monitor = StressMonitor::new();
        let reading = Reading::new(f64::NAN, 7.0, 40.0, 100.0);

        let result = monitor.assess(&reading, ReadingSource::Manual, Utc::now());
        assert!(matches!(result, Err(EvalError::NonFiniteInput(_))));
    }

    #[test]
    fn test_monitor_json_is_parseable() {
        let monitor = StressMonitor::new();
        let reading = Reading::new(60.0, 5.0, 40.0, 100.0);

        let json = monitor
            .assess_to_json(&reading, ReadingSource::GoogleFit, Utc::now())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["score"], 1);
        assert_eq!(parsed["level"], "slight");
    }
}
