//! Assessment report encoding
//!
//! This module encodes assessments into versioned JSON reports for the
//! presentation layer, with producer and provenance metadata attached.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EvalError;
use crate::types::{
    Assessment, AssessmentReport, Reading, ReadingSource, ReportProducer, ReportProvenance,
};
use crate::{MINDWELL_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder for producing presentation-layer payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an assessment into a report
    pub fn encode(
        &self,
        reading: &Reading,
        assessment: &Assessment,
        source: ReadingSource,
        observed_at: DateTime<Utc>,
    ) -> AssessmentReport {
        let computed_at = Utc::now();

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: MINDWELL_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source: source.as_str().to_string(),
            observed_at_utc: observed_at.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        AssessmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            reading: *reading,
            score: assessment.score,
            level: assessment.level,
            message: assessment.message.clone(),
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        reading: &Reading,
        assessment: &Assessment,
        source: ReadingSource,
        observed_at: DateTime<Utc>,
    ) -> Result<String, EvalError> {
        let report = self.encode(reading, assessment, source, observed_at);
        serde_json::to_string_pretty(&report).map_err(EvalError::JsonError)
    }
}
