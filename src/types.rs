//! Core types for the Mindwell engine
//!
//! This module defines the value objects that flow through an assessment:
//! the input reading, the fetched cloud vitals, and the scored output.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Where a reading's physiological values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    Manual,
    GoogleFit,
}

impl ReadingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingSource::Manual => "manual",
            ReadingSource::GoogleFit => "google_fit",
        }
    }
}

/// A single set of measurements to assess.
///
/// Transient per evaluation call; carries no identity and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Heart rate (bpm)
    pub heart_rate_bpm: f64,
    /// Sleep duration over the trailing night (hours)
    pub sleep_hours: f64,
    /// Ambient noise level (dB)
    pub noise_level_db: f64,
    /// Ambient light level (lux)
    pub light_level_lux: f64,
}

impl Reading {
    pub fn new(
        heart_rate_bpm: f64,
        sleep_hours: f64,
        noise_level_db: f64,
        light_level_lux: f64,
    ) -> Self {
        Self {
            heart_rate_bpm,
            sleep_hours,
            noise_level_db,
            light_level_lux,
        }
    }

    /// Reject non-finite fields before they reach the evaluator.
    ///
    /// The evaluator itself is total over finite numbers; NaN and infinity
    /// are caller-side input errors and are caught here.
    pub fn validate(&self) -> Result<(), EvalError> {
        for (name, value) in [
            ("heart_rate_bpm", self.heart_rate_bpm),
            ("sleep_hours", self.sleep_hours),
            ("noise_level_db", self.noise_level_db),
            ("light_level_lux", self.light_level_lux),
        ] {
            if !value.is_finite() {
                return Err(EvalError::NonFiniteInput(name));
            }
        }
        Ok(())
    }
}

/// Physiological values pulled from a cloud provider.
///
/// Either field may be absent when the provider has no data for the window;
/// the caller falls back to manual entry for whatever is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedVitals {
    /// Mean heart rate over the fetch window (bpm)
    pub heart_rate_bpm: Option<f64>,
    /// Total sleep over the fetch window (hours)
    pub sleep_hours: Option<f64>,
}

impl FetchedVitals {
    /// Combine fetched vitals with manually supplied environmental values.
    ///
    /// Returns `None` when either physiological value is missing.
    pub fn into_reading(self, noise_level_db: f64, light_level_lux: f64) -> Option<Reading> {
        Some(Reading {
            heart_rate_bpm: self.heart_rate_bpm?,
            sleep_hours: self.sleep_hours?,
            noise_level_db,
            light_level_lux,
        })
    }
}

/// Stress band derived from the additive score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    /// All four readings inside their normal bands
    Balanced,
    /// One reading out of band
    Slight,
    /// Two readings out of band
    Moderate,
    /// Three readings out of band
    High,
    /// All four readings out of band
    Critical,
}

impl StressLevel {
    /// Map a score to its band. Scores of 4 or more all land in the top
    /// band, making this total over `u8`.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => StressLevel::Balanced,
            1 => StressLevel::Slight,
            2 => StressLevel::Moderate,
            3 => StressLevel::High,
            _ => StressLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Balanced => "balanced",
            StressLevel::Slight => "slight",
            StressLevel::Moderate => "moderate",
            StressLevel::High => "high",
            StressLevel::Critical => "critical",
        }
    }
}

/// Result of evaluating one reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Count of readings outside their normal band, 0-4
    pub score: u8,
    /// Band the score falls into
    pub level: StressLevel,
    /// Canned recommendation for the band
    pub message: String,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source: String,
    pub observed_at_utc: String,
    pub computed_at_utc: String,
}

/// Complete assessment report handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub reading: Reading,
    pub score: u8,
    pub level: StressLevel,
    pub message: String,
}
