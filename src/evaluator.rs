//! Stress evaluation
//!
//! This module holds the scoring rule: four independent threshold checks,
//! each contributing one point, summed into a 0-4 stress score, and the
//! fixed recommendation lookup for each band.

use crate::types::{Assessment, Reading, StressLevel};

/// Lower bound of the normal heart-rate band (bpm, inclusive)
pub const HEART_RATE_MIN_BPM: f64 = 50.0;
/// Upper bound of the normal heart-rate band (bpm, inclusive)
pub const HEART_RATE_MAX_BPM: f64 = 95.0;
/// Lower bound of the normal sleep band (hours, inclusive)
pub const SLEEP_MIN_HOURS: f64 = 6.0;
/// Upper bound of the normal sleep band (hours, inclusive)
pub const SLEEP_MAX_HOURS: f64 = 15.0;
/// Upper bound of the normal noise band (dB, inclusive)
pub const NOISE_MAX_DB: f64 = 70.0;
/// Lower bound of the normal light band (lux, inclusive)
pub const LIGHT_MIN_LUX: f64 = 30.0;
/// Upper bound of the normal light band (lux, inclusive)
pub const LIGHT_MAX_LUX: f64 = 200.0;

/// Evaluator for scoring readings against the fixed bands
pub struct StressEvaluator;

impl StressEvaluator {
    /// Count how many readings fall outside their normal band.
    ///
    /// Each factor contributes independently; the total is order-invariant
    /// and the function never fails for finite inputs.
    pub fn score(reading: &Reading) -> u8 {
        let factors = [
            heart_rate_out_of_band(reading.heart_rate_bpm),
            sleep_out_of_band(reading.sleep_hours),
            noise_out_of_band(reading.noise_level_db),
            light_out_of_band(reading.light_level_lux),
        ];
        factors.iter().map(|&out| out as u8).sum()
    }

    /// Fixed recommendation for a score. Total over `u8`; anything at or
    /// above 4 gets the critical message.
    pub fn recommend(score: u8) -> &'static str {
        match StressLevel::from_score(score) {
            StressLevel::Balanced => "You are doing well! Keep up your current routine.",
            StressLevel::Slight => "Slight stress detected. Try to relax and take breaks.",
            StressLevel::Moderate => {
                "Moderate stress detected. Ensure you have enough sleep and reduce exposure to noise."
            }
            StressLevel::High => {
                "High stress detected. Consider reducing environmental stressors and practice mindfulness."
            }
            StressLevel::Critical => {
                "Critical stress levels detected! Please reach out to a mental health professional."
            }
        }
    }

    /// Score a reading and attach the band and recommendation.
    pub fn evaluate(reading: &Reading) -> Assessment {
        let score = Self::score(reading);
        Assessment {
            score,
            level: StressLevel::from_score(score),
            message: Self::recommend(score).to_string(),
        }
    }
}

/// Heart rate outside [50, 95] bpm
fn heart_rate_out_of_band(bpm: f64) -> bool {
    bpm < HEART_RATE_MIN_BPM || bpm > HEART_RATE_MAX_BPM
}

/// Sleep outside [6, 15] hours
fn sleep_out_of_band(hours: f64) -> bool {
    hours < SLEEP_MIN_HOURS || hours > SLEEP_MAX_HOURS
}

/// Noise above 70 dB
fn noise_out_of_band(db: f64) -> bool {
    db > NOISE_MAX_DB
}

/// Light outside [30, 200] lux
fn light_out_of_band(lux: f64) -> bool {
    lux < LIGHT_MIN_LUX || lux > LIGHT_MAX_LUX
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reading(hr: f64, sleep: f64, noise: f64, light: f64) -> Reading {
        Reading::new(hr, sleep, noise, light)
    }

    #[test]
    fn test_all_in_band_scores_zero() {
        let assessment = StressEvaluator::evaluate(&reading(60.0, 7.0, 40.0, 100.0));
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, StressLevel::Balanced);
        assert_eq!(
            assessment.message,
            "You are doing well! Keep up your current routine."
        );
    }

    #[test]
    fn test_all_out_of_band_scores_four() {
        let assessment = StressEvaluator::evaluate(&reading(40.0, 5.0, 80.0, 250.0));
        assert_eq!(assessment.score, 4);
        assert_eq!(assessment.level, StressLevel::Critical);
        assert_eq!(
            assessment.message,
            "Critical stress levels detected! Please reach out to a mental health professional."
        );
    }

    #[test]
    fn test_heart_rate_boundaries() {
        // Band edges contribute nothing
        assert_eq!(StressEvaluator::score(&reading(50.0, 7.0, 40.0, 100.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(95.0, 7.0, 40.0, 100.0)), 0);
        // One past the edge contributes a point
        assert_eq!(StressEvaluator::score(&reading(49.0, 7.0, 40.0, 100.0)), 1);
        assert_eq!(StressEvaluator::score(&reading(96.0, 7.0, 40.0, 100.0)), 1);
    }

    #[test]
    fn test_sleep_boundaries() {
        assert_eq!(StressEvaluator::score(&reading(60.0, 6.0, 40.0, 100.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(60.0, 15.0, 40.0, 100.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(60.0, 5.0, 40.0, 100.0)), 1);
        assert_eq!(StressEvaluator::score(&reading(60.0, 16.0, 40.0, 100.0)), 1);
    }

    #[test]
    fn test_noise_boundaries() {
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 70.0, 100.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 71.0, 100.0)), 1);
    }

    #[test]
    fn test_light_boundaries() {
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 40.0, 30.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 40.0, 200.0)), 0);
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 40.0, 29.0)), 1);
        assert_eq!(StressEvaluator::score(&reading(60.0, 7.0, 40.0, 201.0)), 1);
    }

    #[test]
    fn test_factors_are_independent_and_additive() {
        // The total equals the sum of the single-factor contributions, so
        // evaluation order cannot matter.
        let singles = [
            reading(40.0, 7.0, 40.0, 100.0),
            reading(60.0, 5.0, 40.0, 100.0),
            reading(60.0, 7.0, 80.0, 100.0),
            reading(60.0, 7.0, 40.0, 250.0),
        ];
        let sum: u8 = singles.iter().map(StressEvaluator::score).sum();
        assert_eq!(sum, 4);
        assert_eq!(StressEvaluator::score(&reading(40.0, 5.0, 80.0, 250.0)), 4);
    }

    #[test]
    fn test_score_stays_in_range() {
        let values = [-1000.0, 0.0, 5.0, 6.0, 50.0, 95.0, 200.0, 1.0e9];
        for &hr in &values {
            for &sleep in &values {
                for &noise in &values {
                    for &light in &values {
                        let score =
                            StressEvaluator::score(&reading(hr, sleep, noise, light));
                        assert!(score <= 4, "score {score} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn test_recommend_matches_bands() {
        assert!(StressEvaluator::recommend(0).starts_with("You are doing well"));
        assert!(StressEvaluator::recommend(1).starts_with("Slight stress"));
        assert!(StressEvaluator::recommend(2).starts_with("Moderate stress"));
        assert!(StressEvaluator::recommend(3).starts_with("High stress"));
        assert!(StressEvaluator::recommend(4).starts_with("Critical stress"));
        // Above the table, same as 4
        assert_eq!(StressEvaluator::recommend(5), StressEvaluator::recommend(4));
    }
}
