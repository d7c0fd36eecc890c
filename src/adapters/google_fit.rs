//! Google Fit adapter
//!
//! Parses Google Fit `dataset:aggregate` responses and reduces them to the
//! two physiological vitals: mean heart rate over the window and total
//! sleep hours summed across sleep segments.

use serde::Deserialize;

use crate::error::EvalError;
use crate::types::FetchedVitals;

use super::VitalsPayloadAdapter;

const NANOS_PER_HOUR: f64 = 3_600.0 * 1e9;

/// Google Fit payload adapter
pub struct GoogleFitAdapter;

impl VitalsPayloadAdapter for GoogleFitAdapter {
    fn parse(
        &self,
        heart_rate_json: Option<&str>,
        sleep_json: Option<&str>,
    ) -> Result<FetchedVitals, EvalError> {
        let heart_rate_bpm = match heart_rate_json {
            Some(raw) => parse_mean_heart_rate(raw)?,
            None => None,
        };

        let sleep_hours = match sleep_json {
            Some(raw) => parse_total_sleep_hours(raw)?,
            None => None,
        };

        Ok(FetchedVitals {
            heart_rate_bpm,
            sleep_hours,
        })
    }
}

/// Mean of every heart-rate sample in the response.
///
/// Returns `None` when the response carries no data points.
fn parse_mean_heart_rate(raw_json: &str) -> Result<Option<f64>, EvalError> {
    let response: AggregateResponse = serde_json::from_str(raw_json)?;

    let mut total = 0.0;
    let mut count = 0u32;

    for point in response.points() {
        for value in &point.value {
            if let Some(bpm) = value.as_f64() {
                total += bpm;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Ok(None);
    }
    Ok(Some(total / f64::from(count)))
}

/// Total sleep duration summed over all sleep-segment points, in hours.
///
/// A response with buckets but no points sums to 0.0 h; a response with no
/// buckets at all yields `None` so the caller can fall back to manual entry
/// instead of scoring a phantom zero.
fn parse_total_sleep_hours(raw_json: &str) -> Result<Option<f64>, EvalError> {
    let response: AggregateResponse = serde_json::from_str(raw_json)?;

    if response.bucket.is_empty() {
        return Ok(None);
    }

    let mut total_nanos: i64 = 0;

    for point in response.points() {
        let start = point.start_nanos()?;
        let end = point.end_nanos()?;
        total_nanos += end - start;
    }

    Ok(Some(total_nanos as f64 / NANOS_PER_HOUR))
}

/// Google Fit aggregate response shape: bucket -> dataset -> point -> value
#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    bucket: Vec<Bucket>,
}

impl AggregateResponse {
    fn points(&self) -> impl Iterator<Item = &Point> {
        self.bucket
            .iter()
            .flat_map(|b| b.dataset.iter())
            .flat_map(|d| d.point.iter())
    }
}

#[derive(Debug, Deserialize)]
struct Bucket {
    #[serde(default)]
    dataset: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    point: Vec<Point>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Point {
    /// Google Fit renders nanosecond timestamps as JSON strings
    #[serde(default)]
    start_time_nanos: Option<String>,
    #[serde(default)]
    end_time_nanos: Option<String>,
    #[serde(default)]
    value: Vec<PointValue>,
}

impl Point {
    fn start_nanos(&self) -> Result<i64, EvalError> {
        parse_nanos(self.start_time_nanos.as_deref(), "startTimeNanos")
    }

    fn end_nanos(&self) -> Result<i64, EvalError> {
        parse_nanos(self.end_time_nanos.as_deref(), "endTimeNanos")
    }
}

fn parse_nanos(raw: Option<&str>, field: &str) -> Result<i64, EvalError> {
    let raw = raw.ok_or_else(|| EvalError::MissingField(field.to_string()))?;
    raw.parse::<i64>()
        .map_err(|_| EvalError::ParseError(format!("invalid {field}: {raw}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointValue {
    fp_val: Option<f64>,
    int_val: Option<i64>,
}

impl PointValue {
    fn as_f64(&self) -> Option<f64> {
        self.fp_val.or_else(|| self.int_val.map(|v| v as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_heart_rate_json() -> &'static str {
        r#"{
            "bucket": [{
                "startTimeMillis": "1704412800000",
                "endTimeMillis": "1704499200000",
                "dataset": [{
                    "dataSourceId": "raw:com.google.heart_rate.bpm:aggregated",
                    "point": [
                        {
                            "startTimeNanos": "1704412800000000000",
                            "endTimeNanos": "1704412860000000000",
                            "value": [{ "fpVal": 58.0 }]
                        },
                        {
                            "startTimeNanos": "1704416400000000000",
                            "endTimeNanos": "1704416460000000000",
                            "value": [{ "fpVal": 66.0 }]
                        }
                    ]
                }]
            }]
        }"#
    }

    fn sample_sleep_json() -> &'static str {
        r#"{
            "bucket": [{
                "dataset": [{
                    "dataSourceId": "derived:com.google.sleep.segment:merged",
                    "point": [
                        {
                            "startTimeNanos": "1704412800000000000",
                            "endTimeNanos": "1704423600000000000",
                            "value": [{ "intVal": 2 }]
                        },
                        {
                            "startTimeNanos": "1704423600000000000",
                            "endTimeNanos": "1704438000000000000",
                            "value": [{ "intVal": 4 }]
                        }
                    ]
                }]
            }]
        }"#
    }

    #[test]
    fn test_mean_heart_rate() {
        let vitals = GoogleFitAdapter
            .parse(Some(sample_heart_rate_json()), None)
            .unwrap();
        assert_eq!(vitals.heart_rate_bpm, Some(62.0));
        assert_eq!(vitals.sleep_hours, None);
    }

    #[test]
    fn test_sleep_hours_sum_segments() {
        // 3 h + 4 h of segments
        let vitals = GoogleFitAdapter
            .parse(None, Some(sample_sleep_json()))
            .unwrap();
        let hours = vitals.sleep_hours.unwrap();
        assert!((hours - 7.0).abs() < 1e-9, "expected 7.0, got {hours}");
    }

    #[test]
    fn test_both_payloads_combined() {
        let vitals = GoogleFitAdapter
            .parse(Some(sample_heart_rate_json()), Some(sample_sleep_json()))
            .unwrap();
        assert_eq!(vitals.heart_rate_bpm, Some(62.0));
        assert!(vitals.sleep_hours.is_some());
    }

    #[test]
    fn test_empty_heart_rate_response_is_none() {
        let vitals = GoogleFitAdapter
            .parse(Some(r#"{"bucket": []}"#), None)
            .unwrap();
        assert_eq!(vitals.heart_rate_bpm, None);
    }

    #[test]
    fn test_bucketed_but_empty_sleep_is_zero() {
        // Buckets exist, no segments recorded: zero hours, which the
        // evaluator counts as out-of-band sleep.
        let raw = r#"{"bucket": [{"dataset": [{"point": []}]}]}"#;
        let vitals = GoogleFitAdapter.parse(None, Some(raw)).unwrap();
        assert_eq!(vitals.sleep_hours, Some(0.0));
    }

    #[test]
    fn test_missing_sleep_response_is_none() {
        let vitals = GoogleFitAdapter
            .parse(None, Some(r#"{"bucket": []}"#))
            .unwrap();
        assert_eq!(vitals.sleep_hours, None);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let result = GoogleFitAdapter.parse(Some("not valid json"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_nanos_is_error() {
        let raw = r#"{
            "bucket": [{
                "dataset": [{
                    "point": [{
                        "startTimeNanos": "not-a-number",
                        "endTimeNanos": "1704438000000000000",
                        "value": []
                    }]
                }]
            }]
        }"#;
        let result = GoogleFitAdapter.parse(None, Some(raw));
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }
}
