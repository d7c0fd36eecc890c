//! Provider payload adapters
//!
//! This module provides adapters that parse raw provider JSON payloads and
//! reduce them to the vitals the evaluator consumes.

mod google_fit;

pub use google_fit::GoogleFitAdapter;

use crate::error::EvalError;
use crate::types::FetchedVitals;

/// Trait for provider payload adapters
pub trait VitalsPayloadAdapter {
    /// Parse per-metric raw JSON payloads into fetched vitals.
    ///
    /// A `None` payload means the provider call for that metric was skipped
    /// or failed; the corresponding vitals field stays empty.
    fn parse(
        &self,
        heart_rate_json: Option<&str>,
        sleep_json: Option<&str>,
    ) -> Result<FetchedVitals, EvalError>;
}
