//! Mindwell - Desktop stress-assessment engine
//!
//! Mindwell turns four physiological and environmental readings (heart
//! rate, sleep hours, ambient noise, ambient light) into an additive 0-4
//! stress score and a canned recommendation: reading → validation →
//! scoring → report encoding.
//!
//! ## Modules
//!
//! - **Evaluator**: threshold scoring and the recommendation table
//! - **Monitor**: validation and report orchestration for host apps
//! - **Providers** (`fetch` feature): Google Fit client that auto-fills the
//!   physiological inputs, with manual entry as the fallback

pub mod adapters;
pub mod error;
pub mod evaluator;
pub mod monitor;
pub mod report;
pub mod types;

#[cfg(feature = "fetch")]
pub mod providers;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::EvalError;
pub use evaluator::StressEvaluator;
pub use monitor::{evaluate, StressMonitor};
pub use report::{ReportEncoder, REPORT_VERSION};
pub use types::{
    Assessment, AssessmentReport, FetchedVitals, Reading, ReadingSource, StressLevel,
};

#[cfg(feature = "fetch")]
pub use providers::{FetchError, GoogleFitClient, StoredToken};

/// Mindwell version embedded in all assessment reports
pub const MINDWELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for assessment reports
pub const PRODUCER_NAME: &str = "mindwell";
