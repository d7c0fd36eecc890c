//! Authenticated provider clients
//!
//! This module holds the HTTP clients that pull physiological vitals from
//! cloud fitness providers. Everything here is behind the `fetch` feature;
//! the evaluation core never depends on it.

mod google_fit;

pub use google_fit::{GoogleFitClient, StoredToken};

use thiserror::Error;

use crate::error::EvalError;

/// Errors that can occur while fetching vitals from a provider
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Token file error: {0}")]
    TokenFile(#[from] std::io::Error),

    #[error("Invalid token file: {0}")]
    InvalidToken(#[from] serde_json::Error),

    #[error("Provider payload error: {0}")]
    Payload(#[from] EvalError),
}
