use std::io;

use thiserror::Error;

/// Failures at the edges of the pipeline: reading configuration, talking to
/// the data service, loading payload files and writing exports. The
/// normalization and aggregation core never fails.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("{url} returned status {status}: {detail}")]
    Http {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
