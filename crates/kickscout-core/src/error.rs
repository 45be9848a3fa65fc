use std::io;
use thiserror::Error;

use crate::SourceKind;

#[derive(Debug, Error)]
pub enum KicksError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    #[error("{source_kind} unavailable: {reason}")]
    SourceUnavailable { source_kind: SourceKind, reason: String },
    #[error("No data: {0}")]
    NoData(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Bridge error: {0}")]
    Bridge(String),
    #[error("Cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl KicksError {
    /// Whether a retry has a chance of succeeding: connection failures,
    /// timeouts, rate limiting and server errors. Other 4xx are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            KicksError::Transport(_) | KicksError::Timeout(_) => true,
            KicksError::HttpStatus(status) => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Classify a failed `send()` so timeouts and connection drops become
    /// retryable while builder errors stay permanent.
    pub fn from_send_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KicksError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() {
            KicksError::Transport(err.to_string())
        } else if let Some(status) = err.status() {
            KicksError::HttpStatus(status.as_u16())
        } else {
            KicksError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, KicksError>;
