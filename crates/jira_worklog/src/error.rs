//! Error model used by work-log fetch and aggregation operations.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorklogError>;

/// Failure raised while fetching or decoding work-log data from the host application.
#[derive(Debug, Error)]
pub enum WorklogError {
    #[error("http {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid url template: {0}")]
    InvalidTemplate(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl WorklogError {
    /// Constructs an HTTP error variant from a non-success response.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        WorklogError::Http {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for WorklogError {
    /// Keeps reqwest timeout, status, connect and decode failures apart; anything else is `Other`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WorklogError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            WorklogError::http(status, err.to_string())
        } else if err.is_connect() {
            WorklogError::Network(err.to_string())
        } else if err.is_decode() {
            WorklogError::Serialization(err.to_string())
        } else {
            WorklogError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WorklogError {
    fn from(err: serde_json::Error) -> Self {
        WorklogError::Serialization(err.to_string())
    }
}
