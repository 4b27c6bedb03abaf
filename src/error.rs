use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::consts::format_secs;

/// Why a scenario query failed. Surfaced once to the user, never persisted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// No response within the configured bound.
    #[error("request timed out after {}", secs(.0))]
    Timeout(Duration),

    /// The service answered with a non-2xx status.
    #[error("HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    /// DNS, connect, TLS, or broken body stream.
    #[error("network error: {0}")]
    Network(String),

    /// The body was not a valid verdict.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Aborted through the cancel handle before an outcome arrived.
    #[error("request cancelled")]
    Cancelled,
}

/// Discriminant of [`RequestError`], for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    HttpStatus,
    Network,
    Malformed,
    Cancelled,
}

fn secs(duration: &Duration) -> String {
    format_secs(*duration)
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Timeout(_) => ErrorKind::Timeout,
            RequestError::HttpStatus { .. } => ErrorKind::HttpStatus,
            RequestError::Network(_) => ErrorKind::Network,
            RequestError::Malformed(_) => ErrorKind::Malformed,
            RequestError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::HttpStatus => "http-status",
            ErrorKind::Network => "network",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::Malformed(err.to_string())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}
