//! REST client for the learning backend
//!
//! This module provides:
//! - `ApiClient`: the reqwest-based client for all backend calls
//! - Endpoint path families with legacy fallbacks (404/405 retry shims)
//! - `ApiError`: transport and status errors with detail-sourced messages

pub mod client;

pub use client::ApiClient;

use thiserror::Error;

/// Answer submission endpoints, newest first.
pub const ANSWER_PATHS: [&str; 2] = ["/progress/log-answer", "/progress/answer"];

/// SRS session-start endpoints, newest first.
pub const SRS_SESSION_PATHS: [&str; 2] = ["/learning/srs/session", "/srs/session"];

/// SRS review endpoints, newest first.
pub const SRS_REVIEW_PATHS: [&str; 2] = ["/learning/srs/review", "/srs/review"];

/// Journal path families, newest first. Entry routes are built by
/// appending `/{id}` to a family root.
pub const JOURNAL_PATHS: [&str; 3] = [
    "/journal/entries",
    "/learning/journal/entries",
    "/capsules/journal/entries",
];

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response. `detail` carries the body's `detail` field when
    /// present, else a generic message, and is what users see.
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("payload encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Whether the next legacy path family should be tried.
    ///
    /// Only a missing route (404) or a method the route refuses (405)
    /// indicates an older API generation; anything else is a real failure
    /// and surfaces immediately.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Status { status: 404 | 405, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_only_on_missing_route_statuses() {
        let not_found = ApiError::Status {
            status: 404,
            detail: "not found".to_string(),
        };
        let bad_method = ApiError::Status {
            status: 405,
            detail: "method not allowed".to_string(),
        };
        let server_error = ApiError::Status {
            status: 500,
            detail: "boom".to_string(),
        };
        assert!(not_found.triggers_fallback());
        assert!(bad_method.triggers_fallback());
        assert!(!server_error.triggers_fallback());
    }

    #[test]
    fn test_status_error_displays_detail_only() {
        let err = ApiError::Status {
            status: 422,
            detail: "answer payload malformed".to_string(),
        };
        assert_eq!(err.to_string(), "answer payload malformed");
    }
}
