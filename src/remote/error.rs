//! Error type for failed list requests.
//!
//! Wraps the status information of a non-success response so callers can
//! tell transient failures from rejected requests, and converts into the
//! crate error following one rule for every endpoint.

use std::fmt;

use serde::Deserialize;

use crate::error::NearbyError;

use super::AsHttpError;

/// Error returned by a list endpoint.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if available
    pub status: Option<reqwest::StatusCode>,
    /// Retry-After header value in seconds, if available
    pub retry_after: Option<u64>,
    /// Human-readable error message
    pub message: String,
}

/// Error body shape returned by the API on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            retry_after: None,
            message: message.into(),
        }
    }

    /// Set the retry-after value.
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Build from a failed response body.
    ///
    /// Uses the server's `message` (or `error`) string when the body is JSON,
    /// otherwise the canonical reason for the status.
    pub fn from_response_body(status: reqwest::StatusCode, body: &str) -> Self {
        let server_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty());

        let message = server_message.unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        });
        Self::with_status(message, status)
    }

    /// Convert this error to a NearbyError.
    ///
    /// 1. Rate limited -> `RateLimited`
    /// 2. Unauthorized -> `Auth`
    /// 3. Transient -> `Api` (retryable)
    /// 4. Anything else -> `Rejected`
    pub fn to_nearby_error(&self) -> NearbyError {
        if let Some(duration) = self.get_retry_after() {
            return NearbyError::RateLimited(duration.as_secs());
        }
        if self.is_unauthorized() {
            return NearbyError::Auth(self.message.clone());
        }
        if self.is_transient() || self.status.is_none() {
            return NearbyError::Api(self.message.clone());
        }
        NearbyError::Rejected(self.message.clone())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl AsHttpError for ApiError {
    fn as_http_error(&self) -> Option<(reqwest::StatusCode, Option<u64>)> {
        self.status.map(|s| (s, self.retry_after))
    }

    fn is_transient(&self) -> bool {
        if let Some(status) = self.status {
            return status.is_server_error() || status.as_u16() == 408;
        }
        false
    }

    fn is_rate_limited(&self) -> bool {
        if let Some(status) = self.status {
            return status.as_u16() == 429;
        }
        false
    }
}

impl From<ApiError> for NearbyError {
    fn from(error: ApiError) -> Self {
        error.to_nearby_error()
    }
}
