//! nominatim-cli error types

use std::time::Duration;

/// Errors surfaced by the pipeline, the transport and the command layer.
///
/// Every variant carries its own retry classification, see
/// [`is_transient()`](Self::is_transient).
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by upstream, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl GeocodeError {
    /// Whether the failure is transient and eligible for another attempt.
    ///
    /// Network failures, timeouts, upstream throttling (429) and server
    /// errors (5xx) are transient. Everything else is terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(_) | GeocodeError::Timeout | GeocodeError::RateLimited { .. } => {
                true
            }
            GeocodeError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status associated with the failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeocodeError::Api { status, .. } => Some(*status),
            GeocodeError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Upstream `Retry-After` hint, when the service sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeocodeError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return GeocodeError::Timeout;
        }
        let message = error_chain(&err);
        // A request that could not be built fails the same way every time.
        if err.is_builder() {
            GeocodeError::Configuration(message)
        } else {
            GeocodeError::Http(message)
        }
    }
}

/// `err` followed by each of its sources, colon separated.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Result type alias for nominatim-cli operations
pub type Result<T> = std::result::Result<T, GeocodeError>;
