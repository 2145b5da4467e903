//! Sync pipeline error types.

use serde_json::Value;
use thiserror::Error;

use crate::response::SyncOutcome;

/// Result type for sync operations.
pub type SyncResult = std::result::Result<SyncOutcome, SyncFailure>;

/// Errors produced by the sync pipeline.
///
/// Every variant is cheap to clone so a single error can be delivered to the
/// caller and to each notification channel.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The request URL could not be resolved or parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network or timeout failure with no usable response.
    #[error("transport error: {message}")]
    Transport {
        /// Failure description from the transport.
        message: String,
        /// HTTP status code, when the underlying failure exposes one.
        status: Option<u16>,
    },

    /// The server answered with a status of 400 or above.
    ///
    /// `data` is the adapter's `parse_error` product, by default the
    /// response body merged with a `status` field.
    #[error("http status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Structured error value built by the adapter.
        data: Value,
    },

    /// The response body was not valid JSON.
    #[error("invalid json in response body (status {status}): {message}")]
    BodyParse {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body text.
        body: String,
        /// Underlying JSON error description.
        message: String,
    },

    /// The adapter's `parse` step rejected the response data.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ModelError {
    /// HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Http { status, .. } => Some(*status),
            Self::BodyParse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body carried by this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BodyParse { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// A failed sync call: the error plus the raw response data and timing that
/// accompanied it, mirroring what the fail notification channels receive.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct SyncFailure {
    /// The classified error.
    pub error: ModelError,
    /// Raw (unparsed) response data, present for HTTP-status errors.
    pub data: Option<Value>,
    /// HTTP status code, when one was observed.
    pub status: Option<u16>,
    /// Elapsed time in fractional milliseconds. Absent when the call failed
    /// before dispatch.
    pub response_time: Option<f64>,
}

impl From<ModelError> for SyncFailure {
    fn from(error: ModelError) -> Self {
        let status = error.status_code();
        Self {
            error,
            data: None,
            status,
            response_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_code_is_exposed_per_variant() {
        let http = ModelError::Http {
            status: 503,
            data: json!({ "status": 503 }),
        };
        assert_eq!(http.status_code(), Some(503));

        let transport = ModelError::Transport {
            message: "connection refused".to_string(),
            status: None,
        };
        assert_eq!(transport.status_code(), None);
        assert!(transport.is_transport());

        let parse = ModelError::Parse("bad shape".to_string());
        assert_eq!(parse.status_code(), None);
    }

    #[test]
    fn body_is_only_carried_by_body_parse_errors() {
        let err = ModelError::BodyParse {
            status: 200,
            body: "invalid".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(err.body(), Some("invalid"));
        assert_eq!(err.status_code(), Some(200));
    }
}
