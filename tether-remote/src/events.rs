//! Sync lifecycle events.

use serde_json::Value;

use crate::error::ModelError;
use crate::request::RequestConfig;

/// Lifecycle notification published by a remote model.
///
/// One `Sync` event fires per dispatched request, followed by exactly one
/// `Success` or `Fail` event carrying the same data the caller receives.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A request is about to be sent.
    Sync {
        /// The fully-built request descriptor.
        settings: RequestConfig,
    },

    /// A request completed successfully.
    Success {
        /// Parsed response data.
        data: Value,
        /// The request descriptor.
        settings: RequestConfig,
        /// HTTP status code.
        status: u16,
        /// Elapsed time in fractional milliseconds.
        response_time: f64,
    },

    /// A request failed.
    Fail {
        /// The classified error.
        error: ModelError,
        /// Raw response data, present for HTTP-status errors.
        data: Option<Value>,
        /// The request descriptor.
        settings: RequestConfig,
        /// HTTP status code, when one was observed.
        status: Option<u16>,
        /// Elapsed time in fractional milliseconds.
        response_time: f64,
    },
}
