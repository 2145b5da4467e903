//! Outbound request log formatting.
//!
//! The pipeline builds one [`LogMeta`] record per notification and hands it
//! to a pluggable [`LogSink`]. The default sink emits `tracing` events with
//! the record's fields; the message templates correspond to the three
//! outcomes a request can have.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::request::RequestConfig;

/// Template for the request-sent record.
pub const MSG_REQUEST_SENT: &str = "model request sent";
/// Template for the request-succeeded record.
pub const MSG_REQUEST_SUCCESS: &str = "model request success";
/// Template for the request-failed record.
pub const MSG_REQUEST_FAILED: &str = "model request failed";

/// Structured metadata describing one request outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMeta {
    /// Outbound HTTP verb.
    pub out_verb: String,
    /// Outbound request target.
    pub out_request: String,
    /// Response status code, once a response was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_response_code: Option<u16>,
    /// Elapsed time in fractional milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_response_time: Option<f64>,
    /// Error summary: the error's message, else the data's `error` or
    /// `errors` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_error: Option<String>,
    /// HTML-trimmed body carried by the error, on failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_error_body: Option<String>,
    /// Statically configured metadata, merged at lowest precedence.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogMeta {
    /// Build the record for one outcome. Static `logging` metadata merges
    /// in last and never overwrites a field the pipeline computed.
    pub(crate) fn build(
        settings: &RequestConfig,
        status: Option<u16>,
        response_time: Option<f64>,
        err: Option<&ModelError>,
        data: Option<&Value>,
        statics: &Map<String, Value>,
        sink: &dyn LogSink,
    ) -> Self {
        let out_error = match err {
            Some(err) => Some(err.to_string()),
            None => data
                .and_then(|data| data.get("error").or_else(|| data.get("errors")))
                .map(|value| match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                }),
        };
        let out_error_body = err
            .and_then(ModelError::body)
            .map(|body| sink.trim_html(body));

        let mut meta = Self {
            out_verb: settings.method.to_string(),
            out_request: settings.url.clone(),
            out_response_code: status,
            out_response_time: response_time,
            out_error,
            out_error_body,
            extra: Map::new(),
        };

        for (key, value) in statics {
            if !meta.computes(key) {
                meta.extra.insert(key.clone(), value.clone());
            }
        }

        meta
    }

    /// Whether the pipeline computed a value for this key.
    fn computes(&self, key: &str) -> bool {
        match key {
            "outVerb" | "outRequest" => true,
            "outResponseCode" => self.out_response_code.is_some(),
            "outResponseTime" => self.out_response_time.is_some(),
            "outError" => self.out_error.is_some(),
            "outErrorBody" => self.out_error_body.is_some(),
            _ => false,
        }
    }
}

/// Destination for outbound request log records.
pub trait LogSink: Send + Sync {
    /// Deliver one record with its message template.
    fn outbound(&self, message: &str, meta: &LogMeta);

    /// Strip markup from an error body before it enters a log record.
    fn trim_html(&self, body: &str) -> String {
        body.to_string()
    }
}

/// Default sink emitting `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingSink {
    label: String,
}

impl TracingSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new("remote-model")
    }
}

impl LogSink for TracingSink {
    fn outbound(&self, message: &str, meta: &LogMeta) {
        if meta.out_error.is_some() {
            tracing::error!(
                target: "tether::remote",
                model = %self.label,
                out_verb = %meta.out_verb,
                out_request = %meta.out_request,
                out_response_code = ?meta.out_response_code,
                out_response_time = ?meta.out_response_time,
                out_error = ?meta.out_error,
                out_error_body = ?meta.out_error_body,
                "{message}"
            );
        } else {
            tracing::info!(
                target: "tether::remote",
                model = %self.label,
                out_verb = %meta.out_verb,
                out_request = %meta.out_request,
                out_response_code = ?meta.out_response_code,
                out_response_time = ?meta.out_response_time,
                "{message}"
            );
        }
    }
}
