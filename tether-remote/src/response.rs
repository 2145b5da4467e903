//! Response interpretation.
//!
//! Turns a raw transport response into either parsed domain data, merged
//! into the model by the adapter, or a structured error. Status codes of
//! 400 and above are errors; everything below goes through the adapter's
//! `parse` step.

use serde_json::Value;
use tether_model::Model;
use tracing::debug;

use crate::adapter::SyncAdapter;
use crate::error::ModelError;
use crate::transport::TransportResponse;

/// A completed, successful sync call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// Parsed response data.
    pub data: Value,
    /// HTTP status code.
    pub status: u16,
    /// Elapsed time in fractional milliseconds, 3 decimal digits.
    pub response_time: f64,
}

/// Interpreter verdict, before timing and notification are attached.
#[derive(Debug, Clone)]
pub(crate) enum Interpretation {
    Success {
        data: Value,
        status: u16,
    },
    Failure {
        error: ModelError,
        data: Option<Value>,
        status: Option<u16>,
    },
}

/// Parse the response body as JSON and interpret the result. An empty body
/// counts as an empty JSON object; an unparseable body is a failure
/// carrying the status code and the raw text.
pub(crate) fn handle_response(
    adapter: &dyn SyncAdapter,
    model: &Model,
    response: &TransportResponse,
) -> Interpretation {
    debug!(target: "tether::remote", status = response.status, "interpreting response");

    let body = if response.body.is_empty() {
        "{}"
    } else {
        response.body.as_str()
    };
    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(e) => {
            return Interpretation::Failure {
                error: ModelError::BodyParse {
                    status: response.status,
                    body: response.body.clone(),
                    message: e.to_string(),
                },
                data: None,
                status: Some(response.status),
            };
        }
    };

    parse_response(adapter, model, response.status, data)
}

/// Route parsed data by status code: 400 and above to the adapter's
/// `parse_error`, everything else through `parse`.
pub(crate) fn parse_response(
    adapter: &dyn SyncAdapter,
    model: &Model,
    status: u16,
    data: Value,
) -> Interpretation {
    if status >= 400 {
        let error = adapter.parse_error(status, &data);
        return Interpretation::Failure {
            error: ModelError::Http {
                status,
                data: error,
            },
            data: Some(data),
            status: Some(status),
        };
    }

    match adapter.parse(model, data) {
        Ok(data) => Interpretation::Success { data, status },
        Err(error) => Interpretation::Failure {
            error,
            data: None,
            status: Some(status),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DefaultAdapter;
    use serde_json::json;

    struct RenamingAdapter;

    impl SyncAdapter for RenamingAdapter {
        fn parse(&self, _model: &Model, _data: Value) -> Result<Value, ModelError> {
            Ok(json!({ "parsed": "message" }))
        }

        fn parse_error(&self, _status: u16, _data: &Value) -> Value {
            json!({ "error": "parsed" })
        }
    }

    struct FailingAdapter;

    impl SyncAdapter for FailingAdapter {
        fn parse(&self, _model: &Model, _data: Value) -> Result<Value, ModelError> {
            Err(ModelError::Parse("parse".to_string()))
        }
    }

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse::new(status, body)
    }

    #[test]
    fn success_statuses_go_through_parse() {
        let model = Model::new();
        let verdict = handle_response(
            &DefaultAdapter,
            &model,
            &response(200, r#"{ "message": "success" }"#),
        );

        match verdict {
            Interpretation::Success { data, status } => {
                assert_eq!(data, json!({ "message": "success" }));
                assert_eq!(status, 200);
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(model.get("message"), Some(json!("success")));
    }

    #[test]
    fn failure_statuses_go_through_parse_error() {
        let model = Model::new();
        let verdict = parse_response(&RenamingAdapter, &model, 400, json!({ "parsed": "false" }));

        match verdict {
            Interpretation::Failure {
                error: ModelError::Http { status, data },
                data: raw,
                status: code,
            } => {
                assert_eq!(status, 400);
                assert_eq!(data, json!({ "error": "parsed" }));
                assert_eq!(raw, Some(json!({ "parsed": "false" })));
                assert_eq!(code, Some(400));
            }
            other => panic!("expected http failure, got {other:?}"),
        }
        assert!(model.is_empty());
    }

    #[test]
    fn a_custom_parse_result_becomes_the_outcome_data() {
        let model = Model::new();
        let verdict = parse_response(&RenamingAdapter, &model, 200, json!({ "parsed": "false" }));
        match verdict {
            Interpretation::Success { data, .. } => {
                assert_eq!(data, json!({ "parsed": "message" }));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn a_parse_failure_surfaces_with_no_data() {
        let model = Model::new();
        let verdict = parse_response(&FailingAdapter, &model, 200, json!({}));
        match verdict {
            Interpretation::Failure { error, data, status } => {
                assert!(matches!(error, ModelError::Parse(_)));
                assert_eq!(data, None);
                assert_eq!(status, Some(200));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn an_empty_body_counts_as_an_empty_object() {
        let model = Model::new();
        let verdict = handle_response(&DefaultAdapter, &model, &response(200, ""));
        match verdict {
            Interpretation::Success { data, status } => {
                assert_eq!(data, json!({}));
                assert_eq!(status, 200);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn an_unparseable_body_carries_status_and_raw_text() {
        let model = Model::new();
        let verdict = handle_response(&DefaultAdapter, &model, &response(200, "invalid"));
        match verdict {
            Interpretation::Failure { error, data, status } => {
                match &error {
                    ModelError::BodyParse { status, body, .. } => {
                        assert_eq!(*status, 200);
                        assert_eq!(body, "invalid");
                    }
                    other => panic!("expected body parse error, got {other:?}"),
                }
                assert_eq!(data, None);
                assert_eq!(status, Some(200));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(model.is_empty());
    }
}
