//! Request/response adaptation strategy.
//!
//! A [`SyncAdapter`] bundles the overridable points of the pipeline: URL,
//! auth, timeout, and proxy resolution on the request side, `parse` and
//! `parse_error` on the response side. Every method has a default
//! implementation delegating to the pure normalizers, so an adapter only
//! overrides what it needs.

use serde_json::{Map, Value};
use tether_model::Model;

use crate::config::{Auth, Credentials, PhaseTimeouts, Timeout, UrlSpec};
use crate::error::ModelError;
use crate::proxy::{ProxyAgent, ProxySpec};

/// Strategy trait for request construction and response interpretation.
pub trait SyncAdapter: Send + Sync {
    /// Resolve the request URL.
    fn url(
        &self,
        explicit: Option<&UrlSpec>,
        configured: Option<&UrlSpec>,
    ) -> Result<String, ModelError> {
        UrlSpec::resolve(explicit, configured)
    }

    /// Resolve auth credentials, or `None` when unconfigured.
    fn auth(&self, explicit: Option<&Auth>, configured: Option<&Auth>) -> Option<Credentials> {
        Auth::resolve(explicit, configured)
    }

    /// Resolve per-phase timeouts.
    fn timeout(&self, explicit: Option<Timeout>, configured: Option<Timeout>) -> PhaseTimeouts {
        Timeout::resolve(explicit, configured).normalize()
    }

    /// Resolve a proxy agent for the target URL.
    fn proxy(
        &self,
        explicit: Option<&ProxySpec>,
        configured: Option<&ProxySpec>,
        target_url: Option<&str>,
        model_headers: &[(String, String)],
    ) -> Result<Option<ProxyAgent>, ModelError> {
        ProxySpec::resolve(explicit, configured, target_url, model_headers)
    }

    /// Interpret successful response data, merging it into the model.
    ///
    /// Arrays are stored under the attribute key `"data"`; objects merge
    /// their keys directly. The returned value becomes the outcome's data,
    /// so an adapter may transform it.
    fn parse(&self, model: &Model, data: Value) -> Result<Value, ModelError> {
        match &data {
            Value::Array(_) => model.set("data", data.clone()),
            Value::Object(map) => model.set_many(map.clone()),
            _ => {}
        }
        Ok(data)
    }

    /// Build the structured error value for a status of 400 or above.
    ///
    /// The default starts from `{"status": <code>}` and overlays the
    /// response data, so a body that carries its own `status` field wins.
    fn parse_error(&self, status: u16, data: &Value) -> Value {
        let mut merged = Map::new();
        merged.insert("status".to_string(), Value::from(status));
        match data {
            Value::Object(map) => {
                for (key, value) in map {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Value::Null => {}
            other => {
                merged.insert("data".to_string(), other.clone());
            }
        }
        Value::Object(merged)
    }
}

/// The default adapter: every method at its default behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdapter;

impl SyncAdapter for DefaultAdapter {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_merges_objects_into_the_model() {
        let model = Model::new();
        let data = json!({ "message": "success", "count": 2 });
        let returned = DefaultAdapter.parse(&model, data.clone()).unwrap();
        assert_eq!(returned, data);
        assert_eq!(model.to_json(), data);
    }

    #[test]
    fn parse_stores_arrays_under_the_data_key() {
        let model = Model::new();
        let data = json!([1, 2, 3]);
        let returned = DefaultAdapter.parse(&model, data.clone()).unwrap();
        assert_eq!(returned, data);
        assert_eq!(model.to_json(), json!({ "data": [1, 2, 3] }));
    }

    #[test]
    fn parse_leaves_scalars_alone() {
        let model = Model::new();
        let returned = DefaultAdapter.parse(&model, json!("plain")).unwrap();
        assert_eq!(returned, json!("plain"));
        assert!(model.is_empty());
    }

    #[test]
    fn parse_error_merges_the_status_code() {
        let error = DefaultAdapter.parse_error(500, &json!({ "message": "error" }));
        assert_eq!(error, json!({ "status": 500, "message": "error" }));
    }

    #[test]
    fn parse_error_lets_body_fields_win_on_collision() {
        let error = DefaultAdapter.parse_error(500, &json!({ "status": 418 }));
        assert_eq!(error, json!({ "status": 418 }));
    }

    #[test]
    fn parse_error_wraps_non_object_bodies() {
        let error = DefaultAdapter.parse_error(400, &json!("message"));
        assert_eq!(error, json!({ "status": 400, "data": "message" }));

        let error = DefaultAdapter.parse_error(400, &Value::Null);
        assert_eq!(error, json!({ "status": 400 }));
    }
}
