//! Remote model: public operations and the request dispatcher.
//!
//! # Design
//! [`RemoteModel`] wraps a local [`Model`] by composition and drives the
//! sync pipeline: build a [`RequestConfig`] from model options and per-call
//! overrides, dispatch it through the [`Transport`], interpret the raw
//! response, and notify every channel of the outcome. Notification order is
//! fixed per outcome: hook, then log formatter, then event, then the
//! returned `Result`. All three channels carry the same data and the same
//! elapsed time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tether_model::{ChangeEvent, Emitter, Model};
use tracing::debug;

use crate::adapter::{DefaultAdapter, SyncAdapter};
use crate::config::ModelOptions;
use crate::error::{ModelError, SyncFailure, SyncResult};
use crate::events::SyncEvent;
use crate::hooks::{FailHook, SuccessHook, SyncHook};
use crate::logging::{
    LogMeta, LogSink, TracingSink, MSG_REQUEST_FAILED, MSG_REQUEST_SENT, MSG_REQUEST_SUCCESS,
};
use crate::request::{CallArgs, RequestConfig, RequestSeed};
use crate::response::{handle_response, Interpretation, SyncOutcome};
use crate::transport::{ReqwestTransport, Transport};

/// An attribute model synchronized with a remote HTTP endpoint.
pub struct RemoteModel {
    model: Model,
    options: ModelOptions,
    transport: Arc<dyn Transport>,
    adapter: Arc<dyn SyncAdapter>,
    events: Emitter<SyncEvent>,
    sink: Arc<dyn LogSink>,
}

impl RemoteModel {
    /// Create a remote model with the default transport, adapter, and log
    /// sink.
    pub fn new(options: ModelOptions) -> Self {
        let sink = Arc::new(TracingSink::new(options.label.clone()));
        Self {
            model: Model::new(),
            options,
            transport: Arc::new(ReqwestTransport::new()),
            adapter: Arc::new(DefaultAdapter),
            events: Emitter::new(),
            sink,
        }
    }

    /// Create a remote model seeded with attributes. No change events fire.
    pub fn with_attributes(attributes: Map<String, Value>, options: ModelOptions) -> Self {
        let mut model = Self::new(options);
        model.model = Model::with_attributes(attributes);
        model
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the request/response adapter.
    pub fn with_adapter(mut self, adapter: Arc<dyn SyncAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Replace the log sink.
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The wrapped attribute model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The configured options.
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Subscribe to sync lifecycle events.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.events.on(listener);
    }

    /// Get a clone of an attribute value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.model.get(key)
    }

    /// Set a single attribute.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.model.set(key, value);
    }

    /// Merge a mapping of attributes.
    pub fn set_many(&self, attributes: Map<String, Value>) {
        self.model.set_many(attributes);
    }

    /// Remove an attribute.
    pub fn unset(&self, key: &str) {
        self.model.unset(key);
    }

    /// Clear all attributes.
    pub fn reset(&self) {
        self.model.reset();
    }

    /// Add 1 to a numeric attribute.
    pub fn increment(&self, key: &str) {
        self.model.increment(key);
    }

    /// Add `amount` to a numeric attribute.
    pub fn increment_by(&self, key: &str, amount: i64) {
        self.model.increment_by(key, amount);
    }

    /// The attribute mapping as a JSON object.
    pub fn to_json(&self) -> Value {
        self.model.to_json()
    }

    /// Subscribe to attribute change events.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.model.on_change(listener);
    }

    /// Fetch remote state with a GET request.
    pub async fn fetch(&self) -> SyncResult {
        self.fetch_with(CallArgs::new()).await
    }

    /// Fetch remote state with per-call overrides.
    pub async fn fetch_with(&self, args: CallArgs) -> SyncResult {
        let config = self.request_config(RequestSeed::get(), &args)?;
        self.request(config).await
    }

    /// Save the attribute bag with a POST request. PUT can be selected per
    /// call via [`CallArgs::method`].
    pub async fn save(&self) -> SyncResult {
        self.save_with(CallArgs::new()).await
    }

    /// Save the attribute bag with per-call overrides.
    pub async fn save_with(&self, args: CallArgs) -> SyncResult {
        let json = self.prepare();
        let config = self.request_config(RequestSeed::post(json), &args)?;
        self.request(config).await
    }

    /// Delete the remote resource with a DELETE request.
    pub async fn delete(&self) -> SyncResult {
        self.delete_with(CallArgs::new()).await
    }

    /// Delete the remote resource with per-call overrides.
    pub async fn delete_with(&self, args: CallArgs) -> SyncResult {
        let config = self.request_config(RequestSeed::delete(), &args)?;
        self.request(config).await
    }

    /// Serialize the attribute bag into the request body sent by `save`.
    pub fn prepare(&self) -> Value {
        debug!(target: "tether::remote", "prepare");
        self.model.to_json()
    }

    /// Build a request descriptor from a seed and per-call overrides.
    pub fn request_config(
        &self,
        seed: RequestSeed,
        args: &CallArgs,
    ) -> Result<RequestConfig, ModelError> {
        RequestConfig::build(seed, &self.options, args, self.adapter.as_ref())
    }

    /// Dispatch a built descriptor and notify every channel of the outcome.
    pub async fn request(&self, config: RequestConfig) -> SyncResult {
        self.notify_sync(&config);

        let start = Instant::now();
        let sent = self.transport.send(&config).await;
        let response_time = round_millis(start.elapsed());

        let verdict = match sent {
            Ok(response) => handle_response(self.adapter.as_ref(), &self.model, &response),
            Err(failure) => match failure.response {
                // Transports that treat non-2xx/3xx statuses as errors
                // still carry the response; interpret it normally.
                Some(response) => {
                    handle_response(self.adapter.as_ref(), &self.model, &response)
                }
                None => Interpretation::Failure {
                    error: ModelError::Transport {
                        message: failure.message,
                        status: failure.status,
                    },
                    data: None,
                    status: failure.status,
                },
            },
        };

        self.finalize(config, verdict, response_time)
    }

    fn finalize(
        &self,
        settings: RequestConfig,
        verdict: Interpretation,
        response_time: f64,
    ) -> SyncResult {
        match verdict {
            Interpretation::Success { data, status } => {
                self.notify_success(&data, &settings, status, response_time);
                Ok(SyncOutcome {
                    data,
                    status,
                    response_time,
                })
            }
            Interpretation::Failure {
                error,
                data,
                status,
            } => {
                self.notify_fail(&error, data.as_ref(), &settings, status, response_time);
                Err(SyncFailure {
                    error,
                    data,
                    status,
                    response_time: Some(response_time),
                })
            }
        }
    }

    fn notify_sync(&self, settings: &RequestConfig) {
        if let Some(hook) = self.options.hooks.sync.as_deref() {
            hook(&SyncHook { settings });
        }
        let meta = LogMeta::build(
            settings,
            None,
            None,
            None,
            None,
            &self.options.logging,
            self.sink.as_ref(),
        );
        self.sink.outbound(MSG_REQUEST_SENT, &meta);
        self.events.emit(&SyncEvent::Sync {
            settings: settings.clone(),
        });
    }

    fn notify_success(
        &self,
        data: &Value,
        settings: &RequestConfig,
        status: u16,
        response_time: f64,
    ) {
        if let Some(hook) = self.options.hooks.success.as_deref() {
            hook(&SuccessHook {
                data,
                settings,
                status,
                response_time,
            });
        }
        let meta = LogMeta::build(
            settings,
            Some(status),
            Some(response_time),
            None,
            None,
            &self.options.logging,
            self.sink.as_ref(),
        );
        self.sink.outbound(MSG_REQUEST_SUCCESS, &meta);
        self.events.emit(&SyncEvent::Success {
            data: data.clone(),
            settings: settings.clone(),
            status,
            response_time,
        });
    }

    fn notify_fail(
        &self,
        error: &ModelError,
        data: Option<&Value>,
        settings: &RequestConfig,
        status: Option<u16>,
        response_time: f64,
    ) {
        if let Some(hook) = self.options.hooks.fail.as_deref() {
            hook(&FailHook {
                settings,
                status,
                response_time,
                err: error,
                data,
            });
        }
        let meta = LogMeta::build(
            settings,
            status,
            Some(response_time),
            Some(error),
            data,
            &self.options.logging,
            self.sink.as_ref(),
        );
        self.sink.outbound(MSG_REQUEST_FAILED, &meta);
        self.events.emit(&SyncEvent::Fail {
            error: error.clone(),
            data: data.cloned(),
            settings: settings.clone(),
            status,
            response_time,
        });
    }
}

/// Elapsed time in fractional milliseconds, rounded to 3 decimal digits.
fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000_000.0).round() / 1_000.0
}
