//! Lifecycle hook callbacks.
//!
//! Hooks are configured callbacks invoked synchronously at fixed points in
//! the dispatch lifecycle, before the log formatter and the event emitter.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ModelError;
use crate::request::RequestConfig;

/// Context handed to the sync hook before a request is sent.
#[derive(Debug)]
pub struct SyncHook<'a> {
    /// The fully-built request descriptor.
    pub settings: &'a RequestConfig,
}

/// Context handed to the success hook after a successful call.
#[derive(Debug)]
pub struct SuccessHook<'a> {
    /// Parsed response data.
    pub data: &'a Value,
    /// The request descriptor that produced this outcome.
    pub settings: &'a RequestConfig,
    /// HTTP status code.
    pub status: u16,
    /// Elapsed time in fractional milliseconds.
    pub response_time: f64,
}

/// Context handed to the fail hook after a failed call.
#[derive(Debug)]
pub struct FailHook<'a> {
    /// The request descriptor that produced this outcome.
    pub settings: &'a RequestConfig,
    /// HTTP status code, when one was observed.
    pub status: Option<u16>,
    /// Elapsed time in fractional milliseconds.
    pub response_time: f64,
    /// The classified error.
    pub err: &'a ModelError,
    /// Raw response data, present for HTTP-status errors.
    pub data: Option<&'a Value>,
}

/// Callback type for the sync hook.
pub type SyncHookFn = Arc<dyn for<'a> Fn(&SyncHook<'a>) + Send + Sync>;
/// Callback type for the success hook.
pub type SuccessHookFn = Arc<dyn for<'a> Fn(&SuccessHook<'a>) + Send + Sync>;
/// Callback type for the fail hook.
pub type FailHookFn = Arc<dyn for<'a> Fn(&FailHook<'a>) + Send + Sync>;

/// Optional lifecycle callbacks, one per outcome.
#[derive(Clone, Default)]
pub struct Hooks {
    pub sync: Option<SyncHookFn>,
    pub success: Option<SuccessHookFn>,
    pub fail: Option<FailHookFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback invoked before every request is sent.
    pub fn on_sync<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&SyncHook<'a>) + Send + Sync + 'static,
    {
        self.sync = Some(Arc::new(hook));
        self
    }

    /// Set the callback invoked on every successful outcome.
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&SuccessHook<'a>) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(hook));
        self
    }

    /// Set the callback invoked on every failed outcome.
    pub fn on_fail<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&FailHook<'a>) + Send + Sync + 'static,
    {
        self.fail = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("sync", &self.sync.is_some())
            .field("success", &self.success.is_some())
            .field("fail", &self.fail.is_some())
            .finish()
    }
}
