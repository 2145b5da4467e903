//! # Tether Remote
//!
//! HTTP synchronization for Tether attribute models. A [`RemoteModel`]
//! wraps a local attribute bag and keeps it in step with a remote endpoint
//! through `fetch` (GET), `save` (POST/PUT), and `delete` (DELETE), each a
//! single request attempt with a uniform notification protocol (hooks, log
//! records, events) for every outcome.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether_remote::{ModelOptions, RemoteModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ModelOptions::builder()
//!         .url("https://api.example.com/profile")
//!         .timeout(5_000u64)
//!         .build();
//!     let model = RemoteModel::new(options);
//!
//!     let outcome = model.fetch().await?;
//!     println!("fetched in {} ms: {}", outcome.response_time, outcome.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration polymorphism
//!
//! Loosely-typed inputs are tagged unions with explicit normalization: a
//! timeout is a single number expanded to every connection phase or a
//! per-phase mapping passed through; auth is a `"user:pass"` string or a
//! credentials pair; a URL is a full string or parts merged over the
//! configured base; a proxy is a bare URI or a config with agent options.
//!
//! ## Extension points
//!
//! The transport, the request/response adapter, and the log sink are all
//! trait objects replaceable on construction:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::Value;
//! use tether_model::Model;
//! use tether_remote::{ModelError, ModelOptions, RemoteModel, SyncAdapter};
//!
//! struct Enveloped;
//!
//! impl SyncAdapter for Enveloped {
//!     fn parse(&self, model: &Model, data: Value) -> Result<Value, ModelError> {
//!         let inner = data.get("payload").cloned().unwrap_or(data);
//!         if let Value::Object(map) = &inner {
//!             model.set_many(map.clone());
//!         }
//!         Ok(inner)
//!     }
//! }
//!
//! let model = RemoteModel::new(ModelOptions::default()).with_adapter(Arc::new(Enveloped));
//! ```

mod adapter;
mod client;
mod config;
mod error;
mod events;
mod hooks;
mod logging;
mod proxy;
mod request;
mod response;
mod transport;

pub use adapter::{DefaultAdapter, SyncAdapter};
pub use client::RemoteModel;
pub use config::{
    Auth, Credentials, ModelOptions, ModelOptionsBuilder, PhaseTimeouts, Timeout, UrlParts,
    UrlSpec, DEFAULT_TIMEOUT_MS,
};
pub use error::{ModelError, SyncFailure, SyncResult};
pub use events::SyncEvent;
pub use hooks::{FailHook, Hooks, SuccessHook, SyncHook};
pub use logging::{
    LogMeta, LogSink, TracingSink, MSG_REQUEST_FAILED, MSG_REQUEST_SENT, MSG_REQUEST_SUCCESS,
};
pub use proxy::{AgentOptions, AgentScheme, ProxyAgent, ProxyConfig, ProxySpec};
pub use request::{CallArgs, RequestConfig, RequestSeed};
pub use response::SyncOutcome;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

// Re-export common types.
pub use http::{Method, StatusCode};
pub use tether_model::{ChangeEvent, Model};

/// Prelude for common imports.
///
/// ```
/// use tether_remote::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::{DefaultAdapter, SyncAdapter};
    pub use crate::client::RemoteModel;
    pub use crate::config::{Auth, ModelOptions, PhaseTimeouts, Timeout, UrlParts, UrlSpec};
    pub use crate::error::{ModelError, SyncFailure, SyncResult};
    pub use crate::events::SyncEvent;
    pub use crate::hooks::Hooks;
    pub use crate::logging::{LogMeta, LogSink, TracingSink};
    pub use crate::proxy::{ProxyAgent, ProxySpec};
    pub use crate::request::{CallArgs, RequestConfig, RequestSeed};
    pub use crate::response::SyncOutcome;
    pub use crate::transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
    pub use http::{Method, StatusCode};
    pub use tether_model::{ChangeEvent, Model};
}
