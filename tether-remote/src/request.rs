//! Request descriptor construction.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use tracing::warn;

use crate::adapter::SyncAdapter;
use crate::config::{Auth, ModelOptions, PhaseTimeouts, Timeout, UrlSpec};
use crate::error::ModelError;
use crate::proxy::{ProxyAgent, ProxySpec};

/// Method-specific starting point for a request, supplied by the public
/// operations.
#[derive(Debug, Clone, Default)]
pub struct RequestSeed {
    pub method: Method,
    /// JSON body, if the operation carries one.
    pub json: Option<Value>,
}

impl RequestSeed {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            json: None,
        }
    }

    pub fn post(json: Value) -> Self {
        Self {
            method: Method::POST,
            json: Some(json),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            json: None,
        }
    }
}

/// Per-call overrides accepted by the public operations.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Method override, e.g. PUT instead of POST for `save`.
    pub method: Option<Method>,
    /// URL override, a full URL or parts merged over the configured base.
    pub url: Option<UrlSpec>,
    pub timeout: Option<Timeout>,
    pub auth: Option<Auth>,
    pub proxy: Option<ProxySpec>,
    /// Headers overlaid onto the model's static headers.
    pub headers: Vec<(String, String)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, url: impl Into<UrlSpec>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    pub fn auth(mut self, auth: impl Into<Auth>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<ProxySpec>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Fully-resolved parameters for one HTTP call.
///
/// Carries only normalized products: auth becomes `username`/`password`, a
/// proxy becomes `agent`. The raw specs never appear on the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    /// Merged headers, present only when non-empty.
    pub headers: Option<HeaderMap>,
    /// JSON body, if any.
    pub json: Option<Value>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-phase timeout thresholds in milliseconds.
    pub timeout: PhaseTimeouts,
    /// Proxy agent, keyed by the target URL's protocol family.
    pub agent: Option<ProxyAgent>,
}

impl RequestConfig {
    /// Build a descriptor from the seed, the model options, and the
    /// per-call overrides. Deterministic and side-effect free; inputs are
    /// never mutated.
    pub fn build(
        seed: RequestSeed,
        options: &ModelOptions,
        args: &CallArgs,
        adapter: &dyn SyncAdapter,
    ) -> Result<Self, ModelError> {
        let url = adapter.url(args.url.as_ref(), options.url.as_ref())?;
        let timeout = adapter.timeout(args.timeout, options.timeout);

        let credentials = adapter.auth(args.auth.as_ref(), options.auth.as_ref());
        let (username, password) = match credentials {
            Some(credentials) => (Some(credentials.username), Some(credentials.password)),
            None => (None, None),
        };

        let agent = adapter.proxy(
            args.proxy.as_ref(),
            options.proxy.as_ref(),
            Some(&url),
            &options.headers,
        )?;

        let headers = merge_headers(&options.headers, &args.headers);
        let method = args.method.clone().unwrap_or(seed.method);

        Ok(Self {
            method,
            url,
            headers,
            json: seed.json,
            username,
            password,
            timeout,
            agent,
        })
    }
}

/// Merge the model's static headers with per-call headers; the per-call
/// side wins on collision. Invalid header names or values are skipped.
fn merge_headers(base: &[(String, String)], overlay: &[(String, String)]) -> Option<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in base.iter().chain(overlay.iter()) {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(target: "tether::remote", header = %name, "skipping invalid header"),
        }
    }
    if headers.is_empty() {
        None
    } else {
        Some(headers)
    }
}
