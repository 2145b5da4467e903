//! HTTP transport abstraction.
//!
//! The pipeline talks to the network through the [`Transport`] trait so
//! tests can substitute an in-memory implementation. The default transport
//! is backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::proxy::AgentScheme;
use crate::request::RequestConfig;

/// Raw response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport-level failure.
///
/// Transports that treat non-2xx/3xx statuses as errors attach the carried
/// response; the dispatcher redirects it into the response interpreter
/// exactly as a success would. A pure network or timeout failure carries no
/// response, optionally a status code.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
    pub response: Option<TransportResponse>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            response: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_response(mut self, response: TransportResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// An HTTP client capable of executing a [`RequestConfig`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestConfig) -> Result<TransportResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
///
/// A client is built per call because the proxy agent and timeout
/// thresholds vary per request. Of the per-phase thresholds the underlying
/// client exposes two: `connect` maps to the connection timeout and
/// `response` to the overall request timeout. The agent's keep-alive flag
/// maps to connection pooling; the socket cap and proxy headers stay on the
/// descriptor for transports that can honor them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }

    fn client(&self, request: &RequestConfig) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(request.timeout.connect))
            .timeout(Duration::from_millis(request.timeout.response));

        if let Some(agent) = &request.agent {
            let proxy = match agent.scheme {
                AgentScheme::Https => reqwest::Proxy::https(agent.uri.as_str()),
                AgentScheme::Http => reqwest::Proxy::http(agent.uri.as_str()),
            }
            .map_err(|e| TransportError::new(e.to_string()))?;
            builder = builder.proxy(proxy);
            if !agent.options.keep_alive {
                builder = builder.pool_max_idle_per_host(0);
            }
        }

        builder.build().map_err(|e| TransportError::new(e.to_string()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestConfig) -> Result<TransportResponse, TransportError> {
        let client = self.client(request)?;

        let mut outgoing = client.request(request.method.clone(), &request.url);
        if let Some(headers) = &request.headers {
            outgoing = outgoing.headers(headers.clone());
        }
        if let Some(username) = &request.username {
            outgoing = outgoing.basic_auth(username, request.password.as_deref());
        }
        if let Some(json) = &request.json {
            outgoing = outgoing.json(json);
        }

        let response = outgoing.send().await.map_err(|e| TransportError {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
            response: None,
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()).with_status(status))?;

        Ok(TransportResponse { status, body })
    }
}
