//! Proxy agent selection.
//!
//! The agent scheme is chosen by inspecting the target URL's scheme, not the
//! proxy's own: `https:` targets get an HTTPS agent entry, everything else an
//! HTTP one. The resulting [`ProxyAgent`] rides on the request descriptor so
//! the transport can pick the correct agent per protocol.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ModelError;

/// Proxy input, a bare proxy URI or a config with agent options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxySpec {
    /// A bare proxy URI.
    Uri(String),
    /// Proxy URI plus agent options.
    Config(ProxyConfig),
}

/// Proxy configuration with optional agent overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URI.
    pub uri: String,
    /// Headers handed to the agent. Defaults to the model's own headers.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Keep-alive override. Defaults to disabled.
    #[serde(default)]
    pub keep_alive: Option<bool>,
    /// Socket cap override. Defaults to 1.
    #[serde(default)]
    pub max_sockets: Option<usize>,
}

/// Which protocol family an agent serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentScheme {
    Http,
    Https,
}

impl AgentScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentScheme::Http => "http",
            AgentScheme::Https => "https",
        }
    }
}

/// Options applied when the transport constructs the proxied connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Whether connections may be reused.
    pub keep_alive: bool,
    /// Maximum concurrent sockets through this agent.
    pub max_sockets: usize,
    /// Headers sent to the proxy.
    pub headers: Vec<(String, String)>,
}

/// A scheme-keyed proxy agent for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyAgent {
    /// The protocol family this agent is bound to, selected from the
    /// target URL's scheme.
    pub scheme: AgentScheme,
    /// Parsed proxy URI.
    pub uri: Url,
    /// Agent construction options.
    pub options: AgentOptions,
}

impl ProxySpec {
    /// Resolve a proxy agent for the given target URL.
    ///
    /// Returns `None` when no proxy is configured anywhere or no target URL
    /// is available. Fails when the proxy or target URL cannot be parsed.
    pub fn resolve(
        explicit: Option<&ProxySpec>,
        configured: Option<&ProxySpec>,
        target_url: Option<&str>,
        model_headers: &[(String, String)],
    ) -> Result<Option<ProxyAgent>, ModelError> {
        let (Some(spec), Some(target)) = (explicit.or(configured), target_url) else {
            return Ok(None);
        };

        let config = spec.config();
        let uri = Url::parse(&config.uri)
            .map_err(|e| ModelError::InvalidUrl(format!("invalid proxy uri: {e}")))?;
        let target = Url::parse(target).map_err(|e| ModelError::InvalidUrl(e.to_string()))?;

        let scheme = if target.scheme() == "https" {
            AgentScheme::Https
        } else {
            AgentScheme::Http
        };

        let headers = if config.headers.is_empty() {
            model_headers.to_vec()
        } else {
            config.headers
        };

        Ok(Some(ProxyAgent {
            scheme,
            uri,
            options: AgentOptions {
                keep_alive: config.keep_alive.unwrap_or(false),
                max_sockets: config.max_sockets.unwrap_or(1),
                headers,
            },
        }))
    }

    fn config(&self) -> ProxyConfig {
        match self {
            ProxySpec::Uri(uri) => ProxyConfig {
                uri: uri.clone(),
                ..ProxyConfig::default()
            },
            ProxySpec::Config(config) => config.clone(),
        }
    }
}

impl From<&str> for ProxySpec {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_string())
    }
}

impl From<ProxyConfig> for ProxySpec {
    fn from(config: ProxyConfig) -> Self {
        Self::Config(config)
    }
}
