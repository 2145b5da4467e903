//! Model options and the pure config normalizers.
//!
//! Loosely-typed configuration inputs (a URL that is a string or a bag of
//! parts, auth that is a `"user:pass"` string or a credentials pair, a
//! timeout that is one number or a per-phase mapping) are represented as
//! tagged unions with explicit normalization methods. Each normalizer is a
//! pure function of its inputs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ModelError;
use crate::hooks::Hooks;
use crate::proxy::ProxySpec;

/// Timeout applied when neither the call nor the model configures one.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Request URL, either a full string or parts merged over a base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlSpec {
    /// A complete URL string, used as-is.
    Full(String),
    /// URL parts applied over the configured base URL.
    Parts(UrlParts),
}

/// Overridable pieces of a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlParts {
    /// Scheme, with or without a trailing colon.
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    /// Query pairs appended to the final URL.
    #[serde(default)]
    pub query: Vec<(String, String)>,
}

impl UrlParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Build a URL from these parts alone. Requires a hostname; the scheme
    /// defaults to `http`.
    fn build(&self) -> Result<String, ModelError> {
        let protocol = self
            .protocol
            .as_deref()
            .map(|p| p.trim_end_matches(':'))
            .unwrap_or("http");
        let hostname = self
            .hostname
            .as_deref()
            .ok_or_else(|| ModelError::InvalidUrl("url parts missing hostname".to_string()))?;
        let base = Url::parse(&format!("{protocol}://{hostname}"))
            .map_err(|e| ModelError::InvalidUrl(e.to_string()))?;
        self.apply_to(base)
    }

    /// Apply these parts over an already-parsed base URL.
    fn apply_to(&self, mut url: Url) -> Result<String, ModelError> {
        if let Some(protocol) = &self.protocol {
            let scheme = protocol.trim_end_matches(':');
            url.set_scheme(scheme)
                .map_err(|_| ModelError::InvalidUrl(format!("invalid scheme: {protocol}")))?;
        }
        if let Some(hostname) = &self.hostname {
            url.set_host(Some(hostname))
                .map_err(|e| ModelError::InvalidUrl(e.to_string()))?;
        }
        if let Some(port) = self.port {
            url.set_port(Some(port))
                .map_err(|_| ModelError::InvalidUrl("cannot set port on url".to_string()))?;
        }
        if let Some(path) = &self.path {
            url.set_path(path);
        }
        for (key, value) in &self.query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url.into())
    }
}

impl UrlSpec {
    /// Resolve the final URL string: the explicit spec wins over the
    /// configured one, and parts merge over the configured base.
    pub fn resolve(
        explicit: Option<&UrlSpec>,
        configured: Option<&UrlSpec>,
    ) -> Result<String, ModelError> {
        match (explicit, configured) {
            (Some(UrlSpec::Full(url)), _) => Ok(url.clone()),
            (Some(UrlSpec::Parts(parts)), Some(base)) => parts.apply_to(base.to_base()?),
            (Some(UrlSpec::Parts(parts)), None) => parts.build(),
            (None, Some(UrlSpec::Full(url))) => Ok(url.clone()),
            (None, Some(UrlSpec::Parts(parts))) => parts.build(),
            (None, None) => Err(ModelError::InvalidUrl("no url configured".to_string())),
        }
    }

    fn to_base(&self) -> Result<Url, ModelError> {
        let raw = match self {
            UrlSpec::Full(url) => url.clone(),
            UrlSpec::Parts(parts) => parts.build()?,
        };
        Url::parse(&raw).map_err(|e| ModelError::InvalidUrl(e.to_string()))
    }
}

impl From<&str> for UrlSpec {
    fn from(url: &str) -> Self {
        Self::Full(url.to_string())
    }
}

impl From<String> for UrlSpec {
    fn from(url: String) -> Self {
        Self::Full(url)
    }
}

impl From<UrlParts> for UrlSpec {
    fn from(parts: UrlParts) -> Self {
        Self::Parts(parts)
    }
}

/// Auth input, either a `"user:pass"` string or an explicit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Auth {
    /// `"user:pass"` form. Only the first colon splits the username; the
    /// remainder, colons included, is the password.
    Userinfo(String),
    /// Explicit credentials.
    Credentials(Credentials),
}

/// Normalized auth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(alias = "user")]
    pub username: String,
    #[serde(alias = "pass")]
    pub password: String,
}

impl Auth {
    /// Normalize to a credentials pair.
    pub fn normalize(&self) -> Credentials {
        match self {
            Auth::Userinfo(userinfo) => {
                let (username, password) = userinfo
                    .split_once(':')
                    .unwrap_or((userinfo.as_str(), ""));
                Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                }
            }
            Auth::Credentials(credentials) => credentials.clone(),
        }
    }

    /// Resolve credentials, or `None` when no auth is configured anywhere.
    pub fn resolve(explicit: Option<&Auth>, configured: Option<&Auth>) -> Option<Credentials> {
        explicit.or(configured).map(Auth::normalize)
    }
}

impl From<&str> for Auth {
    fn from(userinfo: &str) -> Self {
        Self::Userinfo(userinfo.to_string())
    }
}

impl From<(&str, &str)> for Auth {
    fn from((username, password): (&str, &str)) -> Self {
        Self::Credentials(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Timeout input, one number for every phase or an explicit mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timeout {
    /// One millisecond value applied identically to every phase.
    Millis(u64),
    /// A prebuilt per-phase mapping, passed through unchanged.
    PerPhase(PhaseTimeouts),
}

/// Millisecond thresholds per connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimeouts {
    pub lookup: u64,
    pub connect: u64,
    pub secure_connect: u64,
    pub socket: u64,
    pub send: u64,
    pub response: u64,
}

impl PhaseTimeouts {
    /// The same threshold for every phase.
    pub fn uniform(millis: u64) -> Self {
        Self {
            lookup: millis,
            connect: millis,
            secure_connect: millis,
            socket: millis,
            send: millis,
            response: millis,
        }
    }
}

impl Timeout {
    /// Resolve the effective timeout: explicit, else configured, else the
    /// 60 second default.
    pub fn resolve(explicit: Option<Timeout>, configured: Option<Timeout>) -> Timeout {
        explicit
            .or(configured)
            .unwrap_or(Timeout::Millis(DEFAULT_TIMEOUT_MS))
    }

    /// Expand to per-phase thresholds.
    pub fn normalize(self) -> PhaseTimeouts {
        match self {
            Timeout::Millis(millis) => PhaseTimeouts::uniform(millis),
            Timeout::PerPhase(phases) => phases,
        }
    }
}

impl From<u64> for Timeout {
    fn from(millis: u64) -> Self {
        Self::Millis(millis)
    }
}

impl From<PhaseTimeouts> for Timeout {
    fn from(phases: PhaseTimeouts) -> Self {
        Self::PerPhase(phases)
    }
}

/// Configuration for a remote model.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Default request URL.
    pub url: Option<UrlSpec>,
    /// Default timeout.
    pub timeout: Option<Timeout>,
    /// Default auth credentials.
    pub auth: Option<Auth>,
    /// Default proxy.
    pub proxy: Option<ProxySpec>,
    /// Static headers sent with every request.
    pub headers: Vec<(String, String)>,
    /// Label identifying this model in log output.
    pub label: String,
    /// Static metadata merged into every log record.
    pub logging: Map<String, Value>,
    /// Lifecycle hook callbacks.
    pub hooks: Hooks,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            url: None,
            timeout: None,
            auth: None,
            proxy: None,
            headers: Vec::new(),
            label: "remote-model".to_string(),
            logging: Map::new(),
            hooks: Hooks::default(),
        }
    }
}

impl ModelOptions {
    /// Create an options builder.
    pub fn builder() -> ModelOptionsBuilder {
        ModelOptionsBuilder::default()
    }
}

/// Builder for [`ModelOptions`].
#[derive(Debug, Default)]
pub struct ModelOptionsBuilder {
    options: ModelOptions,
}

impl ModelOptionsBuilder {
    /// Set the default request URL.
    pub fn url(mut self, url: impl Into<UrlSpec>) -> Self {
        self.options.url = Some(url.into());
        self
    }

    /// Set the default timeout.
    pub fn timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.options.timeout = Some(timeout.into());
        self
    }

    /// Set the default auth credentials.
    pub fn auth(mut self, auth: impl Into<Auth>) -> Self {
        self.options.auth = Some(auth.into());
        self
    }

    /// Set the default proxy.
    pub fn proxy(mut self, proxy: impl Into<ProxySpec>) -> Self {
        self.options.proxy = Some(proxy.into());
        self
    }

    /// Add a static header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.push((name.into(), value.into()));
        self
    }

    /// Set the log label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.options.label = label.into();
        self
    }

    /// Add a static metadata field merged into every log record.
    pub fn logging(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.logging.insert(key.into(), value.into());
        self
    }

    /// Set the lifecycle hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.options.hooks = hooks;
        self
    }

    /// Build the options.
    pub fn build(self) -> ModelOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_timeout_expands_to_every_phase() {
        let phases = Timeout::Millis(100).normalize();
        assert_eq!(phases, PhaseTimeouts::uniform(100));
        assert_eq!(phases.lookup, 100);
        assert_eq!(phases.connect, 100);
        assert_eq!(phases.secure_connect, 100);
        assert_eq!(phases.socket, 100);
        assert_eq!(phases.send, 100);
        assert_eq!(phases.response, 100);
    }

    #[test]
    fn per_phase_timeout_passes_through_unchanged() {
        let phases = PhaseTimeouts {
            lookup: 1,
            connect: 2,
            secure_connect: 3,
            socket: 4,
            send: 5,
            response: 6,
        };
        assert_eq!(Timeout::PerPhase(phases).normalize(), phases);
    }

    #[test]
    fn timeout_resolution_prefers_explicit_then_configured_then_default() {
        assert_eq!(
            Timeout::resolve(Some(Timeout::Millis(1)), Some(Timeout::Millis(2))),
            Timeout::Millis(1)
        );
        assert_eq!(
            Timeout::resolve(None, Some(Timeout::Millis(2))),
            Timeout::Millis(2)
        );
        assert_eq!(
            Timeout::resolve(None, None),
            Timeout::Millis(DEFAULT_TIMEOUT_MS)
        );
    }

    #[test]
    fn auth_string_splits_on_first_colon_only() {
        let credentials = Auth::from("u:p:q").normalize();
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p:q");
    }

    #[test]
    fn auth_string_without_colon_has_empty_password() {
        let credentials = Auth::from("user").normalize();
        assert_eq!(credentials.username, "user");
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn auth_pair_passes_through() {
        let credentials = Auth::from(("user", "pass")).normalize();
        assert_eq!(credentials.username, "user");
        assert_eq!(credentials.password, "pass");
    }

    #[test]
    fn auth_resolution_returns_none_when_unconfigured() {
        assert_eq!(Auth::resolve(None, None), None);

        let configured = Auth::from("a:b");
        let explicit = Auth::from("c:d");
        assert_eq!(
            Auth::resolve(None, Some(&configured)).unwrap().username,
            "a"
        );
        assert_eq!(
            Auth::resolve(Some(&explicit), Some(&configured))
                .unwrap()
                .username,
            "c"
        );
    }

    #[test]
    fn auth_object_accepts_user_pass_aliases() {
        let auth: Auth = serde_json::from_str(r#"{ "user": "u", "pass": "p" }"#).unwrap();
        let credentials = auth.normalize();
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
    }

    #[test]
    fn url_resolution_returns_configured_string() {
        let configured = UrlSpec::from("http://example.com/");
        assert_eq!(
            UrlSpec::resolve(None, Some(&configured)).unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn url_parts_extend_the_configured_base() {
        let configured = UrlSpec::from("http://example.com");
        let parts = UrlParts::new().port(3000).query("foo", "bar");
        let resolved = UrlSpec::resolve(Some(&UrlSpec::Parts(parts)), Some(&configured)).unwrap();
        assert_eq!(resolved, "http://example.com:3000/?foo=bar");
    }

    #[test]
    fn url_parts_build_standalone_urls() {
        let parts = UrlParts::new()
            .protocol("http:")
            .hostname("proxy-example.com")
            .port(1234)
            .path("/");
        let resolved = UrlSpec::resolve(Some(&UrlSpec::Parts(parts)), None).unwrap();
        assert_eq!(resolved, "http://proxy-example.com:1234/");
    }

    #[test]
    fn url_resolution_fails_without_any_url() {
        assert!(matches!(
            UrlSpec::resolve(None, None),
            Err(ModelError::InvalidUrl(_))
        ));
    }

    #[test]
    fn explicit_full_url_wins_over_configured() {
        let configured = UrlSpec::from("http://example.com/");
        let explicit = UrlSpec::from("http://other.test/");
        assert_eq!(
            UrlSpec::resolve(Some(&explicit), Some(&configured)).unwrap(),
            "http://other.test/"
        );
    }

    #[test]
    fn default_options_carry_the_default_label() {
        let options = ModelOptions::default();
        assert_eq!(options.label, "remote-model");
        assert!(options.url.is_none());
        assert!(options.headers.is_empty());
    }

    #[test]
    fn builder_collects_headers_and_logging_metadata() {
        let options = ModelOptions::builder()
            .url("http://example.com/")
            .timeout(5_000u64)
            .auth("user:pass")
            .header("X-Api-Key", "secret")
            .label("orders-api")
            .logging("service", "orders")
            .build();

        assert_eq!(options.url, Some(UrlSpec::from("http://example.com/")));
        assert_eq!(options.timeout, Some(Timeout::Millis(5_000)));
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.label, "orders-api");
        assert_eq!(options.logging.get("service"), Some(&"orders".into()));
    }
}
