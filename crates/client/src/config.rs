//! Connection context: where requests go and how they are sent.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryConfig;

/// Forward proxy settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ProxyConfig {
    /// An unauthenticated proxy.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            user: None,
            password: None,
        }
    }

    /// Authenticate against the proxy with basic credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// The proxy URL handed to the HTTP client.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Base URL, access key, proxy and retry settings shared by requests.
///
/// Built once per environment and shared read-only (usually behind an
/// `Arc`). The access key is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    base_url: String,
    access_key: String,
    /// Optional forward proxy.
    pub proxy: Option<ProxyConfig>,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("base_url", &self.base_url)
            .field("access_key", &"[REDACTED]")
            .field("proxy", &self.proxy)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionContext {
    /// Create a context with default retry and timeout settings.
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Result<Self> {
        Self::builder(base_url, access_key).build()
    }

    /// Create a new context builder.
    pub fn builder(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
    ) -> ConnectionContextBuilder {
        ConnectionContextBuilder {
            context: ConnectionContext {
                base_url: base_url.into(),
                access_key: access_key.into(),
                proxy: None,
                retry: RetryConfig::default(),
                timeout: Duration::from_secs(60),
                connect_timeout: Duration::from_secs(10),
                user_agent: crate::USER_AGENT.to_string(),
            },
        }
    }

    /// Get the base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the access key.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Replace the base URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        self.base_url = normalize_base_url(base_url.into())?;
        Ok(())
    }

    /// Replace the access key.
    pub fn set_access_key(&mut self, access_key: impl Into<String>) {
        self.access_key = access_key.into();
    }

    /// Build the full URL for a service path.
    ///
    /// Example: `service_url("render")` -> `https://host/api/render`
    pub fn service_url(&self, service: &str) -> String {
        format!("{}/{}", self.base_url, service.trim_start_matches('/'))
    }
}

/// Builder for [`ConnectionContext`].
#[derive(Debug)]
pub struct ConnectionContextBuilder {
    context: ConnectionContext,
}

impl ConnectionContextBuilder {
    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.context.retry = retry;
        self
    }

    /// Disable retries.
    pub fn without_retry(mut self) -> Self {
        self.context.retry = RetryConfig::no_retry();
        self
    }

    /// Route requests through a proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.context.proxy = Some(proxy);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.context.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.context.connect_timeout = timeout;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.context.user_agent = user_agent.into();
        self
    }

    /// Validate the base URL and build the context.
    pub fn build(mut self) -> Result<ConnectionContext> {
        self.context.base_url = normalize_base_url(std::mem::take(&mut self.context.base_url))?;
        Ok(self.context)
    }
}

fn normalize_base_url(base_url: String) -> Result<String> {
    let parsed = url::Url::parse(&base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::new(ErrorKind::Config(format!(
            "Unsupported URL scheme: {}",
            parsed.scheme()
        ))));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}
