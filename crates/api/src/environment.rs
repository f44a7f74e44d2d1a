//! Environment loading: builds the shared connection context.
//!
//! This is the only place that reads process environment variables. The
//! resulting [`Environment`] is passed explicitly to endpoint constructors.

use std::sync::Arc;
use std::time::Duration;

use docgen_client::{ConnectionContext, Error, ErrorKind, ProxyConfig, Result, RetryConfig};
use tracing::debug;

/// Service base URL, e.g. `https://dws.example.com/api`.
pub const ENV_URL: &str = "DOCGEN_URL";
pub const ENV_ACCESS_KEY: &str = "DOCGEN_ACCESS_KEY";
pub const ENV_MAX_TRIES: &str = "DOCGEN_MAX_TRIES";
pub const ENV_RETRY_DELAY_MS: &str = "DOCGEN_RETRY_DELAY_MS";
pub const ENV_PROXY_HOST: &str = "DOCGEN_PROXY_HOST";
pub const ENV_PROXY_PORT: &str = "DOCGEN_PROXY_PORT";
pub const ENV_PROXY_USER: &str = "DOCGEN_PROXY_USER";
pub const ENV_PROXY_PASSWORD: &str = "DOCGEN_PROXY_PASSWORD";

/// A named deployment of the service and its default connection context.
#[derive(Debug, Clone)]
pub struct Environment {
    context: Arc<ConnectionContext>,
}

impl Environment {
    /// Wrap an explicitly built context.
    pub fn new(context: ConnectionContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// Load from `DOCGEN_*` environment variables.
    ///
    /// `DOCGEN_URL` and `DOCGEN_ACCESS_KEY` are required. Retry and proxy
    /// settings are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::new(ErrorKind::Config(format!("{name} is not set"))))
        };

        let url = required(ENV_URL)?;
        let access_key = required(ENV_ACCESS_KEY)?;

        let mut retry = RetryConfig::default();
        if let Some(tries) = lookup(ENV_MAX_TRIES) {
            retry = retry.with_max_tries(parse_number(ENV_MAX_TRIES, &tries)?);
        }
        if let Some(delay) = lookup(ENV_RETRY_DELAY_MS) {
            retry = retry.with_retry_delay(Duration::from_millis(parse_number(
                ENV_RETRY_DELAY_MS,
                &delay,
            )?));
        }

        let mut builder = ConnectionContext::builder(url, access_key).with_retry(retry);

        if let Some(host) = lookup(ENV_PROXY_HOST).filter(|h| !h.is_empty()) {
            let port = match lookup(ENV_PROXY_PORT) {
                Some(port) => parse_number(ENV_PROXY_PORT, &port)?,
                None => 80,
            };
            let mut proxy = ProxyConfig::new(host, port);
            if let (Some(user), Some(password)) = (lookup(ENV_PROXY_USER), lookup(ENV_PROXY_PASSWORD))
            {
                proxy = proxy.with_credentials(user, password);
            }
            builder = builder.with_proxy(proxy);
        }

        let context = builder.build()?;
        debug!(
            base_url = context.base_url(),
            max_tries = context.retry.max_tries,
            proxy = context.proxy.is_some(),
            "Loaded environment"
        );
        Ok(Self::new(context))
    }

    /// Shared handle to the default context, for endpoint constructors.
    pub fn context(&self) -> Arc<ConnectionContext> {
        Arc::clone(&self.context)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        Error::new(ErrorKind::Config(format!("{name} is not a valid number: {e}")))
    })
}
