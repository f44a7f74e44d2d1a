//! HTTP execution engine: POST with bounded retries and outcome classification.
//!
//! Each try ends in one of three states:
//! - **success**: status 200; the endpoint's extractor reads the body.
//! - **transient failure**: a transport error or a 5xx status. Retried after
//!   a fixed delay while tries remain.
//! - **terminal failure**: any other status, or a 5xx on the last try.
//!   Returned as a response, never as an error.
//!
//! Transport errors on the last try have no status to report and surface as
//! [`ErrorKind::RetriesExhausted`], carrying the previous try's diagnostics.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use crate::config::ConnectionContext;
use crate::error::{Error, ErrorKind, Result};
use crate::payload::Payload;
use crate::response::{
    parse_error_body, sanitize_error_message, MutableResponse, PreviousFailureInformation,
    STATUS_OK,
};
use crate::retry::{RetryConfig, RetryPolicy};

/// Raw HTTP response handed to extractors.
pub type HttpResponse = reqwest::blocking::Response;

/// Returns true for statuses worth another try.
pub fn is_transient_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// Blocking HTTP client that runs one request to completion, retries
/// included, on the calling thread.
#[derive(Debug, Clone)]
pub struct DocgenHttpClient {
    inner: reqwest::blocking::Client,
    retry: RetryConfig,
}

impl DocgenHttpClient {
    /// Build a client from a connection context (timeouts, proxy, retries).
    pub fn new(context: &ConnectionContext) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(context.timeout)
            .connect_timeout(context.connect_timeout)
            .user_agent(context.user_agent.as_str());

        if let Some(ref proxy) = context.proxy {
            let mut upstream = reqwest::Proxy::all(proxy.url())
                .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
            if let (Some(user), Some(password)) = (&proxy.user, &proxy.password) {
                upstream = upstream.basic_auth(user, password);
            }
            builder = builder.proxy(upstream);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            retry: context.retry.clone(),
        })
    }

    /// Get the retry configuration.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// POST `payload` to `url` until it succeeds, fails terminally, or runs
    /// out of tries.
    ///
    /// On 200 the response is passed to `extract`. If the extractor keeps a
    /// document stream open, this client moves into the response so the
    /// connection lives until the caller cleans up. A 200 whose body breaks
    /// off while `extract` reads it is retried like any transport failure.
    #[instrument(skip(self, payload, extract), fields(url = %url, max_tries = self.retry.max_tries))]
    pub fn execute<F>(self, url: &str, payload: &Payload, extract: F) -> Result<MutableResponse>
    where
        F: Fn(HttpResponse, &mut MutableResponse) -> Result<()>,
    {
        let mut policy = RetryPolicy::new(self.retry.clone());
        let mut previous: Option<PreviousFailureInformation> = None;

        loop {
            let tries = policy.tries();
            debug!(tries, "Sending request");

            let err = match self.send_once(url, payload) {
                Ok(http) => {
                    let status = http.status();
                    let code = status.as_u16();

                    if code == STATUS_OK {
                        debug!(tries, content_length = http.content_length(), "Request succeeded");
                        let mut response = MutableResponse {
                            status: code,
                            tries,
                            previous_failure: previous.clone(),
                            ..Default::default()
                        };
                        match extract(http, &mut response) {
                            Ok(()) => {
                                if response.document.is_some() {
                                    response.connection = Some(self.inner);
                                }
                                return Ok(response);
                            }
                            Err(err) if err.is_retryable() => err,
                            Err(err) => return Err(err),
                        }
                    } else {
                        let body = http.text().unwrap_or_else(|err| {
                            debug!(status = code, error = %err, "Failed to read error body");
                            String::new()
                        });
                        let messages = parse_error_body(status.canonical_reason(), &body);
                        let failure = PreviousFailureInformation {
                            status: Some(code),
                            short_msg: messages.short_msg,
                            long_msg: messages.long_msg,
                            body: (!body.is_empty()).then(|| sanitize_error_message(&body)),
                        };

                        if is_transient_status(code) {
                            if let Some(delay) = policy.next_delay() {
                                warn!(
                                    status = code,
                                    attempt = tries,
                                    delay_ms = delay.as_millis(),
                                    "Server error, retrying"
                                );
                                previous = Some(failure);
                                std::thread::sleep(delay);
                                continue;
                            }
                        }

                        info!(status = code, tries, short_msg = ?failure.short_msg, "Request failed");
                        return Ok(MutableResponse {
                            status: code,
                            short_msg: failure.short_msg,
                            long_msg: failure.long_msg,
                            tries,
                            previous_failure: previous,
                            ..Default::default()
                        });
                    }
                }
                Err(err) if err.is_retryable() => err,
                // Not retryable (unreadable file, bad request construction)
                Err(err) => return Err(err),
            };

            if let Some(delay) = policy.next_delay() {
                warn!(
                    attempt = tries,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "Request failed, retrying"
                );
                previous = Some(PreviousFailureInformation {
                    status: None,
                    short_msg: Some(err.kind.to_string()),
                    long_msg: err.source.as_ref().map(|s| s.to_string()),
                    body: None,
                });
                std::thread::sleep(delay);
                continue;
            }

            warn!(attempts = tries, error = %err, "Giving up");
            return Err(Error::with_source(
                ErrorKind::RetriesExhausted {
                    attempts: tries,
                    previous_failure: previous,
                },
                err,
            ));
        }
    }

    /// Send a single try without retry logic.
    fn send_once(&self, url: &str, payload: &Payload) -> Result<HttpResponse> {
        let request = self.inner.post(url);
        let request = match payload {
            Payload::Multipart(parts) => request.multipart(Payload::to_form(parts)?),
            Payload::Body(body) => request
                .header(CONTENT_TYPE, body.format.content_type())
                .body(body.content.clone()),
        };
        Ok(request.send()?)
    }
}
