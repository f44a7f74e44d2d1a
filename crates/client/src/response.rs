//! Response carriers and the document stream lifecycle.
//!
//! The engine fills a [`MutableResponse`] during one call and hands the caller
//! an immutable [`Response`]. A successful response may hold an open document
//! stream plus the HTTP client that owns its connection; both are released by
//! [`Response::cleanup`], which also runs on drop.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use tracing::debug;

use crate::client::HttpResponse;
use crate::error::{body_read_error, Error, ErrorKind, Result};

/// The only status treated as success.
pub const STATUS_OK: u16 = 200;

/// Diagnostics of the try immediately before the final one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousFailureInformation {
    /// HTTP status, or `None` when no response was received.
    pub status: Option<u16>,
    pub short_msg: Option<String>,
    pub long_msg: Option<String>,
    /// Raw (sanitized) body of the failed try.
    pub body: Option<String>,
}

/// Response under construction by the engine. Never reused across calls.
#[derive(Default)]
pub struct MutableResponse {
    pub status: u16,
    pub short_msg: Option<String>,
    pub long_msg: Option<String>,
    pub tries: u32,
    pub previous_failure: Option<PreviousFailureInformation>,
    /// Parsed JSON success body, for endpoints that return one.
    pub json: Option<serde_json::Value>,
    pub document: Option<Box<dyn Read + Send>>,
    pub document_type: Option<String>,
    pub document_name: Option<String>,
    /// Client kept alive for as long as the document stream is open.
    pub connection: Option<reqwest::blocking::Client>,
}

impl fmt::Debug for MutableResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableResponse")
            .field("status", &self.status)
            .field("short_msg", &self.short_msg)
            .field("long_msg", &self.long_msg)
            .field("tries", &self.tries)
            .field("previous_failure", &self.previous_failure)
            .field("has_document", &self.document.is_some())
            .finish_non_exhaustive()
    }
}

impl MutableResponse {
    /// Freeze into the caller-facing response.
    ///
    /// A failed response never carries a document stream.
    pub fn into_response(mut self) -> Response {
        if self.status != STATUS_OK {
            self.document = None;
            self.connection = None;
        }
        let closed = self.document.is_none() && self.connection.is_none();
        Response {
            status: self.status,
            short_msg: self.short_msg,
            long_msg: self.long_msg,
            tries: self.tries,
            previous_failure: self.previous_failure,
            json: self.json,
            document: self.document,
            document_type: self.document_type,
            document_name: self.document_name,
            connection: self.connection,
            closed,
        }
    }
}

/// Outcome of one request, as seen by the caller.
///
/// Branch on [`has_succeeded`](Self::has_succeeded); service rejections are
/// not errors. Resources are released by [`cleanup`](Self::cleanup) or drop.
pub struct Response {
    status: u16,
    short_msg: Option<String>,
    long_msg: Option<String>,
    tries: u32,
    previous_failure: Option<PreviousFailureInformation>,
    json: Option<serde_json::Value>,
    document: Option<Box<dyn Read + Send>>,
    document_type: Option<String>,
    document_name: Option<String>,
    connection: Option<reqwest::blocking::Client>,
    closed: bool,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("short_msg", &self.short_msg)
            .field("long_msg", &self.long_msg)
            .field("tries", &self.tries)
            .field("previous_failure", &self.previous_failure)
            .field("has_document", &self.document.is_some())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// True iff the final status was 200.
    pub fn has_succeeded(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn short_msg(&self) -> Option<&str> {
        self.short_msg.as_deref()
    }

    pub fn long_msg(&self) -> Option<&str> {
        self.long_msg.as_deref()
    }

    /// Number of tries performed, the first one included.
    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Set only when more than one try was made.
    pub fn previous_failure(&self) -> Option<&PreviousFailureInformation> {
        self.previous_failure.as_ref()
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// Take the JSON body out, for typed conversion by endpoints.
    pub fn take_json(&mut self) -> Option<serde_json::Value> {
        self.json.take()
    }

    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    /// File name announced in `Content-Disposition`, if any.
    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    /// Returns true while an undrained document stream is held.
    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Returns true once every held resource has been released.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drain the document into a new file at `path`.
    ///
    /// Returns the number of bytes written; 0 when there is no stream left.
    pub fn send_document_to(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        if self.document.is_none() {
            return Ok(0);
        }
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            Error::with_source(
                ErrorKind::Io(format!("cannot create {}: {}", path.display(), e)),
                e,
            )
        })?;
        let mut writer = BufWriter::new(file);
        let written = self.send_document_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(written)
    }

    /// Drain the document into `writer`. The stream is closed afterwards,
    /// whether or not the copy succeeded.
    pub fn send_document_to_writer<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<u64> {
        let Some(mut document) = self.document.take() else {
            return Ok(0);
        };
        let result = io::copy(&mut document, writer);
        drop(document);
        self.release_connection();
        Ok(result?)
    }

    /// Release the document stream and the HTTP client, in that order.
    /// Idempotent; never fails.
    pub fn cleanup(&mut self) {
        if self.closed {
            return;
        }
        if self.document.take().is_some() {
            debug!(status = self.status, "Closed undrained document stream");
        }
        self.release_connection();
        self.closed = true;
    }

    fn release_connection(&mut self) {
        self.connection.take();
        if self.document.is_none() {
            self.closed = true;
        }
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Extract a JSON success body: store it and pick up `shortMsg`/`longMsg`.
///
/// An empty body is accepted. Anything else that is not JSON is a protocol
/// mismatch. A body cut off mid-read is a retryable connection failure.
pub fn extract_json(http: HttpResponse, response: &mut MutableResponse) -> Result<()> {
    let body = http.text().map_err(body_read_error)?;
    if body.trim().is_empty() {
        return Ok(());
    }
    let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        Error::with_source(
            ErrorKind::MalformedResponseBody(format!(
                "expected JSON: {}",
                sanitize_error_message(&body)
            )),
            e,
        )
    })?;
    if let Some(msg) = value.get("shortMsg").and_then(|v| v.as_str()) {
        response.short_msg = Some(msg.to_string());
    }
    if let Some(msg) = value.get("longMsg").and_then(|v| v.as_str()) {
        response.long_msg = Some(msg.to_string());
    }
    response.json = Some(value);
    Ok(())
}

/// Keep the body open as the response's document stream.
pub fn extract_document(http: HttpResponse, response: &mut MutableResponse) -> Result<()> {
    let headers = http.headers();
    response.document_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    response.document_name = headers
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_file_name);
    response.document = Some(Box::new(http));
    Ok(())
}

fn disposition_file_name(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let name = part.strip_prefix("filename=")?;
        let name = name.trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Messages parsed from a failure body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FailureMessages {
    pub short_msg: Option<String>,
    pub long_msg: Option<String>,
}

/// Read `shortMsg`/`longMsg` from a JSON error body, falling back to the
/// status reason phrase.
pub(crate) fn parse_error_body(reason: Option<&str>, body: &str) -> FailureMessages {
    if let Ok(err) = serde_json::from_str::<ServiceErrorResponse>(body) {
        if err.short_msg.is_some() || err.long_msg.is_some() {
            return FailureMessages {
                short_msg: err.short_msg.map(|m| sanitize_error_message(&m)),
                long_msg: err.long_msg.map(|m| sanitize_error_message(&m)),
            };
        }
    }

    let trimmed = body.trim();
    FailureMessages {
        short_msg: reason.map(str::to_string),
        long_msg: (!trimmed.is_empty()).then(|| sanitize_error_message(trimmed)),
    }
}

/// Error body shape returned by the service.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceErrorResponse {
    short_msg: Option<String>,
    long_msg: Option<String>,
}

static ACCESS_KEY_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r#"(?i)(access_?key["']?\s*[:=]\s*["']?)[^\s"'&,}]+"#)
        .expect("access key pattern is valid")
});

/// Redact access keys and truncate long bodies before they are stored or
/// logged.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_CHARS: usize = 500;

    let mut sanitized = ACCESS_KEY_PATTERN
        .replace_all(message, "${1}[REDACTED]")
        .to_string();

    if let Some((idx, _)) = sanitized.char_indices().nth(MAX_CHARS) {
        sanitized.truncate(idx);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
