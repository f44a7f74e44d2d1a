//! Error types for docgen-client.
//!
//! Only local, construction-time problems and protocol corruption surface as
//! errors. Ordinary service rejections (4xx, or 5xx after the last try) are
//! returned as a [`Response`](crate::Response) whose `has_succeeded()` is
//! false.

use std::path::PathBuf;

use crate::params::ParamKind;
use crate::response::PreviousFailureInformation;

/// Result type alias for docgen-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docgen-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error was raised before any network call was made.
    pub fn is_request_construction(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MissingRequiredParameter(_)
                | ErrorKind::TypeMismatch { .. }
                | ErrorKind::UnreadableFile { .. }
                | ErrorKind::Encoding(_)
        )
    }

    /// Returns true if the transport layer could be retried for this error.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Diagnostics of the try before the last one, when retries ran out.
    pub fn previous_failure(&self) -> Option<&PreviousFailureInformation> {
        match &self.kind {
            ErrorKind::RetriesExhausted {
                previous_failure, ..
            } => previous_failure.as_ref(),
            _ => None,
        }
    }

    /// Returns the missing parameter name, if this is a validation failure.
    pub fn missing_parameter(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::MissingRequiredParameter(name) => Some(name),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A parameter declared as required has no value.
    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    /// A typed accessor or setter disagreed with the parameter's kind.
    #[error("Type mismatch for parameter {name}: expected {expected}, found {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    /// A file-valued parameter could not be opened for reading.
    #[error("Unreadable file: {}", path.display())]
    UnreadableFile { path: PathBuf },

    /// The request could not be rendered into a body.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// HTTP 200, but the body is not what the endpoint expects.
    #[error("Malformed response body: {0}")]
    MalformedResponseBody(String),

    /// Connection-level failure (no HTTP status was received).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// The last of `attempts` tries failed at the transport level.
    ///
    /// `previous_failure` describes the try before it, which may have
    /// received a status.
    #[error("Last of {attempts} tries failed without a response")]
    RetriesExhausted {
        attempts: u32,
        previous_failure: Option<PreviousFailureInformation>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Local I/O failure (writing a document, reading a file).
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Connection(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else if err.is_connect()
            || err.is_request()
            || err.is_body()
            || (err.is_decode() && is_read_failure(&err))
        {
            ErrorKind::Connection(err.to_string())
        } else if err.is_decode() {
            ErrorKind::MalformedResponseBody(err.to_string())
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

/// Returns true if the error chain shows the body stream itself broke
/// (reset, truncated, I/O) rather than its content being undecodable.
fn is_read_failure(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        if let Some(inner) = cause.downcast_ref::<reqwest::Error>() {
            if inner.is_body() || inner.is_connect() || inner.is_timeout() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Map a failure while reading a response body.
///
/// The body is read as raw bytes, so any failure here is the transport's.
pub(crate) fn body_read_error(err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Connection(format!("response body interrupted: {err}"))
    };
    Error::with_source(kind, err)
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
