//! Request abstraction shared by every endpoint.
//!
//! An endpoint request owns a [`RequestCore`] (its parameters, a shared
//! connection context and an optional output destination) and implements
//! [`Endpoint`] to say how its body is encoded, how a 200 body is read, and
//! how the generic [`Response`] becomes its typed response.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::client::{DocgenHttpClient, HttpResponse};
use crate::config::ConnectionContext;
use crate::error::{Error, Result};
use crate::params::{ParamSpec, ParamValue, ParameterSet};
use crate::payload::{BodyLayout, Payload};
use crate::response::{extract_document, extract_json, MutableResponse, Response};

/// Where a successful document is written when a request has `send_to` set.
pub enum Destination {
    File(PathBuf),
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => f.debug_tuple("File").field(path).finish(),
            Destination::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Destination::File(path)
    }
}

impl From<&std::path::Path> for Destination {
    fn from(path: &std::path::Path) -> Self {
        Destination::File(path.to_path_buf())
    }
}

impl From<Box<dyn Write + Send>> for Destination {
    fn from(writer: Box<dyn Write + Send>) -> Self {
        Destination::Writer(writer)
    }
}

/// State owned by one request: parameters, context and destination.
///
/// Fluent setters record the first parameter error instead of failing
/// mid-chain; it is returned by `execute()`.
#[derive(Debug)]
pub struct RequestCore {
    params: ParameterSet,
    context: Arc<ConnectionContext>,
    destination: Option<Destination>,
    deferred: Option<Error>,
}

impl RequestCore {
    /// Create a core with the given parameter declarations.
    pub fn new(specs: &[ParamSpec], context: Arc<ConnectionContext>) -> Self {
        Self {
            params: ParameterSet::new(specs),
            context,
            destination: None,
            deferred: None,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Mutable access to this request's context.
    ///
    /// Copy-on-write: a context shared with other requests is cloned first,
    /// so they never observe the change.
    pub fn context_mut(&mut self) -> &mut ConnectionContext {
        Arc::make_mut(&mut self.context)
    }

    /// Replace the context entirely.
    pub fn set_context(&mut self, context: Arc<ConnectionContext>) {
        self.context = context;
    }

    /// Overwrite a parameter.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        self.params.set(name, value)
    }

    /// Append to a string-list parameter.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.params.add(name, value)
    }

    /// Overwrite a parameter, deferring any error to `execute()`.
    pub fn set_deferred(&mut self, name: &str, value: impl Into<ParamValue>) {
        if let Err(err) = self.params.set(name, value) {
            self.deferred.get_or_insert(err);
        }
    }

    /// Append to a string list, deferring any error to `execute()`.
    pub fn add_deferred(&mut self, name: &str, value: impl Into<String>) {
        if let Err(err) = self.params.add(name, value) {
            self.deferred.get_or_insert(err);
        }
    }

    /// The first error recorded by a deferred setter.
    pub fn take_deferred(&mut self) -> Option<Error> {
        self.deferred.take()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn set_destination(&mut self, destination: Destination) {
        self.destination = Some(destination);
    }

    fn take_destination(&mut self) -> Option<Destination> {
        self.destination.take()
    }

    /// Multipart body of every set parameter.
    pub fn multipart(&self) -> Result<Payload> {
        Payload::multipart(&self.params, self.context.access_key())
    }

    /// Single JSON/XML body of every set parameter.
    pub fn single_body(&self, layout: BodyLayout) -> Result<Payload> {
        Payload::single_body(&self.params, self.context.access_key(), layout)
    }
}

/// How an endpoint's 200 body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessBody {
    /// JSON metadata (`shortMsg`, lists, ...).
    Json,
    /// A binary document streamed to the caller.
    Document,
}

/// One remote operation built on the shared core.
///
/// Implementors supply the service path, access to their [`RequestCore`]
/// and the conversion into their typed response; encoding and extraction
/// have multipart/JSON defaults.
pub trait Endpoint: Sized {
    /// Typed response returned by [`execute`](Self::execute).
    type Output;

    /// Service path appended to the context's base URL.
    const SERVICE: &'static str;

    /// How the 200 body is read.
    const SUCCESS_BODY: SuccessBody = SuccessBody::Json;

    fn core(&self) -> &RequestCore;

    fn core_mut(&mut self) -> &mut RequestCore;

    /// Convert the generic response into the endpoint's typed response.
    fn convert(response: Response) -> Result<Self::Output>;

    /// Encode the request body. Multipart by default.
    fn encode(&self) -> Result<Payload> {
        self.core().multipart()
    }

    /// Read a 200 body into the mutable response.
    fn extract(http: HttpResponse, response: &mut MutableResponse) -> Result<()> {
        match Self::SUCCESS_BODY {
            SuccessBody::Json => extract_json(http, response),
            SuccessBody::Document => extract_document(http, response),
        }
    }

    /// Validate, encode, send, and convert.
    ///
    /// Parameter and file problems fail here, before any network call. When
    /// a destination is set, a successful document is drained into it and
    /// the stream is closed before returning.
    fn execute(mut self) -> Result<Self::Output> {
        let _span = debug_span!("execute", service = Self::SERVICE).entered();
        if let Some(err) = self.core_mut().take_deferred() {
            return Err(err);
        }
        self.core().params().validate()?;
        let payload = self.encode()?;

        let context = self.core().context();
        let url = context.service_url(Self::SERVICE);
        let client = DocgenHttpClient::new(context)?;
        let mut response = client.execute(&url, &payload, Self::extract)?.into_response();

        if response.has_succeeded() && response.has_document() {
            if let Some(destination) = self.core_mut().take_destination() {
                let written = match destination {
                    Destination::File(path) => response.send_document_to(path)?,
                    Destination::Writer(mut writer) => {
                        let written = response.send_document_to_writer(&mut writer)?;
                        writer.flush()?;
                        written
                    }
                };
                debug!(bytes = written, "Document written to destination");
            }
        }

        Self::convert(response)
    }

    /// Execute against a different base URL and access key.
    fn execute_with(mut self, base_url: &str, access_key: &str) -> Result<Self::Output> {
        let context = self.core_mut().context_mut();
        context.set_base_url(base_url)?;
        context.set_access_key(access_key);
        self.execute()
    }

    /// Execute with a different access key.
    fn execute_with_key(mut self, access_key: &str) -> Result<Self::Output> {
        self.core_mut().context_mut().set_access_key(access_key);
        self.execute()
    }
}
