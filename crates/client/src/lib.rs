//! # docgen-client
//!
//! Core request model and HTTP execution engine for the document-generation
//! cloud service.
//!
//! This crate provides:
//! - A typed parameter store with declared, ordered required-field checks
//! - Multipart and single JSON/XML body encoding
//! - Blocking execution with fixed-delay retries on transient failures
//! - Responses that own their document stream until cleaned up
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Endpoint requests                        │
//! │  (docgen-api: render, templates, files)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ Endpoint::execute()
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │            RequestCore + ParameterSet + Payload             │
//! │  - Validates required parameters                            │
//! │  - Encodes multipart or single JSON/XML body                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DocgenHttpClient                         │
//! │  - POST with retry on transport errors and 5xx              │
//! │  - Builds MutableResponse, hands back Response              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docgen_client::{ConnectionContext, Endpoint};
//!
//! let ctx = Arc::new(ConnectionContext::new("https://dws.example.com/api", key)?);
//! let mut response = docgen_api::template::get(ctx)
//!     .template_name("welcome.docx")
//!     .execute()?;
//!
//! if response.has_succeeded() {
//!     response.send_document_to("welcome.docx")?;
//! } else {
//!     eprintln!("{:?}: {:?}", response.short_msg(), response.long_msg());
//! }
//! ```

mod client;
mod config;
mod error;
mod params;
mod payload;
mod request;
mod response;
mod retry;

pub use client::{is_transient_status, DocgenHttpClient, HttpResponse};
pub use config::{ConnectionContext, ConnectionContextBuilder, ProxyConfig};
pub use error::{Error, ErrorKind, Result};
pub use params::{FileValue, ParamKind, ParamSpec, ParamValue, Parameter, ParameterSet};
pub use payload::{
    detect_format, BodyLayout, DataFormat, FormPart, PartValue, Payload, SingleBody,
    ACCESS_KEY_FIELD,
};
pub use request::{Destination, Endpoint, RequestCore, SuccessBody};
pub use response::{
    extract_document, extract_json, MutableResponse, PreviousFailureInformation, Response,
    STATUS_OK,
};
pub use retry::{RetryConfig, RetryPolicy, DEFAULT_MAX_TRIES, DEFAULT_RETRY_DELAY};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("docgen-client/", env!("CARGO_PKG_VERSION"));
