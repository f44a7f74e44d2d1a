//! # docgen-api
//!
//! Endpoint requests for the document-generation service, built on
//! [`docgen_client`].
//!
//! Each endpoint has a constructor taking the shared connection context,
//! fluent setters for its fields, and `execute()` from
//! [`Endpoint`](docgen_client::Endpoint).
//!
//! ## Example
//!
//! ```rust,ignore
//! use docgen_api::{render, Endpoint, Environment};
//!
//! let env = Environment::from_env()?;
//!
//! let response = render::render(env.context())
//!     .template_name("invoices/welcome.docx")
//!     .output_name("welcome.pdf")
//!     .data(r#"{"name":"Ann"}"#)
//!     .send_to(std::path::PathBuf::from("welcome.pdf"))
//!     .execute()?;
//!
//! if !response.has_succeeded() {
//!     eprintln!("render failed: {:?}", response.short_msg());
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`render`] | `render` |
//! | [`template`] | `list`, `upload`, `get`, `delete` |
//! | [`file`] | `list`, `get`, `delete` |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_debug_implementations)]

mod environment;
mod types;

pub mod file;
pub mod render;
pub mod template;

pub use environment::{
    Environment, ENV_ACCESS_KEY, ENV_MAX_TRIES, ENV_PROXY_HOST, ENV_PROXY_PASSWORD,
    ENV_PROXY_PORT, ENV_PROXY_USER, ENV_RETRY_DELAY_MS, ENV_URL,
};
pub use types::{DocumentResponse, FileDetails, TemplateDetails};

pub use file::{DeleteFilesRequest, GetFileRequest, ListFilesRequest, ListFilesResponse};
pub use render::{RenderRequest, RenderResponse};
pub use template::{
    DeleteTemplateRequest, GetTemplateRequest, ListTemplatesRequest, ListTemplatesResponse,
    UploadTemplateRequest, UploadTemplateResponse,
};

// Re-export the core so most callers need only this crate
pub use docgen_client::{
    ConnectionContext, Destination, Endpoint, Error, ErrorKind, PreviousFailureInformation,
    ProxyConfig, Response, Result, RetryConfig,
};
