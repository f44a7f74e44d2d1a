//! # docgen-cloud
//!
//! A blocking Rust client for a cloud document-generation service: render
//! templates with JSON or XML data, manage stored templates, and fetch or
//! delete stored output files.
//!
//! ## Security
//!
//! - Access keys and proxy passwords are redacted in Debug output
//! - Tracing spans never record the access key
//! - Error messages sanitize any access key echoed back by the service
//!
//! ## Crates
//!
//! - **docgen-client** - Parameters, payload encoding, HTTP execution with fixed-delay retry, responses
//! - **docgen-api** - Render, template and file endpoints plus environment loading
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docgen_cloud::{api::render, Endpoint, Environment};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // DOCGEN_URL and DOCGEN_ACCESS_KEY
//!     let env = Environment::from_env()?;
//!
//!     let mut response = render::render(env.context())
//!         .template_name("letters/welcome.docx")
//!         .output_name("welcome.pdf")
//!         .data(r#"{"customer":{"name":"Ann"}}"#)
//!         .execute()?;
//!
//!     if response.has_succeeded() {
//!         let bytes = response.send_document_to("welcome.pdf")?;
//!         println!("wrote {bytes} bytes");
//!     } else {
//!         println!("{:?}: {:?}", response.short_msg(), response.long_msg());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export all crates for convenient access
#[cfg(feature = "api")]
pub use docgen_api as api;
#[cfg(feature = "client")]
pub use docgen_client as client;

// Re-export commonly used types at the top level
#[cfg(feature = "api")]
pub use docgen_api::{Environment, FileDetails, TemplateDetails};
#[cfg(feature = "client")]
pub use docgen_client::{
    ConnectionContext, Destination, Endpoint, Error, ErrorKind, ProxyConfig, Response, Result,
    RetryConfig,
};
