//! Render endpoint: merge data into a template and return the document.
//!
//! The request is sent as one JSON or XML body. Which one is decided by the
//! data itself: data starting with `{` (or no data) is sent as JSON, anything
//! else as XML.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;

use docgen_client::{
    extract_document, extract_json, BodyLayout, ConnectionContext, Destination, Endpoint,
    HttpResponse, MutableResponse, ParamKind, ParamSpec, ParamValue, Payload, RequestCore,
    Response, Result,
};

use crate::types::deref_response;

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("templateName", ParamKind::String),
    ParamSpec::required("outputName", ParamKind::String),
    ParamSpec::optional("outputFormat", ParamKind::String),
    ParamSpec::optional("storeTo", ParamKind::String),
    ParamSpec::optional("billingKey", ParamKind::String),
    ParamSpec::optional("devMode", ParamKind::Boolean),
    ParamSpec::optional("requestId", ParamKind::String),
    ParamSpec::optional("data", ParamKind::String),
];

const LAYOUT: BodyLayout = BodyLayout {
    root: "render",
    data_field: "data",
};

/// Create a render request.
pub fn render(context: Arc<ConnectionContext>) -> RenderRequest {
    RenderRequest {
        core: RequestCore::new(PARAMS, context),
    }
}

/// Render a template with data.
#[derive(Debug)]
pub struct RenderRequest {
    core: RequestCore,
}

impl RenderRequest {
    /// Template to render, including its folder.
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_deferred("templateName", ParamValue::String(name.into()));
        self
    }

    /// Name of the produced document; its extension selects the format
    /// unless `output_format` is set.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_deferred("outputName", ParamValue::String(name.into()));
        self
    }

    /// Output formats, `;`-separated (e.g. `pdf;docx`).
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.core.set_deferred("outputFormat", ParamValue::String(format.into()));
        self
    }

    /// Delivery targets, e.g. `stream` or `mailto:...`.
    pub fn store_to(mut self, store_to: impl Into<String>) -> Self {
        self.core.set_deferred("storeTo", ParamValue::String(store_to.into()));
        self
    }

    pub fn billing_key(mut self, key: impl Into<String>) -> Self {
        self.core.set_deferred("billingKey", ParamValue::String(key.into()));
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.core.set_deferred("devMode", dev_mode);
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.core.set_deferred("requestId", ParamValue::String(id.into()));
        self
    }

    /// JSON or XML data document to merge.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.core.set_deferred("data", ParamValue::String(data.into()));
        self
    }

    /// Set any other request field.
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.core.set_deferred(name, value);
        self
    }

    /// Write the rendered document here instead of leaving it open.
    pub fn send_to(mut self, destination: impl Into<Destination>) -> Self {
        self.core.set_destination(destination.into());
        self
    }
}

impl Endpoint for RenderRequest {
    type Output = RenderResponse;
    const SERVICE: &'static str = "render";

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn encode(&self) -> Result<Payload> {
        self.core.single_body(LAYOUT)
    }

    /// Streamed renders return the document; store-only renders return JSON.
    fn extract(http: HttpResponse, response: &mut MutableResponse) -> Result<()> {
        let is_json = http
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        if is_json {
            extract_json(http, response)
        } else {
            extract_document(http, response)
        }
    }

    fn convert(response: Response) -> Result<RenderResponse> {
        Ok(RenderResponse { response })
    }
}

/// Result of a render.
#[derive(Debug)]
pub struct RenderResponse {
    response: Response,
}

impl RenderResponse {
    pub fn into_inner(self) -> Response {
        self.response
    }
}

deref_response!(RenderResponse);
