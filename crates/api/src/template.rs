//! Template endpoints: list, upload, get, delete.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;

use docgen_client::{
    ConnectionContext, Destination, Endpoint, FileValue, ParamKind, ParamSpec, ParamValue,
    RequestCore, Response, Result, SuccessBody,
};

use crate::types::{decode_body, deref_response, DocumentResponse, TemplateDetails};

// ============================================================================
// listTemplates
// ============================================================================

const LIST_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("folder", ParamKind::String),
    ParamSpec::optional("includeSubFolders", ParamKind::Boolean),
    ParamSpec::optional("includeMetaData", ParamKind::Boolean),
    ParamSpec::optional("pageSize", ParamKind::String),
    ParamSpec::optional("pageMarker", ParamKind::String),
];

/// Create a list-templates request.
pub fn list(context: Arc<ConnectionContext>) -> ListTemplatesRequest {
    ListTemplatesRequest {
        core: RequestCore::new(LIST_PARAMS, context),
    }
}

/// List stored templates, optionally one folder at a time and paged.
#[derive(Debug)]
pub struct ListTemplatesRequest {
    core: RequestCore,
}

impl ListTemplatesRequest {
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.core.set_deferred("folder", ParamValue::String(folder.into()));
        self
    }

    pub fn include_sub_folders(mut self, include: bool) -> Self {
        self.core.set_deferred("includeSubFolders", include);
        self
    }

    pub fn include_meta_data(mut self, include: bool) -> Self {
        self.core.set_deferred("includeMetaData", include);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.core.set_deferred("pageSize", size.to_string());
        self
    }

    /// Marker returned by the previous page.
    pub fn page_marker(mut self, marker: impl Into<String>) -> Self {
        self.core.set_deferred("pageMarker", ParamValue::String(marker.into()));
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListTemplatesBody {
    template_list: Vec<TemplateDetails>,
    template_list_stale: bool,
    next_page_marker: Option<String>,
}

impl Endpoint for ListTemplatesRequest {
    type Output = ListTemplatesResponse;
    const SERVICE: &'static str = "listTemplates";

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn convert(mut response: Response) -> Result<ListTemplatesResponse> {
        let body: ListTemplatesBody = decode_body(&mut response)?;
        Ok(ListTemplatesResponse {
            response,
            templates: body.template_list,
            list_stale: body.template_list_stale,
            next_page_marker: body.next_page_marker,
        })
    }
}

/// Templates found by a list request.
#[derive(Debug)]
pub struct ListTemplatesResponse {
    response: Response,
    templates: Vec<TemplateDetails>,
    list_stale: bool,
    next_page_marker: Option<String>,
}

impl ListTemplatesResponse {
    pub fn templates(&self) -> &[TemplateDetails] {
        &self.templates
    }

    /// True when the service's listing cache may be behind recent uploads.
    pub fn is_list_stale(&self) -> bool {
        self.list_stale
    }

    /// Present when more pages are available.
    pub fn next_page_marker(&self) -> Option<&str> {
        self.next_page_marker.as_deref()
    }
}

// ============================================================================
// uploadTemplate
// ============================================================================

const UPLOAD_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("templateName", ParamKind::String),
    ParamSpec::required("templateFile", ParamKind::File),
    ParamSpec::optional("templateDescription", ParamKind::String),
    ParamSpec::optional("devTemplate", ParamKind::Boolean),
    ParamSpec::optional("fieldDelimPrefix", ParamKind::String),
    ParamSpec::optional("fieldDelimSuffix", ParamKind::String),
];

/// Create an upload-template request.
pub fn upload(context: Arc<ConnectionContext>) -> UploadTemplateRequest {
    UploadTemplateRequest {
        core: RequestCore::new(UPLOAD_PARAMS, context),
    }
}

/// Upload (or replace) a template file.
#[derive(Debug)]
pub struct UploadTemplateRequest {
    core: RequestCore,
}

impl UploadTemplateRequest {
    /// Name to store the template under, including its folder.
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_deferred("templateName", ParamValue::String(name.into()));
        self
    }

    /// Template file on disk; streamed as an octet-stream part.
    pub fn template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.core
            .set_deferred("templateFile", FileValue::Path(path.into()));
        self
    }

    /// Template content already in memory.
    pub fn template_bytes(mut self, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.core.set_deferred(
            "templateFile",
            FileValue::Bytes {
                file_name: file_name.into(),
                data: data.into(),
            },
        );
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.core
            .set_deferred("templateDescription", ParamValue::String(description.into()));
        self
    }

    pub fn dev_template(mut self, dev: bool) -> Self {
        self.core.set_deferred("devTemplate", dev);
        self
    }

    /// Custom field delimiters, e.g. `{{` and `}}`.
    pub fn field_delimiters(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.core.set_deferred("fieldDelimPrefix", ParamValue::String(prefix.into()));
        self.core.set_deferred("fieldDelimSuffix", ParamValue::String(suffix.into()));
        self
    }

    /// Set any other request field.
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.core.set_deferred(name, value);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UploadTemplateBody {
    template_details: Option<TemplateDetails>,
}

impl Endpoint for UploadTemplateRequest {
    type Output = UploadTemplateResponse;
    const SERVICE: &'static str = "uploadTemplate";

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn convert(mut response: Response) -> Result<UploadTemplateResponse> {
        let body: UploadTemplateBody = decode_body(&mut response)?;
        Ok(UploadTemplateResponse {
            response,
            details: body.template_details,
        })
    }
}

/// Result of an upload.
#[derive(Debug)]
pub struct UploadTemplateResponse {
    response: Response,
    details: Option<TemplateDetails>,
}

impl UploadTemplateResponse {
    /// Stored template as seen by the service.
    pub fn details(&self) -> Option<&TemplateDetails> {
        self.details.as_ref()
    }
}

// ============================================================================
// getTemplate
// ============================================================================

const GET_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("templateName", ParamKind::StringList),
    ParamSpec::optional("isSystemTemplate", ParamKind::Boolean),
];

/// Create a get-template request.
pub fn get(context: Arc<ConnectionContext>) -> GetTemplateRequest {
    GetTemplateRequest {
        core: RequestCore::new(GET_PARAMS, context),
    }
}

/// Download one or more templates. Several names come back zipped.
#[derive(Debug)]
pub struct GetTemplateRequest {
    core: RequestCore,
}

impl GetTemplateRequest {
    /// Add a template to fetch; may be called repeatedly.
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.core.add_deferred("templateName", name);
        self
    }

    pub fn system_template(mut self, system: bool) -> Self {
        self.core.set_deferred("isSystemTemplate", system);
        self
    }

    /// Write the downloaded document here instead of leaving it open.
    pub fn send_to(mut self, destination: impl Into<Destination>) -> Self {
        self.core.set_destination(destination.into());
        self
    }
}

impl Endpoint for GetTemplateRequest {
    type Output = DocumentResponse;
    const SERVICE: &'static str = "getTemplate";
    const SUCCESS_BODY: SuccessBody = SuccessBody::Document;

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn convert(response: Response) -> Result<DocumentResponse> {
        Ok(DocumentResponse::new(response))
    }
}

// ============================================================================
// deleteTemplate
// ============================================================================

const DELETE_PARAMS: &[ParamSpec] = &[ParamSpec::required("templateName", ParamKind::StringList)];

/// Create a delete-template request.
pub fn delete(context: Arc<ConnectionContext>) -> DeleteTemplateRequest {
    DeleteTemplateRequest {
        core: RequestCore::new(DELETE_PARAMS, context),
    }
}

/// Delete one or more templates.
#[derive(Debug)]
pub struct DeleteTemplateRequest {
    core: RequestCore,
}

impl DeleteTemplateRequest {
    /// Add a template to delete; may be called repeatedly.
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.core.add_deferred("templateName", name);
        self
    }
}

impl Endpoint for DeleteTemplateRequest {
    type Output = Response;
    const SERVICE: &'static str = "deleteTemplate";

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn convert(response: Response) -> Result<Response> {
        Ok(response)
    }
}

deref_response!(ListTemplatesResponse, UploadTemplateResponse);
