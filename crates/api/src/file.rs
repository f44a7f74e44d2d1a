//! Stored file endpoints: list, get, delete.
//!
//! Files are documents kept by the service, usually render output sent
//! with a `storeTo` target.

use std::sync::Arc;

use serde::Deserialize;

use docgen_client::{
    ConnectionContext, Destination, Endpoint, ParamKind, ParamSpec, ParamValue, RequestCore,
    Response, Result, SuccessBody,
};

use crate::types::{decode_body, deref_response, DocumentResponse, FileDetails};

const LIST_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("folder", ParamKind::String),
    ParamSpec::optional("includeSubFolders", ParamKind::Boolean),
    ParamSpec::optional("includeMetaData", ParamKind::Boolean),
    ParamSpec::optional("pageSize", ParamKind::String),
    ParamSpec::optional("pageMarker", ParamKind::String),
];

/// Create a list-files request.
pub fn list(context: Arc<ConnectionContext>) -> ListFilesRequest {
    ListFilesRequest {
        core: RequestCore::new(LIST_PARAMS, context),
    }
}

#[derive(Debug)]
pub struct ListFilesRequest {
    core: RequestCore,
}

impl ListFilesRequest {
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

    pub fn page_marker(mut self, marker: impl Into<String>) -> Self {
        self.core.set_deferred("pageMarker", ParamValue::String(marker.into()));
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListFilesBody {
    file_list: Vec<FileDetails>,
    next_page_marker: Option<String>,
}

impl Endpoint for ListFilesRequest {
    type Output = ListFilesResponse;
    const SERVICE: &'static str = "listFiles";

    fn core(&self) -> &RequestCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RequestCore {
        &mut self.core
    }

    fn convert(mut response: Response) -> Result<ListFilesResponse> {
        let body: ListFilesBody = decode_body(&mut response)?;
        Ok(ListFilesResponse {
            response,
            files: body.file_list,
            next_page_marker: body.next_page_marker,
        })
    }
}

#[derive(Debug)]
pub struct ListFilesResponse {
    response: Response,
    files: Vec<FileDetails>,
    next_page_marker: Option<String>,
}

impl ListFilesResponse {
    pub fn files(&self) -> &[FileDetails] {
        &self.files
    }

    pub fn next_page_marker(&self) -> Option<&str> {
        self.next_page_marker.as_deref()
    }
}

const GET_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("fileName", ParamKind::StringList),
    ParamSpec::optional("zipOutput", ParamKind::Boolean),
];

/// Create a get-file request.
pub fn get(context: Arc<ConnectionContext>) -> GetFileRequest {
    GetFileRequest {
        core: RequestCore::new(GET_PARAMS, context),
    }
}

/// Download stored files. Several names, or `zip_output(true)`, come back
/// as one zip archive.
#[derive(Debug)]
pub struct GetFileRequest {
    core: RequestCore,
}

impl GetFileRequest {
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.core.add_deferred("fileName", name);
        self
    }

    pub fn zip_output(mut self, zip: bool) -> Self {
        self.core.set_deferred("zipOutput", zip);
        self
    }

    pub fn send_to(mut self, destination: impl Into<Destination>) -> Self {
        self.core.set_destination(destination.into());
        self
    }
}

impl Endpoint for GetFileRequest {
    type Output = DocumentResponse;
    const SERVICE: &'static str = "getFile";
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

const DELETE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("fileName", ParamKind::StringList),
    ParamSpec::optional("folder", ParamKind::String),
];

/// Create a delete-files request.
pub fn delete(context: Arc<ConnectionContext>) -> DeleteFilesRequest {
    DeleteFilesRequest {
        core: RequestCore::new(DELETE_PARAMS, context),
    }
}

#[derive(Debug)]
pub struct DeleteFilesRequest {
    core: RequestCore,
}

impl DeleteFilesRequest {
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.core.add_deferred("fileName", name);
        self
    }

    /// Delete every named file from this folder.
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.core.set_deferred("folder", ParamValue::String(folder.into()));
        self
    }
}

impl Endpoint for DeleteFilesRequest {
    type Output = Response;
    const SERVICE: &'static str = "deleteFiles";

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

deref_response!(ListFilesResponse);
