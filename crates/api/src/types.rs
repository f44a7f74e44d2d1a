//! Metadata payloads returned by the list and upload endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use docgen_client::{Error, ErrorKind, Response, Result};

/// A stored template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateDetails {
    pub name: String,
    pub description: Option<String>,
    pub last_modified_millis_since_epoch: Option<i64>,
    pub size_bytes: Option<u64>,
    pub md5: Option<String>,
    pub dev_template: Option<bool>,
    pub field_delim_prefix: Option<String>,
    pub field_delim_suffix: Option<String>,
    /// Template processing problems reported by the service.
    pub template_errors: Option<String>,
}

/// A stored file (rendered output or upload).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileDetails {
    pub name: String,
    pub last_modified_millis_since_epoch: Option<i64>,
    pub size_bytes: Option<u64>,
    pub md5: Option<String>,
    pub content_type: Option<String>,
    pub meta_data: Option<String>,
}

/// Decode the JSON success body of `response` into `T`.
///
/// Failed responses and empty bodies decode to `T::default()`; a 200 body
/// of the wrong shape is a malformed response.
pub(crate) fn decode_body<T>(response: &mut Response) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !response.has_succeeded() {
        return Ok(T::default());
    }
    match response.take_json() {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| {
            Error::with_source(ErrorKind::MalformedResponseBody(e.to_string()), e)
        }),
    }
}

/// A response whose success body is a downloaded document.
#[derive(Debug)]
pub struct DocumentResponse {
    response: Response,
}

impl DocumentResponse {
    pub(crate) fn new(response: Response) -> Self {
        Self { response }
    }

    pub fn into_inner(self) -> Response {
        self.response
    }
}

/// `Deref`/`DerefMut` to the wrapped `response` field.
macro_rules! deref_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::ops::Deref for $ty {
                type Target = docgen_client::Response;

                fn deref(&self) -> &docgen_client::Response {
                    &self.response
                }
            }

            impl std::ops::DerefMut for $ty {
                fn deref_mut(&mut self) -> &mut docgen_client::Response {
                    &mut self.response
                }
            }
        )*
    };
}

pub(crate) use deref_response;

deref_response!(DocumentResponse);
