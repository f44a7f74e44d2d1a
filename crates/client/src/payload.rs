//! Payload encoding: multipart forms and single JSON/XML bodies.
//!
//! A [`Payload`] is a plain description of the body. The engine turns it into
//! a wire body once per try, so file parts are reopened on every retry.
//!
//! Single-body payloads are built by string concatenation in a fixed field
//! order. The format is picked by looking at the caller's `data` string: a
//! first non-whitespace `{` (or no data at all) means JSON, anything else
//! means XML.

use std::fs::File;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::blocking::multipart::{Form, Part};

use crate::error::{Error, ErrorKind, Result};
use crate::params::{FileValue, ParamValue, ParameterSet};

/// Field name carrying the access key in every request.
pub const ACCESS_KEY_FIELD: &str = "accessKey";

/// Content type of binary form parts.
const OCTET_STREAM: &str = "application/octet-stream";

/// Format of a single-body payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Xml,
}

impl DataFormat {
    /// The `Content-Type` header for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            DataFormat::Json => "application/json; charset=utf-8",
            DataFormat::Xml => "application/xml; charset=utf-8",
        }
    }
}

/// Pick the body format from the caller's data.
///
/// The first non-whitespace character decides: `{` selects JSON, anything
/// else selects XML. Absent or blank data selects JSON.
pub fn detect_format(data: Option<&str>) -> DataFormat {
    match data.and_then(|d| d.trim_start().chars().next()) {
        None | Some('{') => DataFormat::Json,
        Some(_) => DataFormat::Xml,
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Content of a multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    /// Streamed from disk as an octet-stream part.
    File { path: PathBuf, file_name: String },
    Bytes { file_name: String, data: Bytes },
}

/// A single JSON or XML document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleBody {
    pub format: DataFormat,
    pub content: String,
}

/// Layout of a single-body payload.
#[derive(Debug, Clone, Copy)]
pub struct BodyLayout {
    /// Root element name in XML mode.
    pub root: &'static str,
    /// Name of the parameter carrying the caller's raw data document.
    pub data_field: &'static str,
}

/// Request body, materialized per try by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Multipart(Vec<FormPart>),
    Body(SingleBody),
}

impl Payload {
    /// One part per set parameter, in declaration order.
    ///
    /// The access key goes first when non-empty; a caller-set `accessKey`
    /// parameter is dropped. String lists repeat the field name once per
    /// entry. File parameters are checked for
    /// readability here, before any network call.
    pub fn multipart(params: &ParameterSet, access_key: &str) -> Result<Self> {
        params.validate()?;

        let mut parts = Vec::new();
        if !access_key.is_empty() {
            parts.push(FormPart {
                name: ACCESS_KEY_FIELD.to_string(),
                value: PartValue::Text(access_key.to_string()),
            });
        }

        for (name, value) in params.iter_set() {
            if name == ACCESS_KEY_FIELD {
                continue;
            }
            match value {
                ParamValue::String(s) => parts.push(text_part(name, s.clone())),
                ParamValue::Boolean(b) => parts.push(text_part(name, b.to_string())),
                ParamValue::StringList(values) => {
                    parts.extend(values.iter().map(|v| text_part(name, v.clone())))
                }
                ParamValue::File(FileValue::Path(path)) => {
                    check_readable(path)?;
                    parts.push(FormPart {
                        name: name.to_string(),
                        value: PartValue::File {
                            path: path.clone(),
                            file_name: FileValue::Path(path.clone()).file_name(),
                        },
                    });
                }
                ParamValue::File(FileValue::Bytes { file_name, data }) => parts.push(FormPart {
                    name: name.to_string(),
                    value: PartValue::Bytes {
                        file_name: file_name.clone(),
                        data: data.clone(),
                    },
                }),
            }
        }

        Ok(Payload::Multipart(parts))
    }

    /// A single JSON object or XML element holding every set parameter.
    ///
    /// Fields are emitted in declaration order after the access key; the data
    /// document always comes last. In XML mode fields become attributes of
    /// `layout.root` and the data becomes its content, wrapped in `<data>`
    /// unless it already starts with `<data`.
    pub fn single_body(params: &ParameterSet, access_key: &str, layout: BodyLayout) -> Result<Self> {
        params.validate()?;

        let data = params
            .get_string(layout.data_field)?
            .filter(|d| !d.trim().is_empty());
        let format = detect_format(data);

        let mut fields: Vec<(&str, &ParamValue)> = Vec::new();
        let access_value = ParamValue::String(access_key.to_string());
        if !access_key.is_empty() {
            fields.push((ACCESS_KEY_FIELD, &access_value));
        }
        for (name, value) in params.iter_set() {
            if name == layout.data_field || name == ACCESS_KEY_FIELD {
                continue;
            }
            if let ParamValue::File(_) = value {
                return Err(Error::new(ErrorKind::Encoding(format!(
                    "file parameter {name} cannot be sent in a single-body request"
                ))));
            }
            fields.push((name, value));
        }

        let content = match format {
            DataFormat::Json => json_body(&fields, layout.data_field, data)?,
            DataFormat::Xml => xml_body(&fields, layout.root, data),
        };

        Ok(Payload::Body(SingleBody { format, content }))
    }

    /// Build the multipart form for one try. Files are opened here.
    pub(crate) fn to_form(parts: &[FormPart]) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            let body = match &part.value {
                PartValue::Text(text) => Part::text(text.clone()),
                PartValue::File { path, file_name } => {
                    let file = File::open(path).map_err(|e| unreadable(path, e))?;
                    let len = file.metadata().map_err(|e| unreadable(path, e))?.len();
                    Part::reader_with_length(file, len)
                        .file_name(file_name.clone())
                        .mime_str(OCTET_STREAM)?
                }
                PartValue::Bytes { file_name, data } => Part::bytes(data.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(OCTET_STREAM)?,
            };
            form = form.part(part.name.clone(), body);
        }
        Ok(form)
    }
}

fn text_part(name: &str, value: String) -> FormPart {
    FormPart {
        name: name.to_string(),
        value: PartValue::Text(value),
    }
}

fn check_readable(path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| unreadable(path, e))?;
    let meta = file.metadata().map_err(|e| unreadable(path, e))?;
    if !meta.is_file() {
        return Err(Error::new(ErrorKind::UnreadableFile {
            path: path.to_path_buf(),
        }));
    }
    Ok(())
}

fn unreadable(path: &Path, err: std::io::Error) -> Error {
    Error::with_source(
        ErrorKind::UnreadableFile {
            path: path.to_path_buf(),
        },
        err,
    )
}

fn json_body(fields: &[(&str, &ParamValue)], data_field: &str, data: Option<&str>) -> Result<String> {
    let mut entries = Vec::with_capacity(fields.len() + 1);
    for (name, value) in fields {
        let rendered = match value {
            ParamValue::String(s) => serde_json::to_string(s)?,
            ParamValue::Boolean(b) => b.to_string(),
            ParamValue::StringList(values) => serde_json::to_string(values)?,
            ParamValue::File(_) => continue,
        };
        entries.push(format!("{}:{}", serde_json::to_string(name)?, rendered));
    }
    if let Some(data) = data {
        entries.push(format!("{}:{}", serde_json::to_string(data_field)?, data));
    }
    Ok(format!("{{{}}}", entries.join(",")))
}

fn xml_body(fields: &[(&str, &ParamValue)], root: &str, data: Option<&str>) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    out.push('<');
    out.push_str(root);
    for (name, value) in fields {
        let rendered = match value {
            ParamValue::String(s) => s.clone(),
            ParamValue::Boolean(b) => b.to_string(),
            ParamValue::StringList(values) => values.join(";"),
            ParamValue::File(_) => continue,
        };
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&quick_xml::escape::escape(rendered.as_str()));
        out.push('"');
    }
    out.push('>');
    if let Some(data) = data {
        if data.trim_start().starts_with("<data") {
            out.push_str(data);
        } else {
            out.push_str("<data>");
            out.push_str(data);
            out.push_str("</data>");
        }
    }
    out.push_str("</");
    out.push_str(root);
    out.push('>');
    out
}
