//! Typed parameter store backing every request.
//!
//! Each endpoint declares its parameters up front as a static, ordered list of
//! [`ParamSpec`]s. Values are set and read through kind-checked accessors, and
//! [`ParameterSet::validate`] reports the first unmet required parameter in
//! declaration order.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{Error, ErrorKind, Result};

/// The declared kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
    File,
    StringList,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::String => "string",
            ParamKind::Boolean => "boolean",
            ParamKind::File => "file",
            ParamKind::StringList => "string list",
        };
        f.write_str(name)
    }
}

/// Static descriptor of one declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    /// An optional parameter.
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// A parameter that must be set before the request can be encoded.
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

/// A binary parameter: either a file on disk or bytes already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileValue {
    /// Opened (and streamed) at send time.
    Path(PathBuf),
    /// In-memory content with the file name to report in the upload.
    Bytes { file_name: String, data: Bytes },
}

impl FileValue {
    /// The file name sent in the multipart part, taken from the file itself.
    pub fn file_name(&self) -> String {
        match self {
            FileValue::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            FileValue::Bytes { file_name, .. } => file_name.clone(),
        }
    }
}

impl From<PathBuf> for FileValue {
    fn from(path: PathBuf) -> Self {
        FileValue::Path(path)
    }
}

impl From<&Path> for FileValue {
    fn from(path: &Path) -> Self {
        FileValue::Path(path.to_path_buf())
    }
}

/// A stored parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Boolean(bool),
    File(FileValue),
    StringList(Vec<String>),
}

impl ParamValue {
    /// The kind of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::String(_) => ParamKind::String,
            ParamValue::Boolean(_) => ParamKind::Boolean,
            ParamValue::File(_) => ParamKind::File,
            ParamValue::StringList(_) => ParamKind::StringList,
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<FileValue> for ParamValue {
    fn from(value: FileValue) -> Self {
        ParamValue::File(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::StringList(value)
    }
}

/// One named parameter with its declared kind and current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    required: bool,
    value: Option<ParamValue>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn value(&self) -> Option<&ParamValue> {
        self.value.as_ref()
    }

    /// A required list with no entries counts as unset.
    fn is_set(&self) -> bool {
        match &self.value {
            None => false,
            Some(ParamValue::StringList(values)) => !values.is_empty(),
            Some(_) => true,
        }
    }
}

/// Insertion-ordered mapping from parameter name to [`Parameter`].
///
/// Owned by exactly one request. Lookups are linear; endpoints declare a
/// handful of parameters each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Create a set with the given declarations, all unset.
    pub fn new(specs: &[ParamSpec]) -> Self {
        let params = specs
            .iter()
            .map(|spec| Parameter {
                name: spec.name.to_string(),
                kind: spec.kind,
                required: spec.required,
                value: None,
            })
            .collect();
        Self { params }
    }

    fn find(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    /// Overwrite the value of `name`.
    ///
    /// Undeclared names are appended as optional parameters of the value's
    /// kind. A declared name only accepts values of its declared kind.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let value = value.into();
        match self.find_mut(name) {
            Some(param) => {
                if param.kind != value.kind() {
                    return Err(type_mismatch(name, param.kind, value.kind()));
                }
                param.value = Some(value);
            }
            None => self.params.push(Parameter {
                name: name.to_string(),
                kind: value.kind(),
                required: false,
                value: Some(value),
            }),
        }
        Ok(())
    }

    /// Append one entry to the string list `name`, creating it if needed.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match self.find_mut(name) {
            Some(param) => {
                if param.kind != ParamKind::StringList {
                    return Err(type_mismatch(name, ParamKind::StringList, param.kind));
                }
                match &mut param.value {
                    Some(ParamValue::StringList(values)) => values.push(value),
                    _ => param.value = Some(ParamValue::StringList(vec![value])),
                }
            }
            None => self.params.push(Parameter {
                name: name.to_string(),
                kind: ParamKind::StringList,
                required: false,
                value: Some(ParamValue::StringList(vec![value])),
            }),
        }
        Ok(())
    }

    /// Unset `name`. Declarations are kept.
    pub fn clear(&mut self, name: &str) {
        if let Some(param) = self.find_mut(name) {
            param.value = None;
        }
    }

    /// The stored value of `name`, of whatever kind.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.find(name).and_then(|p| p.value.as_ref())
    }

    /// Returns true if `name` currently has a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.find(name).is_some_and(Parameter::is_set)
    }

    fn checked(&self, name: &str, expected: ParamKind) -> Result<Option<&ParamValue>> {
        match self.find(name) {
            None => Ok(None),
            Some(param) if param.kind != expected => {
                Err(type_mismatch(name, expected, param.kind))
            }
            Some(param) => Ok(param.value.as_ref()),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&str>> {
        Ok(match self.checked(name, ParamKind::String)? {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        Ok(match self.checked(name, ParamKind::Boolean)? {
            Some(ParamValue::Boolean(b)) => Some(*b),
            _ => None,
        })
    }

    pub fn get_file(&self, name: &str) -> Result<Option<&FileValue>> {
        Ok(match self.checked(name, ParamKind::File)? {
            Some(ParamValue::File(f)) => Some(f),
            _ => None,
        })
    }

    pub fn get_string_list(&self, name: &str) -> Result<Option<&[String]>> {
        Ok(match self.checked(name, ParamKind::StringList)? {
            Some(ParamValue::StringList(values)) => Some(values.as_slice()),
            _ => None,
        })
    }

    /// Check that every required parameter is set.
    ///
    /// Reports the first unmet name in declaration order.
    pub fn validate(&self) -> Result<()> {
        match self.params.iter().find(|p| p.required && !p.is_set()) {
            Some(param) => Err(Error::new(ErrorKind::MissingRequiredParameter(
                param.name.clone(),
            ))),
            None => Ok(()),
        }
    }

    /// Parameters that currently hold a value, in declaration order.
    pub fn iter_set(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params
            .iter()
            .filter_map(|p| p.value.as_ref().map(|v| (p.name.as_str(), v)))
    }

    /// All parameters, set or not, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }
}

fn type_mismatch(name: &str, expected: ParamKind, actual: ParamKind) -> Error {
    Error::new(ErrorKind::TypeMismatch {
        name: name.to_string(),
        expected,
        actual,
    })
}
