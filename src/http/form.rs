//! Multipart form payloads.
//!
//! Payloads are flattened from their serialized form: one field per top-level
//! key. Booleans travel as `"1"`/`"0"`, scalar arrays as comma-joined text and
//! nested objects as JSON strings.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{ApiError, Result};

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk; the MIME type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Validation(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::new(file_name, mime.essence_str(), bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// Ordered multipart fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a serializable struct or map into form fields.
    pub fn from_serialize<T: Serialize>(payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(ApiError::Validation(format!(
                "form payload must be an object, got {}",
                other
            ))),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut form = Self::new();
        for (key, value) in map {
            if let Some(text) = field_text(&value) {
                form.fields.push((key, FormValue::Text(text)));
            }
        }
        form
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.fields.push((name.into(), FormValue::File(part)));
        self
    }

    /// Attach a file only when one was provided (edits usually keep the old image).
    pub fn maybe_file(self, name: impl Into<String>, part: Option<FilePart>) -> Self {
        match part {
            Some(part) => self.file(name, part),
            None => self,
        }
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(key, value)| match value {
            FormValue::Text(text) if key == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|(key, value)| key == name && matches!(value, FormValue::File(_)))
    }

    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(file) => {
                    let part = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime)
                        .map_err(|e| ApiError::Validation(format!("invalid MIME type: {}", e)))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(items) if items.iter().all(is_scalar) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_text(scalar),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
