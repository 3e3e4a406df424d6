//! Structural validation of bundle configuration documents.
//!
//! Fail-fast: the first violation found is returned. Required:
//! a `bundle` mapping with a non-empty string `bundle.name`. Optional
//! sections are checked only when present and non-null; unknown top-level
//! keys are ignored.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::document::{self, DocumentError};
use crate::models::Document;

/// A single validation failure, pinpointing the section/field/index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bundle configuration: {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from [`ConfigValidator::validate_file`].
#[derive(Error, Debug)]
pub enum ValidateFileError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Validates bundle configuration documents.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a document, returning the first violation found.
    pub fn validate(config: &Document) -> Result<(), ValidationError> {
        validate_bundle(config)?;

        if let Some(includes) = present(config, "includes") {
            validate_list_of_mappings(includes, "includes", "bundle")?;
        }
        for section in ["providers", "tools", "hooks"] {
            if let Some(list) = present(config, section) {
                validate_list_of_mappings(list, section, "module")?;
            }
        }
        if let Some(spawn) = present(config, "spawn") {
            validate_spawn(spawn)?;
        }

        Ok(())
    }

    /// Load a bundle document from disk and validate it.
    pub fn validate_file(path: &Path) -> Result<Document, ValidateFileError> {
        let loaded = document::load_document(path)?;
        Self::validate(&loaded.document)?;
        Ok(loaded.document)
    }
}

/// A section that is present and not null.
fn present<'a>(config: &'a Document, key: &str) -> Option<&'a Value> {
    config.get(key).filter(|v| !v.is_null())
}

fn validate_bundle(config: &Document) -> Result<(), ValidationError> {
    let bundle = config
        .get("bundle")
        .ok_or_else(|| ValidationError::new("missing required section 'bundle'"))?;
    let bundle = bundle
        .as_object()
        .ok_or_else(|| ValidationError::new("'bundle' must be a mapping"))?;

    match bundle.get("name") {
        None | Some(Value::Null) => Err(ValidationError::new(
            "missing required field 'bundle.name'",
        )),
        Some(Value::String(name)) if name.is_empty() => Err(ValidationError::new(
            "'bundle.name' must be a non-empty string",
        )),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::new("'bundle.name' must be a string")),
    }
}

fn validate_list_of_mappings(
    value: &Value,
    section: &str,
    required_key: &str,
) -> Result<(), ValidationError> {
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::new(format!("'{section}' must be a list")))?;

    for (i, item) in items.iter().enumerate() {
        let entry = item
            .as_object()
            .ok_or_else(|| ValidationError::new(format!("{section}[{i}] must be a mapping")))?;
        if !entry.contains_key(required_key) {
            return Err(ValidationError::new(format!(
                "{section}[{i}] is missing required key '{required_key}'"
            )));
        }
    }
    Ok(())
}

fn validate_spawn(value: &Value) -> Result<(), ValidationError> {
    let spawn = value
        .as_object()
        .ok_or_else(|| ValidationError::new("'spawn' must be a mapping"))?;

    for key in ["exclude_tools", "tools"] {
        if let Some(v) = spawn.get(key) {
            if !v.is_array() {
                return Err(ValidationError::new(format!("'spawn.{key}' must be a list")));
            }
        }
    }
    if spawn.contains_key("exclude_tools") && spawn.contains_key("tools") {
        return Err(ValidationError::new(
            "'spawn' cannot specify both 'tools' and 'exclude_tools'",
        ));
    }
    Ok(())
}
