//! JSON export and import of a whole CV.
//!
//! Import checks the document's top-level shape before deserializing so that a
//! structurally invalid file is rejected with a readable reason and nothing is
//! partially applied.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::cv::Cv;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid JSON file: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("Invalid CV data structure: the document root must be an object")]
    NotAnObject,

    #[error("Invalid CV data structure: `{field}` must be {expected}")]
    Shape {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid CV data structure: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("Failed to serialize CV: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub const DEFAULT_EXPORT_FILENAME: &str = "cv-data.json";

const REQUIRED_LISTS: &[&str] = &["experience", "skills", "certifications", "projects", "education"];

fn expect(
    object: &Map<String, Value>,
    key: &str,
    field: &'static str,
    ok: fn(&Value) -> bool,
    expected: &'static str,
) -> Result<(), TransferError> {
    match object.get(key) {
        Some(value) if ok(value) => Ok(()),
        _ => Err(TransferError::Shape { field, expected }),
    }
}

fn validate_shape(root: &Value) -> Result<(), TransferError> {
    let object = root.as_object().ok_or(TransferError::NotAnObject)?;

    expect(object, "personalInfo", "personalInfo", Value::is_object, "an object")?;
    expect(object, "summary", "summary", Value::is_string, "a string")?;
    for &field in REQUIRED_LISTS {
        expect(object, field, field, Value::is_array, "an array")?;
    }
    // Exports predating the languages section omit it entirely.
    if object.get("languages").is_some_and(|v| !v.is_array()) {
        return Err(TransferError::Shape {
            field: "languages",
            expected: "an array",
        });
    }

    if let Some(personal) = object.get("personalInfo").and_then(Value::as_object) {
        expect(personal, "fullName", "personalInfo.fullName", Value::is_string, "a string")?;
        expect(personal, "location", "personalInfo.location", Value::is_string, "a string")?;
        expect(personal, "email", "personalInfo.email", Value::is_string, "a string")?;
        expect(personal, "links", "personalInfo.links", Value::is_array, "an array")?;
    }

    Ok(())
}

/// Serializes the CV as a pretty-printed JSON document.
pub fn export_json(cv: &Cv) -> Result<String, TransferError> {
    serde_json::to_string_pretty(cv).map_err(TransferError::Serialize)
}

/// Download name for an export, derived from the candidate's name.
/// Characters that cannot appear in a header value are dropped.
pub fn export_filename(cv: &Cv) -> String {
    let stem: String = cv
        .personal_info
        .full_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if stem.is_empty() {
        DEFAULT_EXPORT_FILENAME.to_string()
    } else {
        format!("{stem}-{DEFAULT_EXPORT_FILENAME}")
    }
}

/// Parses and validates a CV document produced by `export_json` (or by hand).
pub fn import_json(text: &str) -> Result<Cv, TransferError> {
    let root: Value = serde_json::from_str(text).map_err(TransferError::Syntax)?;
    validate_shape(&root)?;
    serde_json::from_value(root).map_err(TransferError::Schema)
}
