//! Partial CV updates proposed by the assistant.
//!
//! A `CvPatch` never carries personal information: the type has no such field,
//! so whatever the model sends under `personalInfo` is dropped at the boundary.
//! Every section is an `Option` so "absent" (no change) and "present but empty"
//! stay distinguishable after parsing.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PatchShapeError {
    #[error("proposed changes must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("proposed changes do not match the CV schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Models often emit years and dates as numbers; accept any scalar as text.
fn scalar_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => {
            Err(E::invalid_type(de::Unexpected::Other("a list or object"), &"a string"))
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
}

/// Distinguishes a missing key (`None`) from an explicit `null` (`Some(None)`).
fn lenient_end_date<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub company: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<String>,
    /// `Some(None)` is an explicit "Present".
    #[serde(
        default,
        deserialize_with = "lenient_end_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationPatch {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationPatch {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub degree: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub institution: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePatch {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub language: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub proficiency: Option<String>,
}

/// Any subset of the CV except `personalInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperiencePatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<CertificationPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguagePatch>>,
}

impl CvPatch {
    /// True when no section is proposed at all.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.experience.is_none()
            && self.skills.is_none()
            && self.certifications.is_none()
            && self.projects.is_none()
            && self.education.is_none()
            && self.languages.is_none()
    }

    /// Validates model output into a typed patch.
    ///
    /// Unknown keys are ignored; a `personalInfo` key is dropped with a warning.
    pub fn from_untrusted(value: Value) -> Result<Self, PatchShapeError> {
        let object = match &value {
            Value::Object(map) => map,
            Value::Null => return Err(PatchShapeError::NotAnObject("null")),
            Value::Bool(_) => return Err(PatchShapeError::NotAnObject("a boolean")),
            Value::Number(_) => return Err(PatchShapeError::NotAnObject("a number")),
            Value::String(_) => return Err(PatchShapeError::NotAnObject("a string")),
            Value::Array(_) => return Err(PatchShapeError::NotAnObject("an array")),
        };

        if object.contains_key("personalInfo") {
            warn!("Dropping personalInfo from proposed changes");
        }

        Ok(serde_json::from_value(value)?)
    }
}
