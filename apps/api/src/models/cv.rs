//! Canonical CV aggregate.
//!
//! Field names serialize in camelCase to match the document format used by
//! export/import and the persisted record. Every top-level field carries a
//! serde default so older persisted records with missing sections still load.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    /// GitHub, LinkedIn, personal site, etc.
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub start_date: String,
    /// `None` means the position is current ("Present").
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub title: String,
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub role: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    pub proficiency: String,
}

/// The complete CV. List order is render order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub languages: Vec<Language>,
}

/// The ordered sections of a CV that can be addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSection {
    Experience,
    Skills,
    Certifications,
    Projects,
    Education,
    Languages,
}

impl ListSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSection::Experience => "experience",
            ListSection::Skills => "skills",
            ListSection::Certifications => "certifications",
            ListSection::Projects => "projects",
            ListSection::Education => "education",
            ListSection::Languages => "languages",
        }
    }
}

/// A single list item together with the section it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "snake_case")]
pub enum SectionItem {
    Experience(ExperienceEntry),
    Skill(String),
    Certification(Certification),
    Project(Project),
    Education(Education),
    Language(Language),
}

impl SectionItem {
    pub fn section(&self) -> ListSection {
        match self {
            SectionItem::Experience(_) => ListSection::Experience,
            SectionItem::Skill(_) => ListSection::Skills,
            SectionItem::Certification(_) => ListSection::Certifications,
            SectionItem::Project(_) => ListSection::Projects,
            SectionItem::Education(_) => ListSection::Education,
            SectionItem::Language(_) => ListSection::Languages,
        }
    }
}
