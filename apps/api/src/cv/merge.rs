//! Patch merge engine.
//!
//! `apply_patch` reconciles an assistant-proposed `CvPatch` into a CV without
//! mutating its input. List sections are merged by a lower-cased composite
//! natural key: a proposed item whose key matches an existing entry updates
//! that entry in place (proposed fields win), anything else is appended in
//! patch order. Proposed items that cannot be keyed (an identifying field
//! missing) are always appended, never dropped. A blank field is still a key
//! part, so `"Acme"` with an empty role matches itself on every apply.
//!
//! Skills are merged as an ordered union with exact, case-sensitive string
//! comparison, so "TypeScript" and "typescript" are both kept. The object
//! sections compare keys case-insensitively.

use std::collections::HashSet;

use crate::models::cv::{Certification, Cv, Education, ExperienceEntry, Language, Project};
use crate::models::patch::{
    CertificationPatch, CvPatch, EducationPatch, ExperiencePatch, LanguagePatch, ProjectPatch,
};

/// A list entry that can absorb a partial proposal of itself.
pub trait Mergeable: Clone {
    type Patch;

    fn merge_key(&self) -> String;
    fn patch_key(patch: &Self::Patch) -> Option<String>;
    fn absorb(&mut self, patch: &Self::Patch);
    fn from_patch(patch: &Self::Patch) -> Self;
}

fn composite_key(parts: &[&str]) -> String {
    parts.join("-").to_lowercase()
}

fn patch_composite_key(parts: &[Option<&String>]) -> Option<String> {
    let parts: Option<Vec<&str>> = parts.iter().map(|p| p.map(String::as_str)).collect();
    Some(composite_key(&parts?))
}

fn take(target: &mut String, proposed: &Option<String>) {
    if let Some(value) = proposed {
        target.clone_from(value);
    }
}

impl Mergeable for ExperienceEntry {
    type Patch = ExperiencePatch;

    fn merge_key(&self) -> String {
        composite_key(&[self.company.as_str(), self.role.as_str()])
    }

    fn patch_key(patch: &ExperiencePatch) -> Option<String> {
        patch_composite_key(&[patch.company.as_ref(), patch.role.as_ref()])
    }

    fn absorb(&mut self, patch: &ExperiencePatch) {
        take(&mut self.company, &patch.company);
        take(&mut self.role, &patch.role);
        take(&mut self.start_date, &patch.start_date);
        if let Some(end_date) = &patch.end_date {
            self.end_date.clone_from(end_date);
        }
        if patch.location.is_some() {
            self.location.clone_from(&patch.location);
        }
        take(&mut self.description, &patch.description);
    }

    fn from_patch(patch: &ExperiencePatch) -> Self {
        let mut entry = ExperienceEntry::default();
        entry.absorb(patch);
        entry
    }
}

impl Mergeable for Certification {
    type Patch = CertificationPatch;

    fn merge_key(&self) -> String {
        composite_key(&[self.title.as_str(), self.issuer.as_str()])
    }

    fn patch_key(patch: &CertificationPatch) -> Option<String> {
        patch_composite_key(&[patch.title.as_ref(), patch.issuer.as_ref()])
    }

    fn absorb(&mut self, patch: &CertificationPatch) {
        take(&mut self.title, &patch.title);
        take(&mut self.issuer, &patch.issuer);
        if patch.year.is_some() {
            self.year.clone_from(&patch.year);
        }
    }

    fn from_patch(patch: &CertificationPatch) -> Self {
        let mut entry = Certification::default();
        entry.absorb(patch);
        entry
    }
}

impl Mergeable for Project {
    type Patch = ProjectPatch;

    fn merge_key(&self) -> String {
        composite_key(&[self.name.as_str()])
    }

    fn patch_key(patch: &ProjectPatch) -> Option<String> {
        patch_composite_key(&[patch.name.as_ref()])
    }

    fn absorb(&mut self, patch: &ProjectPatch) {
        take(&mut self.name, &patch.name);
        take(&mut self.role, &patch.role);
        take(&mut self.link, &patch.link);
        take(&mut self.description, &patch.description);
    }

    fn from_patch(patch: &ProjectPatch) -> Self {
        let mut entry = Project::default();
        entry.absorb(patch);
        entry
    }
}

impl Mergeable for Education {
    type Patch = EducationPatch;

    fn merge_key(&self) -> String {
        composite_key(&[self.degree.as_str(), self.institution.as_str()])
    }

    fn patch_key(patch: &EducationPatch) -> Option<String> {
        patch_composite_key(&[patch.degree.as_ref(), patch.institution.as_ref()])
    }

    fn absorb(&mut self, patch: &EducationPatch) {
        take(&mut self.degree, &patch.degree);
        take(&mut self.institution, &patch.institution);
        take(&mut self.location, &patch.location);
        take(&mut self.year, &patch.year);
    }

    fn from_patch(patch: &EducationPatch) -> Self {
        let mut entry = Education::default();
        entry.absorb(patch);
        entry
    }
}

impl Mergeable for Language {
    type Patch = LanguagePatch;

    fn merge_key(&self) -> String {
        composite_key(&[self.language.as_str()])
    }

    fn patch_key(patch: &LanguagePatch) -> Option<String> {
        patch_composite_key(&[patch.language.as_ref()])
    }

    fn absorb(&mut self, patch: &LanguagePatch) {
        take(&mut self.language, &patch.language);
        take(&mut self.proficiency, &patch.proficiency);
    }

    fn from_patch(patch: &LanguagePatch) -> Self {
        let mut entry = Language::default();
        entry.absorb(patch);
        entry
    }
}

/// Merges proposed items into `current` by merge key.
///
/// Appended items are visible to later proposals, so two proposals sharing a
/// key collapse into one entry with the last one's fields winning.
pub fn merge_by_key<T: Mergeable>(current: &[T], proposed: Option<&[T::Patch]>) -> Vec<T> {
    let mut result = current.to_vec();
    let Some(proposed) = proposed else {
        return result;
    };

    for item in proposed {
        let existing = T::patch_key(item).and_then(|key| {
            result
                .iter()
                .position(|entry| entry.merge_key() == key)
        });
        match existing {
            Some(index) => result[index].absorb(item),
            None => result.push(T::from_patch(item)),
        }
    }

    result
}

/// Ordered union: current skills first, then new proposals in patch order.
pub fn union_skills(current: &[String], proposed: Option<&[String]>) -> Vec<String> {
    let Some(proposed) = proposed else {
        return current.to_vec();
    };

    let mut seen = HashSet::new();
    current
        .iter()
        .chain(proposed)
        .filter(|skill| seen.insert(skill.as_str()))
        .cloned()
        .collect()
}

/// Computes the CV that results from applying `patch` to `current`.
/// `personal_info` is always carried over untouched.
pub fn apply_patch(current: &Cv, patch: &CvPatch) -> Cv {
    Cv {
        personal_info: current.personal_info.clone(),
        summary: patch
            .summary
            .clone()
            .unwrap_or_else(|| current.summary.clone()),
        experience: merge_by_key(&current.experience, patch.experience.as_deref()),
        skills: union_skills(&current.skills, patch.skills.as_deref()),
        certifications: merge_by_key(&current.certifications, patch.certifications.as_deref()),
        projects: merge_by_key(&current.projects, patch.projects.as_deref()),
        education: merge_by_key(&current.education, patch.education.as_deref()),
        languages: merge_by_key(&current.languages, patch.languages.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::PersonalInfo;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> CvPatch {
        CvPatch::from_untrusted(value).unwrap()
    }

    fn experience(company: &str, role: &str, description: &str) -> ExperienceEntry {
        ExperienceEntry {
            company: company.to_string(),
            role: role.to_string(),
            start_date: "2020-01".to_string(),
            end_date: None,
            location: Some("Remote".to_string()),
            description: description.to_string(),
        }
    }

    fn sample_cv() -> Cv {
        Cv {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                location: "Milan".to_string(),
                email: "jane@x.com".to_string(),
                links: vec!["https://github.com/jane".to_string()],
            },
            summary: "Engineer".to_string(),
            experience: vec![experience("Acme", "Engineer", "old")],
            skills: vec!["Go".to_string(), "Rust".to_string()],
            certifications: vec![Certification {
                title: "CKA".to_string(),
                issuer: "CNCF".to_string(),
                year: Some("2021".to_string()),
            }],
            languages: vec![Language {
                language: "English".to_string(),
                proficiency: "C1".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let cv = sample_cv();
        assert_eq!(apply_patch(&cv, &CvPatch::default()), cv);
    }

    #[test]
    fn test_skills_union_without_duplicates() {
        let cv = sample_cv();
        let merged = apply_patch(&cv, &patch(json!({ "skills": ["Rust", "Python"] })));
        assert_eq!(merged.skills, vec!["Go", "Rust", "Python"]);
    }

    /// Skills dedup is exact-match while object sections use lower-cased keys.
    /// This asymmetry is kept on purpose.
    #[test]
    fn test_skills_dedup_is_case_sensitive() {
        let cv = Cv {
            skills: vec!["TypeScript".to_string()],
            ..Default::default()
        };
        let merged = apply_patch(&cv, &patch(json!({ "skills": ["typescript"] })));
        assert_eq!(merged.skills, vec!["TypeScript", "typescript"]);
    }

    #[test]
    fn test_empty_skills_list_keeps_current() {
        let cv = sample_cv();
        let merged = apply_patch(&cv, &patch(json!({ "skills": [] })));
        assert_eq!(merged.skills, cv.skills);
    }

    #[test]
    fn test_experience_merge_by_key() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({
                "experience": [
                    { "company": "Acme", "role": "Engineer", "description": "new" },
                    { "company": "Globex", "role": "Analyst", "description": "x" }
                ]
            })),
        );
        assert_eq!(merged.experience.len(), 2);
        assert_eq!(merged.experience[0].company, "Acme");
        assert_eq!(merged.experience[0].description, "new");
        assert_eq!(merged.experience[1].company, "Globex");
        assert_eq!(merged.experience[1].role, "Analyst");
    }

    #[test]
    fn test_experience_key_is_case_insensitive() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({ "experience": [{ "company": "ACME", "role": "engineer", "description": "new" }] })),
        );
        assert_eq!(merged.experience.len(), 1);
        assert_eq!(merged.experience[0].description, "new");
        assert_eq!(merged.experience[0].company, "ACME");
    }

    #[test]
    fn test_missing_optional_fields_keep_existing_values() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({ "experience": [{ "company": "Acme", "role": "Engineer", "description": "new" }] })),
        );
        let entry = &merged.experience[0];
        assert_eq!(entry.location.as_deref(), Some("Remote"));
        assert_eq!(entry.start_date, "2020-01");
    }

    #[test]
    fn test_explicit_null_end_date_marks_present() {
        let mut cv = sample_cv();
        cv.experience[0].end_date = Some("2023-01".to_string());
        let merged = apply_patch(
            &cv,
            &patch(json!({ "experience": [{ "company": "Acme", "role": "Engineer", "endDate": null }] })),
        );
        assert_eq!(merged.experience[0].end_date, None);
    }

    #[test]
    fn test_personal_info_is_invariant() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({
                "personalInfo": { "fullName": "Mallory", "email": "m@evil.com" },
                "summary": "changed"
            })),
        );
        assert_eq!(merged.personal_info, cv.personal_info);
        assert_eq!(merged.summary, "changed");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let cv = sample_cv();
        let p = patch(json!({
            "summary": "Senior engineer",
            "skills": ["Rust", "Kubernetes"],
            "experience": [{ "company": "Globex", "role": "Analyst", "startDate": "2019", "endDate": "2020", "description": "x" }],
            "certifications": [{ "title": "CKA", "issuer": "CNCF", "year": "2022" }],
            "projects": [{ "name": "Kith", "role": "Author", "link": "", "description": "contacts" }],
            "education": [{ "degree": "BSc", "institution": "Polimi", "location": "Milan", "year": "2018" }],
            "languages": [{ "language": "italian", "proficiency": "Native" }]
        }));
        let once = apply_patch(&cv, &p);
        let twice = apply_patch(&once, &p);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let cv = sample_cv();
        let before = cv.clone();
        let _ = apply_patch(&cv, &patch(json!({ "skills": ["Zig"], "summary": "x" })));
        assert_eq!(cv, before);
    }

    #[test]
    fn test_new_items_append_in_patch_order() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({
                "languages": [
                    { "language": "German", "proficiency": "B1" },
                    { "language": "english", "proficiency": "C2" },
                    { "language": "French", "proficiency": "A2" }
                ]
            })),
        );
        let names: Vec<_> = merged.languages.iter().map(|l| l.language.as_str()).collect();
        assert_eq!(names, vec!["english", "German", "French"]);
        assert_eq!(merged.languages[0].proficiency, "C2");
    }

    #[test]
    fn test_duplicate_keys_in_patch_last_wins() {
        let cv = Cv::default();
        let merged = apply_patch(
            &cv,
            &patch(json!({
                "experience": [
                    { "company": "Acme", "role": "Engineer", "description": "first" },
                    { "company": "acme", "role": "ENGINEER", "description": "second" }
                ]
            })),
        );
        assert_eq!(merged.experience.len(), 1);
        assert_eq!(merged.experience[0].description, "second");
    }

    #[test]
    fn test_unkeyable_items_are_appended() {
        let cv = sample_cv();
        let p = patch(json!({
            "experience": [{ "company": "Acme", "description": "no role given" }],
            "projects": [{ "description": "nameless" }]
        }));
        let merged = apply_patch(&cv, &p);
        assert_eq!(merged.experience.len(), 2);
        assert_eq!(merged.experience[0].description, "old");
        assert_eq!(merged.experience[1].description, "no role given");
        assert_eq!(merged.projects.len(), 1);
        assert_eq!(merged.projects[0].description, "nameless");
    }

    #[test]
    fn test_blank_identifying_field_is_still_a_key() {
        let p = patch(json!({
            "experience": [{ "company": "Acme", "role": "", "description": "freelance" }],
            "projects": [{ "name": "", "role": "Dev", "link": "", "description": "side work" }]
        }));
        let once = apply_patch(&Cv::default(), &p);
        let twice = apply_patch(&once, &p);
        assert_eq!(once.experience.len(), 1);
        assert_eq!(once.projects.len(), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_certification_year_merges_field_wise() {
        let cv = sample_cv();
        let merged = apply_patch(
            &cv,
            &patch(json!({ "certifications": [{ "title": "cka", "issuer": "cncf" }] })),
        );
        assert_eq!(merged.certifications.len(), 1);
        assert_eq!(merged.certifications[0].year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_independent_keys_commute() {
        let cv = sample_cv();
        let a = patch(json!({ "projects": [{ "name": "Alpha", "role": "Lead", "link": "", "description": "a" }] }));
        let b = patch(json!({ "projects": [{ "name": "Beta", "role": "Dev", "link": "", "description": "b" }] }));
        let ab = apply_patch(&apply_patch(&cv, &a), &b);
        let ba = apply_patch(&apply_patch(&cv, &b), &a);
        let mut ab_names: Vec<_> = ab.projects.iter().map(|p| p.name.clone()).collect();
        let mut ba_names: Vec<_> = ba.projects.iter().map(|p| p.name.clone()).collect();
        ab_names.sort();
        ba_names.sort();
        assert_eq!(ab_names, ba_names);
    }

    #[test]
    fn test_same_key_most_recent_wins() {
        let cv = sample_cv();
        let a = patch(json!({ "summary": "from a", "languages": [{ "language": "English", "proficiency": "B2" }] }));
        let b = patch(json!({ "languages": [{ "language": "English", "proficiency": "C2" }] }));
        let merged = apply_patch(&apply_patch(&cv, &a), &b);
        assert_eq!(merged.languages[0].proficiency, "C2");
        assert_eq!(merged.summary, "from a");
    }
}
