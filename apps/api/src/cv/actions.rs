//! CV reducer. Every change to the live CV is expressed as a `CvAction` and
//! computed by `reduce` into a fresh value; the caller swaps it in whole.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cv::merge::apply_patch;
use crate::models::cv::{Cv, ListSection, PersonalInfo, SectionItem};
use crate::models::patch::CvPatch;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CvError {
    #[error("index {index} is out of bounds for {section} (length {len})")]
    IndexOutOfBounds {
        section: &'static str,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CvAction {
    SetPersonalInfo {
        personal_info: PersonalInfo,
    },
    SetSummary {
        summary: String,
    },
    SetSkills {
        skills: Vec<String>,
    },
    AddItem {
        item: SectionItem,
    },
    UpdateItem {
        index: usize,
        item: SectionItem,
    },
    RemoveItem {
        section: ListSection,
        index: usize,
    },
    MoveItem {
        section: ListSection,
        from: usize,
        to: usize,
    },
    Replace {
        cv: Cv,
    },
    Reset,
    /// Only produced by the chat lifecycle when the user applies a proposal.
    #[serde(skip_deserializing)]
    ApplyPatch {
        patch: CvPatch,
    },
}

impl CvAction {
    /// Actions after which earlier snapshots no longer describe the same CV.
    pub fn starts_new_generation(&self) -> bool {
        matches!(self, CvAction::Replace { .. } | CvAction::Reset)
    }
}

fn check_index(section: ListSection, index: usize, len: usize) -> Result<(), CvError> {
    if index < len {
        Ok(())
    } else {
        Err(CvError::IndexOutOfBounds {
            section: section.as_str(),
            index,
            len,
        })
    }
}

/// Position-based reorder: removes the item at `from` and reinserts it at `to`.
/// Both indices must address an existing element.
pub fn move_item<T: Clone>(
    list: &[T],
    from: usize,
    to: usize,
    section: ListSection,
) -> Result<Vec<T>, CvError> {
    check_index(section, from, list.len())?;
    check_index(section, to, list.len())?;
    let mut moved = list.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Ok(moved)
}

fn remove_at<T>(list: &mut Vec<T>, index: usize, section: ListSection) -> Result<(), CvError> {
    check_index(section, index, list.len())?;
    list.remove(index);
    Ok(())
}

fn replace_at<T>(list: &mut [T], index: usize, item: T, section: ListSection) -> Result<(), CvError> {
    check_index(section, index, list.len())?;
    list[index] = item;
    Ok(())
}

/// Computes the next CV state. `current` is never modified.
pub fn reduce(current: &Cv, action: CvAction) -> Result<Cv, CvError> {
    let mut next = current.clone();

    match action {
        CvAction::SetPersonalInfo { personal_info } => next.personal_info = personal_info,
        CvAction::SetSummary { summary } => next.summary = summary,
        CvAction::SetSkills { skills } => next.skills = skills,
        CvAction::AddItem { item } => match item {
            SectionItem::Experience(entry) => next.experience.push(entry),
            SectionItem::Skill(skill) => next.skills.push(skill),
            SectionItem::Certification(entry) => next.certifications.push(entry),
            SectionItem::Project(entry) => next.projects.push(entry),
            SectionItem::Education(entry) => next.education.push(entry),
            SectionItem::Language(entry) => next.languages.push(entry),
        },
        CvAction::UpdateItem { index, item } => {
            let section = item.section();
            match item {
                SectionItem::Experience(entry) => {
                    replace_at(&mut next.experience, index, entry, section)?
                }
                SectionItem::Skill(skill) => replace_at(&mut next.skills, index, skill, section)?,
                SectionItem::Certification(entry) => {
                    replace_at(&mut next.certifications, index, entry, section)?
                }
                SectionItem::Project(entry) => {
                    replace_at(&mut next.projects, index, entry, section)?
                }
                SectionItem::Education(entry) => {
                    replace_at(&mut next.education, index, entry, section)?
                }
                SectionItem::Language(entry) => {
                    replace_at(&mut next.languages, index, entry, section)?
                }
            }
        }
        CvAction::RemoveItem { section, index } => match section {
            ListSection::Experience => remove_at(&mut next.experience, index, section)?,
            ListSection::Skills => remove_at(&mut next.skills, index, section)?,
            ListSection::Certifications => remove_at(&mut next.certifications, index, section)?,
            ListSection::Projects => remove_at(&mut next.projects, index, section)?,
            ListSection::Education => remove_at(&mut next.education, index, section)?,
            ListSection::Languages => remove_at(&mut next.languages, index, section)?,
        },
        CvAction::MoveItem { section, from, to } => match section {
            ListSection::Experience => {
                next.experience = move_item(&next.experience, from, to, section)?
            }
            ListSection::Skills => next.skills = move_item(&next.skills, from, to, section)?,
            ListSection::Certifications => {
                next.certifications = move_item(&next.certifications, from, to, section)?
            }
            ListSection::Projects => next.projects = move_item(&next.projects, from, to, section)?,
            ListSection::Education => {
                next.education = move_item(&next.education, from, to, section)?
            }
            ListSection::Languages => {
                next.languages = move_item(&next.languages, from, to, section)?
            }
        },
        CvAction::Replace { cv } => next = cv,
        CvAction::Reset => next = Cv::default(),
        CvAction::ApplyPatch { patch } => next = apply_patch(current, &patch),
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{Language, Project};

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cv_with_skills(names: &[&str]) -> Cv {
        Cv {
            skills: skills(names),
            ..Default::default()
        }
    }

    #[test]
    fn test_move_item_forward_and_back() {
        let list = skills(&["a", "b", "c", "d"]);
        assert_eq!(
            move_item(&list, 0, 2, ListSection::Skills).unwrap(),
            skills(&["b", "c", "a", "d"])
        );
        assert_eq!(
            move_item(&list, 3, 0, ListSection::Skills).unwrap(),
            skills(&["d", "a", "b", "c"])
        );
        assert_eq!(move_item(&list, 1, 1, ListSection::Skills).unwrap(), list);
    }

    #[test]
    fn test_move_item_is_bounds_checked() {
        let list = skills(&["a", "b"]);
        assert_eq!(
            move_item(&list, 2, 0, ListSection::Skills),
            Err(CvError::IndexOutOfBounds {
                section: "skills",
                index: 2,
                len: 2
            })
        );
        assert!(move_item(&list, 0, 5, ListSection::Skills).is_err());
        assert!(move_item::<String>(&[], 0, 0, ListSection::Skills).is_err());
    }

    #[test]
    fn test_add_update_remove_project() {
        let project = Project {
            name: "Kith".to_string(),
            role: "Author".to_string(),
            link: "https://example.com".to_string(),
            description: "Contacts".to_string(),
        };
        let cv = reduce(
            &Cv::default(),
            CvAction::AddItem {
                item: SectionItem::Project(project.clone()),
            },
        )
        .unwrap();
        assert_eq!(cv.projects, vec![project.clone()]);

        let renamed = Project {
            name: "Kith 2".to_string(),
            ..project
        };
        let cv = reduce(
            &cv,
            CvAction::UpdateItem {
                index: 0,
                item: SectionItem::Project(renamed.clone()),
            },
        )
        .unwrap();
        assert_eq!(cv.projects, vec![renamed]);

        let cv = reduce(
            &cv,
            CvAction::RemoveItem {
                section: ListSection::Projects,
                index: 0,
            },
        )
        .unwrap();
        assert!(cv.projects.is_empty());
    }

    #[test]
    fn test_update_out_of_bounds_fails_without_change() {
        let cv = Cv::default();
        let result = reduce(
            &cv,
            CvAction::UpdateItem {
                index: 0,
                item: SectionItem::Language(Language::default()),
            },
        );
        assert!(matches!(
            result,
            Err(CvError::IndexOutOfBounds {
                section: "languages",
                ..
            })
        ));
    }

    #[test]
    fn test_move_action_reorders_skills() {
        let cv = cv_with_skills(&["Go", "Rust", "Python"]);
        let next = reduce(
            &cv,
            CvAction::MoveItem {
                section: ListSection::Skills,
                from: 2,
                to: 0,
            },
        )
        .unwrap();
        assert_eq!(next.skills, skills(&["Python", "Go", "Rust"]));
        assert_eq!(cv.skills, skills(&["Go", "Rust", "Python"]));
    }

    #[test]
    fn test_reset_returns_empty_cv() {
        let cv = cv_with_skills(&["Go"]);
        assert_eq!(reduce(&cv, CvAction::Reset).unwrap(), Cv::default());
    }

    #[test]
    fn test_apply_patch_action_keeps_personal_info() {
        let mut cv = cv_with_skills(&["Go"]);
        cv.personal_info.full_name = "Jane".to_string();
        let patch = CvPatch {
            skills: Some(skills(&["Rust"])),
            ..Default::default()
        };
        let next = reduce(&cv, CvAction::ApplyPatch { patch }).unwrap();
        assert_eq!(next.skills, skills(&["Go", "Rust"]));
        assert_eq!(next.personal_info.full_name, "Jane");
    }

    #[test]
    fn test_apply_patch_cannot_be_deserialized() {
        let json = r#"{"type": "apply_patch", "patch": {"summary": "x"}}"#;
        assert!(serde_json::from_str::<CvAction>(json).is_err());
    }

    #[test]
    fn test_action_wire_format() {
        let json = r#"{"type": "move_item", "section": "experience", "from": 1, "to": 0}"#;
        let action: CvAction = serde_json::from_str(json).unwrap();
        assert!(matches!(
            action,
            CvAction::MoveItem {
                section: ListSection::Experience,
                from: 1,
                to: 0
            }
        ));

        let json = r#"{"type": "add_item", "item": {"section": "skill", "value": "Rust"}}"#;
        let action: CvAction = serde_json::from_str(json).unwrap();
        assert!(matches!(
            action,
            CvAction::AddItem {
                item: SectionItem::Skill(_)
            }
        ));
    }

    #[test]
    fn test_generation_boundaries() {
        assert!(CvAction::Reset.starts_new_generation());
        assert!(CvAction::Replace { cv: Cv::default() }.starts_new_generation());
        assert!(!CvAction::SetSummary {
            summary: String::new()
        }
        .starts_new_generation());
    }
}
