//! CV language detection by word frequency over a short text sample.
//!
//! The result is injected into the assistant prompt so that proposed content
//! stays in the CV's own language whatever language the user chats in.

use serde::{Deserialize, Serialize};

use crate::models::cv::Cv;

/// Max characters of sample text scored.
const SAMPLE_BUDGET: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageTag {
    #[default]
    English,
    Italian,
    French,
    Spanish,
    Portuguese,
    German,
}

impl LanguageTag {
    pub fn name(&self) -> &'static str {
        match self {
            LanguageTag::English => "English",
            LanguageTag::Italian => "Italian",
            LanguageTag::French => "French",
            LanguageTag::Spanish => "Spanish",
            LanguageTag::Portuguese => "Portuguese",
            LanguageTag::German => "German",
        }
    }
}

/// Scored in this order; on equal scores the earlier language is kept.
const LANGUAGE_MARKERS: &[(LanguageTag, &[&str])] = &[
    (
        LanguageTag::English,
        &["the", "and", "for", "with", "this", "that", "have", "from", "your", "will"],
    ),
    (
        LanguageTag::Italian,
        &[
            "della", "dello", "degli", "nelle", "questo", "sono", "anche", "come", "con", "per",
            "una", "del", "nel", "che", "ho", "mi", "al",
        ],
    ),
    (
        LanguageTag::French,
        &[
            "dans", "avec", "pour", "sur", "les", "des", "une", "qui", "est", "ont", "nous",
            "vous", "leur", "mais",
        ],
    ),
    (
        LanguageTag::Spanish,
        &[
            "para", "con", "por", "que", "este", "una", "del", "las", "los", "son", "también",
            "como",
        ],
    ),
    (
        LanguageTag::Portuguese,
        &[
            "para", "com", "por", "que", "uma", "das", "dos", "são", "também", "como", "pelo",
        ],
    ),
    (
        LanguageTag::German,
        &[
            "und", "mit", "für", "auf", "eine", "einer", "wird", "haben", "oder", "auch", "aus",
        ],
    ),
];

fn sample_text(cv: &Cv) -> String {
    let first = cv.experience.first().map(|e| e.description.as_str());
    let second = cv.experience.get(1).map(|e| e.description.as_str());
    [cv.summary.as_str(), first.unwrap_or(""), second.unwrap_or("")]
        .join(" ")
        .to_lowercase()
        .chars()
        .take(SAMPLE_BUDGET)
        .collect()
}

/// Detects the dominant language of the CV's free text.
/// Deterministic; an empty sample yields English.
pub fn detect_language(cv: &Cv) -> LanguageTag {
    let sample = sample_text(cv);
    if sample.trim().is_empty() {
        return LanguageTag::English;
    }

    let words: Vec<&str> = sample.split_whitespace().collect();
    let mut best = LanguageTag::English;
    let mut best_score = 0;

    for (language, markers) in LANGUAGE_MARKERS {
        let score = words.iter().filter(|w| markers.contains(*w)).count();
        if score > best_score {
            best_score = score;
            best = *language;
        }
    }

    best
}
