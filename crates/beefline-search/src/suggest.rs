//! Search box suggestions.

use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;

pub const BREEDS: [&str; 3] = ["West African Shorthorn", "Zebu", "Sanga"];

pub const REGIONS: [&str; 10] = [
    "Ashanti",
    "Northern Savannah",
    "Greater Accra",
    "Western",
    "Central",
    "Eastern",
    "Volta",
    "Upper East",
    "Upper West",
    "Brong Ahafo",
];

pub const POPULAR_SEARCHES: [&str; 6] = [
    "West African Shorthorn",
    "Zebu",
    "Sanga",
    "Ashanti",
    "Northern Savannah",
    "vaccinated cattle",
];

const MAX_IDLE_SUGGESTIONS: usize = 8;
const MAX_MATCH_SUGGESTIONS: usize = 6;

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Breed,
    Region,
    Recent,
    Popular,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breed => "breed",
            Self::Region => "region",
            Self::Recent => "recent",
            Self::Popular => "popular",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// `kind-index`, stable for a given catalog position.
    pub id: String,
    pub text: String,
    pub kind: SuggestionKind,
}

impl Suggestion {
    fn new(kind: SuggestionKind, index: usize, text: &str) -> Self {
        Self {
            id: format!("{}-{}", kind.as_str(), index),
            text: text.to_string(),
            kind,
        }
    }
}

/// Suggestions for the current search box input.
///
/// Blank input lists recent searches then popular ones. Otherwise breeds,
/// regions and recent searches containing the input (case-insensitive).
pub fn suggest(input: &str, history: &[HistoryEntry]) -> Vec<Suggestion> {
    if input.trim().is_empty() {
        let recent = history
            .iter()
            .enumerate()
            .map(|(i, entry)| Suggestion::new(SuggestionKind::Recent, i, &entry.query));
        let popular = POPULAR_SEARCHES
            .iter()
            .enumerate()
            .map(|(i, text)| Suggestion::new(SuggestionKind::Popular, i, text));
        return recent.chain(popular).take(MAX_IDLE_SUGGESTIONS).collect();
    }

    let needle = input.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let mut suggestions: Vec<Suggestion> = Vec::new();
    for (kind, catalog) in [
        (SuggestionKind::Breed, &BREEDS[..]),
        (SuggestionKind::Region, &REGIONS[..]),
    ] {
        for (i, &text) in catalog.iter().enumerate() {
            if matches(text) {
                suggestions.push(Suggestion::new(kind, i, text));
            }
        }
    }

    for (i, entry) in history.iter().enumerate() {
        if matches(&entry.query) && !suggestions.iter().any(|s| s.text == entry.query) {
            suggestions.push(Suggestion::new(SuggestionKind::Recent, i, &entry.query));
        }
    }

    suggestions.truncate(MAX_MATCH_SUGGESTIONS);
    suggestions
}
