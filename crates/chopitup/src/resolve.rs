//! Turn sentences into clip sequences.

use clipdex_db::WordIndex;
use clipdex_fuzzy::FuzzyResolver;
use clipdex_types::{Occurrence, Segment};
use serde::Serialize;
use tracing::debug;

/// Words picked for a sentence, in sentence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub occurrences: Vec<Occurrence>,
    /// Tokens with no entry in the index, in sentence order.
    pub missing: Vec<String>,
}

impl Selection {
    /// Attach media paths so the clips can be cut.
    pub fn segments<'a>(&self, index: &'a WordIndex) -> Vec<Segment<'a>> {
        resolve_segments(index, &self.occurrences)
    }
}

/// Pick the first-ingested occurrence of every whitespace-separated word.
///
/// Unknown words are recorded in [`Selection::missing`] and skipped.
pub fn select_segments(index: &WordIndex, sentence: &str) -> Selection {
    let mut occurrences = Vec::new();
    let mut missing = Vec::new();
    for token in sentence.to_lowercase().split_whitespace() {
        match index.first_occurrence(token) {
            Some(occ) => occurrences.push(*occ),
            None => {
                debug!("word {token:?} not found in the library");
                missing.push(token.to_string());
            }
        }
    }
    Selection {
        occurrences,
        missing,
    }
}

pub fn resolve_segments<'a>(index: &'a WordIndex, occurrences: &[Occurrence]) -> Vec<Segment<'a>> {
    occurrences
        .iter()
        .filter_map(|occ| index.segment(occ))
        .collect()
}

/// Every occurrence of a single word, in ingestion order.
pub fn word_instances<'a>(index: &'a WordIndex, word: &str) -> &'a [Occurrence] {
    index.occurrences(&word.to_lowercase())
}

/// Default file name for an all-instances cut, e.g. `12-hello-words.mp4`.
pub fn instances_output_name(word: &str, count: usize) -> String {
    let sanitized: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    format!("{count}-{sanitized}-words.mp4")
}

/// How one sentence word was answered by the vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordChoice {
    pub query: String,
    pub resolved: String,
    pub exact: bool,
}

/// Feasibility preview for a sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub choices: Vec<WordChoice>,
    /// Words with neither an exact match nor a substitute.
    pub unresolved: Vec<String>,
    pub substitution_made: bool,
}

impl Preview {
    /// The sentence rebuilt from resolved words.
    pub fn phrase(&self) -> String {
        self.choices
            .iter()
            .map(|c| c.resolved.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Closing line for the preview; `None` when nothing resolved.
    pub fn summary(&self) -> Option<String> {
        if self.choices.is_empty() {
            return None;
        }
        let phrase = self.phrase();
        Some(if self.substitution_made {
            format!("We don't have all those words, how about this: {phrase}")
        } else {
            format!("All words were found for string: {phrase}")
        })
    }
}

/// Check a sentence against the vocabulary, proposing substitutes.
///
/// `?` and `!` are dropped before splitting. A word that has no substitute
/// still counts as a substitution.
pub fn check_sentence(index: &WordIndex, sentence: &str) -> Preview {
    let resolver = FuzzyResolver::new(index.vocabulary());
    let cleaned = sentence.replace(['?', '!'], "").to_lowercase();

    let mut choices = Vec::new();
    let mut unresolved = Vec::new();
    let mut substitution_made = false;
    for token in cleaned.split_whitespace() {
        match resolver.resolve(token) {
            Some(res) => {
                if !res.is_exact() {
                    substitution_made = true;
                }
                choices.push(WordChoice {
                    query: token.to_string(),
                    resolved: res.word().to_string(),
                    exact: res.is_exact(),
                });
            }
            None => {
                substitution_made = true;
                unresolved.push(token.to_string());
            }
        }
    }

    Preview {
        choices,
        unresolved,
        substitution_made,
    }
}
