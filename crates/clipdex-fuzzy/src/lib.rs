//! Pick a stand-in word from a fixed vocabulary.
//!
//! When a sentence asks for a word nobody said on camera, the closest word
//! that *was* said is often good enough for a supercut. [`FuzzyResolver`]
//! answers that question purely orthographically:
//!
//! 1. A word already in the vocabulary is returned as-is.
//! 2. Otherwise only words with the same first character and a length within
//!    [`DEFAULT_MAX_LEN_DIFF`] characters are considered.
//! 3. The candidate with the highest [`similarity_ratio`] wins; ties go to
//!    the lexicographically smallest word.
//!
//! The crate does not know how the vocabulary is stored; it borrows whatever
//! word iterator the caller hands over.
//!
//! # Example
//! ```rust
//! use clipdex_fuzzy::FuzzyResolver;
//!
//! let resolver = FuzzyResolver::new(["cat", "cart", "dog"]);
//! assert_eq!(resolver.resolve("dog").unwrap().word(), "dog");
//! assert_eq!(resolver.resolve("cot").unwrap().word(), "cat");
//! assert!(resolver.resolve("zebra").is_none());
//! ```

pub mod ratio;

use std::collections::{HashMap, HashSet};

use tracing::debug;

pub use ratio::{MatchBlock, matching_blocks, similarity_ratio};

/// Largest allowed difference in character count between query and candidate.
pub const DEFAULT_MAX_LEN_DIFF: usize = 2;

/// How a query was answered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// The query itself is in the vocabulary.
    Exact(&'a str),
    /// A different word stands in for the query.
    Substitute { word: &'a str, score: f64 },
}

impl<'a> Resolution<'a> {
    pub fn word(&self) -> &'a str {
        match *self {
            Resolution::Exact(word) => word,
            Resolution::Substitute { word, .. } => word,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Resolution::Exact(_))
    }
}

/// Vocabulary bucketed by first character for substitute lookups.
#[derive(Clone, Debug)]
pub struct FuzzyResolver<'a> {
    known: HashSet<&'a str>,
    by_initial: HashMap<char, Vec<&'a str>>,
    max_len_diff: usize,
}

impl<'a> FuzzyResolver<'a> {
    pub fn new<I>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut known = HashSet::new();
        let mut by_initial: HashMap<char, Vec<&'a str>> = HashMap::new();
        for word in vocabulary {
            let Some(initial) = word.chars().next() else {
                continue;
            };
            if known.insert(word) {
                by_initial.entry(initial).or_default().push(word);
            }
        }
        for bucket in by_initial.values_mut() {
            bucket.sort_unstable();
        }
        Self {
            known,
            by_initial,
            max_len_diff: DEFAULT_MAX_LEN_DIFF,
        }
    }

    /// Widen or narrow the length window used for substitutes.
    ///
    /// The `chopitup` binary always keeps [`DEFAULT_MAX_LEN_DIFF`]; library
    /// callers with longer vocabularies may want a looser window. Exact
    /// matches are unaffected.
    ///
    /// ```rust
    /// use clipdex_fuzzy::FuzzyResolver;
    ///
    /// let resolver = FuzzyResolver::new(["catalog"]);
    /// assert!(resolver.resolve("cat").is_none());
    /// let wide = resolver.with_max_len_diff(4);
    /// assert_eq!(wide.resolve("cat").unwrap().word(), "catalog");
    /// ```
    pub fn with_max_len_diff(mut self, max_len_diff: usize) -> Self {
        self.max_len_diff = max_len_diff;
        self
    }

    /// Exact word if known, otherwise the best substitute, otherwise `None`.
    pub fn resolve(&self, query: &str) -> Option<Resolution<'a>> {
        if let Some(&word) = self.known.get(query) {
            return Some(Resolution::Exact(word));
        }
        self.best_substitute(query)
            .map(|(word, score)| Resolution::Substitute { word, score })
    }

    /// Whether `candidate` may stand in for `query` at all.
    pub fn is_eligible(&self, query: &str, candidate: &str) -> bool {
        match (query.chars().next(), candidate.chars().next()) {
            (Some(q), Some(c)) if q == c => {
                query.chars().count().abs_diff(candidate.chars().count()) <= self.max_len_diff
            }
            _ => false,
        }
    }

    fn best_substitute(&self, query: &str) -> Option<(&'a str, f64)> {
        let initial = query.chars().next()?;
        let bucket = self.by_initial.get(&initial)?;

        let mut best: Option<(&'a str, f64)> = None;
        let mut best_score = 0.0;
        for &candidate in bucket {
            if candidate == query || !self.is_eligible(query, candidate) {
                continue;
            }
            let score = similarity_ratio(query, candidate);
            if score > best_score {
                best_score = score;
                best = Some((candidate, score));
            }
        }

        match best {
            Some((word, score)) => debug!("substitute for {query:?}: {word:?} ({score:.3})"),
            None => debug!("no substitute for {query:?}"),
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_similar_words() {
        let resolver = FuzzyResolver::new(["cat", "cats", "cap", "cart"]);
        assert_eq!(resolver.resolve("cat"), Some(Resolution::Exact("cat")));
    }

    #[test]
    fn picks_highest_similarity() {
        let resolver = FuzzyResolver::new(["cart", "cat"]);
        let res = resolver.resolve("cot").unwrap();
        assert_eq!(res.word(), "cat");
        assert!(!res.is_exact());
        match res {
            Resolution::Substitute { score, .. } => assert!((score - 4.0 / 6.0).abs() < 1e-9),
            Resolution::Exact(_) => unreachable!(),
        }
    }

    #[test]
    fn requires_same_initial_and_close_length() {
        let resolver = FuzzyResolver::new(["bat", "catalogue", "cot"]);
        assert!(resolver.is_eligible("cat", "cot"));
        assert!(!resolver.is_eligible("cat", "bat"));
        assert!(!resolver.is_eligible("cat", "catalogue"));
        assert_eq!(resolver.resolve("cat").unwrap().word(), "cot");
        assert!(resolver.resolve("dog").is_none());
    }

    #[test]
    fn length_window_is_configurable() {
        let resolver = FuzzyResolver::new(["catalog"]);
        assert!(resolver.resolve("cat").is_none());
        let wide = resolver.with_max_len_diff(4);
        assert_eq!(wide.resolve("cat").unwrap().word(), "catalog");
    }

    #[test]
    fn ties_go_to_the_lexicographically_smallest_word() {
        // "bag" and "bat" both share two of three characters with "bad".
        let forward = FuzzyResolver::new(["bag", "bat"]);
        let reverse = FuzzyResolver::new(["bat", "bag"]);
        assert_eq!(forward.resolve("bad").unwrap().word(), "bag");
        assert_eq!(reverse.resolve("bad").unwrap().word(), "bag");
    }

    #[test]
    fn empty_query_resolves_to_nothing() {
        let resolver = FuzzyResolver::new(["a", ""]);
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn compares_characters_for_length_and_initial() {
        let resolver = FuzzyResolver::new(["élan", "elan"]);
        assert_eq!(resolver.resolve("éla").unwrap().word(), "élan");
    }
}
