//! Frequency and length statistics over a word library.

use std::fmt;

use clipdex_db::WordIndex;
use serde::Serialize;

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    /// Include per-occurrence detail in single-word reports.
    pub verbose: bool,
    pub top_n: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordLength {
    pub word: String,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_occurrences: usize,
    pub unique_words: usize,
    pub top_n: usize,
    pub most_frequent: Vec<WordFrequency>,
    pub longest: Vec<WordLength>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceDetail {
    pub source: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordStats {
    pub word: String,
    pub occurrences: usize,
    /// Empty unless [`StatsOptions::verbose`] was set.
    pub details: Vec<OccurrenceDetail>,
}

/// Occurrence count per word, in lexicographic word order.
pub fn frequencies(index: &WordIndex) -> Vec<(&str, usize)> {
    index
        .entries()
        .map(|(word, occs)| (word, occs.len()))
        .collect()
}

/// Library-wide totals plus the top words by frequency and by length.
///
/// Both rankings are descending; equal values keep lexicographic order.
pub fn global_stats(index: &WordIndex, opts: StatsOptions) -> GlobalStats {
    let freqs = frequencies(index);
    let total_occurrences: usize = freqs.iter().map(|(_, n)| n).sum();
    let unique_words = freqs.len();

    let mut by_length: Vec<(&str, usize)> = freqs
        .iter()
        .map(|(word, _)| (*word, word.chars().count()))
        .collect();
    by_length.sort_by(|a, b| b.1.cmp(&a.1));
    by_length.truncate(opts.top_n);

    let mut by_count = freqs;
    by_count.sort_by(|a, b| b.1.cmp(&a.1));
    by_count.truncate(opts.top_n);

    GlobalStats {
        total_occurrences,
        unique_words,
        top_n: opts.top_n,
        most_frequent: by_count
            .into_iter()
            .map(|(word, occurrences)| WordFrequency {
                word: word.to_string(),
                occurrences,
            })
            .collect(),
        longest: by_length
            .into_iter()
            .map(|(word, length)| WordLength {
                word: word.to_string(),
                length,
            })
            .collect(),
    }
}

/// Statistics for one word, or `None` if the library never heard it.
pub fn word_stats(index: &WordIndex, word: &str, opts: StatsOptions) -> Option<WordStats> {
    let word = word.to_lowercase();
    if !index.contains(&word) {
        return None;
    }
    let occs = index.occurrences(&word);
    let details = if opts.verbose {
        occs.iter()
            .map(|occ| OccurrenceDetail {
                source: index.source_path(occ.source).unwrap_or_default().to_string(),
                start: occ.start,
                end: occ.end,
                duration: occ.duration(),
            })
            .collect()
    } else {
        Vec::new()
    };
    Some(WordStats {
        occurrences: occs.len(),
        word,
        details,
    })
}

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total words in library: {}", self.total_occurrences)?;
        writeln!(f, "Unique words in library: {}", self.unique_words)?;
        writeln!(f)?;
        writeln!(f, "Top {} words in the library:", self.top_n)?;
        for entry in &self.most_frequent {
            writeln!(f, "{}: {}", entry.word, entry.occurrences)?;
        }
        writeln!(f)?;
        writeln!(f, "Top {} longest words in the library:", self.top_n)?;
        for entry in &self.longest {
            writeln!(f, "{}: {}", entry.word, entry.length)?;
        }
        Ok(())
    }
}

impl fmt::Display for WordStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics for the word '{}':", self.word)?;
        for (idx, d) in self.details.iter().enumerate() {
            writeln!(
                f,
                "  Occurrence {}: File: {}, Start: {}, End: {}, Duration: {:.2}",
                idx + 1,
                d.source,
                d.start,
                d.end,
                d.duration
            )?;
        }
        writeln!(f, "occurrences: {}", self.occurrences)
    }
}
