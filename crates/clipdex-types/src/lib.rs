//! Shared types for word-level clip indexes.
//!
//! A clip index maps spoken words to the places they were said: a registered
//! media file ([`SourceHandle`]) and a time window in seconds
//! ([`Occurrence`]). Once an occurrence has been looked up against the source
//! table it becomes a [`Segment`], which carries the concrete media path and
//! is what clip assemblers consume.
//!
//! ```rust
//! use clipdex_types::{Occurrence, SourceHandle};
//!
//! let occ = Occurrence::new(SourceHandle(0), 0.10, 0.40);
//! assert!(occ.is_well_formed());
//! assert!((occ.duration() - 0.30).abs() < 1e-9);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle of a registered media file: its position in the source table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceHandle(pub usize);

impl SourceHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One spoken instance of a word in one source.
///
/// Field aliases accept the compact `src`/`A`/`B` keys of older library files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    #[serde(alias = "src")]
    pub source: SourceHandle,
    #[serde(alias = "A")]
    pub start: f64,
    #[serde(alias = "B")]
    pub end: f64,
}

impl Occurrence {
    pub fn new(source: SourceHandle, start: f64, end: f64) -> Self {
        Self { source, start, end }
    }

    /// Seconds between `start` and `end`; negative for malformed windows.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `0 <= start < end`, with both bounds finite.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.start < self.end
    }
}

/// An occurrence resolved to the media file it was cut from.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<'a> {
    pub source: SourceHandle,
    pub path: &'a str,
    pub start: f64,
    pub end: f64,
}

impl Segment<'_> {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}){}: {}-{}",
            self.source.0, self.path, self.start, self.end
        )
    }
}
