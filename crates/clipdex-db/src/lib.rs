//! Persistent word-to-occurrence index for word-level supercuts.
//!
//! Transcript records (see [`transcript`]) list every word spoken in a media
//! file together with its time window. [`WordIndex`] folds those records into
//! a lowercase word → [`Occurrence`] list, alongside an append-only table of
//! media paths addressed by [`SourceHandle`]. The index is stored as one JSON
//! document and replaced atomically on save.
//!
//! Words are kept in a `BTreeMap`, so every walk over the vocabulary runs in
//! lexicographic order and anything that breaks ties by "first seen" is
//! reproducible.
//!
//! # Example
//! ```no_run
//! use clipdex_db::build::build_library;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (index, report) = build_library("words_library.json", "transcripts/")?;
//! println!("{} files indexed", report.files_indexed);
//! for occ in index.occurrences("hello") {
//!     let seg = index.segment(occ).expect("known source");
//!     println!("{seg}");
//! }
//! # Ok(()) }
//! ```

pub mod build;
pub mod transcript;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use clipdex_types::{Occurrence, Segment, SourceHandle};
pub use transcript::{TranscriptEntry, TranscriptError, TranscriptRecord, read_transcript};

/// Failures reading or writing a persisted index.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read library {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write library {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("library {} is not a valid word index: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode library: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("library {}: word {word:?} references unknown source {handle}", path.display())]
    DanglingSource {
        path: PathBuf,
        word: String,
        handle: SourceHandle,
    },
}

/// Word → occurrences map plus the source table it points into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordIndex {
    sources: Vec<String>,
    words: BTreeMap<String, Vec<Occurrence>>,
}

/// What a single [`WordIndex::merge`] changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MergeOutcome {
    pub source: SourceHandle,
    pub new_source: bool,
    pub occurrences: usize,
}

#[derive(Serialize)]
struct StoredRef<'a> {
    sources: &'a [String],
    words: &'a BTreeMap<String, Vec<Occurrence>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLibrary {
    Structured(StructuredLayout),
    Flat(FlatLayout),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StructuredLayout {
    sources: Vec<String>,
    words: BTreeMap<String, Vec<Occurrence>>,
}

/// Older libraries keep the source list under a reserved `sources` key next
/// to the words themselves.
#[derive(Deserialize)]
struct FlatLayout {
    #[serde(default)]
    sources: Vec<String>,
    #[serde(flatten)]
    words: BTreeMap<String, Vec<Occurrence>>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index file, accepting both the structured and the flat layout.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let stored: StoredLibrary =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let index = match stored {
            StoredLibrary::Structured(s) => Self {
                sources: s.sources,
                words: s.words,
            },
            StoredLibrary::Flat(f) => {
                debug!("{} uses the flat library layout", path.display());
                Self {
                    sources: f.sources,
                    words: f.words,
                }
            }
        };
        index.validate(path)?;
        Ok(index)
    }

    /// Load `path` if it exists, otherwise start empty. The flag reports
    /// whether a file was found.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, bool), StoreError> {
        let path = path.as_ref();
        if path.exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::new(), false))
        }
    }

    /// Write the whole index to `path`, replacing any previous file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let write_err = |source: io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            self.write_json(&mut writer, path)?;
            writer.flush().map_err(write_err)?;
        }
        // Temp files start out owner-only; keep whatever mode the library had.
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|err| write_err(err.error))?;
        Ok(())
    }

    fn write_json<W: Write>(&self, writer: W, path: &Path) -> Result<(), StoreError> {
        let stored = StoredRef {
            sources: &self.sources,
            words: &self.words,
        };
        serde_json::to_writer_pretty(writer, &stored).map_err(|err| {
            if err.is_io() {
                StoreError::Write {
                    path: path.to_path_buf(),
                    source: err.into(),
                }
            } else {
                StoreError::Encode(err)
            }
        })
    }

    /// Add a path to the source table unless it is already registered.
    pub fn register_source(&mut self, media: &str) -> (SourceHandle, bool) {
        if let Some(pos) = self.sources.iter().position(|s| s == media) {
            return (SourceHandle(pos), false);
        }
        self.sources.push(media.to_string());
        (SourceHandle(self.sources.len() - 1), true)
    }

    /// Fold one transcript record into the index.
    ///
    /// Occurrences are appended as-is; merging the same record twice stores
    /// every window twice under the same source handle.
    pub fn merge(&mut self, record: TranscriptRecord) -> MergeOutcome {
        let (source, new_source) = self.register_source(&record.media);
        let occurrences = record.entries.len();
        for entry in record.entries {
            self.words
                .entry(entry.word)
                .or_default()
                .push(Occurrence::new(source, entry.start, entry.end));
        }
        MergeOutcome {
            source,
            new_source,
            occurrences,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn source_path(&self, handle: SourceHandle) -> Option<&str> {
        self.sources.get(handle.index()).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// All occurrences of `word` in ingestion order, or an empty slice.
    pub fn occurrences(&self, word: &str) -> &[Occurrence] {
        self.words.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first occurrence ever ingested for `word`.
    pub fn first_occurrence(&self, word: &str) -> Option<&Occurrence> {
        self.words.get(word).and_then(|occs| occs.first())
    }

    /// Iterate `(word, occurrences)` in lexicographic word order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[Occurrence])> + '_ {
        self.words.iter().map(|(w, o)| (w.as_str(), o.as_slice()))
    }

    /// Iterate indexed words in lexicographic order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.keys().map(String::as_str)
    }

    /// Number of distinct words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of occurrences across all words.
    pub fn occurrence_count(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.sources.is_empty()
    }

    /// Attach the media path to an occurrence.
    pub fn segment(&self, occ: &Occurrence) -> Option<Segment<'_>> {
        self.source_path(occ.source).map(|path| Segment {
            source: occ.source,
            path,
            start: occ.start,
            end: occ.end,
        })
    }

    fn validate(&self, path: &Path) -> Result<(), StoreError> {
        for (word, occs) in &self.words {
            if let Some(bad) = occs.iter().find(|o| o.source.index() >= self.sources.len()) {
                return Err(StoreError::DanglingSource {
                    path: path.to_path_buf(),
                    word: word.clone(),
                    handle: bad.source,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(media: &str, words: &[(&str, f64, f64)]) -> TranscriptRecord {
        TranscriptRecord {
            media: media.to_string(),
            entries: words
                .iter()
                .map(|(w, s, e)| TranscriptEntry {
                    word: w.to_string(),
                    start: *s,
                    end: *e,
                })
                .collect(),
        }
    }

    #[test]
    fn merge_registers_source_once() {
        let mut index = WordIndex::new();
        let first = index.merge(record("a.mp4", &[("hello", 0.1, 0.4)]));
        let second = index.merge(record("a.mp4", &[("world", 0.5, 0.9)]));
        assert_eq!(first.source, SourceHandle(0));
        assert!(first.new_source);
        assert_eq!(second.source, SourceHandle(0));
        assert!(!second.new_source);
        assert_eq!(index.sources(), &["a.mp4".to_string()]);
        assert_eq!(index.occurrences("world")[0].source, SourceHandle(0));
    }

    #[test]
    fn occurrences_keep_ingestion_order() {
        let mut index = WordIndex::new();
        index.merge(record("late.mp4", &[("go", 9.0, 9.5)]));
        index.merge(record("early.mp4", &[("go", 0.5, 1.0)]));
        let occs = index.occurrences("go");
        assert_eq!(occs.len(), 2);
        assert_eq!(occs[0].start, 9.0);
        assert_eq!(index.first_occurrence("go").unwrap().source, SourceHandle(0));
    }

    #[test]
    fn sources_word_is_an_ordinary_word() {
        let mut index = WordIndex::new();
        index.merge(record("a.mp4", &[("sources", 0.1, 0.2)]));
        assert_eq!(index.word_count(), 1);
        assert_eq!(index.vocabulary().collect::<Vec<_>>(), vec!["sources"]);
        assert_eq!(index.sources().len(), 1);
    }

    #[test]
    fn counts_and_segments() {
        let mut index = WordIndex::new();
        index.merge(record("a.mp4", &[("a", 0.0, 0.1), ("b", 0.1, 0.2), ("a", 0.3, 0.4)]));
        assert_eq!(index.word_count(), 2);
        assert_eq!(index.occurrence_count(), 3);
        let seg = index.segment(&index.occurrences("b")[0]).unwrap();
        assert_eq!(seg.path, "a.mp4");
        assert!(index.segment(&Occurrence::new(SourceHandle(7), 0.0, 1.0)).is_none());
        assert!(index.occurrences("zzz").is_empty());
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_not_encode_errors() {
        let mut index = WordIndex::new();
        index.merge(record("a.mp4", &[("hello", 0.1, 0.4)]));
        let err = index
            .write_json(FullDisk, Path::new("lib.json"))
            .unwrap_err();
        match err {
            StoreError::Write { path, source } => {
                assert_eq!(path, Path::new("lib.json"));
                assert_eq!(source.kind(), io::ErrorKind::StorageFull);
            }
            other => panic!("expected a write error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word_library.json");
        let mut index = WordIndex::new();
        index.save(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        index.merge(record("a.mp4", &[("hello", 0.1, 0.4)]));
        index.save(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(WordIndex::load(&path).unwrap(), index);
    }
}
