//! Reader for `.rec` transcript records.
//!
//! A record names its media file on the first line and lists one timed word
//! per following line:
//!
//! ```text
//! media=clips/interview.mp4
//! hello	0.10	0.40
//! world	0.50	0.90
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

const MEDIA_PREFIX: &str = "media=";

/// Parsed contents of one transcript file.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptRecord {
    pub media: String,
    pub entries: Vec<TranscriptEntry>,
}

/// A lowercased word and the window it was spoken in.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptEntry {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: missing `media=` header", path.display())]
    MissingHeader { path: PathBuf },
    #[error("{}:1: malformed header {header:?}, expected `media=<path>`", path.display())]
    BadHeader { path: PathBuf, header: String },
    #[error("{}:{line}: expected 3 tab-separated fields, found {found}", path.display())]
    FieldCount {
        path: PathBuf,
        line: usize,
        found: usize,
    },
    #[error("{}:{line}: invalid timestamp {value:?}", path.display())]
    BadTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("{}:{line}: invalid time window {start}..{end}", path.display())]
    BadWindow {
        path: PathBuf,
        line: usize,
        start: f64,
        end: f64,
    },
}

/// Read and parse a transcript file.
pub fn read_transcript(path: impl AsRef<Path>) -> Result<TranscriptRecord, TranscriptError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_transcript(BufReader::new(file), path)
}

/// Parse a transcript from any buffered reader; `origin` is only used in errors.
///
/// Trailing blank lines are ignored; a blank line followed by more data is a
/// field-count error. Every data line must carry a window with
/// `0 <= start < end`.
pub fn parse_transcript<R: BufRead>(
    reader: R,
    origin: &Path,
) -> Result<TranscriptRecord, TranscriptError> {
    let io_err = |source: io::Error| TranscriptError::Io {
        path: origin.to_path_buf(),
        source,
    };

    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line.map_err(io_err)?,
        None => {
            return Err(TranscriptError::MissingHeader {
                path: origin.to_path_buf(),
            });
        }
    };
    let media = parse_header(&header).ok_or_else(|| TranscriptError::BadHeader {
        path: origin.to_path_buf(),
        header: header.clone(),
    })?;

    let mut entries = Vec::new();
    let mut first_blank = None;
    for (idx, line) in lines.enumerate() {
        let line = line.map_err(io_err)?;
        let lineno = idx + 2;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            first_blank.get_or_insert(lineno);
            continue;
        }
        if let Some(blank) = first_blank {
            return Err(TranscriptError::FieldCount {
                path: origin.to_path_buf(),
                line: blank,
                found: 1,
            });
        }
        entries.push(parse_entry(trimmed, lineno, origin)?);
    }

    Ok(TranscriptRecord {
        media: media.to_string(),
        entries,
    })
}

fn parse_header(line: &str) -> Option<&str> {
    let media = line.trim().strip_prefix(MEDIA_PREFIX)?.trim();
    if media.is_empty() { None } else { Some(media) }
}

fn parse_entry(line: &str, lineno: usize, origin: &Path) -> Result<TranscriptEntry, TranscriptError> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [word, start, end] = fields.as_slice() else {
        return Err(TranscriptError::FieldCount {
            path: origin.to_path_buf(),
            line: lineno,
            found: fields.len(),
        });
    };

    let start = parse_seconds(start, lineno, origin)?;
    let end = parse_seconds(end, lineno, origin)?;
    if start < 0.0 || start >= end {
        return Err(TranscriptError::BadWindow {
            path: origin.to_path_buf(),
            line: lineno,
            start,
            end,
        });
    }

    Ok(TranscriptEntry {
        word: word.to_lowercase(),
        start,
        end,
    })
}

fn parse_seconds(raw: &str, lineno: usize, origin: &Path) -> Result<f64, TranscriptError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TranscriptError::BadTimestamp {
            path: origin.to_path_buf(),
            line: lineno,
            value: raw.to_string(),
        })
}
