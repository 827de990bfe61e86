//! Build or extend a persisted index from a directory of `.rec` transcripts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::transcript::{TranscriptError, read_transcript};
use crate::{StoreError, WordIndex};

pub const TRANSCRIPT_EXTENSION: &str = "rec";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to list transcripts in {}: {source}", dir.display())]
    ListDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A transcript left out of the build and why.
#[derive(Debug)]
pub struct SkippedTranscript {
    pub path: PathBuf,
    pub error: TranscriptError,
}

/// Totals for one ingestion pass.
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub files_indexed: usize,
    pub sources_added: usize,
    pub occurrences_added: usize,
    pub skipped: Vec<SkippedTranscript>,
}

/// Outcome of [`build_library`].
#[derive(Debug)]
pub struct BuildReport {
    pub library: PathBuf,
    /// `true` when no library existed before this build.
    pub created: bool,
    pub files_indexed: usize,
    pub sources_added: usize,
    pub occurrences_added: usize,
    pub skipped: Vec<SkippedTranscript>,
}

/// List `*.rec` files directly inside `dir`, sorted by path.
pub fn collect_transcripts(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, BuildError> {
    let dir = dir.as_ref();
    let list_err = |source: io::Error| BuildError::ListDir {
        dir: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == TRANSCRIPT_EXTENSION)
        {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Parse each transcript and merge it into `index`.
///
/// A transcript that fails to parse is skipped and logged; it never leaves
/// partial occurrences behind because records are parsed in full before they
/// are merged.
pub fn ingest<P: AsRef<Path>>(index: &mut WordIndex, transcripts: &[P]) -> IngestSummary {
    let mut summary = IngestSummary::default();
    for path in transcripts {
        let path = path.as_ref();
        let record = match read_transcript(path) {
            Ok(record) => record,
            Err(error) => {
                warn!("skipping transcript: {error}");
                summary.skipped.push(SkippedTranscript {
                    path: path.to_path_buf(),
                    error,
                });
                continue;
            }
        };

        let outcome = index.merge(record);
        info!(
            "indexed {} words from {} (source {})",
            outcome.occurrences,
            path.display(),
            outcome.source
        );
        summary.files_indexed += 1;
        summary.occurrences_added += outcome.occurrences;
        if outcome.new_source {
            summary.sources_added += 1;
        }
    }
    summary
}

/// Load (or start) the library at `library`, ingest every transcript in
/// `transcripts_dir`, and write the result back.
pub fn build_library(
    library: impl AsRef<Path>,
    transcripts_dir: impl AsRef<Path>,
) -> Result<(WordIndex, BuildReport), BuildError> {
    let library = library.as_ref();
    let (mut index, existed) = WordIndex::open(library)?;
    let transcripts = collect_transcripts(transcripts_dir.as_ref())?;
    info!(
        "found {} transcripts in {}",
        transcripts.len(),
        transcripts_dir.as_ref().display()
    );

    let summary = ingest(&mut index, &transcripts);
    index.save(library)?;
    info!(
        "{} word library {}: {} words, {} occurrences, {} sources",
        if existed { "updated" } else { "created" },
        library.display(),
        index.word_count(),
        index.occurrence_count(),
        index.sources().len()
    );

    Ok((
        index,
        BuildReport {
            library: library.to_path_buf(),
            created: !existed,
            files_indexed: summary.files_indexed,
            sources_added: summary.sources_added,
            occurrences_added: summary.occurrences_added,
            skipped: summary.skipped,
        },
    ))
}
