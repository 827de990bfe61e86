use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chopitup::resolve::word_instances;
use chopitup::{
    AssembleError, SegmentAssembler, StatsOptions, check_sentence, global_stats, select_segments,
};
use clipdex_db::WordIndex;
use clipdex_db::build::build_library;
use clipdex_types::{Occurrence, Segment, SourceHandle};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn build_from(names: &[&str]) -> (tempfile::TempDir, WordIndex) {
    let tempdir = tempfile::tempdir().unwrap();
    let recs = tempdir.path().join("recs");
    fs::create_dir(&recs).unwrap();
    for name in names {
        fs::copy(fixture(name), recs.join(name)).unwrap();
    }
    let (index, _) = build_library(tempdir.path().join("word_library.json"), &recs).unwrap();
    (tempdir, index)
}

#[derive(Default)]
struct RecordingAssembler {
    calls: RefCell<Vec<(Vec<(String, f64, f64)>, PathBuf)>>,
}

impl SegmentAssembler for RecordingAssembler {
    fn assemble(&self, segments: &[Segment<'_>], output: &Path) -> Result<(), AssembleError> {
        if segments.is_empty() {
            return Err(AssembleError::Empty);
        }
        self.calls.borrow_mut().push((
            segments
                .iter()
                .map(|s| (s.path.to_string(), s.start, s.end))
                .collect(),
            output.to_path_buf(),
        ));
        Ok(())
    }
}

#[test]
fn sentence_resolves_to_first_occurrences() {
    let (_dir, index) = build_from(&["a.rec"]);
    let selection = select_segments(&index, "hello world");
    assert_eq!(
        selection.occurrences,
        vec![
            Occurrence::new(SourceHandle(0), 0.10, 0.40),
            Occurrence::new(SourceHandle(0), 0.50, 0.90),
        ]
    );
    assert_eq!(index.source_path(SourceHandle(0)), Some("a.mp4"));
    assert!(selection.missing.is_empty());
}

#[test]
fn missing_words_shorten_the_sequence() {
    let (_dir, index) = build_from(&["a.rec"]);
    let selection = select_segments(&index, "hello xyz");
    assert_eq!(
        selection.occurrences,
        vec![Occurrence::new(SourceHandle(0), 0.10, 0.40)]
    );
    assert_eq!(selection.missing, vec!["xyz"]);
}

#[test]
fn segments_reach_the_assembler_in_sentence_order() {
    let (_dir, index) = build_from(&["a.rec", "b.rec"]);
    let selection = select_segments(&index, "world there hello");
    let assembler = RecordingAssembler::default();
    assembler
        .assemble(&selection.segments(&index), Path::new("out.mp4"))
        .unwrap();

    let calls = assembler.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        vec![
            ("a.mp4".to_string(), 0.50, 0.90),
            ("b.mp4".to_string(), 3.40, 3.80),
            ("a.mp4".to_string(), 0.10, 0.40),
        ]
    );
    assert_eq!(calls[0].1, PathBuf::from("out.mp4"));
}

#[test]
fn all_instances_span_sources() {
    let (_dir, index) = build_from(&["a.rec", "b.rec"]);
    let hello = word_instances(&index, "Hello");
    assert_eq!(hello.len(), 2);
    assert_eq!(index.segment(&hello[1]).unwrap().path, "b.mp4");
}

#[test]
fn malformed_transcripts_do_not_block_queries() {
    let (_dir, index) = build_from(&["a.rec", "c_malformed.rec"]);
    assert_eq!(index.sources(), &["a.mp4".to_string()]);
    assert!(!index.contains("broken"));
    assert_eq!(select_segments(&index, "hello").occurrences.len(), 1);
}

#[test]
fn preview_and_stats_over_built_library() {
    let (_dir, index) = build_from(&["a.rec", "b.rec"]);

    let preview = check_sentence(&index, "hello wurld!");
    assert!(preview.substitution_made);
    assert_eq!(preview.phrase(), "hello world");

    let stats = global_stats(&index, StatsOptions::default());
    assert_eq!(stats.total_occurrences, 5);
    assert_eq!(stats.unique_words, 3);
    assert_eq!(stats.most_frequent[0].occurrences, 2);
    assert!(stats.most_frequent.iter().all(|w| w.word != "sources"));
}

#[test]
fn reloaded_library_answers_the_same() {
    let (dir, index) = build_from(&["a.rec", "b.rec"]);
    let reloaded = WordIndex::load(dir.path().join("word_library.json")).unwrap();
    assert_eq!(
        select_segments(&reloaded, "there world"),
        select_segments(&index, "there world")
    );
}
