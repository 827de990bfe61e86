use clipdex_db::{TranscriptEntry, TranscriptRecord, WordIndex};
use clipdex_fuzzy::{FuzzyResolver, Resolution, similarity_ratio};

fn index_with(media: &str, words: &[&str]) -> WordIndex {
    let mut index = WordIndex::new();
    index.merge(TranscriptRecord {
        media: media.to_string(),
        entries: words
            .iter()
            .enumerate()
            .map(|(i, w)| TranscriptEntry {
                word: w.to_string(),
                start: i as f64,
                end: i as f64 + 0.5,
            })
            .collect(),
    });
    index
}

#[test]
fn substitutes_respect_initial_and_length_window() {
    let index = index_with(
        "a.mp4",
        &[
            "the", "then", "there", "thermometer", "cat", "cart", "carton", "dog", "dot",
            "doughnut", "zebra",
        ],
    );
    let resolver = FuzzyResolver::new(index.vocabulary());

    for query in ["thee", "cot", "dug", "do", "zeal", "thermos", "ca", "x"] {
        if let Some(Resolution::Substitute { word, score }) = resolver.resolve(query) {
            assert_eq!(word.chars().next(), query.chars().next(), "{query} -> {word}");
            assert!(
                word.chars().count().abs_diff(query.chars().count()) <= 2,
                "{query} -> {word}"
            );
            assert!(index.contains(word));
            assert!((score - similarity_ratio(query, word)).abs() < 1e-12);
        }
    }
}

#[test]
fn exact_words_are_never_substituted() {
    let index = index_with("a.mp4", &["cat", "cats", "cap", "cart"]);
    let resolver = FuzzyResolver::new(index.vocabulary());
    assert_eq!(resolver.resolve("cat"), Some(Resolution::Exact("cat")));
}

#[test]
fn insertion_order_does_not_change_the_choice() {
    let forward = index_with("a.mp4", &["cart", "cat"]);
    let backward = index_with("a.mp4", &["cat", "cart"]);
    let a = FuzzyResolver::new(forward.vocabulary()).resolve("cot");
    let b = FuzzyResolver::new(backward.vocabulary()).resolve("cot");
    assert_eq!(a, b);
    assert_eq!(a.unwrap().word(), "cat");
}

#[test]
fn source_paths_are_not_vocabulary() {
    let index = index_with("sources", &["hello"]);
    let resolver = FuzzyResolver::new(index.vocabulary());
    assert!(resolver.resolve("sources").is_none());
    assert!(resolver.resolve("sourced").is_none());
}
