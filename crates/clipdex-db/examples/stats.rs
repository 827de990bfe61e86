use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clipdex_db::WordIndex;

fn main() -> Result<()> {
    let library = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p clipdex-db --example stats -- <path-to-library.json>")?;

    let index = WordIndex::load(&library)
        .with_context(|| format!("loading word library from {}", library.display()))?;

    let mut total_seconds = 0.0f64;
    let mut longest: Option<(&str, f64)> = None;
    for (word, occs) in index.entries() {
        for occ in occs {
            let duration = occ.duration();
            total_seconds += duration;
            if longest.is_none_or(|(_, best)| duration > best) {
                longest = Some((word, duration));
            }
        }
    }

    println!("Library    : {}", library.display());
    println!("Sources    : {}", index.sources().len());
    println!("Words      : {}", index.word_count());
    println!("Occurrences: {}", index.occurrence_count());
    println!("Speech time: {:.2}s", total_seconds);
    if let Some((word, duration)) = longest {
        println!("Longest utterance: '{}' ({:.2}s)", word, duration);
    }

    // Spot-check a couple of common words.
    for word in ["the", "and"] {
        println!("'{}' occurrences: {}", word, index.occurrences(word).len());
    }

    Ok(())
}
