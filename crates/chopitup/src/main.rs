use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use chopitup::config::{DEFAULT_OUTPUT, load_config};
use chopitup::resolve::{instances_output_name, resolve_segments, word_instances};
use chopitup::stats::DEFAULT_TOP_N;
use chopitup::{
    Config, ConfigOverrides, FfmpegAssembler, SegmentAssembler, StatsOptions, check_sentence,
    global_stats, select_segments, word_stats,
};
use clipdex_db::WordIndex;
use clipdex_db::build::build_library;
use clipdex_types::Segment;

#[derive(Parser)]
#[command(name = "chopitup")]
#[command(about = "Index word timings from transcripts and cut supercuts from them")]
struct Cli {
    /// Which library to work with (default: `word`).
    #[arg(long, global = true)]
    label: Option<String>,
    /// Directory holding the libraries.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Use this library file instead of `<data-dir>/<label>_library.json`.
    #[arg(long, global = true)]
    library: Option<PathBuf>,
    /// Directory of `.rec` transcripts used to build the library.
    #[arg(long, global = true, value_name = "RECPATH")]
    media: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the library from `.rec` transcripts.
    Generate,
    /// Cut a video from the words of a sentence.
    Create {
        sentence: String,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only list the selected segments.
        #[arg(long, default_value_t = false)]
        no_render: bool,
    },
    /// Cut a video of every instance of a word.
    Words {
        word: String,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_render: bool,
    },
    /// Check a sentence against the library and suggest substitutes.
    Check {
        sentence: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Library statistics, optionally for a single word.
    Stats {
        word: Option<String>,
        /// List every occurrence of the word.
        #[arg(long, default_value_t = false)]
        verbose: bool,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(ConfigOverrides {
        data_dir: cli.data_dir,
        label: cli.label,
        library: cli.library,
        media_dir: cli.media,
    });
    let library = config.library_path();
    info!("using word library {}", library.display());
    config
        .ensure_library_dir()
        .with_context(|| format!("creating directory for {}", library.display()))?;

    match cli.command {
        Commands::Generate => {
            generate(&config)?;
        }
        Commands::Stats {
            word,
            verbose,
            top,
            json,
        } => {
            let (index, _) = WordIndex::open(&library)?;
            stats(&index, word.as_deref(), StatsOptions { verbose, top_n: top }, json)?;
        }
        Commands::Create {
            sentence,
            output,
            no_render,
        } => {
            let index = open_or_generate(&config)?;
            let selection = select_segments(&index, &sentence);
            for word in &selection.missing {
                println!("Word '{word}' not found in the library");
            }
            let segments = selection.segments(&index);
            println!("Selected segments:");
            for seg in &segments {
                println!("{seg}");
            }
            if !no_render {
                let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
                if render(&segments, &output)? {
                    println!("Video assembled and saved to {}", output.display());
                }
            }
        }
        Commands::Words {
            word,
            output,
            no_render,
        } => {
            let index = open_or_generate(&config)?;
            let word = word.to_lowercase();
            let occurrences = word_instances(&index, &word);
            if occurrences.is_empty() {
                println!("Word '{word}' not found in the library");
                return Ok(());
            }
            let segments = resolve_segments(&index, occurrences);
            for seg in &segments {
                println!("{seg}");
            }
            if !no_render {
                let output = output
                    .unwrap_or_else(|| PathBuf::from(instances_output_name(&word, occurrences.len())));
                if render(&segments, &output)? {
                    println!(
                        "Video with all instances of '{word}' saved to {}",
                        output.display()
                    );
                }
            }
        }
        Commands::Check { sentence, json } => {
            let index = open_or_generate(&config)?;
            let preview = check_sentence(&index, &sentence);
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
                return Ok(());
            }
            println!("Checking string: {sentence}");
            for choice in preview.choices.iter().filter(|c| !c.exact) {
                println!(
                    "Alternative used for '{}': '{}'",
                    choice.query, choice.resolved
                );
            }
            for word in &preview.unresolved {
                println!(
                    "Word '{word}' not found in the library, and no suitable alternative found"
                );
            }
            if let Some(summary) = preview.summary() {
                println!("\n{summary}");
            }
        }
    }

    Ok(())
}

fn generate(config: &Config) -> Result<WordIndex> {
    let library = config.library_path();
    let start = Instant::now();
    let (index, report) = build_library(&library, &config.media_dir).with_context(|| {
        format!(
            "building {} from {}",
            library.display(),
            config.media_dir.display()
        )
    })?;
    info!("library built in {} ms", start.elapsed().as_millis());

    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.path.display(), skipped.error);
    }
    if report.created {
        println!("Word library created: {}", library.display());
    } else {
        println!("Word library updated: {}", library.display());
    }
    Ok(index)
}

fn open_or_generate(config: &Config) -> Result<WordIndex> {
    let library = config.library_path();
    if library.exists() {
        return WordIndex::load(&library)
            .with_context(|| format!("loading {}", library.display()));
    }
    println!(
        "Generating word library {} from .rec files directory '{}'...",
        library.display(),
        config.media_dir.display()
    );
    generate(config)
}

fn stats(index: &WordIndex, word: Option<&str>, opts: StatsOptions, json: bool) -> Result<()> {
    match word.filter(|w| !w.is_empty()) {
        Some(word) => match word_stats(index, word, opts) {
            Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
            Some(report) => print!("{report}"),
            None => println!("Word '{}' not found in the library.", word.to_lowercase()),
        },
        None => {
            let report = global_stats(index, opts);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
    }
    Ok(())
}

/// Returns `false` when there was nothing to cut.
fn render(segments: &[Segment<'_>], output: &Path) -> Result<bool> {
    if segments.is_empty() {
        warn!("none of the requested words are in the library; nothing to render");
        return Ok(false);
    }
    FfmpegAssembler::new()
        .assemble(segments, output)
        .with_context(|| format!("assembling {}", output.display()))?;
    Ok(true)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
