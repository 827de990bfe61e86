pub mod assemble;
pub mod config;
pub mod resolve;
pub mod stats;

pub use assemble::{AssembleError, FfmpegAssembler, SegmentAssembler};
pub use config::{Config, ConfigOverrides, load_config};
pub use resolve::{Preview, Selection, WordChoice, check_sentence, select_segments};
pub use stats::{GlobalStats, StatsOptions, WordStats, global_stats, word_stats};
