//! Cut and join clips for a sequence of segments.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use clipdex_types::Segment;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_FFMPEG: &str = "ffmpeg";

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("no segments to assemble")]
    Empty,
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Tool {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("failed to prepare clips: {0}")]
    Io(#[from] io::Error),
}

/// Turns an ordered list of segments into one media file.
///
/// Clips are taken from each segment's source between `start` and `end` and
/// joined in the order given, without transitions.
pub trait SegmentAssembler {
    fn assemble(&self, segments: &[Segment<'_>], output: &Path) -> Result<(), AssembleError>;
}

/// Assembler backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    program: String,
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegAssembler {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_FFMPEG)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), AssembleError> {
        debug!("running {} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| AssembleError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(AssembleError::Tool {
            program: self.program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl SegmentAssembler for FfmpegAssembler {
    fn assemble(&self, segments: &[Segment<'_>], output: &Path) -> Result<(), AssembleError> {
        if segments.is_empty() {
            return Err(AssembleError::Empty);
        }

        let workdir = tempfile::tempdir()?;
        let mut clips = Vec::with_capacity(segments.len());
        for (idx, seg) in segments.iter().enumerate() {
            info!("{seg}");
            let clip = workdir.path().join(format!("clip_{idx:05}.mp4"));
            self.run(cut_args(seg, &clip))?;
            clips.push(clip);
        }

        let list = workdir.path().join("clips.txt");
        fs::write(&list, concat_list(&clips))?;
        self.run(concat_args(&list, output))?;
        info!("wrote {} clips to {}", clips.len(), output.display());
        Ok(())
    }
}

/// Re-encode one clip so every cut starts on a keyframe.
fn cut_args(seg: &Segment<'_>, clip: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-ss"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(format!("{:.3}", seg.start).into());
    args.push("-t".into());
    args.push(format!("{:.3}", seg.duration()).into());
    args.push("-i".into());
    args.push(seg.path.into());
    args.extend(["-c:v", "libx264", "-c:a", "aac"].map(OsString::from));
    args.push(clip.as_os_str().to_owned());
    args
}

fn concat_args(list: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(list.as_os_str().to_owned());
    args.extend(["-c", "copy"].map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

/// Body of an ffmpeg concat-demuxer list file.
fn concat_list(clips: &[PathBuf]) -> String {
    let mut out = String::new();
    for clip in clips {
        let quoted = clip.to_string_lossy().replace('\'', r"'\''");
        out.push_str(&format!("file '{quoted}'\n"));
    }
    out
}
