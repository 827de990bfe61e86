use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const APP_NAME: &str = "ChopItUp";
pub const DEFAULT_LABEL: &str = "word";
pub const DEFAULT_MEDIA_DIR: &str = ".";
pub const DEFAULT_OUTPUT: &str = "output_video.mp4";
pub const DATA_DIR_ENV: &str = "CHOPITUP_DATA_DIR";
pub const LABEL_ENV: &str = "CHOPITUP_LABEL";

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub label: String,
    pub library_override: Option<PathBuf>,
    pub media_dir: PathBuf,
}

/// Values given on the command line; these win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub label: Option<String>,
    pub library: Option<PathBuf>,
    pub media_dir: Option<PathBuf>,
}

impl Config {
    /// `<data_dir>/<label>_library.json` unless a library file was given.
    pub fn library_path(&self) -> PathBuf {
        match &self.library_override {
            Some(path) => path.clone(),
            None => self.data_dir.join(format!("{}_library.json", self.label)),
        }
    }

    /// Create the directory the library lives in.
    pub fn ensure_library_dir(&self) -> io::Result<()> {
        match self.library_path().parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

pub fn load_config(overrides: ConfigOverrides) -> Config {
    resolve_config(overrides, |key| env::var(key).ok())
}

/// Merge overrides, then `lookup` (normally the process environment), then defaults.
pub fn resolve_config<F>(overrides: ConfigOverrides, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let data_dir = overrides
        .data_dir
        .or_else(|| non_empty(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(default_data_dir);
    let label = overrides
        .label
        .filter(|l| !l.trim().is_empty())
        .or_else(|| non_empty(LABEL_ENV))
        .unwrap_or_else(|| DEFAULT_LABEL.to_string());
    let media_dir = overrides
        .media_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR));

    Config {
        data_dir,
        label,
        library_override: overrides.library,
        media_dir,
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR))
}
