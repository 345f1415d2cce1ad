// src/config.rs
//
// loading of perimeter.toml

use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "perimeter.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub paths: PathConfig,
    pub hint: HintConfig,
    pub shuffle: ShuffleConfig,
    /// Directory of the file this config came from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub dictionary: String,
    pub map: String,
    pub snapshot: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            dictionary: "dictionary.txt".into(),
            map: "map.txt".into(),
            snapshot: "round.bin".into(),
        }
    }
}

/// How hard the hint search tries before giving up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Extra words a chain may use beyond the first.
    pub max_depth: usize,
    /// Distance slack for the second attempt, after a strict one fails.
    pub fallback_slack: f32,
    /// Offer the closest non-connecting attempt when nothing connects.
    pub allow_partial: bool,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self { max_depth: 3, fallback_slack: 2.0, allow_partial: true }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    pub tiles_per_batch: usize,
    /// Draw Easier replacement letters by English frequency rather than uniformly.
    pub weighted: bool,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self { tiles_per_batch: 25, weighted: true }
    }
}

impl EngineConfig {
    /// Looks next to the executable first, then in the working directory.
    /// No file at all means defaults.
    pub fn load() -> Result<Self> {
        if let Some(exe_config) = Self::exe_dir().map(|d| d.join(CONFIG_FILE)).filter(|p| p.exists()) {
            return Self::from_file(&exe_config);
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Relative paths resolve against the config file's directory, or the
    /// working directory for a default config.
    pub fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if !Path::new(path).is_absolute() => base.join(path),
            _ => PathBuf::from(path),
        }
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.resolve(&self.paths.dictionary)
    }

    pub fn map_path(&self) -> PathBuf {
        self.resolve(&self.paths.map)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.paths.snapshot)
    }
}
