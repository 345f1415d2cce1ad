// src/error.rs
use thiserror::Error;

/// Failures from loading, parsing and saving. Player input never ends up here:
/// rejected taps, non-words and failed merges are plain `false` returns.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Invalid map: {0}")]
    MapParse(String),

    #[error("Snapshot does not replay onto this map: {0}")]
    Replay(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
