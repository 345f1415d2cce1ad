// File: src/persistence.rs
use crate::config::HintConfig;
use crate::core::engine::Board;
use crate::core::grid::Grid;
use crate::core::trie::Dictionary;
use crate::core::types::Coord;
use crate::error::{EngineError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// What is needed to rebuild a round: the letters, and every verified word as
/// the path it was traced along, in merge order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub rows: Vec<String>,
    pub merges: Vec<Vec<Coord>>,
}

impl RoundSnapshot {
    pub fn capture(board: &Board) -> Self {
        Self {
            rows: board.grid.render_rows(),
            merges: board
                .perimeter
                .history()
                .iter()
                .map(|s| s.coords().collect())
                .collect(),
        }
    }

    /// Rebuilds the board by replaying every merge, so a snapshot that no
    /// longer fits the dictionary or the map is refused instead of trusted.
    pub fn restore(&self, dictionary: Dictionary, hint_config: HintConfig) -> Result<Board> {
        let grid = Grid::from_rows(&self.rows, dictionary)?;
        let mut board = Board::new(grid, hint_config);

        for path in &self.merges {
            for &coord in path {
                let Some(tile) = board.grid.tile_at(coord) else {
                    return Err(EngineError::Replay(format!("{} is not a tile", coord)));
                };
                if !board.perimeter.add_tile(tile) {
                    return Err(EngineError::Replay(format!("tile {} was refused", coord)));
                }
            }
            if !board.perimeter.try_merge_current(board.grid.dictionary()) {
                let word = board.perimeter.current().map(|s| s.to_text()).unwrap_or_default();
                return Err(EngineError::Replay(format!("{} did not merge", word)));
            }
        }
        Ok(board)
    }
}

/// Writes the snapshot atomically: a temp file in the same directory, then a rename.
pub fn save_snapshot(board: &Board, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let snapshot = RoundSnapshot::capture(board);
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}

pub fn load_snapshot(path: &Path, dictionary: Dictionary, hint_config: HintConfig) -> Result<Board> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot: RoundSnapshot = bincode::deserialize_from(reader)?;
    snapshot.restore(dictionary, hint_config).map_err(|e| {
        warn!("Snapshot {} could not be restored: {}", path.display(), e);
        e
    })
}
