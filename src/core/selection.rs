// src/core/selection.rs
use crate::core::sequence::LetterSequence;
use crate::core::types::{Coord, Direction, Tile};
use serde::{Deserialize, Serialize};

/// The tiles a player is tracing right now, not yet checked against the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    tiles: Vec<Tile>,
}

impl Selection {
    pub fn new(initial: Tile) -> Self {
        Self { tiles: vec![initial] }
    }

    /// Appends `tile` if it is new to this selection and touches the current tail.
    pub fn try_extend(&mut self, tile: Tile) -> bool {
        if self.contains(tile.coord) {
            return false;
        }
        match self.tiles.last() {
            Some(tail) if tail.coord.is_adjacent(tile.coord) => {
                self.tiles.push(tile);
                true
            }
            Some(_) => false,
            None => {
                self.tiles.push(tile);
                true
            }
        }
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.tiles.iter().any(|t| t.coord == coord)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn first(&self) -> Option<Tile> {
        self.tiles.first().copied()
    }

    pub fn last(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    /// Letters in tap order, for the caller's dictionary lookup.
    pub fn to_text(&self) -> String {
        self.tiles.iter().map(|t| t.ch).collect()
    }

    /// Step directions between consecutive tiles, for drawing connectors.
    pub fn directions(&self) -> Vec<Direction> {
        self.tiles
            .windows(2)
            .map(|pair| Direction::between(pair[0].coord, pair[1].coord))
            .collect()
    }

    /// Releases every tile.
    pub fn discard(&mut self) {
        self.tiles.clear();
    }

    pub fn to_sequence(&self) -> Option<LetterSequence> {
        LetterSequence::from_tiles(self.tiles.clone())
    }
}
