// src/core/sequence.rs
use crate::core::types::{Coord, Tile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// An ordered walk over grid tiles that never visits a cell twice.
/// Always holds at least one tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterSequence {
    tiles: Vec<Tile>,
}

impl LetterSequence {
    pub fn new(first: Tile) -> Self {
        Self { tiles: vec![first] }
    }

    /// None if `tiles` is empty or repeats a coordinate.
    pub fn from_tiles(tiles: Vec<Tile>) -> Option<Self> {
        if tiles.is_empty() {
            return None;
        }
        let mut seen = HashSet::with_capacity(tiles.len());
        if !tiles.iter().all(|t| seen.insert(t.coord)) {
            return None;
        }
        Some(Self { tiles })
    }

    /// Copy of `self` with `tile` appended. The caller guarantees `tile` is new.
    pub fn extended(&self, tile: Tile) -> Self {
        debug_assert!(!self.contains(tile.coord));
        let mut tiles = Vec::with_capacity(self.tiles.len() + 1);
        tiles.extend_from_slice(&self.tiles);
        tiles.push(tile);
        Self { tiles }
    }

    pub fn start(&self) -> Tile {
        self.tiles[0]
    }

    pub fn end(&self) -> Tile {
        self.tiles[self.tiles.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn coords(&self) -> impl DoubleEndedIterator<Item = Coord> + '_ {
        self.tiles.iter().map(|t| t.coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.tiles.iter().any(|t| t.coord == coord)
    }

    pub fn contains_any(&self, coords: &HashSet<Coord>) -> bool {
        self.tiles.iter().any(|t| coords.contains(&t.coord))
    }

    /// Tiles strictly between the first and the last.
    pub fn interior(&self) -> &[Tile] {
        if self.tiles.len() <= 2 {
            &[]
        } else {
            &self.tiles[1..self.tiles.len() - 1]
        }
    }

    pub fn text(&self) -> String {
        self.tiles.iter().map(|t| t.ch).collect()
    }
}

impl fmt::Display for LetterSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// A sequence together with the direction it is walked in a chain.
/// When `reversed` is set the stored end is the effective start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientedSequence {
    pub sequence: LetterSequence,
    pub reversed: bool,
}

impl OrientedSequence {
    pub fn new(sequence: LetterSequence, reversed: bool) -> Self {
        Self { sequence, reversed }
    }

    pub fn start(&self) -> Tile {
        if self.reversed {
            self.sequence.end()
        } else {
            self.sequence.start()
        }
    }

    pub fn end(&self) -> Tile {
        if self.reversed {
            self.sequence.start()
        } else {
            self.sequence.end()
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tiles in walking order.
    pub fn walk(&self) -> Box<dyn Iterator<Item = Tile> + '_> {
        let tiles = self.sequence.tiles().iter().copied();
        if self.reversed {
            Box::new(tiles.rev())
        } else {
            Box::new(tiles)
        }
    }

    /// Letters in walking order.
    pub fn text(&self) -> String {
        self.walk().map(|t| t.ch).collect()
    }
}
