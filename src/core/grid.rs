// src/core/grid.rs
use crate::core::sequence::LetterSequence;
use crate::core::trie::{Dictionary, NodeId};
use crate::core::types::{Coord, Direction, Tile, MAX_WORD_LEN, MIN_WORD_LEN};
use crate::error::{EngineError, Result};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Marker written for holes by [`Grid::render_rows`].
pub const HOLE: char = '+';

/// One occupied cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub ch: char,
    pub coord: Coord,
    neighbors: [Option<Coord>; 8],
    /// Indexed words that start here. Recomputed by [`Grid::refresh_indexes`].
    pub words_starting: usize,
    /// Indexed words that end here. Recomputed by [`Grid::refresh_indexes`].
    pub words_ending: usize,
}

impl Letter {
    fn new(ch: char, coord: Coord) -> Self {
        Self { ch, coord, neighbors: [None; 8], words_starting: 0, words_ending: 0 }
    }

    pub fn tile(&self) -> Tile {
        Tile::new(self.coord, self.ch)
    }

    /// Occupied neighbour in `direction`, if any.
    pub fn neighbor(&self, direction: Direction) -> Option<Coord> {
        self.neighbors[direction.index()]
    }

    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbors[d.index()].map(|c| (d, c)))
    }
}

/// Aggregate word statistics over the whole grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridStats {
    pub tile_count: usize,
    pub total_words: usize,
    pub total_word_letters: usize,
}

impl GridStats {
    pub fn avg_words_per_tile(&self) -> f32 {
        if self.tile_count == 0 {
            return 0.0;
        }
        self.total_words as f32 / self.tile_count as f32
    }

    pub fn avg_word_letters_per_tile(&self) -> f32 {
        if self.tile_count == 0 {
            return 0.0;
        }
        self.total_word_letters as f32 / self.tile_count as f32
    }
}

/// A sparse rectangular board of letters plus the word indexes derived from it.
///
/// The forward index maps a coordinate to every dictionary sequence of at least
/// [`MIN_WORD_LEN`] letters starting there; the backward index holds the same
/// sequences keyed by their last coordinate. Both are only rebuilt by
/// [`Grid::refresh_indexes`]. After [`Grid::set_letter`] they describe the old
/// letters until the next refresh.
#[derive(Debug, Clone)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Option<Letter>>,
    dictionary: Dictionary,
    forward: HashMap<Coord, Vec<LetterSequence>>,
    backward: HashMap<Coord, Vec<LetterSequence>>,
    stats: GridStats,
    stale: bool,
}

impl Grid {
    /// Builds a grid from text rows listed top to bottom. Any character that
    /// is not an ASCII letter is a hole.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], dictionary: Dictionary) -> Result<Self> {
        let cells = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .trim_end_matches(&['\r', '\n'][..])
                    .chars()
                    .map(|c| c.is_ascii_alphabetic().then(|| c.to_ascii_uppercase()))
                    .collect()
            })
            .collect();
        Self::from_cells(cells, dictionary)
    }

    /// Builds a grid from rows of optional characters, top row first.
    pub fn from_cells(cells: Vec<Vec<Option<char>>>, dictionary: Dictionary) -> Result<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(EngineError::MapParse("map has no cells".into()));
        }
        if let Some((i, row)) = cells.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(EngineError::MapParse(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                cols
            )));
        }

        let mut grid = Self {
            cols: cols as i32,
            rows: rows as i32,
            cells: vec![None; rows * cols],
            dictionary,
            forward: HashMap::new(),
            backward: HashMap::new(),
            stats: GridStats::default(),
            stale: true,
        };

        // Text rows run top to bottom, grid rows bottom to top.
        for (text_row, row) in cells.into_iter().enumerate() {
            let y = (rows - 1 - text_row) as i32;
            for (x, cell) in row.into_iter().enumerate() {
                if let Some(ch) = cell {
                    if !ch.is_ascii_alphabetic() {
                        return Err(EngineError::MapParse(format!(
                            "cell ({}, {}) holds {:?}, not a letter",
                            x, y, ch
                        )));
                    }
                    let coord = Coord::new(x as i32, y);
                    let idx = grid.index(coord);
                    grid.cells[idx] = Some(Letter::new(ch.to_ascii_uppercase(), coord));
                }
            }
        }

        grid.mark_adjacency();
        grid.refresh_indexes();
        Ok(grid)
    }

    fn mark_adjacency(&mut self) {
        for idx in 0..self.cells.len() {
            let Some(coord) = self.cells[idx].as_ref().map(|l| l.coord) else {
                continue;
            };
            let mut neighbors = [None; 8];
            for direction in Direction::ALL {
                let next = coord.step(direction);
                if self.letter_at(next).is_some() {
                    neighbors[direction.index()] = Some(next);
                }
            }
            if let Some(letter) = self.cells[idx].as_mut() {
                letter.neighbors = neighbors;
            }
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// True between a letter change and the next [`Grid::refresh_indexes`].
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.cols && coord.y < self.rows
    }

    fn index(&self, coord: Coord) -> usize {
        (coord.y * self.cols + coord.x) as usize
    }

    /// None for holes and out-of-bounds coordinates. O(1).
    pub fn letter_at(&self, coord: Coord) -> Option<&Letter> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.cells[self.index(coord)].as_ref()
    }

    pub fn tile_at(&self, coord: Coord) -> Option<Tile> {
        self.letter_at(coord).map(Letter::tile)
    }

    /// Occupied cells, bottom row first.
    pub fn letters(&self) -> impl Iterator<Item = &Letter> + '_ {
        self.cells.iter().flatten()
    }

    /// In-bounds neighbours of `coord` (holes included) in N, S, E, W, NE, NW, SE, SW order.
    pub fn adjacent_coords(&self, coord: Coord) -> Vec<Coord> {
        Direction::ALL
            .into_iter()
            .map(|d| coord.step(d))
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Replaces the letter at `coord`, returning the old one. Holes stay holes
    /// and return None. Indexes are left untouched until the next refresh.
    ///
    /// # Panics
    /// If `ch` is not an ASCII letter.
    pub fn set_letter(&mut self, coord: Coord, ch: char) -> Option<char> {
        assert!(ch.is_ascii_alphabetic(), "grid letter {:?} is not A-Z", ch);
        if !self.in_bounds(coord) {
            return None;
        }
        let idx = self.index(coord);
        let letter = self.cells[idx].as_mut()?;
        let previous = std::mem::replace(&mut letter.ch, ch.to_ascii_uppercase());
        self.stale = true;
        Some(previous)
    }

    /// Distinct dictionary words a walk from `coord` can spell.
    pub fn words_starting_at(&self, coord: Coord) -> BTreeSet<String> {
        self.sequences_starting_at(coord)
            .iter()
            .map(LetterSequence::text)
            .collect()
    }

    /// Every dictionary walk from `coord`, of any length up to [`MAX_WORD_LEN`].
    ///
    /// Only neighbours matching a trie child of the current prefix are
    /// followed, so the walk is bounded by the dictionary rather than by 8^depth.
    pub fn sequences_starting_at(&self, coord: Coord) -> Vec<LetterSequence> {
        let Some(letter) = self.letter_at(coord) else {
            return Vec::new();
        };
        let root = self.dictionary.root(letter.ch);
        self.walk(root, &LetterSequence::new(letter.tile()))
    }

    fn walk(&self, node: NodeId, so_far: &LetterSequence) -> Vec<LetterSequence> {
        if so_far.len() >= MAX_WORD_LEN {
            return Vec::new();
        }
        let mut found = Vec::new();
        for coord in self.adjacent_coords(so_far.end().coord) {
            if so_far.contains(coord) {
                continue;
            }
            let Some(letter) = self.letter_at(coord) else {
                continue;
            };
            let Some(child) = self.dictionary.descend(node, letter.ch) else {
                continue;
            };
            let next = so_far.extended(letter.tile());
            // A word can also be the prefix of a longer one, so keep descending.
            found.extend(self.walk(child, &next));
            if self.dictionary.node(child).is_word() {
                found.push(next);
            }
        }
        found
    }

    /// Recomputes both word indexes, the per-letter counters and the grid stats.
    pub fn refresh_indexes(&mut self) {
        let mut forward = HashMap::new();
        let mut backward: HashMap<Coord, Vec<LetterSequence>> = HashMap::new();
        let mut stats = GridStats::default();
        let mut starting = HashMap::new();

        for letter in self.letters() {
            stats.tile_count += 1;
            let mut sequences = self.sequences_starting_at(letter.coord);
            sequences.retain(|s| s.len() >= MIN_WORD_LEN);
            sequences.sort_by(|a, b| b.len().cmp(&a.len()));

            stats.total_words += sequences.len();
            stats.total_word_letters += sequences.iter().map(LetterSequence::len).sum::<usize>();
            starting.insert(letter.coord, sequences.len());

            for sequence in &sequences {
                backward.entry(sequence.end().coord).or_default().push(sequence.clone());
            }
            forward.insert(letter.coord, sequences);
        }

        for letter in self.cells.iter_mut().flatten() {
            letter.words_starting = starting.get(&letter.coord).copied().unwrap_or(0);
            letter.words_ending = backward.get(&letter.coord).map_or(0, Vec::len);
        }

        self.forward = forward;
        self.backward = backward;
        self.stats = stats;
        self.stale = false;

        info!(
            "Indexed {} words over {} tiles ({:.2} words/tile, {:.2} letters/tile)",
            stats.total_words,
            stats.tile_count,
            stats.avg_words_per_tile(),
            stats.avg_word_letters_per_tile()
        );
    }

    /// Indexed sequences starting at `coord`, longest first.
    pub fn forward_sequences(&self, coord: Coord) -> &[LetterSequence] {
        self.forward.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indexed sequences ending at `coord`.
    pub fn backward_sequences(&self, coord: Coord) -> &[LetterSequence] {
        self.backward.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The grid as text rows, top row first, holes as [`HOLE`].
    pub fn render_rows(&self) -> Vec<String> {
        (0..self.rows)
            .rev()
            .map(|y| {
                (0..self.cols)
                    .map(|x| self.letter_at(Coord::new(x, y)).map_or(HOLE, |l| l.ch))
                    .collect()
            })
            .collect()
    }

    pub fn log_layout(&self) {
        debug!("Grid layout:\n{}", self.render_rows().join("\n"));
    }
}

/// Splits a map file into its maps. `#` lines are headers separating maps;
/// blank lines are ignored.
pub fn parse_map_file(text: &str) -> Vec<Vec<String>> {
    let mut maps = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.starts_with('#') {
            if !current.is_empty() {
                maps.push(std::mem::take(&mut current));
            }
        } else if !line.is_empty() {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        maps.push(current);
    }
    maps
}

impl Grid {
    /// Loads the first map of a map file.
    pub fn load(path: &Path, dictionary: Dictionary) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let maps = parse_map_file(&text);
        let Some(rows) = maps.first() else {
            return Err(EngineError::MapParse(format!("{} holds no map", path.display())));
        };
        info!("Loading map {} ({} maps in file)", path.display(), maps.len());
        Self::from_rows(rows, dictionary)
    }
}
