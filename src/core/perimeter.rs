// src/core/perimeter.rs
use crate::core::selection::Selection;
use crate::core::sequence::{LetterSequence, OrientedSequence};
use crate::core::trie::Dictionary;
use crate::core::types::{Coord, Tile, MIN_WORD_LEN};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerimeterState {
    /// No verified words yet.
    Empty,
    /// One or more verified words with two distinct open ends.
    Open,
    /// The two ends met; the loop is done and accepts no more tiles.
    Closed,
}

/// Numbers the surrounding game uses to price a loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerimeterStats {
    pub words: usize,
    pub tiles: usize,
    pub average_word_length: f32,
}

/// The player's chain of verified words plus the selection being traced.
///
/// Segments are kept in walking order, each with the orientation it is walked
/// in, so that concatenating them gives one path from the start terminal to
/// the end terminal. Every rejected operation returns `false` and leaves the
/// perimeter exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct Perimeter {
    segments: Vec<OrientedSequence>,
    current: Option<Selection>,
    start_terminal: Option<Tile>,
    end_terminal: Option<Tile>,
    history: Vec<LetterSequence>,
    closed: bool,
}

impl Perimeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PerimeterState {
        if self.closed {
            PerimeterState::Closed
        } else if self.segments.is_empty() {
            PerimeterState::Empty
        } else {
            PerimeterState::Open
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Offers a tapped tile to the live selection, starting one if needed.
    pub fn add_tile(&mut self, tile: Tile) -> bool {
        if self.closed {
            debug!("Rejecting {}: perimeter is closed", tile.coord);
            return false;
        }
        if self.current.as_ref().is_some_and(|s| s.contains(tile.coord)) {
            debug!("Rejecting {}: already in current selection", tile.coord);
            return false;
        }
        if self.is_interior(tile.coord) {
            debug!("Rejecting {}: interior of a verified word", tile.coord);
            return false;
        }

        if self.current.is_none() {
            debug!("Starting selection at {} with {}", tile.coord, tile.ch);
            self.current = Some(Selection::new(tile));
            return true;
        }

        // A selection that has already run onto the perimeter stops there.
        let verified = self.verified_coords();
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        if current.tiles().iter().skip(1).any(|t| verified.contains(&t.coord)) {
            debug!("Rejecting {}: selection already reached the perimeter", tile.coord);
            return false;
        }

        let accepted = current.try_extend(tile);
        if !accepted {
            debug!("Rejecting {}: not adjacent to {}", tile.coord, current.to_text());
        }
        accepted
    }

    /// Verifies the live selection as a word and joins it to the chain.
    ///
    /// Fails without side effects if there is no selection, if it does not
    /// spell a word of at least [`MIN_WORD_LEN`] letters, or if neither of its
    /// ends touches a terminal. The caller decides whether to discard it then.
    pub fn try_merge_current(&mut self, dictionary: &Dictionary) -> bool {
        let Some(current) = self.current.as_ref().filter(|s| !s.is_empty()) else {
            debug!("Not merging: no current selection");
            return false;
        };
        let text = current.to_text();
        if current.len() < MIN_WORD_LEN || !dictionary.is_word(&text) {
            debug!("Not merging: {} is not a word", text);
            return false;
        }
        let Some(sequence) = current.to_sequence() else {
            return false;
        };

        let first = sequence.start().coord;
        let last = sequence.end().coord;
        let start = self.start_terminal.map(|t| t.coord);
        let end = self.end_terminal.map(|t| t.coord);

        if self.segments.is_empty() {
            debug!("Merged {} as the first word", text);
            self.segments.push(OrientedSequence::new(sequence.clone(), false));
        } else if end == Some(first) {
            debug!("Merged {}: end extension", text);
            self.segments.push(OrientedSequence::new(sequence.clone(), false));
        } else if end == Some(last) {
            debug!("Merged {}: end extension (reversed)", text);
            self.segments.push(OrientedSequence::new(sequence.clone(), true));
        } else if start == Some(last) {
            debug!("Merged {}: start extension", text);
            self.segments.insert(0, OrientedSequence::new(sequence.clone(), false));
        } else if start == Some(first) {
            debug!("Merged {}: start extension (reversed)", text);
            self.segments.insert(0, OrientedSequence::new(sequence.clone(), true));
        } else {
            debug!("Not merging: {} does not extend the perimeter", text);
            return false;
        }

        self.history.push(sequence);
        self.current = None;
        self.update_terminals();
        self.closed = matches!(
            (self.start_terminal, self.end_terminal),
            (Some(s), Some(e)) if s.coord == e.coord
        );
        if self.closed {
            debug!("Perimeter closed after {} words", self.segments.len());
        }
        true
    }

    /// Undoes the most recent merge.
    pub fn revert_last(&mut self) -> bool {
        if self.closed || self.current.as_ref().is_some_and(|s| !s.is_empty()) {
            return false;
        }
        let Some(sequence) = self.history.pop() else {
            return false;
        };

        if self.segments.last().is_some_and(|s| s.sequence == sequence) {
            self.segments.pop();
        } else if self.segments.first().is_some_and(|s| s.sequence == sequence) {
            self.segments.remove(0);
        } else {
            unreachable!("last merged word {} is not at either end of the chain", sequence);
        }
        debug!("Reverted {}", sequence);
        self.update_terminals();
        true
    }

    pub fn discard_current(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.discard();
        }
        self.current = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn update_terminals(&mut self) {
        self.start_terminal = self.segments.first().map(OrientedSequence::start);
        self.end_terminal = self.segments.last().map(OrientedSequence::end);
    }

    fn verified_coords_of(segments: &[OrientedSequence]) -> HashSet<Coord> {
        segments.iter().flat_map(|s| s.sequence.coords()).collect()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn segments(&self) -> &[OrientedSequence] {
        &self.segments
    }

    /// Verified words in the order they were merged.
    pub fn history(&self) -> &[LetterSequence] {
        &self.history
    }

    pub fn start_terminal(&self) -> Option<Tile> {
        self.start_terminal
    }

    pub fn end_terminal(&self) -> Option<Tile> {
        self.end_terminal
    }

    pub fn terminals(&self) -> Option<(Tile, Tile)> {
        self.start_terminal.zip(self.end_terminal)
    }

    /// The terminal the most recent merge landed on, for camera framing.
    pub fn latest_terminal(&self) -> Option<Tile> {
        let latest = self.history.last()?;
        if self.segments.first().is_some_and(|s| &s.sequence == latest) && self.segments.len() > 1 {
            self.start_terminal
        } else {
            self.end_terminal
        }
    }

    pub fn is_terminal(&self, coord: Coord) -> bool {
        self.start_terminal.is_some_and(|t| t.coord == coord)
            || self.end_terminal.is_some_and(|t| t.coord == coord)
    }

    pub fn is_verified(&self, coord: Coord) -> bool {
        self.segments.iter().any(|s| s.sequence.contains(coord))
    }

    /// True for verified cells that are not one of the two open ends.
    pub fn is_interior(&self, coord: Coord) -> bool {
        !self.is_terminal(coord) && self.is_verified(coord)
    }

    pub fn verified_coords(&self) -> HashSet<Coord> {
        Self::verified_coords_of(&self.segments)
    }

    /// Verified tiles from the start terminal to the end terminal. Cells shared
    /// by consecutive words appear once; a closed loop repeats its start at the end.
    pub fn verified_tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            tiles.extend(segment.walk().skip(usize::from(i > 0)));
        }
        tiles
    }

    /// Letters per verified word, 0 when nothing is verified.
    pub fn average_word_length(&self) -> f32 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let letters: usize = self.segments.iter().map(OrientedSequence::len).sum();
        letters as f32 / self.segments.len() as f32
    }

    pub fn stats(&self) -> PerimeterStats {
        PerimeterStats {
            words: self.segments.len(),
            tiles: self.verified_coords().len(),
            average_word_length: self.average_word_length(),
        }
    }

    /// The chain as text, `-->` between words.
    pub fn describe(&self) -> String {
        self.segments
            .iter()
            .map(OrientedSequence::text)
            .collect::<Vec<_>>()
            .join(" --> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: i32, y: i32, ch: char) -> Tile {
        Tile::new(Coord::new(x, y), ch)
    }

    fn trace(perimeter: &mut Perimeter, tiles: &[Tile]) -> bool {
        tiles.iter().all(|t| perimeter.add_tile(*t))
    }

    // C A T O P on one row.
    fn row() -> Vec<Tile> {
        "CATOP".chars().enumerate().map(|(x, ch)| tile(x as i32, 0, ch)).collect()
    }

    #[test]
    fn first_word_sets_both_terminals() {
        let dictionary = Dictionary::from_words(["CAT"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        assert!(trace(&mut perimeter, &tiles[..3]));
        assert!(perimeter.try_merge_current(&dictionary));
        assert_eq!(perimeter.state(), PerimeterState::Open);
        assert_eq!(perimeter.terminals(), Some((tiles[0], tiles[2])));
        assert!(perimeter.current().is_none());
    }

    #[test]
    fn non_words_and_short_words_do_not_merge() {
        let dictionary = Dictionary::from_words(["CA", "CATO"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[..2]);
        assert!(!perimeter.try_merge_current(&dictionary));
        perimeter.add_tile(tiles[2]);
        assert!(!perimeter.try_merge_current(&dictionary));
        assert_eq!(perimeter.current().unwrap().len(), 3);
        assert_eq!(perimeter.state(), PerimeterState::Empty);
    }

    #[test]
    fn valid_words_away_from_the_terminals_do_not_merge() {
        let dictionary = Dictionary::from_words(["CAT", "OPS"]);
        let tiles: Vec<Tile> =
            "CATXOPS".chars().enumerate().map(|(x, ch)| tile(x as i32, 0, ch)).collect();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[..3]);
        assert!(perimeter.try_merge_current(&dictionary));

        assert!(trace(&mut perimeter, &tiles[4..7]));
        assert!(!perimeter.try_merge_current(&dictionary));
        assert_eq!(perimeter.current().unwrap().to_text(), "OPS");
        assert_eq!(perimeter.segments().len(), 1);
        assert_eq!(perimeter.history().len(), 1);
    }

    #[test]
    fn interior_cells_cannot_start_or_join_a_selection() {
        let dictionary = Dictionary::from_words(["CAT"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[..3]);
        perimeter.try_merge_current(&dictionary);
        assert!(!perimeter.add_tile(tiles[1]));
        assert!(perimeter.current().is_none());
        assert!(perimeter.add_tile(tiles[2]));
        assert!(perimeter.add_tile(tiles[3]));
    }

    #[test]
    fn reversed_end_extension_and_start_extension() {
        // Column layout:   x: 0 1 2 3 4
        //                  y0 C A T O P
        let dictionary = Dictionary::from_words(["CAT", "POT", "TOP"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[..3]);
        assert!(perimeter.try_merge_current(&dictionary));

        // POT ends on the end terminal T, so it is walked reversed.
        assert!(trace(&mut perimeter, &[tiles[4], tiles[3], tiles[2]]));
        assert!(perimeter.try_merge_current(&dictionary));
        assert!(perimeter.segments()[1].reversed);
        assert_eq!(perimeter.end_terminal(), Some(tiles[4]));
        assert_eq!(perimeter.describe(), "CAT --> TOP");
        assert_eq!(perimeter.verified_tiles(), tiles);
        assert!(perimeter.is_interior(tiles[2].coord));
        assert!(perimeter.is_terminal(tiles[4].coord));
    }

    #[test]
    fn revert_pops_the_latest_word_from_whichever_end() {
        let dictionary = Dictionary::from_words(["CAT", "TOP"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[2..5]);
        assert!(perimeter.try_merge_current(&dictionary));
        // CAT ends on the start terminal T: start extension.
        trace(&mut perimeter, &tiles[..3]);
        assert!(perimeter.try_merge_current(&dictionary));
        assert_eq!(perimeter.start_terminal(), Some(tiles[0]));

        assert!(perimeter.revert_last());
        assert_eq!(perimeter.terminals(), Some((tiles[2], tiles[4])));
        assert!(perimeter.revert_last());
        assert_eq!(perimeter.state(), PerimeterState::Empty);
        assert!(perimeter.terminals().is_none());
        assert!(!perimeter.revert_last());
    }

    #[test]
    fn revert_waits_for_the_live_selection() {
        let dictionary = Dictionary::from_words(["CAT"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[..3]);
        perimeter.try_merge_current(&dictionary);
        perimeter.add_tile(tiles[3]);
        assert!(!perimeter.revert_last());
        perimeter.discard_current();
        assert!(perimeter.revert_last());
    }

    #[test]
    fn selection_stops_once_it_reaches_the_perimeter() {
        let dictionary = Dictionary::from_words(["TOP"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        trace(&mut perimeter, &tiles[2..5]);
        perimeter.try_merge_current(&dictionary);

        // Walk A -> T: T is a terminal, so the tap lands, but nothing may follow it.
        assert!(perimeter.add_tile(tiles[1]));
        assert!(perimeter.add_tile(tiles[2]));
        assert!(!perimeter.add_tile(tiles[0]));
    }

    #[test]
    fn average_word_length_counts_letters_per_word() {
        let dictionary = Dictionary::from_words(["CAT", "TOP"]);
        let tiles = row();
        let mut perimeter = Perimeter::new();
        assert_eq!(perimeter.average_word_length(), 0.0);
        trace(&mut perimeter, &tiles[..3]);
        perimeter.try_merge_current(&dictionary);
        trace(&mut perimeter, &tiles[2..5]);
        perimeter.try_merge_current(&dictionary);
        assert_eq!(perimeter.average_word_length(), 3.0);
        assert_eq!(perimeter.stats().tiles, 5);
        perimeter.reset();
        assert_eq!(perimeter.state(), PerimeterState::Empty);
    }
}
