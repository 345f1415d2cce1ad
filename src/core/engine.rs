use crate::config::{EngineConfig, HintConfig};
use crate::core::connector::{describe, WordChain};
use crate::core::grid::Grid;
use crate::core::perimeter::{Perimeter, PerimeterState};
use crate::core::trie::Dictionary;
use crate::core::types::{Coord, MIN_WORD_LEN};
use crate::error::Result;
use crate::shuffle::{self, Difficulty, ShuffleOutcome};
use log::{debug, info};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;

/// Notifications for presentation layers, drained with [`Board::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    WordAttempted {
        word: String,
        is_word: bool,
        merged: bool,
        closed: bool,
        /// Terminal to frame: the one just reached, or the latest one if the word failed.
        terminal: Option<Coord>,
    },
    WordReverted {
        terminal: Option<Coord>,
    },
    HintResolved {
        words: Vec<String>,
        reaches_end: bool,
        chain: WordChain,
    },
    HintFailed,
}

// The board ties the grid and the perimeter to coordinate-resolved touches.
// Touch-to-coordinate mapping, drawing and camera work all live outside.
#[derive(Debug)]
pub struct Board {
    pub grid: Grid,
    pub perimeter: Perimeter,
    hint_config: HintConfig,
    events: VecDeque<BoardEvent>,
}

impl Board {
    pub fn new(grid: Grid, hint_config: HintConfig) -> Self {
        Self { grid, perimeter: Perimeter::new(), hint_config, events: VecDeque::new() }
    }

    /// Loads the dictionary and the map named by `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let dictionary = Dictionary::load(&config.dictionary_path())?;
        let grid = Grid::load(&config.map_path(), dictionary)?;
        grid.log_layout();
        Ok(Self::new(grid, config.hint.clone()))
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.grid.dictionary()
    }

    pub fn hint_config(&self) -> &HintConfig {
        &self.hint_config
    }

    pub fn touch_started(&mut self, coord: Coord) -> bool {
        self.add_tile_at(coord)
    }

    pub fn touch_moved(&mut self, coord: Coord) -> bool {
        self.add_tile_at(coord)
    }

    fn add_tile_at(&mut self, coord: Coord) -> bool {
        match self.grid.tile_at(coord) {
            Some(tile) => self.perimeter.add_tile(tile),
            None => false,
        }
    }

    /// Finishes the trace: merges it if it is a word that extends the chain,
    /// otherwise releases its tiles. Returns whether it merged.
    pub fn touch_ended(&mut self) -> bool {
        let Some(word) = self.perimeter.current().map(|s| s.to_text()) else {
            return false;
        };
        let is_word = word.chars().count() >= MIN_WORD_LEN && self.grid.dictionary().is_word(&word);
        let merged = is_word && self.perimeter.try_merge_current(self.grid.dictionary());

        if !merged {
            if is_word {
                debug!("{} can't extend perimeter", word);
            } else {
                debug!("{} is not a word", word);
            }
            self.perimeter.discard_current();
        }

        self.events.push_back(BoardEvent::WordAttempted {
            word,
            is_word,
            merged,
            closed: self.perimeter.is_closed(),
            terminal: self.perimeter.latest_terminal().map(|t| t.coord),
        });
        merged
    }

    /// Undoes the latest word.
    pub fn undo(&mut self) -> bool {
        if !self.perimeter.revert_last() {
            return false;
        }
        self.events.push_back(BoardEvent::WordReverted {
            terminal: self.perimeter.latest_terminal().map(|t| t.coord),
        });
        true
    }

    /// Searches for words joining the two open ends of the chain.
    pub fn hint(&mut self) -> Option<WordChain> {
        let found = match (self.perimeter.state(), self.perimeter.terminals()) {
            (PerimeterState::Open, Some((start, end))) => {
                let avoid = self.perimeter.verified_coords();
                self.grid.hint(start.coord, end.coord, &avoid, &self.hint_config)
            }
            _ => None,
        };

        match &found {
            Some(chain) => {
                let reaches_end = self
                    .perimeter
                    .end_terminal()
                    .is_some_and(|end| chain.reaches(end.coord));
                info!("Hint: {}", describe(chain));
                self.events.push_back(BoardEvent::HintResolved {
                    words: chain.words(),
                    reaches_end,
                    chain: chain.clone(),
                });
            }
            None => self.events.push_back(BoardEvent::HintFailed),
        }
        found
    }

    pub fn discard_selection(&mut self) {
        self.perimeter.discard_current();
    }

    pub fn reset(&mut self) {
        self.perimeter.reset();
    }

    /// Shuffles a batch of letters. The chain is cleared first since its
    /// words no longer spell anything once letters change.
    pub fn shuffle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &crate::config::ShuffleConfig,
        difficulty: Difficulty,
    ) -> ShuffleOutcome {
        self.perimeter.reset();
        shuffle::shuffle_batch(&mut self.grid, rng, config, difficulty)
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        self.events.drain(..).collect()
    }

    /// Pending events as a JSON array, leaving the queue empty.
    pub fn drain_events_json(&mut self) -> Result<String> {
        let events = self.drain_events();
        Ok(serde_json::to_string(&events)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        let dictionary = Dictionary::from_words(["CAT", "TOP", "COT"]);
        let grid = Grid::from_rows(&["CATOP"], dictionary).unwrap();
        Board::new(grid, HintConfig::default())
    }

    fn trace(board: &mut Board, xs: &[i32]) {
        board.touch_started(Coord::new(xs[0], 0));
        for &x in &xs[1..] {
            board.touch_moved(Coord::new(x, 0));
        }
    }

    #[test]
    fn a_word_merges_and_reports_its_terminal() {
        let mut board = board();
        trace(&mut board, &[0, 1, 2]);
        assert!(board.touch_ended());
        assert_eq!(
            board.drain_events(),
            vec![BoardEvent::WordAttempted {
                word: "CAT".into(),
                is_word: true,
                merged: true,
                closed: false,
                terminal: Some(Coord::new(2, 0)),
            }]
        );
        assert!(board.drain_events().is_empty());
    }

    #[test]
    fn a_non_word_releases_the_selection() {
        let mut board = board();
        trace(&mut board, &[1, 2, 3]);
        assert!(!board.touch_ended());
        assert!(board.perimeter.current().is_none());
        match &board.drain_events()[0] {
            BoardEvent::WordAttempted { is_word, merged, .. } => {
                assert!(!is_word);
                assert!(!merged);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn touches_on_holes_are_ignored() {
        let dictionary = Dictionary::from_words(["CAT"]);
        let grid = Grid::from_rows(&["C+T"], dictionary).unwrap();
        let mut board = Board::new(grid, HintConfig::default());
        assert!(!board.touch_started(Coord::new(1, 0)));
        assert!(!board.touch_started(Coord::new(9, 9)));
        assert!(!board.touch_ended());
        assert!(board.drain_events().is_empty());
    }

    #[test]
    fn undo_reports_the_new_terminal() {
        let mut board = board();
        trace(&mut board, &[0, 1, 2]);
        board.touch_ended();
        trace(&mut board, &[2, 3, 4]);
        assert!(board.touch_ended());
        board.drain_events();

        assert!(board.undo());
        assert_eq!(
            board.drain_events(),
            vec![BoardEvent::WordReverted { terminal: Some(Coord::new(2, 0)) }]
        );
        assert!(board.undo());
        assert!(!board.undo());
    }

    #[test]
    fn hint_needs_an_open_chain() {
        let mut board = board();
        assert!(board.hint().is_none());
        assert_eq!(board.drain_events(), vec![BoardEvent::HintFailed]);
    }

    #[test]
    fn events_serialize_as_tagged_json() {
        let mut board = board();
        board.undo();
        board.hint();
        let json = board.drain_events_json().unwrap();
        assert_eq!(json, r#"[{"event":"hint_failed"}]"#);
    }
}
