// File: src/shuffle.rs
use crate::config::ShuffleConfig;
use crate::core::grid::Grid;
use crate::core::trie::ALPHABET;
use crate::core::types::Coord;
use log::info;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// English letter frequencies, most common first.
const LETTER_WEIGHTS: [(char, u32); 26] = [
    ('E', 5688),
    ('A', 4331),
    ('R', 3864),
    ('I', 3845),
    ('O', 3651),
    ('T', 3543),
    ('N', 3392),
    ('S', 2923),
    ('L', 2798),
    ('C', 2313),
    ('U', 1851),
    ('D', 1725),
    ('P', 1614),
    ('M', 1536),
    ('H', 1531),
    ('G', 1259),
    ('B', 1056),
    ('F', 924),
    ('Y', 906),
    ('W', 657),
    ('K', 561),
    ('V', 513),
    ('X', 148),
    ('Z', 139),
    ('J', 100),
    ('Q', 100),
];

/// Which way a shuffle batch is allowed to move the grid's word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// Keep batches that do not lose words.
    Easier,
    /// Keep batches that do not gain words.
    Harder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousLetter {
    pub coord: Coord,
    pub ch: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleOutcome {
    pub changed: usize,
    pub words_before: usize,
    pub words_after: usize,
    pub kept: bool,
}

pub fn random_letter<R: Rng + ?Sized>(rng: &mut R, weighted: bool) -> char {
    if !weighted {
        let idx = rng.gen_range(0..ALPHABET.len());
        return ALPHABET.as_bytes()[idx] as char;
    }
    match WeightedIndex::new(LETTER_WEIGHTS.iter().map(|(_, w)| *w)) {
        Ok(dist) => LETTER_WEIGHTS[dist.sample(rng)].0,
        Err(_) => 'E',
    }
}

/// Gives up to `count` distinct occupied tiles a fresh random letter. The
/// indexes are NOT refreshed; the returned list restores the old letters.
pub fn shuffle_tiles<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    count: usize,
    weighted: bool,
) -> Vec<PreviousLetter> {
    let coords: Vec<Coord> = grid.letters().map(|l| l.coord).collect();
    let picked: Vec<Coord> = coords.choose_multiple(rng, count).copied().collect();

    let mut previous = Vec::with_capacity(picked.len());
    for coord in picked {
        let ch = random_letter(rng, weighted);
        if let Some(old) = grid.set_letter(coord, ch) {
            previous.push(PreviousLetter { coord, ch: old });
        }
    }
    previous
}

pub fn restore(grid: &mut Grid, previous: &[PreviousLetter]) {
    for letter in previous {
        grid.set_letter(letter.coord, letter.ch);
    }
}

/// Easier batches draw common letters when `weighted` is on. Harder batches
/// always draw uniformly, which favours rare letters.
pub fn draws_weighted(config: &ShuffleConfig, difficulty: Difficulty) -> bool {
    config.weighted && difficulty == Difficulty::Easier
}

/// One shuffle step: replace a batch of letters, reindex, and undo the batch
/// if the word count moved against `difficulty`.
pub fn shuffle_batch<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    config: &ShuffleConfig,
    difficulty: Difficulty,
) -> ShuffleOutcome {
    let words_before = grid.stats().total_words;
    let weighted = draws_weighted(config, difficulty);
    let previous = shuffle_tiles(grid, rng, config.tiles_per_batch, weighted);
    grid.refresh_indexes();

    let words_after = grid.stats().total_words;
    let kept = match difficulty {
        Difficulty::Easier => words_after >= words_before,
        Difficulty::Harder => words_after <= words_before,
    };
    if !kept {
        restore(grid, &previous);
        grid.refresh_indexes();
    }

    info!(
        "Shuffled {} tiles ({:?}): {} -> {} words, {}",
        previous.len(),
        difficulty,
        words_before,
        words_after,
        if kept { "kept" } else { "reverted" }
    );
    ShuffleOutcome { changed: previous.len(), words_before, words_after, kept }
}
