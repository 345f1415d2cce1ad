// src/core/connector.rs
//
// Hint search: chains of indexed words linking two cells of the grid.
use crate::config::HintConfig;
use crate::core::grid::Grid;
use crate::core::sequence::{LetterSequence, OrientedSequence};
use crate::core::types::{Coord, Tile, HINT_MAX_WORD_LEN};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Deref;

/// Once a level has found a chain that reaches the target, it tries at most
/// this many more candidates before settling.
pub const ATTEMPTS_AFTER_HIT: usize = 2;

/// A level that has only produced chains falling short of the target stops
/// after this many of them. Only partial searches produce such chains.
pub const PARTIAL_ATTEMPTS: usize = 4;

/// Words linked end to start, as proposed by [`Grid::connect`]. A chain from a
/// partial search may stop short of the requested end cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordChain {
    links: Vec<OrientedSequence>,
}

impl WordChain {
    fn single(link: OrientedSequence) -> Self {
        Self { links: vec![link] }
    }

    fn prepended(mut self, link: OrientedSequence) -> Self {
        self.links.insert(0, link);
        self
    }

    pub fn links(&self) -> &[OrientedSequence] {
        &self.links
    }

    pub fn into_links(self) -> Vec<OrientedSequence> {
        self.links
    }

    pub fn word_count(&self) -> usize {
        self.links.len()
    }

    pub fn letter_count(&self) -> usize {
        self.links.iter().map(OrientedSequence::len).sum()
    }

    pub fn start(&self) -> Tile {
        self.links[0].start()
    }

    pub fn end(&self) -> Tile {
        self.links[self.links.len() - 1].end()
    }

    pub fn reaches(&self, target: Coord) -> bool {
        self.end().coord == target
    }

    pub fn words(&self) -> Vec<String> {
        self.links.iter().map(OrientedSequence::text).collect()
    }

    /// Ordering used to pick between candidate chains: reaching `target` wins,
    /// then fewer words, then more letters. Chains that fall short are ranked
    /// by how close they get first.
    fn compare(&self, other: &WordChain, target: Coord) -> Ordering {
        match (self.reaches(target), other.reaches(target)) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => other
                .word_count()
                .cmp(&self.word_count())
                .then(self.letter_count().cmp(&other.letter_count())),
            (false, false) => {
                let mine = self.end().coord.distance(target);
                let theirs = other.end().coord.distance(target);
                theirs
                    .partial_cmp(&mine)
                    .unwrap_or(Ordering::Equal)
                    .then(other.word_count().cmp(&self.word_count()))
                    .then(self.letter_count().cmp(&other.letter_count()))
            }
        }
    }
}

impl Deref for WordChain {
    type Target = [OrientedSequence];

    fn deref(&self) -> &Self::Target {
        &self.links
    }
}

/// Keeps `current` unless `challenger` is strictly better.
fn prefer(current: Option<WordChain>, challenger: WordChain, target: Coord) -> Option<WordChain> {
    match current {
        Some(best) if challenger.compare(&best, target) != Ordering::Greater => Some(best),
        _ => Some(challenger),
    }
}

impl Grid {
    /// Finds a chain of indexed words walking from `start` to `end` that never
    /// touches a cell in `avoid` other than `start` and `end` themselves.
    ///
    /// Candidates at each step come from the forward index (words starting at
    /// the pivot) and the backward index (words ending there, walked in
    /// reverse), capped at [`HINT_MAX_WORD_LEN`] letters and discarded when
    /// their far end lands more than `slack` further from `end` than the pivot
    /// is. A single word reaching `end` is returned straight away. Otherwise up
    /// to `max_depth` further words are chained. With `allow_partial`, a
    /// search that cannot reach `end` returns the attempt that gets closest.
    ///
    /// This is a bounded heuristic, not an optimal search: each level stops
    /// [`ATTEMPTS_AFTER_HIT`] candidates after its first success, or after
    /// [`PARTIAL_ATTEMPTS`] chains that fall short.
    pub fn connect(
        &self,
        start: Coord,
        end: Coord,
        avoid: &HashSet<Coord>,
        allow_partial: bool,
        max_depth: usize,
        slack: f32,
    ) -> Option<WordChain> {
        let blocked: HashSet<Coord> = avoid
            .iter()
            .copied()
            .filter(|c| *c != start && *c != end)
            .collect();
        let reach = start.distance(end) + slack;

        let usable = |sequence: &LetterSequence, reversed: bool| {
            let far = if reversed { sequence.start() } else { sequence.end() }.coord;
            sequence.len() <= HINT_MAX_WORD_LEN
                && !sequence.contains_any(&blocked)
                && (far == end || !sequence.contains(end))
                && far.distance(end) <= reach
        };
        let forward: Vec<OrientedSequence> = self
            .forward_sequences(start)
            .iter()
            .filter(|s| usable(*s, false))
            .map(|s| OrientedSequence::new(s.clone(), false))
            .collect();
        let backward: Vec<OrientedSequence> = self
            .backward_sequences(start)
            .iter()
            .filter(|s| usable(*s, true))
            .map(|s| OrientedSequence::new(s.clone(), true))
            .collect();

        let direct = forward
            .iter()
            .chain(backward.iter())
            .filter(|l| l.end().coord == end)
            .fold(None::<&OrientedSequence>, |best, l| match best {
                Some(b) if b.len() >= l.len() => Some(b),
                _ => Some(l),
            });
        if let Some(link) = direct {
            debug!("Connected {} -> {} with {}", start, end, link.text());
            return Some(WordChain::single(link.clone()));
        }

        if max_depth == 0 {
            return if allow_partial { closest_attempt(&forward, &backward, end) } else { None };
        }

        let via_forward = self.extend_each(&forward, end, avoid, allow_partial, max_depth, slack);
        let via_backward = self.extend_each(&backward, end, avoid, allow_partial, max_depth, slack);
        let best = match (via_forward, via_backward) {
            (Some(f), Some(b)) => prefer(Some(f), b, end),
            (f, b) => f.or(b),
        };

        match best {
            Some(chain) if chain.reaches(end) => Some(chain),
            best if allow_partial => match closest_attempt(&forward, &backward, end) {
                Some(closest) => prefer(best, closest, end),
                None => best,
            },
            Some(chain) => Some(chain),
            None => {
                debug!("No chain from {} to {} within depth {}", start, end, max_depth);
                None
            }
        }
    }

    fn extend_each(
        &self,
        candidates: &[OrientedSequence],
        end: Coord,
        avoid: &HashSet<Coord>,
        allow_partial: bool,
        max_depth: usize,
        slack: f32,
    ) -> Option<WordChain> {
        let mut best = None;
        let mut attempts_since_hit: Option<usize> = None;
        let mut misses = 0;

        for link in candidates {
            match attempts_since_hit {
                Some(attempts) if attempts >= ATTEMPTS_AFTER_HIT => break,
                Some(attempts) => attempts_since_hit = Some(attempts + 1),
                None if misses >= PARTIAL_ATTEMPTS => break,
                None => {}
            }

            let mut next_avoid = avoid.clone();
            next_avoid.extend(link.sequence.coords());
            let pivot = link.end().coord;

            let Some(rest) =
                self.connect(pivot, end, &next_avoid, allow_partial, max_depth - 1, slack)
            else {
                continue;
            };
            let chain = rest.prepended(link.clone());
            if !chain.reaches(end) {
                misses += 1;
            } else if attempts_since_hit.is_none() {
                attempts_since_hit = Some(0);
            }
            best = prefer(best, chain, end);
        }
        best
    }

    /// Hint between two cells: an exact search, then one widened by
    /// `fallback_slack`. The widened search is also the partial one when
    /// partial hints are enabled, since reaching chains still outrank the rest.
    pub fn hint(
        &self,
        start: Coord,
        end: Coord,
        avoid: &HashSet<Coord>,
        config: &HintConfig,
    ) -> Option<WordChain> {
        self.connect(start, end, avoid, false, config.max_depth, 0.0).or_else(|| {
            self.connect(
                start,
                end,
                avoid,
                config.allow_partial,
                config.max_depth,
                config.fallback_slack,
            )
        })
    }
}

/// Longest forward and longest backward candidate; whichever ends nearer `end` wins.
fn closest_attempt(
    forward: &[OrientedSequence],
    backward: &[OrientedSequence],
    end: Coord,
) -> Option<WordChain> {
    fn longest(links: &[OrientedSequence]) -> Option<&OrientedSequence> {
        links.iter().fold(None, |best, l| match best {
            Some(b) if b.len() >= l.len() => Some(b),
            _ => Some(l),
        })
    }

    let nearer = match (longest(forward), longest(backward)) {
        (Some(f), Some(b)) => {
            if b.end().coord.distance(end) < f.end().coord.distance(end) {
                b
            } else {
                f
            }
        }
        (Some(f), None) => f,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(WordChain::single(nearer.clone()))
}

/// Sequence text in walking order, for logs and events.
pub fn describe(links: &[OrientedSequence]) -> String {
    links.iter().map(OrientedSequence::text).collect::<Vec<_>>().join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trie::Dictionary;

    fn grid(rows: &[&str], words: &[&str]) -> Grid {
        Grid::from_rows(rows, Dictionary::from_words(words.iter().copied())).unwrap()
    }

    #[test]
    fn single_word_between_its_own_ends() {
        let g = grid(&["CAT"], &["CAT"]);
        let chain = g
            .connect(Coord::new(0, 0), Coord::new(2, 0), &HashSet::new(), false, 3, 0.0)
            .unwrap();
        assert_eq!(chain.word_count(), 1);
        assert!(!chain[0].reversed);
        assert_eq!(chain.words(), vec!["CAT".to_string()]);
    }

    #[test]
    fn backward_index_supplies_reversed_links() {
        let g = grid(&["CAT"], &["CAT"]);
        let chain = g
            .connect(Coord::new(2, 0), Coord::new(0, 0), &HashSet::new(), false, 3, 0.0)
            .unwrap();
        assert!(chain[0].reversed);
        assert_eq!(chain.start().coord, Coord::new(2, 0));
        assert!(chain.reaches(Coord::new(0, 0)));
    }

    #[test]
    fn two_words_share_a_pivot() {
        // CAT then TOP: C(0,0) A(1,0) T(2,0) O(3,0) P(4,0)
        let g = grid(&["CATOP"], &["CAT", "TOP"]);
        let chain = g
            .connect(Coord::new(0, 0), Coord::new(4, 0), &HashSet::new(), false, 3, 0.0)
            .unwrap();
        assert_eq!(chain.words(), vec!["CAT".to_string(), "TOP".to_string()]);
        assert_eq!(chain[0].end(), chain[1].start());
    }

    #[test]
    fn avoided_cells_block_the_route() {
        let g = grid(&["CATOP"], &["CAT", "TOP"]);
        let avoid: HashSet<Coord> = [Coord::new(1, 0)].into_iter().collect();
        assert!(g
            .connect(Coord::new(0, 0), Coord::new(4, 0), &avoid, false, 3, 0.0)
            .is_none());
    }

    #[test]
    fn depth_zero_only_accepts_direct_hits() {
        let g = grid(&["CATOP"], &["CAT", "TOP"]);
        assert!(g
            .connect(Coord::new(0, 0), Coord::new(4, 0), &HashSet::new(), false, 0, 0.0)
            .is_none());
        let partial = g
            .connect(Coord::new(0, 0), Coord::new(4, 0), &HashSet::new(), true, 0, 0.0)
            .unwrap();
        assert_eq!(partial.words(), vec!["CAT".to_string()]);
        assert!(!partial.reaches(Coord::new(4, 0)));
    }

    #[test]
    fn hint_widens_then_falls_back_to_partial() {
        let g = grid(&["CAT++Q"], &["CAT"]);
        let config = HintConfig::default();
        let hint = g
            .hint(Coord::new(0, 0), Coord::new(5, 0), &HashSet::new(), &config)
            .unwrap();
        assert_eq!(hint.words(), vec!["CAT".to_string()]);

        let strict = HintConfig { allow_partial: false, ..HintConfig::default() };
        assert!(g
            .hint(Coord::new(0, 0), Coord::new(5, 0), &HashSet::new(), &strict)
            .is_none());
    }

    #[test]
    fn shorter_chains_beat_longer_ones() {
        let g = grid(&["CAT"], &["CAT"]);
        let seq = |coords: &[(i32, i32)]| {
            LetterSequence::from_tiles(coords.iter().map(|&(x, y)| g.tile_at(Coord::new(x, y)).unwrap()).collect())
                .unwrap()
        };
        let one = WordChain::single(OrientedSequence::new(seq(&[(0, 0), (1, 0), (2, 0)]), false));
        let two = WordChain::single(OrientedSequence::new(seq(&[(1, 0), (2, 0)]), false))
            .prepended(OrientedSequence::new(seq(&[(0, 0), (1, 0)]), false));
        let target = Coord::new(2, 0);
        assert_eq!(one.compare(&two, target), Ordering::Greater);
        assert_eq!(prefer(Some(two), one.clone(), target), Some(one));
    }

    fn link(g: &Grid, coords: &[(i32, i32)]) -> OrientedSequence {
        let tiles = coords.iter().map(|&(x, y)| g.tile_at(Coord::new(x, y)).unwrap()).collect();
        OrientedSequence::new(LetterSequence::from_tiles(tiles).unwrap(), false)
    }

    #[test]
    fn longest_direct_word_wins() {
        // Bottom row C T, top row A R. TAC runs forward from T, CART ends there.
        let g = grid(&["AR", "CT"], &["TAC", "CART"]);
        let chain = g
            .connect(Coord::new(1, 0), Coord::new(0, 0), &HashSet::new(), false, 3, 0.0)
            .unwrap();
        assert_eq!(chain.words(), vec!["TRAC".to_string()]);
        assert!(chain[0].reversed);
    }

    #[test]
    fn words_running_through_the_target_are_skipped() {
        let g = grid(&["CATS"], &["CATS"]);
        let (c, a) = (Coord::new(0, 0), Coord::new(1, 0));
        assert!(g.connect(c, a, &HashSet::new(), false, 3, 10.0).is_none());
        assert!(g.connect(c, a, &HashSet::new(), true, 3, 10.0).is_none());
        assert!(g.connect(c, Coord::new(3, 0), &HashSet::new(), false, 3, 10.0).is_some());
    }

    #[test]
    fn a_level_settles_two_candidates_after_its_first_hit() {
        // A B C D E F G: CDE then EFG reach G.
        let g = grid(&["ABCDEFG"], &["CDE", "EFG"]);
        let end = Coord::new(6, 0);
        let three_words = link(&g, &[(0, 0), (1, 0), (2, 0)]);
        let dead_end = link(&g, &[(0, 0), (1, 0)]);
        let two_words = link(&g, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);

        let within = [three_words.clone(), two_words.clone()];
        let chain = g.extend_each(&within, end, &HashSet::new(), false, 3, 10.0).unwrap();
        assert_eq!(chain.word_count(), 2);

        let beyond = [three_words, dead_end.clone(), dead_end, two_words];
        let chain = g.extend_each(&beyond, end, &HashSet::new(), false, 3, 10.0).unwrap();
        assert_eq!(chain.word_count(), 3);
        assert!(chain.reaches(end));
    }

    #[test]
    fn deeper_partial_chain_outranks_the_closest_single_word() {
        // ABC then CDE gets to E, three cells short of H; ABC alone stops at C.
        let g = grid(&["ABCDEFGH"], &["ABC", "CDE"]);
        let (a, h) = (Coord::new(0, 0), Coord::new(7, 0));
        assert!(g.connect(a, h, &HashSet::new(), false, 3, 0.0).is_none());

        let partial = g.connect(a, h, &HashSet::new(), true, 3, 0.0).unwrap();
        assert_eq!(partial.words(), vec!["ABC".to_string(), "CDE".to_string()]);
        assert!(!partial.reaches(h));

        let shallow = g.connect(a, h, &HashSet::new(), true, 0, 0.0).unwrap();
        assert_eq!(shallow.words(), vec!["ABC".to_string()]);
        assert_eq!(partial.compare(&shallow, h), Ordering::Greater);
    }

    #[test]
    fn partial_levels_stop_after_a_few_misses() {
        // From C only CDE continues, stopping at E. FGH reaches H from F.
        let g = grid(&["ABCDEFGH"], &["CDE", "FGH"]);
        let h = Coord::new(7, 0);
        let miss = link(&g, &[(0, 0), (1, 0), (2, 0)]);
        let reaching = link(&g, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);

        let mut candidates = vec![miss; PARTIAL_ATTEMPTS];
        candidates.push(reaching);
        let chain = g.extend_each(&candidates, h, &HashSet::new(), true, 3, 10.0).unwrap();
        assert_eq!(chain.words(), vec!["ABC".to_string(), "CDE".to_string()]);

        candidates.remove(0);
        let chain = g.extend_each(&candidates, h, &HashSet::new(), true, 3, 10.0).unwrap();
        assert!(chain.reaches(h));
        assert_eq!(chain.word_count(), 2);
    }
}
