// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest sequence that counts as a word anywhere in the game.
pub const MIN_WORD_LEN: usize = 3;
/// Longest walk the grid enumeration will follow from a single cell.
pub const MAX_WORD_LEN: usize = 15;
/// Longest word the hint search will consider as a link in a chain.
pub const HINT_MAX_WORD_LEN: usize = 7;

/// Zero-based grid coordinate. `y` grows upward: row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True for the 8 cells surrounding `self`, never for `self`.
    pub fn is_adjacent(&self, other: Coord) -> bool {
        *self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }

    pub fn distance(&self, other: Coord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn step(&self, direction: Direction) -> Coord {
        let (dx, dy) = direction.offset();
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

/// The 8 compass directions a walk may take between neighbouring cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Direction {
    /// Neighbour visiting order. Search results depend on it, so it never changes.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::S,
        Direction::E,
        Direction::W,
        Direction::NE,
        Direction::NW,
        Direction::SE,
        Direction::SW,
    ];

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, 1),
            Direction::S => (0, -1),
            Direction::E => (1, 0),
            Direction::W => (-1, 0),
            Direction::NE => (1, 1),
            Direction::NW => (-1, 1),
            Direction::SE => (1, -1),
            Direction::SW => (-1, -1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
            Direction::NE => Direction::SW,
            Direction::NW => Direction::SE,
            Direction::SE => Direction::NW,
            Direction::SW => Direction::NE,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction of the step from `from` to `to`.
    ///
    /// # Panics
    /// If the two coordinates are not adjacent. Callers must only ask about
    /// cells they already know to be neighbours.
    pub fn between(from: Coord, to: Coord) -> Direction {
        assert!(
            from.is_adjacent(to),
            "no adjacent direction between {} and {}",
            from,
            to
        );
        let offset = (to.x - from.x, to.y - from.y);
        Direction::ALL
            .into_iter()
            .find(|d| d.offset() == offset)
            .unwrap_or_else(|| unreachable!("adjacent offset {:?} has a direction", offset))
    }
}

/// One occupied cell as seen by sequences and selections: where it is and what it says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub ch: char,
}

impl Tile {
    pub const fn new(coord: Coord, ch: char) -> Self {
        Self { coord, ch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_resolves_every_direction_and_its_opposite() {
        let origin = Coord::new(4, 4);
        for direction in Direction::ALL {
            let next = origin.step(direction);
            assert_eq!(Direction::between(origin, next), direction);
            assert_eq!(Direction::between(next, origin), direction.opposite());
        }
    }

    #[test]
    #[should_panic(expected = "no adjacent direction")]
    fn between_panics_for_distant_cells() {
        Direction::between(Coord::new(0, 0), Coord::new(2, 0));
    }

    #[test]
    fn a_cell_is_not_its_own_neighbour() {
        let c = Coord::new(1, 1);
        assert!(!c.is_adjacent(c));
        assert!(c.is_adjacent(Coord::new(2, 2)));
        assert!(!c.is_adjacent(Coord::new(3, 1)));
    }
}
