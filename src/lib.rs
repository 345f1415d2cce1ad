// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod shuffle;

pub use crate::core::engine::{Board, BoardEvent};
pub use crate::core::grid::Grid;
pub use crate::core::perimeter::{Perimeter, PerimeterState};
pub use crate::core::trie::Dictionary;
pub use crate::error::{EngineError, Result};
