pub mod connector;
pub mod engine;
pub mod grid;
pub mod perimeter;
pub mod selection;
pub mod sequence;
pub mod trie;
pub mod types;
