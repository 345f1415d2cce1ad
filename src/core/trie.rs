// --- File: src/core/trie.rs
use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Index of a node inside the dictionary's node arena.
pub type NodeId = usize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrieNode {
    children: HashMap<u8, NodeId>,
    is_word: bool,
}

impl TrieNode {
    /// True when the path from the root to this node spells a whole word.
    pub fn is_word(&self) -> bool {
        self.is_word
    }

    pub fn child(&self, ch: char) -> Option<NodeId> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        self.children.get(&(ch.to_ascii_uppercase() as u8)).copied()
    }

    pub fn children(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.children.iter().map(|(&b, &id)| (b as char, id))
    }
}

/// Prefix tree over uppercase A-Z, one root per letter.
///
/// Built once from a word list and never mutated afterwards. Search code walks
/// it directly: take [`Dictionary::root`] for the first letter, then
/// [`TrieNode::child`] for each following letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    // The first 26 nodes are the roots for A..Z, in alphabet order.
    nodes: Vec<TrieNode>,
    word_count: usize,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::default(); ALPHABET.len()], word_count: 0 }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        for word in words {
            if !dictionary.insert(word.as_ref()) && !word.as_ref().trim().is_empty() {
                warn!("Skipping dictionary entry {:?}", word.as_ref());
            }
        }
        dictionary
    }

    /// Reads a newline separated word list.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        let dictionary = Self::from_words(lines);
        info!("Loaded {} words from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    /// Inserts one word. Returns false if the entry is empty or has a
    /// character outside A-Z once trimmed and uppercased.
    /// O(k) complexity where k is word length.
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim().to_ascii_uppercase();
        if word.is_empty() || !word.bytes().all(|b| b.is_ascii_uppercase()) {
            return false;
        }

        let bytes = word.as_bytes();
        let mut node_idx = Self::root_index(bytes[0]);
        for &byte in &bytes[1..] {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&byte) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::default());
                self.nodes[node_idx].children.insert(byte, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }

        if !self.nodes[node_idx].is_word {
            self.nodes[node_idx].is_word = true;
            self.word_count += 1;
        }
        true
    }

    /// Exact, case-insensitive membership. O(k).
    pub fn is_word(&self, text: &str) -> bool {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let Some(mut node_idx) = self.try_root(first) else {
            return false;
        };
        for ch in chars {
            match self.nodes[node_idx].child(ch) {
                Some(next) => node_idx = next,
                None => return false,
            }
        }
        self.nodes[node_idx].is_word
    }

    /// Root node for the first letter of a word.
    ///
    /// # Panics
    /// If `ch` is not a letter A-Z in either case.
    pub fn root(&self, ch: char) -> NodeId {
        self.try_root(ch)
            .unwrap_or_else(|| panic!("no dictionary root for character {:?}", ch))
    }

    pub fn try_root(&self, ch: char) -> Option<NodeId> {
        ch.is_ascii_alphabetic()
            .then(|| Self::root_index(ch.to_ascii_uppercase() as u8))
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Follows one edge from `id`, the single step every grid walk takes.
    pub fn descend(&self, id: NodeId, ch: char) -> Option<NodeId> {
        self.nodes[id].child(ch)
    }

    /// Number of distinct words inserted.
    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    fn root_index(upper: u8) -> NodeId {
        (upper - b'A') as NodeId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_match_regardless_of_case() {
        let dictionary = Dictionary::from_words(["cat", "CATS", " Dog\r"]);
        assert!(dictionary.is_word("CAT"));
        assert!(dictionary.is_word("cat"));
        assert!(dictionary.is_word("Cats"));
        assert!(dictionary.is_word("dog"));
        assert_eq!(dictionary.len(), 3);
    }

    #[test]
    fn prefixes_are_not_words_unless_inserted() {
        let dictionary = Dictionary::from_words(["CATALOG", "CAT"]);
        assert!(!dictionary.is_word("CA"));
        assert!(!dictionary.is_word("CATAL"));
        assert!(dictionary.is_word("CAT"));
        assert!(dictionary.is_word("CATALOG"));
        assert!(!dictionary.is_word("C"));
    }

    #[test]
    fn unknown_first_letters_and_empty_text_are_not_words() {
        let dictionary = Dictionary::from_words(["CAT"]);
        assert!(!dictionary.is_word(""));
        assert!(!dictionary.is_word("1AT"));
        assert!(!dictionary.is_word("DOG"));
    }

    #[test]
    fn entries_with_non_letters_are_skipped() {
        let mut dictionary = Dictionary::new();
        assert!(!dictionary.insert("don't"));
        assert!(!dictionary.insert("   "));
        assert!(dictionary.insert("DONT"));
        assert!(dictionary.insert("dont"));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn walking_children_spells_the_word() {
        let dictionary = Dictionary::from_words(["TEA"]);
        let t = dictionary.root('t');
        let e = dictionary.descend(t, 'E').unwrap();
        let a = dictionary.descend(e, 'a').unwrap();
        assert!(!dictionary.node(e).is_word());
        assert!(dictionary.node(a).is_word());
        assert_eq!(dictionary.node(t).children().count(), 1);
    }

    #[test]
    #[should_panic(expected = "no dictionary root")]
    fn root_for_non_letter_panics() {
        Dictionary::new().root('#');
    }
}
