//! Data structures for the Makai Trie Server.
//!
//! This module contains the concurrent structures at the heart of the service:
//! the per-namespace byte trie and the Aho-Corasick overlay built on top of
//! it. Both are designed for many concurrent readers, fine-grained locking on
//! the write path, and safe traversal across concurrent detachment.

pub mod aho_corasick_matcher;
pub mod lanai_trie;

// Re-export common data structures
pub use aho_corasick_matcher::{AhoCorasickMatcher, MatchIter, MatchSpan};
pub use lanai_trie::{KeyIter, LanaiTrie, TrieStats};
