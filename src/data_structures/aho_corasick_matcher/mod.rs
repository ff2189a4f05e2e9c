// Copyright (c) 2025 Makai Trie Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Aho-Corasick Multi-Pattern Matcher over a Lanai Byte Trie.
//!
//! This module layers failure links on top of a dictionary trie and streams
//! an input through the resulting automaton, reporting every dictionary hit —
//! overlapping hits included — in a single left-to-right scan.
//!
//! # Features
//!
//! - One-pass matching of an arbitrary number of byte-string patterns
//! - Overlap reporting: all dictionary suffixes ending at a position are emitted
//! - Lazy iterator interface over match spans
//! - Reuses the trie's node storage; the overlay adds only weak links
//!
//! # Example
//!
//! ```
//! use makai_trie_lib::data_structures::aho_corasick_matcher::AhoCorasickMatcher;
//!
//! let matcher = AhoCorasickMatcher::new();
//! for pattern in ["he", "she", "his", "hers"] {
//!     matcher.insert_pattern(pattern.as_bytes());
//! }
//! matcher.build();
//!
//! let spans: Vec<(usize, usize)> = matcher
//!     .find_iter(b"ushers")
//!     .map(|m| (m.start, m.end))
//!     .collect();
//! assert_eq!(spans, vec![(1, 3), (2, 3), (2, 5)]);
//! ```
//!
//! # Contract
//!
//! The underlying trie must be structurally frozen between `build` and the end
//! of matching; mutating it concurrently is unsupported and yields unspecified
//! (but memory-safe) match results.

mod matcher;

// Re-exports
pub use matcher::{AhoCorasickMatcher, MatchIter, MatchSpan};
