// Copyright (c) 2025 Makai Trie Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Aho-Corasick automaton construction and streaming match iteration.
//!
//! The automaton is an overlay: it stores no state of its own beyond the
//! dictionary trie, whose nodes carry the failure links populated by
//! [`AhoCorasickMatcher::build`]. The root's failure link is a self-loop
//! sentinel and is never followed.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::data_structures::lanai_trie::{LanaiTrie, NodeRef};

/// A dictionary hit in the scanned input.
///
/// Both indices are byte positions into the input and both are inclusive:
/// a pattern of length `n` ending at position `i` yields
/// `start = i - n + 1, end = i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Position of the first matched byte.
    pub start: usize,
    /// Position of the last matched byte.
    pub end: usize,
}

/// Aho-Corasick matcher over a dictionary trie.
///
/// `AhoCorasickMatcher::new()` builds a self-contained dictionary of valueless
/// patterns; [`AhoCorasickMatcher::from_trie`] overlays an existing trie. In
/// either case the trie's structure must stay frozen from [`build`] until
/// matching finishes.
///
/// [`build`]: AhoCorasickMatcher::build
#[derive(Debug)]
pub struct AhoCorasickMatcher<V = ()> {
    trie: Arc<LanaiTrie<V>>,
}

impl AhoCorasickMatcher<()> {
    /// Creates a matcher with an empty dictionary.
    pub fn new() -> Self {
        Self {
            trie: Arc::new(LanaiTrie::new()),
        }
    }

    /// Adds a pattern to the dictionary. Call [`build`](Self::build) again
    /// before matching after any dictionary change.
    pub fn insert_pattern(&self, pattern: &[u8]) {
        self.trie.insert(pattern, ());
    }

    /// Removes a pattern from the dictionary, returning whether it was present.
    pub fn remove_pattern(&self, pattern: &[u8]) -> bool {
        self.trie.remove(pattern)
    }
}

impl<V> AhoCorasickMatcher<V> {
    /// Overlays an automaton on an existing dictionary trie.
    pub fn from_trie(trie: Arc<LanaiTrie<V>>) -> Self {
        Self { trie }
    }

    /// The underlying dictionary trie.
    pub fn trie(&self) -> &Arc<LanaiTrie<V>> {
        &self.trie
    }

    /// Populates failure links on every node via breadth-first traversal.
    ///
    /// Depth-1 nodes fail to the root. A deeper node reached from its parent
    /// via `byte` fails to the deepest proper path suffix that still has a
    /// `byte` edge, or to the root when none exists. A node never links to
    /// itself.
    pub fn build(&self) {
        let root = Arc::clone(self.trie.root());
        root.write().fail = Arc::downgrade(&root);

        self.trie.bfs(|path, node, parent| {
            if Arc::ptr_eq(node, &root) {
                return;
            }
            if Arc::ptr_eq(parent, &root) {
                node.write().fail = Arc::downgrade(&root);
                return;
            }
            let Some(&byte) = path.last() else {
                return;
            };

            let mut probe = parent.read().fail().unwrap_or_else(|| Arc::clone(&root));
            loop {
                if Arc::ptr_eq(&probe, &root) {
                    break;
                }
                let (has_edge, fail) = {
                    let guard = probe.read();
                    (guard.child(byte).is_some(), guard.fail())
                };
                if has_edge {
                    break;
                }
                probe = fail.unwrap_or_else(|| Arc::clone(&root));
            }

            let target = probe.read().child(byte);
            match target {
                Some(target) if !Arc::ptr_eq(&target, node) => {
                    node.write().fail = Arc::downgrade(&target);
                }
                _ => node.write().fail = Arc::downgrade(&root),
            }
        });
    }

    /// Streams `haystack` through the automaton, yielding spans lazily in scan
    /// order. Overlapping dictionary hits ending at the same position are each
    /// yielded, deepest suffix first.
    pub fn find_iter<'h>(&self, haystack: &'h [u8]) -> MatchIter<'h, V> {
        let root = Arc::clone(self.trie.root());
        MatchIter {
            node: Arc::clone(&root),
            chain: None,
            root,
            haystack,
            pos: 0,
        }
    }

    /// Convenience wrapper collecting every span of
    /// [`find_iter`](Self::find_iter).
    pub fn match_all(&self, haystack: &[u8]) -> Vec<MatchSpan> {
        self.find_iter(haystack).collect()
    }
}

impl Default for AhoCorasickMatcher<()> {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming iterator over automaton matches in one input.
#[derive(Debug)]
pub struct MatchIter<'h, V> {
    root: NodeRef<V>,
    /// Current automaton state.
    node: NodeRef<V>,
    /// Pending failure-chain cursor for the last consumed position.
    chain: Option<NodeRef<V>>,
    haystack: &'h [u8],
    /// Next input position to consume.
    pos: usize,
}

impl<'h, V> Iterator for MatchIter<'h, V> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain dictionary suffixes ending at the previously consumed
            // position. The chain stops at the root sentinel.
            while let Some(current) = self.chain.take() {
                if Arc::ptr_eq(&current, &self.root) {
                    break;
                }
                let (is_key, height, fail) = {
                    let guard = current.read();
                    (guard.is_key(), guard.height(), guard.fail())
                };
                self.chain = Some(fail.unwrap_or_else(|| Arc::clone(&self.root)));
                if is_key {
                    return Some(MatchSpan {
                        start: self.pos - height,
                        end: self.pos - 1,
                    });
                }
            }

            let &byte = self.haystack.get(self.pos)?;

            // Follow failure links until an edge on `byte` exists or the root
            // is reached.
            loop {
                if Arc::ptr_eq(&self.node, &self.root) {
                    break;
                }
                let (has_edge, fail) = {
                    let guard = self.node.read();
                    (guard.child(byte).is_some(), guard.fail())
                };
                if has_edge {
                    break;
                }
                self.node = fail.unwrap_or_else(|| Arc::clone(&self.root));
            }

            let next = self.node.read().child(byte);
            self.node = next.unwrap_or_else(|| Arc::clone(&self.root));
            self.pos += 1;
            self.chain = Some(Arc::clone(&self.node));
        }
    }
}

impl<'h, V> FusedIterator for MatchIter<'h, V> {}
