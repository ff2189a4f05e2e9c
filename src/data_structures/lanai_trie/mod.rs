//! Lanai Byte Trie Implementation
//!
//! This module provides the concurrent prefix trie backing every namespace of
//! the Makai Trie Server. Keys are opaque byte strings; values are optional
//! attached payloads.
//!
//! Key features:
//! * Fine-grained per-node locking with hand-over-hand coupling for writers
//! * Concurrent readers that never block behind a full-tree lock
//! * Lazy breadth-first key enumeration from any prefix
//! * Cheap eventually-consistent node/key statistics
//!
//! # Concurrency Safety
//!
//! Writers (insert/remove) acquire the next node's write lock *before*
//! releasing the previous one, so at most two locks are held per writer and
//! always in depth order — competing writers on the same path serialize at the
//! deepest shared node and can never deadlock. Readers descend with brief
//! per-node read locks and may observe a subtree that a concurrent remove is
//! about to detach; the subtree's storage stays valid for them because every
//! traverser holds `Arc` references to the nodes it touches.

mod iter;
mod node;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

pub use iter::KeyIter;
pub use node::{NodeRef, TrieNode, WeakNodeRef};

/// Observable statistics for one trie.
///
/// Counter reads are atomic loads and deliberately not synchronized with
/// in-flight mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrieStats {
    /// Number of live non-root nodes.
    pub number_node: u64,
    /// Number of stored keys.
    pub number_key: u64,
}

/// Concurrent byte-string prefix trie with optional per-key values.
#[derive(Debug)]
pub struct LanaiTrie<V> {
    /// Root node; never a key terminal, height 0.
    root: NodeRef<V>,

    /// Count of non-root nodes, maintained under the mutating node's lock.
    number_node: AtomicU64,

    /// Count of stored keys, maintained under the terminal node's lock.
    number_key: AtomicU64,
}

impl<V> LanaiTrie<V> {
    /// Creates a new empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new_root(),
            number_node: AtomicU64::new(0),
            number_key: AtomicU64::new(0),
        }
    }

    /// Shared handle to the root node, for overlay builds within the crate.
    pub(crate) fn root(&self) -> &NodeRef<V> {
        &self.root
    }

    /// Number of stored keys.
    pub fn number_key(&self) -> u64 {
        self.number_key.load(Ordering::Relaxed)
    }

    /// Number of live non-root nodes.
    pub fn number_node(&self) -> u64 {
        self.number_node.load(Ordering::Relaxed)
    }

    /// Snapshot of both counters.
    pub fn stats(&self) -> TrieStats {
        TrieStats {
            number_node: self.number_node(),
            number_key: self.number_key(),
        }
    }

    /// Inserts `key` with the given value.
    ///
    /// Missing nodes along the path are created; the terminal node is marked as
    /// a key and stores `value`. Returns `(previous_value, touched)`:
    /// `previous_value` is the value replaced when the key was already present,
    /// and `touched` is false only for the empty key, which is a no-op.
    ///
    /// The walk uses hand-over-hand write locking: the child's lock is taken
    /// while the parent's is still held, so a concurrent remove can never
    /// detach a node between two steps of the descent.
    pub fn insert(&self, key: &[u8], value: V) -> (Option<V>, bool) {
        let Some((&last, prefix)) = key.split_last() else {
            return (None, false);
        };

        let mut guard = self.root.write_arc();
        for (depth, &byte) in prefix.iter().enumerate() {
            let child = self.child_or_create(&mut guard, byte, depth + 1);
            // Assignment acquires the child lock before the parent guard drops.
            guard = child.write_arc();
        }

        let terminal = self.child_or_create(&mut guard, last, key.len());
        let mut terminal_guard = terminal.write_arc();
        drop(guard);

        let (newly_keyed, previous) = terminal_guard.update(true, Some(value));
        if newly_keyed {
            self.number_key.fetch_add(1, Ordering::Relaxed);
        }
        drop(terminal_guard);

        (previous, true)
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// The terminal node loses its key status; if it has no children it is also
    /// detached from its parent. Interior nodes left dead by the detach are not
    /// coalesced — a later remove walking through them cleans them up one level
    /// at a time.
    pub fn remove(&self, key: &[u8]) -> bool {
        let Some((&last, prefix)) = key.split_last() else {
            return false;
        };

        let mut guard = self.root.write_arc();
        for &byte in prefix {
            let Some(child) = guard.child(byte) else {
                return false;
            };
            guard = child.write_arc();
        }

        let Some(terminal) = guard.child(last) else {
            return false;
        };
        // Parent and terminal locks are both held across the detach check; the
        // transiently dead terminal is never observable without its parent.
        let mut terminal_guard = terminal.write_arc();

        let existed = terminal_guard.is_key;
        if existed {
            terminal_guard.update(false, None);
            self.number_key.fetch_sub(1, Ordering::Relaxed);
        }

        if terminal_guard.children.is_empty() {
            guard.children.remove(&last);
            self.number_node.fetch_sub(1, Ordering::Relaxed);
        }

        existed
    }

    /// Looks up `key`, returning its value iff the full key is stored.
    pub fn find(&self, key: &[u8]) -> Option<V>
    where
        V: Clone,
    {
        let mut node = Arc::clone(&self.root);
        for &byte in key {
            let child = node.read().child(byte)?;
            node = child;
        }

        let guard = node.read();
        if guard.is_key {
            guard.value.clone()
        } else {
            None
        }
    }

    /// Returns the ascending indices `i` such that `key[0..=i]` is a stored key.
    pub fn seek_before(&self, key: &[u8]) -> Vec<usize> {
        let mut hits = Vec::new();
        let mut node = Arc::clone(&self.root);

        for (i, &byte) in key.iter().enumerate() {
            let Some(child) = node.read().child(byte) else {
                break;
            };
            if child.read().is_key {
                hits.push(i);
            }
            node = child;
        }

        hits
    }

    /// Returns a lazy iterator over the subtree of keys having `prefix` as a
    /// prefix. The iterator is empty when the prefix walk falls off the trie.
    pub fn seek_after(&self, prefix: &[u8]) -> KeyIter<V> {
        let mut node = Arc::clone(&self.root);
        for &byte in prefix {
            let next = node.read().child(byte);
            match next {
                Some(child) => node = child,
                None => return KeyIter::empty(),
            }
        }
        KeyIter::new(prefix.to_vec(), node)
    }

    /// Breadth-first traversal over every node, the root included.
    ///
    /// `visit` receives `(path, node, parent)`; the root is visited with itself
    /// as parent.
    pub fn bfs<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &NodeRef<V>, &NodeRef<V>),
    {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((Vec::new(), Arc::clone(&self.root), Arc::clone(&self.root)));

        while let Some((path, node, parent)) = queue.pop_front() {
            visit(&path, &node, &parent);

            for (byte, child) in node.read().children_sorted() {
                let mut child_path = path.clone();
                child_path.push(byte);
                queue.push_back((child_path, child, Arc::clone(&node)));
            }
        }
    }

    /// Fetches or creates the child for `byte` under the caller-held parent
    /// lock, bumping the node counter when a node is created.
    fn child_or_create(&self, parent: &mut TrieNode<V>, byte: u8, height: usize) -> NodeRef<V> {
        if let Some(child) = parent.child(byte) {
            return child;
        }
        let child: NodeRef<V> = Arc::new(parking_lot::RwLock::new(TrieNode::new(height)));
        parent.children.insert(byte, Arc::clone(&child));
        self.number_node.fetch_add(1, Ordering::Relaxed);
        child
    }
}

impl<V> Default for LanaiTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}
