//! Node implementation for the Lanai Byte Trie.
//!
//! Nodes are the fundamental building blocks of the trie. Each node is shared
//! behind an `Arc<RwLock<..>>` handle ([`NodeRef`]); the lock guards key status,
//! the attached value, child-map membership, and the Aho-Corasick failure link.
//! A node's continued existence is guaranteed to a traverser only while it holds
//! the parent's lock or an `Arc` reference of its own.

use std::sync::{Arc, Weak};

use fnv::FnvHashMap;
use parking_lot::RwLock;

/// Shared handle to a trie node.
pub type NodeRef<V> = Arc<RwLock<TrieNode<V>>>;

/// Weak (non-owning) handle to a trie node, used for failure links.
pub type WeakNodeRef<V> = Weak<RwLock<TrieNode<V>>>;

/// A node in the Lanai Byte Trie.
///
/// Each node represents one byte along a key path. Key-terminal nodes carry the
/// value stored for the complete key.
#[derive(Debug)]
pub struct TrieNode<V> {
    /// Whether some inserted key terminates at this node.
    pub(crate) is_key: bool,

    /// Value attached to the key ending here; `Some` only for key-terminal nodes.
    pub(crate) value: Option<V>,

    /// Map from next byte to child node.
    pub(crate) children: FnvHashMap<u8, NodeRef<V>>,

    /// Path length from the root (the root itself has height 0).
    pub(crate) height: usize,

    /// Aho-Corasick failure link; populated only by an automaton build pass.
    /// Never an ownership edge. The root links to itself as a sentinel.
    pub(crate) fail: WeakNodeRef<V>,
}

impl<V> TrieNode<V> {
    /// Creates a new non-key node at the given height.
    pub(crate) fn new(height: usize) -> Self {
        Self {
            is_key: false,
            value: None,
            children: FnvHashMap::default(),
            height,
            fail: Weak::new(),
        }
    }

    /// Creates a fresh root node wrapped in its shared handle.
    pub(crate) fn new_root() -> NodeRef<V> {
        Arc::new(RwLock::new(Self::new(0)))
    }

    /// Whether a key terminates at this node.
    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// The value stored at this node, if it is a key terminal.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Path length from the root.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flips key status and stores a new value under the caller-held lock.
    ///
    /// Returns `(newly_keyed, previous_value)`: `newly_keyed` is true iff the
    /// node was not a key before, so callers can adjust the key counter exactly
    /// once per transition.
    pub(crate) fn update(&mut self, is_key: bool, value: Option<V>) -> (bool, Option<V>) {
        let newly_keyed = is_key && !self.is_key;
        self.is_key = is_key;
        let previous = std::mem::replace(&mut self.value, value);
        (newly_keyed, previous)
    }

    /// Clones the child handle for `byte`, if present.
    pub(crate) fn child(&self, byte: u8) -> Option<NodeRef<V>> {
        self.children.get(&byte).map(Arc::clone)
    }

    /// Snapshot of the child map in ascending byte order.
    ///
    /// Sorting keeps breadth-first traversals deterministic for equal contents.
    pub(crate) fn children_sorted(&self) -> Vec<(u8, NodeRef<V>)> {
        let mut children: Vec<(u8, NodeRef<V>)> = self
            .children
            .iter()
            .map(|(byte, child)| (*byte, Arc::clone(child)))
            .collect();
        children.sort_unstable_by_key(|(byte, _)| *byte);
        children
    }

    /// Resolves the failure link, if it has been populated and still points at
    /// a live node.
    pub(crate) fn fail(&self) -> Option<NodeRef<V>> {
        self.fail.upgrade()
    }
}
