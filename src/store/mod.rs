//! Namespace registry for the Makai Trie Server.
//!
//! The registry is the service facade the front-end talks to: it maps
//! namespace names to their tries and mediates every mutation through the
//! append-only file. It is an explicit value handed to the front-end and to
//! replay — there is no process-wide singleton.
//!
//! # Ordering contract
//!
//! A successful insert or remove mutates the in-memory trie *before* its
//! frame is enqueued on the AOF. The two steps are deliberately not atomic: a
//! crash in between loses durability of that single operation, nothing more.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::aof::{frame, AofWriter};
use crate::data_structures::lanai_trie::{LanaiTrie, TrieStats};
use crate::error::store::StoreError;

/// The trie type stored per namespace: byte keys with opaque byte values.
pub type NamespaceTrie = LanaiTrie<Vec<u8>>;

/// Named collection of independent tries, with optional write-ahead logging.
#[derive(Debug, Default)]
pub struct Registry {
    /// Namespace map. The mutex is held only for create/lookup, never across
    /// a trie mutation.
    namespaces: Mutex<HashMap<String, Arc<NamespaceTrie>>>,

    /// Log writer; `None` disables persistence entirely.
    aof: Option<Arc<AofWriter>>,
}

impl Registry {
    /// Creates a registry without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose mutations are fed to `aof`.
    pub fn with_aof(aof: Arc<AofWriter>) -> Self {
        Self {
            namespaces: Mutex::new(HashMap::new()),
            aof: Some(aof),
        }
    }

    /// Creates a namespace if it does not exist. Idempotent: creating an
    /// existing namespace leaves its keys untouched.
    pub fn create_namespace(&self, name: &str) {
        self.namespaces
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(LanaiTrie::new()));
    }

    /// Looks up a namespace's trie.
    pub fn namespace(&self, name: &str) -> Option<Arc<NamespaceTrie>> {
        self.namespaces.lock().get(name).map(Arc::clone)
    }

    /// Names of every namespace, in no particular order.
    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.lock().keys().cloned().collect()
    }

    /// Inserts `key` into namespace `name`, returning any replaced value.
    ///
    /// The value is optional; an absent value is stored (and logged) as the
    /// empty byte string.
    pub fn insert(
        &self,
        name: &str,
        key: &[u8],
        value: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let trie = self.require(name)?;
        let stored = value.unwrap_or_default();
        let (previous, _) = trie.insert(key, stored.to_vec());

        if let Some(aof) = &self.aof {
            aof.feed(&frame::encode_insert(name, key, stored));
        }
        Ok(previous)
    }

    /// Removes `key` from namespace `name`, returning whether it existed.
    pub fn remove(&self, name: &str, key: &[u8]) -> Result<bool, StoreError> {
        let trie = self.require(name)?;
        let existed = trie.remove(key);

        if let Some(aof) = &self.aof {
            aof.feed(&frame::encode_remove(name, key));
        }
        Ok(existed)
    }

    /// Looks up `key` in namespace `name`. Key absence is `Ok(None)`, not an
    /// error.
    pub fn find(&self, name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.require(name)?.find(key))
    }

    /// Returns every stored key that is a prefix of `input`, shortest first.
    pub fn search_forward(&self, name: &str, input: &[u8]) -> Result<Vec<Vec<u8>>, StoreError> {
        let trie = self.require(name)?;
        Ok(trie
            .seek_before(input)
            .into_iter()
            .map(|end| input[..=end].to_vec())
            .collect())
    }

    /// Returns up to `limit` stored keys having `prefix` as a prefix, shortest
    /// first.
    pub fn search_backward(
        &self,
        name: &str,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<Vec<u8>>, StoreError> {
        let trie = self.require(name)?;
        Ok(trie
            .seek_after(prefix)
            .keys()
            .take(limit)
            .map(|(key, _)| key)
            .collect())
    }

    /// Node and key counters for namespace `name`.
    pub fn stats(&self, name: &str) -> Result<TrieStats, StoreError> {
        Ok(self.require(name)?.stats())
    }

    /// Replay-path insert: materializes the namespace and never re-feeds the
    /// log.
    pub(crate) fn apply_insert(&self, name: &str, key: &[u8], value: Option<&[u8]>) {
        self.create_namespace(name);
        if let Some(trie) = self.namespace(name) {
            trie.insert(key, value.unwrap_or_default().to_vec());
        }
    }

    /// Replay-path remove: materializes the namespace and never re-feeds the
    /// log.
    pub(crate) fn apply_remove(&self, name: &str, key: &[u8]) {
        self.create_namespace(name);
        if let Some(trie) = self.namespace(name) {
            trie.remove(key);
        }
    }

    fn require(&self, name: &str) -> Result<Arc<NamespaceTrie>, StoreError> {
        self.namespace(name)
            .ok_or_else(|| StoreError::NamespaceNotFound(name.to_string()))
    }
}
