//! Makai Trie Server Library
//!
//! This library contains the core components of the Makai Trie Server: the
//! concurrent namespace tries, the Aho-Corasick overlay, the append-only file
//! and its replay, and the registry facade the front-end talks to. The
//! library is designed to be used by the binary crate, but can also be used
//! as a dependency by other projects.
//!
//! # Architecture
//!
//! The Makai Trie Server is designed with the following principles in mind:
//! - Strict component boundaries
//! - Fine-grained locking: writers couple at most two node locks at a time
//! - Readers proceed concurrently with writers and never block the tree
//! - Mutations hit memory first; durability is asynchronous by default
//! - Comprehensive error handling and propagation

// Re-export public modules
pub mod aof;
pub mod config;
pub mod data_structures;
pub mod error;
pub mod store;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for the Makai Trie Server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function
pub fn init() {
    // Set up global error reporter with tracing
    let reporter = error::TracingErrorReporter;
    error::set_error_reporter(std::sync::Arc::new(reporter));
}
