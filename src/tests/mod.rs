//! Test modules for the Makai Trie Server.
//!
//! This module contains the cross-component test suites and shared testing
//! infrastructure:
//! - Unit tests for configuration, errors, persistence and the registry
//! - Property-based tests using proptest for the trie and the matcher
//! - Test fixtures and strategy helpers
//!
//! Component-local unit tests live next to their component in `#[cfg(test)]`
//! modules; what is here either spans components or needs the shared
//! fixtures.

pub mod error_tests;
pub mod matcher_tests;
