//! Store error module.
//!
//! Error types surfaced by the namespace registry. Key absence is a domain
//! negative (`Ok(None)` / `false`), not an error, so it has no variant here.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Error when an operation references a namespace that was never created.
    #[error("namespace `{0}` not found")]
    NamespaceNotFound(String),
}
