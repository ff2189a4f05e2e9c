//! Append-only file error module.
//!
//! This module defines error types for the AOF writer and the replay path.
//! I/O failures in the background durability loop are logged and retried;
//! format errors during replay are fatal because the log can no longer be
//! trusted.

use thiserror::Error;

/// Errors that can occur while writing or replaying the append-only file.
#[derive(Error, Debug)]
pub enum AofError {
    /// Error from the underlying file (open, write, fsync, read).
    #[error("AOF I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame in the log does not follow the wire format. The byte offset
    /// points just past the data that was last consumed successfully.
    #[error("malformed AOF frame near byte {offset}: {message}")]
    Format {
        /// Byte offset into the log where decoding stopped.
        offset: u64,
        /// What was expected versus found.
        message: String,
    },
}
