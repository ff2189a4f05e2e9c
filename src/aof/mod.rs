//! Append-only file persistence for the Makai Trie Server.
//!
//! Every mutation accepted by the registry is framed into a compact
//! redis-style text encoding and fed to the [`AofWriter`], which buffers in
//! memory and hands bytes to the OS on a durability schedule selected by
//! [`FsyncPolicy`]. On startup, [`replay::load`] reads the log back and
//! re-applies it to a fresh registry.

pub mod frame;
pub mod replay;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use replay::load;
pub use writer::AofWriter;

/// Durability schedule for the append-only file.
///
/// The configuration document encodes the policy as an integer:
/// `-1` off, `1` always, `2` every second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum FsyncPolicy {
    /// No durability; the ticker is disabled and nothing is flushed until
    /// shutdown.
    #[default]
    Off,
    /// Flush and fsync inline on every feed.
    Always,
    /// Flush and fsync from a 1 Hz background ticker.
    EverySecond,
}

impl FsyncPolicy {
    /// Whether the append-only file is in use at all.
    pub fn enabled(self) -> bool {
        self != Self::Off
    }
}

impl TryFrom<i64> for FsyncPolicy {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Self::Off),
            1 => Ok(Self::Always),
            2 => Ok(Self::EverySecond),
            other => Err(format!(
                "invalid fsync policy {other}: expected -1 (off), 1 (always) or 2 (every_second)"
            )),
        }
    }
}

impl From<FsyncPolicy> for i64 {
    fn from(policy: FsyncPolicy) -> Self {
        match policy {
            FsyncPolicy::Off => -1,
            FsyncPolicy::Always => 1,
            FsyncPolicy::EverySecond => 2,
        }
    }
}
