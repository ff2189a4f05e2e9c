//! Background-buffered append-only file writer.
//!
//! `feed` only appends to an in-memory buffer under the writer lock; bytes
//! reach the OS in `flush` and the platter in `sync`, driven either inline
//! (policy `Always`) or by the 1 Hz ticker task (policy `EverySecond`).
//! Durability failures are logged and retried on the next tick — the writer
//! never takes the process down.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::FsyncPolicy;
use crate::error::aof::AofError;

#[derive(Debug)]
struct AofInner {
    file: File,
    buffer: Vec<u8>,
}

/// Append-only file writer with an in-memory buffer and periodic durability.
#[derive(Debug)]
pub struct AofWriter {
    inner: Mutex<AofInner>,

    /// Total bytes fed into the buffer since open.
    current_offset: AtomicU64,

    /// Total bytes handed to the OS since open.
    sync_offset: AtomicU64,

    policy: FsyncPolicy,

    /// Running ticker task, present only for [`FsyncPolicy::EverySecond`].
    ticker: Mutex<Option<JoinHandle<()>>>,

    /// Shutdown signal observed by the ticker.
    shutdown: watch::Sender<bool>,
}

impl AofWriter {
    /// Opens (creating if necessary) the log at `path` in append mode.
    ///
    /// Append mode matters: a restarted process must extend the replayed log,
    /// not overwrite it.
    pub fn open<P: AsRef<Path>>(path: P, policy: FsyncPolicy) -> Result<Self, AofError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            inner: Mutex::new(AofInner {
                file,
                buffer: Vec::new(),
            }),
            current_offset: AtomicU64::new(0),
            sync_offset: AtomicU64::new(0),
            policy,
            ticker: Mutex::new(None),
            shutdown,
        })
    }

    /// The durability schedule this writer was opened with.
    pub fn policy(&self) -> FsyncPolicy {
        self.policy
    }

    /// Bytes fed into the buffer since open.
    pub fn current_offset(&self) -> u64 {
        self.current_offset.load(Ordering::Relaxed)
    }

    /// Bytes handed to the OS since open.
    pub fn sync_offset(&self) -> u64 {
        self.sync_offset.load(Ordering::Relaxed)
    }

    /// Appends an encoded frame to the in-memory buffer.
    ///
    /// Does not touch the disk unless the policy is [`FsyncPolicy::Always`].
    pub fn feed(&self, frame: &[u8]) {
        {
            let mut inner = self.inner.lock();
            inner.buffer.extend_from_slice(frame);
        }
        self.current_offset
            .fetch_add(frame.len() as u64, Ordering::Relaxed);

        if self.policy == FsyncPolicy::Always {
            self.flush();
            self.sync();
        }
    }

    /// Writes the buffered bytes to the file, dropping the written prefix.
    ///
    /// A short or failed write leaves the unwritten tail in place to be
    /// retried on the next tick.
    pub fn flush(&self) {
        let mut inner = self.inner.lock();
        if inner.buffer.is_empty() {
            return;
        }

        let AofInner { file, buffer } = &mut *inner;
        match file.write(buffer) {
            Ok(written) => {
                buffer.drain(..written);
                self.sync_offset.fetch_add(written as u64, Ordering::Relaxed);
            }
            Err(err) => warn!(error = %err, "AOF flush failed; will retry"),
        }
    }

    /// Requests OS-level durability for everything written so far.
    pub fn sync(&self) {
        let inner = self.inner.lock();
        if let Err(err) = inner.file.sync_all() {
            warn!(error = %err, "AOF fsync failed; will retry");
        }
    }

    /// Starts the 1 Hz flush+sync ticker when the policy calls for one.
    pub fn spawn_ticker(self: &Arc<Self>) {
        if self.policy != FsyncPolicy::EverySecond {
            return;
        }

        let writer = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        writer.flush();
                        writer.sync();
                    }
                    _ = shutdown.changed() => break,
                }
            }
            debug!("AOF ticker stopped");
        });

        *self.ticker.lock() = Some(handle);
    }

    /// Stops the ticker, then performs the final flush and sync.
    ///
    /// The ticker must be gone before the final flush so the two cannot race
    /// on shutdown. The file handle itself closes on drop.
    pub async fn close(&self) {
        let _ = self.shutdown.send(true);
        let handle = self.ticker.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "AOF ticker did not shut down cleanly");
            }
        }

        self.flush();
        self.sync();
    }
}
