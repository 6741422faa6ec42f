//! Rate-limited snapshot persistence.
//!
//! The snapshotter is offered a trigger after every applied command; the
//! throttle makes that equivalent to the original gesture-end trigger. The
//! eligibility time is recorded before the write, so a failed write does not
//! tighten the cadence — the next eligible trigger simply retries. Triggering
//! never mutates the board, so replica-local write timing cannot cause
//! cross-replica divergence.

#[cfg(test)]
#[path = "snapshotter_test.rs"]
mod snapshotter_test;

use std::time::{SystemTime, UNIX_EPOCH};

use board::Board;
use tracing::info;

use crate::store::{SnapshotStore, StoreError};

/// Error returned by a snapshot trigger that actually attempted a write.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotterError {
    /// The board could not be serialized.
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] board::SnapshotError),
    /// The store rejected the write; in-memory state is unaffected.
    #[error("snapshot write failed: {0}")]
    Store(#[from] StoreError),
}

/// Throttled snapshot trigger.
pub struct Snapshotter {
    interval_ms: i64,
    last_snapshot_ms: Option<i64>,
}

impl Snapshotter {
    /// A snapshotter that writes at most once per `interval_ms`.
    #[must_use]
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms, last_snapshot_ms: None }
    }

    /// Offer a trigger at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Propagates encode or store failures from an attempted write.
    pub async fn trigger(
        &mut self,
        board: &Board,
        store: &dyn SnapshotStore,
    ) -> Result<bool, SnapshotterError> {
        self.trigger_at(board, store, now_ms()).await
    }

    /// Offer a trigger with an explicit timestamp (test seam).
    ///
    /// Returns `Ok(false)` without touching the store or the eligibility
    /// time while the interval has not elapsed; otherwise records `now_ms`
    /// and writes a snapshot of all live ink.
    ///
    /// # Errors
    ///
    /// Propagates encode or store failures from an attempted write.
    pub async fn trigger_at(
        &mut self,
        board: &Board,
        store: &dyn SnapshotStore,
        now_ms: i64,
    ) -> Result<bool, SnapshotterError> {
        if let Some(last) = self.last_snapshot_ms {
            if now_ms - last < self.interval_ms {
                return Ok(false);
            }
        }

        // Recorded before the write: a failure retries at the next eligible
        // trigger, not on every command.
        self.last_snapshot_ms = Some(now_ms);

        let bytes = board::snapshot::encode(board)?;
        store.write(&bytes).await?;
        info!(bytes = bytes.len(), pages = board.pages().len(), "snapshot written");
        Ok(true)
    }

    /// When the last write was attempted, if ever.
    #[must_use]
    pub fn last_snapshot_ms(&self) -> Option<i64> {
        self.last_snapshot_ms
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
