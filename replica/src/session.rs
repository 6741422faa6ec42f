//! The replica session: apply loop, viewer fan-out, and the local gateway.
//!
//! One `Replica` owns one board and consumes one ordered command stream.
//! Applying is strictly sequential — the only concurrency in the system is
//! across replicas, each replaying the identical total order. Viewers are
//! best-effort sinks: a full queue drops the frame rather than stalling the
//! apply loop, and a closed viewer is pruned on the next send.
//!
//! The gateway methods (`local_start_stroke`, `local_segment`) are outbound
//! only. They turn locally-captured gesture data into commands for the
//! channel and consult the gesture table to drop obsolete continuations
//! before they are ever submitted; they never touch the board.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use board::{Board, Notification};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wire::{Command, ParticipantId, Segment};

use crate::config::ReplicaConfig;
use crate::gesture::GestureTable;
use crate::snapshotter::Snapshotter;
use crate::store::SnapshotStore;

/// One replica process: board, gesture table, snapshotter, viewer sinks.
pub struct Replica {
    id: Uuid,
    board: Board,
    gestures: GestureTable,
    snapshotter: Snapshotter,
    store: Arc<dyn SnapshotStore>,
    viewers: Vec<mpsc::Sender<Notification>>,
    viewer_queue_capacity: usize,
}

impl Replica {
    /// A replica over a fresh board.
    #[must_use]
    pub fn new(config: &ReplicaConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_board(config, store, Board::new())
    }

    /// A replica over an existing board, e.g. one decoded from a snapshot.
    #[must_use]
    pub fn with_board(config: &ReplicaConfig, store: Arc<dyn SnapshotStore>, board: Board) -> Self {
        Self {
            id: Uuid::new_v4(),
            board,
            gestures: GestureTable::new(),
            snapshotter: Snapshotter::new(config.snapshot_interval_ms),
            store,
            viewers: Vec::new(),
            viewer_queue_capacity: config.viewer_queue_capacity,
        }
    }

    /// The replicated board state.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Subscribe a render sink to this replica's notifications.
    pub fn add_viewer(&mut self) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(self.viewer_queue_capacity);
        self.viewers.push(tx);
        rx
    }

    /// Number of currently-subscribed viewers.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Apply one command from the ordered log.
    ///
    /// Delegates the replicated transition to the board and maintains the
    /// local gesture table for the invalidation events.
    pub fn apply(&mut self, command: &Command) -> Option<Notification> {
        match command {
            Command::ParticipantDeparted { participant_id } => {
                self.gestures.forget(participant_id);
            }
            Command::PageRemoved { page_key } => self.gestures.forget_page(*page_key),
            _ => {}
        }
        self.board.apply(command)
    }

    /// Apply one command, fan out its notification, and offer a snapshot.
    pub async fn step(&mut self, command: &Command) {
        if let Some(notification) = self.apply(command) {
            self.publish(&notification);
        }
        if let Err(e) = self.snapshotter.trigger(&self.board, self.store.as_ref()).await {
            error!(replica = %self.id, error = %e, "snapshot trigger failed; will retry");
        }
    }

    /// The single-threaded apply loop over the ordered stream.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) {
        info!(replica = %self.id, "replica consuming ordered stream");
        while let Some(command) = commands.recv().await {
            self.step(&command).await;
        }
        info!(replica = %self.id, "ordered stream closed; replica stopping");
    }

    fn publish(&mut self, notification: &Notification) {
        self.viewers.retain(|viewer| match viewer.try_send(notification.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("viewer queue full; dropping frame");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    // --- Local input gateway (outbound only) ---

    /// Begin a local gesture on the active page; returns the command to
    /// submit. `None` when no page is active.
    pub fn local_start_stroke(&mut self, participant: &ParticipantId) -> Option<Command> {
        let page_key = self.board.active_key()?;
        self.gestures.begin(participant, page_key);
        Some(Command::StartLine { page_key })
    }

    /// Turn locally-captured gesture data into an `addSegment` command.
    ///
    /// Returns `None` — dropping the segment before it reaches the channel —
    /// when the gesture's page is no longer the active one (switched away,
    /// removed, or the gesture was never started).
    pub fn local_segment(&self, segment: &Segment, is_new_stroke: bool) -> Option<Command> {
        let page_key = self.board.active_key()?;
        if self.gestures.page_of(&segment.author) != Some(page_key) {
            debug!(participant = %segment.author, "obsolete gesture segment dropped at the gateway");
            return None;
        }
        Some(Command::AddSegment {
            page_key,
            participant_id: segment.author.clone(),
            x0: segment.x0,
            y0: segment.y0,
            x1: segment.x1,
            y1: segment.y1,
            color: segment.color.clone(),
            nib: segment.nib,
            under: segment.under,
            is_new_stroke,
        })
    }
}
