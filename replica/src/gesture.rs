//! Replica-local gesture bookkeeping for stale-command discard.
//!
//! When a local participant starts a gesture, the page it began on is
//! recorded here. The input gateway consults the table to drop continuation
//! segments whose gesture is obsolete (page switched away, page removed,
//! participant departed) before they ever reach the channel — no round-trip
//! confirmation needed. Deliberately NOT part of the replicated document:
//! nothing in here feeds a replicated transition, so replicas are free to
//! disagree about its contents.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashMap;

use wire::{PageKey, ParticipantId};

/// Page each locally-issuing participant's current gesture started on.
#[derive(Default)]
pub struct GestureTable {
    open: HashMap<ParticipantId, PageKey>,
}

impl GestureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh gesture. Always overwrites any stale entry.
    pub fn begin(&mut self, participant: &ParticipantId, page: PageKey) {
        self.open.insert(participant.clone(), page);
    }

    /// The page the participant's current gesture started on, if any.
    #[must_use]
    pub fn page_of(&self, participant: &ParticipantId) -> Option<PageKey> {
        self.open.get(participant).copied()
    }

    /// Drop the participant's gesture (departure or explicit end).
    pub fn forget(&mut self, participant: &ParticipantId) {
        self.open.remove(participant);
    }

    /// Drop every gesture that started on a now-removed page.
    pub fn forget_page(&mut self, page: PageKey) {
        self.open.retain(|_, &mut open_page| open_page != page);
    }

    /// Number of gestures currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// Returns `true` when no gesture is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
