//! Per-page document model: the stroke arena and undo/redo scans.
//!
//! A `Document` owns every stroke ever drawn on one page in an indexed arena.
//! `global` is the append-only creation-order view used for replay;
//! `by_participant` holds each participant's creation-order view used for
//! undo/redo. Both views are sequences of arena indices, so toggling a
//! stroke's `live` flag through one view is visible through the other without
//! aliased references. The undo cursor is never stored — it is derived on
//! demand by scanning `live` flags, so it can never drift from the data.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wire::{PageKey, ParticipantId, Segment};

/// Index of a stroke in its document's arena.
pub type StrokeId = usize;

/// One continuous drawing gesture by one participant.
///
/// Append-only: segments are only ever pushed onto the tail. Once created a
/// stroke is never removed except by whole-document clear or page removal;
/// toggling `live` is the only other mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Participant who drew this stroke.
    pub author: ParticipantId,
    /// Visibility flag; `false` means undone.
    pub live: bool,
    /// Ordered line primitives of the gesture.
    pub segments: Vec<Segment>,
}

/// The replicated state of one drawing page.
#[derive(Debug)]
pub struct Document {
    key: PageKey,
    width: u32,
    height: u32,
    /// Arena owning every stroke; ids are indices into it.
    strokes: Vec<Stroke>,
    /// All strokes in creation order. Append-only.
    global: Vec<StrokeId>,
    /// Each participant's strokes in creation order. Keyed access only —
    /// never iterated, so map order cannot leak into replicated state.
    by_participant: HashMap<ParticipantId, Vec<StrokeId>>,
}

impl Document {
    /// Create an empty page.
    #[must_use]
    pub fn new(key: PageKey, width: u32, height: u32) -> Self {
        Self {
            key,
            width,
            height,
            strokes: Vec::new(),
            global: Vec::new(),
            by_participant: HashMap::new(),
        }
    }

    /// The page identifier.
    #[must_use]
    pub fn key(&self) -> PageKey {
        self.key
    }

    /// Page raster width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Page raster height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Open a new live stroke for `author` and return its id.
    ///
    /// The id is appended to both the global history and the author's own
    /// list; the author's previously open stroke (if any) is implicitly
    /// closed because appends always target the list tail.
    pub fn begin_stroke(&mut self, author: &ParticipantId) -> StrokeId {
        let id = self.strokes.len();
        self.strokes.push(Stroke { author: author.clone(), live: true, segments: Vec::new() });
        self.global.push(id);
        self.by_participant.entry(author.clone()).or_default().push(id);
        id
    }

    /// Append a segment to the participant's currently open stroke.
    ///
    /// Returns the stroke id the segment landed on, or `None` when the
    /// participant has no stroke on this page (a continuation that arrived
    /// without its opening segment — discarded by the caller).
    pub fn append_segment(&mut self, participant: &ParticipantId, segment: Segment) -> Option<StrokeId> {
        let id = *self.by_participant.get(participant)?.last()?;
        self.strokes.get_mut(id)?.segments.push(segment);
        Some(id)
    }

    /// Hide the participant's most recent live stroke.
    ///
    /// Scans the participant's list from newest to oldest for the first
    /// `live` stroke and clears its flag. Returns `false` (no mutation) when
    /// the participant has nothing to undo.
    pub fn undo(&mut self, participant: &ParticipantId) -> bool {
        let Some(ids) = self.by_participant.get(participant) else {
            return false;
        };
        let Some(&id) = ids.iter().rev().find(|&&id| self.strokes[id].live) else {
            return false;
        };
        self.strokes[id].live = false;
        true
    }

    /// Restore the participant's most recently undone stroke.
    ///
    /// Linear (non-branching) stack discipline: scanning from the newest
    /// entry, find the index whose stroke is undone while its predecessor is
    /// live (or which is the oldest entry), and set it live. A live newest
    /// entry means there is nothing to redo — a stroke drawn after an undo
    /// permanently blocks redo of the older undone tail.
    pub fn redo(&mut self, participant: &ParticipantId) -> bool {
        let Some(ids) = self.by_participant.get(participant) else {
            return false;
        };
        let Some(&newest) = ids.last() else {
            return false;
        };
        if self.strokes[newest].live {
            return false;
        }

        let mut index = 0;
        for i in (1..ids.len()).rev() {
            if self.strokes[ids[i - 1]].live {
                index = i;
                break;
            }
        }
        self.strokes[ids[index]].live = true;
        true
    }

    /// Append a fully-formed stroke to the global history only, leaving every
    /// per-participant list untouched. Snapshot load path: undo history does
    /// not survive persistence, so restored strokes have no undo owner.
    pub fn restore_stroke(&mut self, stroke: Stroke) -> StrokeId {
        let id = self.strokes.len();
        self.strokes.push(stroke);
        self.global.push(id);
        id
    }

    /// Erase the page entirely: arena, global history, every undo stack.
    /// Irreversible; not an undo target.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.global.clear();
        self.by_participant.clear();
    }

    /// Drop the participant's undo/redo capability. Their strokes stay in
    /// the global history and stay visible.
    pub fn remove_participant(&mut self, participant: &ParticipantId) {
        self.by_participant.remove(participant);
    }

    /// Look up a stroke by id.
    #[must_use]
    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.get(id)
    }

    /// All stroke ids in creation order.
    #[must_use]
    pub fn global(&self) -> &[StrokeId] {
        &self.global
    }

    /// The participant's stroke ids in creation order. Empty when unknown.
    #[must_use]
    pub fn participant_strokes(&self, participant: &ParticipantId) -> &[StrokeId] {
        self.by_participant.get(participant).map_or(&[], Vec::as_slice)
    }

    /// Visible strokes in replay order.
    #[must_use]
    pub fn live_strokes(&self) -> Vec<&Stroke> {
        self.global
            .iter()
            .map(|&id| &self.strokes[id])
            .filter(|stroke| stroke.live)
            .collect()
    }

    /// Number of strokes ever created on this page (live or undone).
    #[must_use]
    pub fn len(&self) -> usize {
        self.global.len()
    }

    /// Returns `true` if no stroke has ever been created on this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }
}
