//! The replicated board aggregate and its deterministic transition.
//!
//! `Board::apply` is the single entry point every replica feeds with the
//! totally-ordered command log. Each call is a pure function of (current
//! state, command): invalid or stale input resolves to a documented no-op,
//! never an error, so the log can always be replayed in full. Commands for a
//! page other than the active one are expected under page-switch races and
//! are discarded at debug level only.

#[cfg(test)]
#[path = "apply_test.rs"]
mod apply_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wire::{Command, PageKey, Segment};

use crate::doc::{Document, Stroke};
use crate::pages::PageStore;

/// Default page raster dimensions, used for the initial page and for legacy
/// imports that carry no dimensions of their own.
pub const DEFAULT_PAGE_SIZE: u32 = 2048;

/// Render notification emitted toward the projection surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "note", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Incremental draw of one new segment. Carries the author for cursor
    /// pass-through.
    SegmentDrawn { page: PageKey, segment: Segment },
    /// Replace the raster entirely with the given live strokes, in replay
    /// order. Emitted whenever incremental patching would be unsafe.
    RedrawAll { page: PageKey, strokes: Vec<Stroke> },
    /// A page became active; carries its summary and full replay payload.
    PageActivated { key: PageKey, width: u32, height: u32, strokes: Vec<Stroke> },
}

/// The replicated aggregate: all pages plus the active-page binding.
#[derive(Debug)]
pub struct Board {
    pages: PageStore,
    active: Option<PageKey>,
}

impl Board {
    /// A fresh board: page 0 exists at the default dimensions and is active.
    #[must_use]
    pub fn new() -> Self {
        let mut pages = PageStore::new();
        pages.get_or_create(0, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE);
        Self { pages, active: Some(0) }
    }

    /// Rebuild a board from already-populated pages, e.g. a decoded snapshot.
    #[must_use]
    pub(crate) fn from_pages(pages: PageStore, active: Option<PageKey>) -> Self {
        Self { pages, active }
    }

    /// Apply one command from the ordered log.
    ///
    /// Returns the render notification the transition produced, if any.
    /// Every replica applying the same command sequence takes the same
    /// branches and returns the same notifications.
    pub fn apply(&mut self, command: &Command) -> Option<Notification> {
        match command {
            // Gesture bookkeeping is replica-local; nothing replicated moves.
            Command::StartLine { .. } => None,
            Command::AddSegment { page_key, participant_id, is_new_stroke, .. } => {
                self.add_segment(*page_key, participant_id, *is_new_stroke, command.segment()?)
            }
            Command::Undo { participant_id } => {
                let doc = self.active_document_mut()?;
                if doc.undo(participant_id) { Some(redraw(doc)) } else { None }
            }
            Command::Redo { participant_id } => {
                let doc = self.active_document_mut()?;
                if doc.redo(participant_id) { Some(redraw(doc)) } else { None }
            }
            Command::Clear => {
                let doc = self.active_document_mut()?;
                doc.clear();
                Some(redraw(doc))
            }
            Command::ParticipantDeparted { participant_id } => {
                for (_, doc) in self.pages.iter_mut() {
                    doc.remove_participant(participant_id);
                }
                None
            }
            Command::PageSwitch { page_key, width, height } => {
                let doc = self.pages.get_or_create(*page_key, *width, *height);
                let activated = Notification::PageActivated {
                    key: doc.key(),
                    width: doc.width(),
                    height: doc.height(),
                    strokes: replay(doc),
                };
                self.active = Some(*page_key);
                Some(activated)
            }
            Command::PageRemoved { page_key } => {
                self.pages.remove(*page_key);
                if self.active == Some(*page_key) {
                    self.active = None;
                }
                None
            }
        }
    }

    fn add_segment(
        &mut self,
        page_key: PageKey,
        participant: &wire::ParticipantId,
        is_new_stroke: bool,
        segment: Segment,
    ) -> Option<Notification> {
        if self.active != Some(page_key) {
            debug!(page_key, participant = %participant, "segment for inactive page discarded");
            return None;
        }
        let doc = self.pages.get_mut(page_key)?;

        if is_new_stroke {
            doc.begin_stroke(participant);
        }
        let Some(id) = doc.append_segment(participant, segment.clone()) else {
            debug!(page_key, participant = %participant, "continuation without an open stroke discarded");
            return None;
        };

        // Ink appended to an undone stroke is recorded but not painted; the
        // next full redraw decides its fate.
        if doc.stroke(id).is_some_and(|stroke| stroke.live) {
            Some(Notification::SegmentDrawn { page: page_key, segment })
        } else {
            None
        }
    }

    /// The key the rendering surface is currently bound to, if any.
    #[must_use]
    pub fn active_key(&self) -> Option<PageKey> {
        self.active
    }

    /// The active page, if one is bound.
    #[must_use]
    pub fn active_document(&self) -> Option<&Document> {
        self.pages.get(self.active?)
    }

    fn active_document_mut(&mut self) -> Option<&mut Document> {
        self.pages.get_mut(self.active?)
    }

    /// All pages of the board.
    #[must_use]
    pub fn pages(&self) -> &PageStore {
        &self.pages
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn redraw(doc: &Document) -> Notification {
    Notification::RedrawAll { page: doc.key(), strokes: replay(doc) }
}

fn replay(doc: &Document) -> Vec<Stroke> {
    doc.live_strokes().into_iter().cloned().collect()
}
