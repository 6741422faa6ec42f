//! Replicated document core for the collaborative drawing surface.
//!
//! This crate is the deterministic heart of the system: a pure state machine
//! that every replica runs over the same totally-ordered command log. It owns
//! the per-page stroke arena, the per-participant undo/redo discipline, page
//! switching with stale-command rejection, and the snapshot codec. It performs
//! no I/O, reads no clocks, and holds no randomness — applying the same
//! command prefix on two fresh instances always yields the same state.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`apply`] | The [`apply::Board`] aggregate and its `apply` transition |
//! | [`doc`] | Per-page [`doc::Document`]: stroke arena, undo/redo scans |
//! | [`pages`] | Ordered page-key → document map with lazy creation |
//! | [`snapshot`] | Versioned snapshot encode/decode plus legacy import |

pub mod apply;
pub mod doc;
pub mod pages;
pub mod snapshot;

pub use apply::{Board, Notification};
pub use doc::{Document, Stroke, StrokeId};
pub use pages::PageStore;
pub use snapshot::SnapshotError;
