//! Versioned snapshot codec: persisted form of all live ink.
//!
//! A snapshot keeps only `live` strokes — undone ink is dropped permanently,
//! and per-participant undo history does not survive a save/load cycle. The
//! encoded form is deterministic: pages serialize in key order with a stable
//! field order, so encoding the same board twice yields identical bytes.
//!
//! Two formats are accepted on load: the current version `"1"`, and a legacy
//! single-page format (flat per-color line runs, no page keys) imported as
//! one stroke per contiguous run under page 0. Load is all-or-nothing: a
//! malformed or unknown snapshot leaves no partial state behind.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use wire::Segment;

use crate::apply::{Board, DEFAULT_PAGE_SIZE};
use crate::doc::{Document, Stroke};
use crate::pages::PageStore;

/// Version tag written by [`encode`].
pub const SNAPSHOT_VERSION: &str = "1";

/// Version tags accepted as the legacy single-page format.
const LEGACY_VERSIONS: [&str; 2] = ["legacy", "whiteboard-nopages"];

/// Error returned by the snapshot codec.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The bytes are not valid JSON or do not match the declared format.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot carries no `version` tag.
    #[error("snapshot has no version tag")]
    MissingVersion,
    /// The `version` tag names a format this build does not understand.
    #[error("unknown snapshot version: {0}")]
    UnknownVersion(String),
}

/// Serialize all live ink across all pages.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if serialization fails (does not occur for
/// well-formed boards; surfaced rather than swallowed).
pub fn encode(board: &Board) -> Result<Vec<u8>, SnapshotError> {
    let doc = SnapshotDoc {
        version: SNAPSHOT_VERSION.to_owned(),
        pages: board.pages().iter().map(|(_, page)| encode_page(page)).collect(),
    };
    Ok(serde_json::to_vec(&doc)?)
}

/// Reconstruct a board from snapshot bytes.
///
/// Every restored stroke deserializes as live (undone strokes were never
/// saved) with an empty per-participant undo history. Page 0 is activated
/// after load, created at the default dimensions if the snapshot lacks it.
///
/// # Errors
///
/// Returns [`SnapshotError::MissingVersion`] or
/// [`SnapshotError::UnknownVersion`] for unrecognized formats and
/// [`SnapshotError::Json`] for malformed payloads. No partial state is
/// applied on failure.
pub fn decode(bytes: &[u8]) -> Result<Board, SnapshotError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let Some(version) = value.get("version").and_then(|v| v.as_str()) else {
        return Err(SnapshotError::MissingVersion);
    };

    let mut pages = if version == SNAPSHOT_VERSION {
        let doc: SnapshotDoc = serde_json::from_value(value)?;
        decode_pages(doc)
    } else if LEGACY_VERSIONS.contains(&version) {
        let doc: LegacyDoc = serde_json::from_value(value)?;
        decode_legacy(doc)
    } else {
        return Err(SnapshotError::UnknownVersion(version.to_owned()));
    };

    pages.get_or_create(0, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE);
    Ok(Board::from_pages(pages, Some(0)))
}

// =============================================================================
// CURRENT FORMAT
// =============================================================================

#[derive(Serialize, Deserialize)]
struct SnapshotDoc {
    version: String,
    pages: Vec<SnapshotPage>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotPage {
    key: u64,
    width: u32,
    height: u32,
    strokes: Vec<SnapshotStroke>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotStroke {
    participant_id: String,
    segments: Vec<SnapshotSegment>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotSegment {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    color: String,
    nib: f64,
    under: bool,
}

fn encode_page(page: &Document) -> SnapshotPage {
    SnapshotPage {
        key: page.key(),
        width: page.width(),
        height: page.height(),
        strokes: page
            .live_strokes()
            .into_iter()
            .map(|stroke| SnapshotStroke {
                participant_id: stroke.author.clone(),
                segments: stroke
                    .segments
                    .iter()
                    .map(|s| SnapshotSegment {
                        x0: s.x0,
                        y0: s.y0,
                        x1: s.x1,
                        y1: s.y1,
                        color: s.color.clone(),
                        nib: s.nib,
                        under: s.under,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn decode_pages(doc: SnapshotDoc) -> PageStore {
    let mut pages = PageStore::new();
    for page in doc.pages {
        let mut document = Document::new(page.key, page.width, page.height);
        for stroke in page.strokes {
            let author = stroke.participant_id;
            let segments = stroke
                .segments
                .into_iter()
                .map(|s| Segment {
                    x0: s.x0,
                    y0: s.y0,
                    x1: s.x1,
                    y1: s.y1,
                    color: s.color,
                    nib: s.nib,
                    under: s.under,
                    author: author.clone(),
                })
                .collect();
            document.restore_stroke(Stroke { author, live: true, segments });
        }
        pages.insert(document);
    }
    pages
}

// =============================================================================
// LEGACY FORMAT
// =============================================================================

#[derive(Deserialize)]
struct LegacyDoc {
    lines: Vec<LegacyRun>,
}

#[derive(Deserialize)]
struct LegacyRun {
    #[serde(rename = "lineInfo")]
    line_info: LegacyLineInfo,
    lines: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLineInfo {
    color: String,
    line_width: f64,
    view_id: String,
}

/// One stroke per contiguous point run, everything under implicit page 0.
fn decode_legacy(doc: LegacyDoc) -> PageStore {
    let mut pages = PageStore::new();
    let page = pages.get_or_create(0, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE);

    for run in doc.lines {
        let author = run.line_info.view_id;
        let segments = run
            .lines
            .windows(2)
            .map(|pair| Segment {
                x0: pair[0][0],
                y0: pair[0][1],
                x1: pair[1][0],
                y1: pair[1][1],
                color: run.line_info.color.clone(),
                nib: run.line_info.line_width,
                under: false,
                author: author.clone(),
            })
            .collect();
        // A single-point run yields a stroke with no segments; kept for
        // import fidelity.
        page.restore_stroke(Stroke { author, live: true, segments });
    }
    pages
}
