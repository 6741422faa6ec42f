//! End-to-end properties of the replicated board: determinism, undo/redo
//! discipline, page isolation, departure, and snapshot round trips.

use board::{Board, Notification, snapshot};
use wire::Command;

fn add(page_key: u64, participant: &str, x1: f64, is_new_stroke: bool) -> Command {
    Command::AddSegment {
        page_key,
        participant_id: participant.to_owned(),
        x0: 0.0,
        y0: 0.0,
        x1,
        y1: 1.0,
        color: "#1F1A17".to_owned(),
        nib: 2.0,
        under: false,
        is_new_stroke,
    }
}

fn undo(participant: &str) -> Command {
    Command::Undo { participant_id: participant.to_owned() }
}

fn redo(participant: &str) -> Command {
    Command::Redo { participant_id: participant.to_owned() }
}

fn replay(commands: &[Command]) -> Board {
    let mut board = Board::new();
    for command in commands {
        board.apply(command);
    }
    board
}

fn live_flags(board: &Board, page: u64, participant: &str) -> Vec<bool> {
    let doc = board.pages().get(page).expect("page");
    doc.participant_strokes(&participant.to_owned())
        .iter()
        .map(|&id| doc.stroke(id).is_some_and(|s| s.live))
        .collect()
}

/// Determinism: two fresh instances fed the same log end bit-identical.
#[test]
fn identical_logs_produce_identical_boards() {
    let log = vec![
        Command::StartLine { page_key: 0 },
        add(0, "v1", 1.0, true),
        add(0, "v1", 2.0, false),
        add(0, "v2", 1.0, true),
        undo("v1"),
        Command::PageSwitch { page_key: 4, width: 800, height: 600 },
        add(4, "v2", 9.0, true),
        redo("v1"),
        Command::PageSwitch { page_key: 0, width: 1, height: 1 },
        undo("v2"),
        Command::ParticipantDeparted { participant_id: "v2".to_owned() },
    ];

    let first = replay(&log);
    let second = replay(&log);

    assert_eq!(first.active_key(), second.active_key());
    let first_keys: Vec<u64> = first.pages().iter().map(|(k, _)| k).collect();
    let second_keys: Vec<u64> = second.pages().iter().map(|(k, _)| k).collect();
    assert_eq!(first_keys, second_keys);

    for (key, doc) in first.pages().iter() {
        let other = second.pages().get(key).expect("page");
        assert_eq!(doc.global(), other.global());
        for &id in doc.global() {
            assert_eq!(doc.stroke(id), other.stroke(id));
        }
    }

    // The snapshot bytes agree as well.
    let a = snapshot::encode(&first).expect("encode");
    let b = snapshot::encode(&second).expect("encode");
    assert_eq!(a, b);
}

/// Undo/redo duality: one undo then one redo restores the live-flag vector.
#[test]
fn undo_then_redo_restores_the_live_vector() {
    let mut board = replay(&[
        add(0, "v1", 1.0, true),
        add(0, "v1", 2.0, true),
        add(0, "v1", 3.0, true),
    ]);
    let before = live_flags(&board, 0, "v1");

    board.apply(&undo("v1"));
    assert_ne!(live_flags(&board, 0, "v1"), before);
    board.apply(&redo("v1"));
    assert_eq!(live_flags(&board, 0, "v1"), before);
}

/// Redo truncation: drawing after an undo makes redo a permanent no-op.
#[test]
fn new_stroke_after_undo_truncates_redo() {
    let mut board = replay(&[add(0, "v1", 1.0, true), undo("v1"), add(0, "v1", 2.0, true)]);

    assert_eq!(board.apply(&redo("v1")), None);
    assert_eq!(live_flags(&board, 0, "v1"), vec![false, true]);
}

/// Page isolation: ink under one key never appears under another.
#[test]
fn strokes_never_cross_page_boundaries() {
    let board = replay(&[
        add(0, "v1", 1.0, true),
        Command::PageSwitch { page_key: 7, width: 512, height: 512 },
        add(7, "v1", 2.0, true),
        // Stale continuation for page 0 arrives after the switch.
        add(0, "v1", 3.0, false),
        Command::PageSwitch { page_key: 0, width: 1, height: 1 },
        add(0, "v1", 4.0, true),
    ]);

    let page0 = board.pages().get(0).expect("page 0");
    let page7 = board.pages().get(7).expect("page 7");
    assert_eq!(page0.len(), 2);
    assert_eq!(page7.len(), 1);
    for stroke in page0.live_strokes() {
        assert!(stroke.segments.iter().all(|s| s.x1 != 2.0));
    }
}

/// Departure preserves ink: the raster still renders everything.
#[test]
fn departed_participants_ink_survives_redraw() {
    let mut board = replay(&[
        add(0, "v1", 1.0, true),
        add(0, "v2", 2.0, true),
        Command::ParticipantDeparted { participant_id: "v1".to_owned() },
    ]);

    // Force a full redraw and look at the replay payload.
    let note = board.apply(&Command::PageSwitch { page_key: 0, width: 1, height: 1 });
    match note {
        Some(Notification::PageActivated { strokes, .. }) => {
            let authors: Vec<&str> = strokes.iter().map(|s| s.author.as_str()).collect();
            assert_eq!(authors, vec!["v1", "v2"]);
        }
        other => panic!("expected PageActivated, got {other:?}"),
    }
}

/// Snapshot idempotence: visible ink survives, undo stacks reset.
#[test]
fn save_load_save_is_stable_on_visible_ink() {
    let board = replay(&[
        add(0, "v1", 1.0, true),
        add(0, "v2", 2.0, true),
        undo("v2"),
        Command::PageSwitch { page_key: 1, width: 300, height: 300 },
        add(1, "v1", 3.0, true),
    ]);

    let saved = snapshot::encode(&board).expect("encode");
    let loaded = snapshot::decode(&saved).expect("decode");
    let saved_again = snapshot::encode(&loaded).expect("encode");
    assert_eq!(saved, saved_again);

    // v2's undone stroke is gone for good; v1's ink is intact.
    let page0 = loaded.pages().get(0).expect("page 0");
    assert_eq!(page0.len(), 1);
    assert!(page0.participant_strokes(&"v1".to_owned()).is_empty());

    // Undo after reload has nothing to chew on.
    let mut loaded = loaded;
    assert_eq!(loaded.apply(&undo("v1")), None);
}

// =============================================================
// End-to-end walkthroughs
// =============================================================

#[test]
fn single_stroke_undo_redo_round_trip() {
    let mut board = Board::new();
    board.apply(&add(0, "v1", 1.0, true));

    board.apply(&undo("v1"));
    assert_eq!(live_flags(&board, 0, "v1"), vec![false]);

    board.apply(&redo("v1"));
    assert_eq!(live_flags(&board, 0, "v1"), vec![true]);
}

#[test]
fn interleaved_undo_only_hides_the_invokers_latest() {
    let mut board = replay(&[
        add(0, "v1", 1.0, true),
        add(0, "v2", 2.0, true),
        add(0, "v1", 3.0, true),
    ]);

    board.apply(&undo("v1"));
    assert_eq!(live_flags(&board, 0, "v1"), vec![true, false]);
    assert_eq!(live_flags(&board, 0, "v2"), vec![true]);

    let doc = board.pages().get(0).expect("page 0");
    let authors: Vec<&str> = doc.live_strokes().iter().map(|s| s.author.as_str()).collect();
    assert_eq!(authors, vec!["v1", "v2"]);
}

#[test]
fn stale_page_segment_neither_lands_nor_creates_the_page() {
    let mut board = Board::new();
    let note = board.apply(&add(5, "v1", 1.0, true));

    assert_eq!(note, None);
    assert!(board.pages().get(0).is_some_and(board::Document::is_empty));
    assert!(board.pages().get(5).is_none());
}
