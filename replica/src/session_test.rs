use std::sync::Arc;

use board::Notification;
use tokio::sync::mpsc;
use wire::{Command, Segment};

use super::*;
use crate::store::MemoryStore;

fn make_replica() -> Replica {
    Replica::new(&ReplicaConfig::default(), Arc::new(MemoryStore::new()))
}

fn make_segment(author: &str, x1: f64) -> Segment {
    Segment {
        x0: 0.0,
        y0: 0.0,
        x1,
        y1: 1.0,
        color: "#1F1A17".to_owned(),
        nib: 2.0,
        under: false,
        author: author.to_owned(),
    }
}

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

// =============================================================
// Apply + fan-out
// =============================================================

#[tokio::test]
async fn step_applies_and_notifies_viewers() {
    let mut replica = make_replica();
    let mut viewer = replica.add_viewer();

    replica.step(&add(0, "v1", 1.0, true)).await;

    let note = viewer.try_recv().expect("notification");
    assert!(matches!(note, Notification::SegmentDrawn { page: 0, .. }));
    assert_eq!(replica.board().pages().get(0).map(board::Document::len), Some(1));
}

#[tokio::test]
async fn noop_commands_notify_nobody() {
    let mut replica = make_replica();
    let mut viewer = replica.add_viewer();

    replica.step(&Command::StartLine { page_key: 0 }).await;
    replica.step(&Command::Undo { participant_id: "v1".to_owned() }).await;

    assert!(viewer.try_recv().is_err());
}

#[tokio::test]
async fn slow_viewer_drops_frames_without_stalling() {
    let config = ReplicaConfig { viewer_queue_capacity: 1, ..ReplicaConfig::default() };
    let mut replica = Replica::new(&config, Arc::new(MemoryStore::new()));
    let mut viewer = replica.add_viewer();

    replica.step(&add(0, "v1", 1.0, true)).await;
    replica.step(&add(0, "v1", 2.0, false)).await;

    // Queue depth 1: the second frame was dropped, the viewer stays subscribed.
    assert!(viewer.try_recv().is_ok());
    assert!(viewer.try_recv().is_err());
    assert_eq!(replica.viewer_count(), 1);
}

#[tokio::test]
async fn closed_viewers_are_pruned() {
    let mut replica = make_replica();
    let viewer = replica.add_viewer();
    drop(viewer);

    replica.step(&add(0, "v1", 1.0, true)).await;
    assert_eq!(replica.viewer_count(), 0);
}

#[tokio::test]
async fn run_drains_the_stream_and_snapshots() {
    let store = Arc::new(MemoryStore::new());
    let mut replica = Replica::new(&ReplicaConfig::default(), store.clone());
    let (tx, rx) = mpsc::channel(16);

    let handle = tokio::spawn(async move {
        replica.run(rx).await;
        replica
    });

    tx.send(add(0, "v1", 1.0, true)).await.expect("send");
    tx.send(add(0, "v2", 2.0, true)).await.expect("send");
    drop(tx);

    let replica = handle.await.expect("join");
    assert_eq!(replica.board().pages().get(0).map(board::Document::len), Some(2));

    // The first trigger is always eligible, so a snapshot landed in the store.
    let bytes = store.read().await.expect("read").expect("snapshot");
    assert!(board::snapshot::decode(&bytes).is_ok());
}

// =============================================================
// Local gateway
// =============================================================

#[tokio::test]
async fn gateway_tags_segments_with_the_gesture_page() {
    let mut replica = make_replica();
    let p1 = "v1".to_owned();

    let start = replica.local_start_stroke(&p1).expect("start");
    assert_eq!(start, Command::StartLine { page_key: 0 });

    let command = replica.local_segment(&make_segment("v1", 1.0), true).expect("command");
    assert!(matches!(command, Command::AddSegment { page_key: 0, .. }));
}

#[tokio::test]
async fn gateway_drops_continuations_after_a_page_switch() {
    let mut replica = make_replica();
    let p1 = "v1".to_owned();
    replica.local_start_stroke(&p1);

    replica.step(&Command::PageSwitch { page_key: 2, width: 100, height: 100 }).await;
    assert_eq!(replica.local_segment(&make_segment("v1", 1.0), false), None);

    // A fresh gesture on the new page flows again.
    replica.local_start_stroke(&p1);
    assert!(replica.local_segment(&make_segment("v1", 2.0), true).is_some());
}

#[tokio::test]
async fn gateway_drops_segments_without_a_started_gesture() {
    let replica = make_replica();
    assert_eq!(replica.local_segment(&make_segment("v1", 1.0), true), None);
}

#[tokio::test]
async fn departure_and_page_removal_invalidate_gestures() {
    let mut replica = make_replica();
    let p1 = "v1".to_owned();

    replica.local_start_stroke(&p1);
    replica.step(&Command::ParticipantDeparted { participant_id: p1.clone() }).await;
    assert_eq!(replica.local_segment(&make_segment("v1", 1.0), false), None);

    replica.local_start_stroke(&p1);
    replica.step(&Command::PageRemoved { page_key: 0 }).await;
    assert_eq!(replica.local_segment(&make_segment("v1", 1.0), false), None);

    // No active page either until the next switch.
    assert_eq!(replica.local_start_stroke(&p1), None);
}
