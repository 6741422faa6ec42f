//! Standalone replica process: ordered commands in on stdin (JSONL), render
//! notifications out on stdout (JSONL), snapshots to `SNAPSHOT_PATH`.
//!
//! The stdin stream stands in for the total-order transport; feeding two
//! processes the same file must leave them with identical boards.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use wire::Command;

use replica::{FileStore, Replica, ReplicaConfig, SnapshotStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ReplicaConfig::from_env();
    let store = Arc::new(FileStore::new(config.snapshot_path.clone()));

    let existing = store.read().await.expect("snapshot read failed");
    let mut replica = match existing {
        Some(bytes) => {
            let board = board::snapshot::decode(&bytes).expect("snapshot load failed");
            info!(path = %config.snapshot_path, "resumed from snapshot");
            Replica::with_board(&config, store, board)
        }
        None => Replica::new(&config, store),
    };

    // Viewer sink: notifications as JSONL on stdout.
    let mut viewer = replica.add_viewer();
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(notification) = viewer.recv().await {
            let Ok(mut line) = serde_json::to_vec(&notification) else {
                continue;
            };
            line.push(b'\n');
            if stdout.write_all(&line).await.is_err() {
                break;
            }
        }
    });

    // Ordered stream: commands as JSONL on stdin.
    let (tx, rx) = mpsc::channel::<Command>(1024);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(&line) {
                Ok(command) => {
                    if tx.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "skipping unparseable command line"),
            }
        }
    });

    replica.run(rx).await;
}
