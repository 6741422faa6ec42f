//! Replica runtime: one process replaying the ordered command log.
//!
//! The `board` crate is a pure state machine; this crate is everything that
//! surrounds it in a running process. A [`session::Replica`] consumes one
//! ordered `mpsc` stream of commands (the stand-in for the external
//! total-order transport), applies each to its board, fans render
//! notifications out to viewer sinks, filters obsolete local gesture input
//! before it ever reaches the channel, and throttles snapshot persistence
//! through a pluggable [`store::SnapshotStore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | The [`session::Replica`]: apply loop, fan-out, gateway |
//! | [`gesture`] | Replica-local stale-command discard table |
//! | [`snapshotter`] | Rate-limited snapshot trigger |
//! | [`store`] | Snapshot storage seam: file and in-memory backends |
//! | [`config`] | Environment-driven tuning knobs |

pub mod config;
pub mod gesture;
pub mod session;
pub mod snapshotter;
pub mod store;

pub use config::ReplicaConfig;
pub use gesture::GestureTable;
pub use session::Replica;
pub use snapshotter::Snapshotter;
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError};
