//! Environment-driven tuning knobs for the replica process.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const DEFAULT_SNAPSHOT_INTERVAL_MS: i64 = 30_000;
const DEFAULT_SNAPSHOT_PATH: &str = "snapshot.json";
const DEFAULT_VIEWER_QUEUE_CAPACITY: usize = 256;

/// Runtime configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct ReplicaConfig {
    /// Minimum milliseconds between snapshot writes.
    pub snapshot_interval_ms: i64,
    /// Where the file-backed snapshot store writes.
    pub snapshot_path: String,
    /// Bounded queue depth per viewer sink; full queues drop frames.
    pub viewer_queue_capacity: usize,
}

impl ReplicaConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            snapshot_interval_ms: env_parse("SNAPSHOT_INTERVAL_MS", DEFAULT_SNAPSHOT_INTERVAL_MS),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_owned()),
            viewer_queue_capacity: env_parse("VIEWER_QUEUE_CAPACITY", DEFAULT_VIEWER_QUEUE_CAPACITY),
        }
    }
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: DEFAULT_SNAPSHOT_INTERVAL_MS,
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_owned(),
            viewer_queue_capacity: DEFAULT_VIEWER_QUEUE_CAPACITY,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
