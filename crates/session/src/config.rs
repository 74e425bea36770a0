//! Session tuning read from the environment.
use std::env;
use std::path::PathBuf;

/// Channel capacities and persistence settings for a [`SessionManager`].
///
/// [`SessionManager`]: crate::SessionManager
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Pending commands queued per combat worker.
    pub command_buffer: usize,
    /// Broadcast capacity of each event topic.
    pub event_buffer: usize,
    /// Snapshot writes waiting for the repository. Writes beyond this are
    /// dropped with a warning.
    pub snapshot_buffer: usize,
    /// Directory for bincode snapshots; in-memory when unset.
    pub snapshot_dir: Option<PathBuf>,
    /// Memoized path previews kept per combat.
    pub path_cache_capacity: usize,
    /// Applied command ids remembered per combat for duplicate detection.
    /// Older ids are forgotten first.
    pub idempotency_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_buffer: 32,
            event_buffer: 100,
            snapshot_buffer: 64,
            snapshot_dir: None,
            path_cache_capacity: grid_math::PathCache::DEFAULT_CAPACITY,
            idempotency_window: 1024,
        }
    }
}

impl SessionConfig {
    /// Construct session configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_COMMAND_BUFFER` - queued commands per combat (default: 32)
    /// - `COMBAT_EVENT_BUFFER` - events buffered per topic (default: 100)
    /// - `COMBAT_SNAPSHOT_BUFFER` - pending snapshot writes (default: 64)
    /// - `COMBAT_SNAPSHOT_DIR` - snapshot directory (default: in-memory)
    /// - `COMBAT_IDEMPOTENCY_WINDOW` - applied command ids remembered per
    ///   combat (default: 1024)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("COMBAT_COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_SNAPSHOT_BUFFER") {
            config.snapshot_buffer = capacity.max(1);
        }
        if let Some(window) = read_env::<usize>("COMBAT_IDEMPOTENCY_WINDOW") {
            config.idempotency_window = window.max(1);
        }
        if let Ok(dir) = env::var("COMBAT_SNAPSHOT_DIR")
            && !dir.is_empty()
        {
            config.snapshot_dir = Some(PathBuf::from(dir));
        }

        config
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_snapshots_in_memory() {
        let config = SessionConfig::default();
        assert!(config.snapshot_dir.is_none());
        assert!(config.command_buffer > 0);
        assert_eq!(config.event_buffer, 100);
        assert_eq!(config.idempotency_window, 1024);
    }

    #[test]
    fn builder_sets_snapshot_dir() {
        let config = SessionConfig::default().with_snapshot_dir("/tmp/combats");
        assert_eq!(config.snapshot_dir, Some(PathBuf::from("/tmp/combats")));
    }
}
