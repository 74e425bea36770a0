//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::{RepositoryError, Result, Snapshot, SnapshotRepository};
use crate::id::CombatId;

/// Stores snapshots as bincode files.
///
/// # File Structure
///
/// ```text
/// {base_dir}/
///   └── {combat_id}/
///       ├── state_0.bin
///       ├── state_1.bin
///       └── ...
/// ```
///
/// Writes go to a temporary file that is renamed into place, so a crash
/// never leaves a truncated snapshot behind.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn combat_dir(&self, combat_id: &CombatId) -> Result<PathBuf> {
        let id = combat_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::InvalidCombatId(id.to_owned()));
        }
        Ok(self.base_dir.join(id))
    }

    fn state_path(&self, combat_id: &CombatId, nonce: u64) -> Result<PathBuf> {
        Ok(self.combat_dir(combat_id)?.join(format!("state_{nonce}.bin")))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(self.combat_dir(&snapshot.combat_id)?)?;
        let path = self.state_path(&snapshot.combat_id, snapshot.nonce)?;
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "combat_session::snapshot",
            combat = %snapshot.combat_id,
            nonce = snapshot.nonce,
            path = %path.display(),
            "Saved snapshot"
        );
        Ok(())
    }

    fn load(&self, combat_id: &CombatId, nonce: u64) -> Result<Option<Snapshot>> {
        let path = self.state_path(combat_id, nonce)?;
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let snapshot: Snapshot = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Some(snapshot))
    }

    fn list_nonces(&self, combat_id: &CombatId) -> Result<Vec<u64>> {
        let dir = self.combat_dir(combat_id)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut nonces = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(nonce) = filename
                    .strip_prefix("state_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(nonce) = nonce.parse::<u64>()
            {
                nonces.push(nonce);
            }
        }
        nonces.sort_unstable();
        Ok(nonces)
    }

    fn delete(&self, combat_id: &CombatId) -> Result<()> {
        let dir = self.combat_dir(combat_id)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
