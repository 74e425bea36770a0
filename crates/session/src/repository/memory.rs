//! In-memory SnapshotRepository implementation for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{RepositoryError, Result, Snapshot, SnapshotRepository};
use crate::id::CombatId;

/// Keeps every snapshot in process memory.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<HashMap<CombatId, BTreeMap<u64, Snapshot>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots
            .entry(snapshot.combat_id.clone())
            .or_default()
            .insert(snapshot.nonce, snapshot.clone());
        Ok(())
    }

    fn load(&self, combat_id: &CombatId, nonce: u64) -> Result<Option<Snapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots
            .get(combat_id)
            .and_then(|by_nonce| by_nonce.get(&nonce))
            .cloned())
    }

    fn list_nonces(&self, combat_id: &CombatId) -> Result<Vec<u64>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots
            .get(combat_id)
            .map(|by_nonce| by_nonce.keys().copied().collect())
            .unwrap_or_default())
    }

    fn delete(&self, combat_id: &CombatId) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.remove(combat_id);
        Ok(())
    }
}
