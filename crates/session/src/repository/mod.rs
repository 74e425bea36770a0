//! Snapshot persistence for combat states.
//!
//! Workers hand snapshots to a background writer; repositories only need to
//! store the latest states per combat and return the newest one on restore.
mod error;
mod file;
mod memory;

pub use error::{RepositoryError, Result};
pub use file::FileSnapshotRepository;
pub use memory::InMemorySnapshotRepository;

use combat_core::CombatState;
use serde::{Deserialize, Serialize};

use crate::id::CombatId;

/// A combat state captured after the command that produced `nonce`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub combat_id: CombatId,
    pub nonce: u64,
    pub state: CombatState,
}

impl Snapshot {
    pub fn new(combat_id: CombatId, state: CombatState) -> Self {
        Self {
            combat_id,
            nonce: state.nonce(),
            state,
        }
    }
}

/// Repository for combat snapshots indexed by combat id and nonce.
pub trait SnapshotRepository: Send + Sync {
    /// Save a snapshot, replacing any stored at the same nonce
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Load the snapshot at a specific nonce
    fn load(&self, combat_id: &CombatId, nonce: u64) -> Result<Option<Snapshot>>;

    /// List stored nonces for a combat, ascending
    fn list_nonces(&self, combat_id: &CombatId) -> Result<Vec<u64>>;

    /// Delete every snapshot of a combat
    fn delete(&self, combat_id: &CombatId) -> Result<()>;

    /// Load the snapshot with the highest nonce
    fn load_latest(&self, combat_id: &CombatId) -> Result<Option<Snapshot>> {
        match self.list_nonces(combat_id)?.last() {
            Some(&nonce) => self.load(combat_id, nonce),
            None => Ok(None),
        }
    }
}
