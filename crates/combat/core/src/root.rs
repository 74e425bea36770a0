//! State root: a SHA-256 commitment to the whole combat state.
//!
//! Two replicas that executed the same commands from the same setup produce
//! the same root, which makes divergence cheap to detect.

use crate::state::CombatState;

impl CombatState {
    /// Hashes the bincode encoding of the state.
    ///
    /// Requires the `serde` feature. Collections are ordered maps and
    /// vectors, so the encoding (and therefore the root) is deterministic.
    #[cfg(feature = "serde")]
    pub fn state_root(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        if let Ok(bytes) = bincode::serialize(self) {
            hasher.update(&bytes);
        }
        hasher.finalize().into()
    }
}
