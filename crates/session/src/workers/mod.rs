//! Background tasks owned by the session manager.
//!
//! Each open combat runs one [`CombatWorker`] that applies commands
//! sequentially; a single [`SnapshotWorker`] drains snapshot writes for all
//! combats.
mod combat;
mod snapshot;

pub(crate) use combat::{CombatWorker, Command};
pub(crate) use snapshot::{SnapshotWorker, queue_snapshot};
