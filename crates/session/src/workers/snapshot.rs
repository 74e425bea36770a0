//! Writer task draining queued snapshots into a repository.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::repository::{Snapshot, SnapshotRepository};

pub(crate) struct SnapshotWorker {
    repository: Arc<dyn SnapshotRepository>,
    snapshot_rx: mpsc::Receiver<Snapshot>,
}

impl SnapshotWorker {
    pub(crate) fn new(
        repository: Arc<dyn SnapshotRepository>,
        snapshot_rx: mpsc::Receiver<Snapshot>,
    ) -> Self {
        Self {
            repository,
            snapshot_rx,
        }
    }

    /// Runs until every sender is dropped and the queue is drained.
    pub(crate) async fn run(mut self) {
        while let Some(snapshot) = self.snapshot_rx.recv().await {
            match self.repository.save(&snapshot) {
                Ok(()) => debug!(
                    target: "combat_session::snapshot",
                    combat = %snapshot.combat_id,
                    nonce = snapshot.nonce,
                    "Snapshot stored"
                ),
                Err(e) => error!(
                    target: "combat_session::snapshot",
                    combat = %snapshot.combat_id,
                    nonce = snapshot.nonce,
                    error = %e,
                    "Failed to store snapshot"
                ),
            }
        }
        debug!(target: "combat_session::snapshot", "Snapshot worker stopped");
    }
}

/// Queues a snapshot without waiting; a full or closed queue drops it.
pub(crate) fn queue_snapshot(tx: &mpsc::Sender<Snapshot>, snapshot: Snapshot) {
    match tx.try_send(snapshot) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(snapshot)) => {
            warn!(
                target: "combat_session::snapshot",
                combat = %snapshot.combat_id,
                nonce = snapshot.nonce,
                "Snapshot queue full, dropping snapshot"
            );
        }
        Err(mpsc::error::TrySendError::Closed(snapshot)) => {
            warn!(
                target: "combat_session::snapshot",
                combat = %snapshot.combat_id,
                nonce = snapshot.nonce,
                "Snapshot writer stopped, dropping snapshot"
            );
        }
    }
}
