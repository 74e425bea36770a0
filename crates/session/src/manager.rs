//! Entry point for hosting many combats at once.
//!
//! [`SessionManager`] owns one worker task per open combat. Commands for the
//! same combat queue up on that worker's channel and run one at a time;
//! commands for different combats run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use combat_core::{CombatSetup, CombatState, ExecutionOutcome, StateDelta, TokenId};
use grid_math::{Coord, Path};
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::{Event, EventBus, Topic};
use crate::id::CombatId;
use crate::repository::{
    FileSnapshotRepository, InMemorySnapshotRepository, Snapshot, SnapshotRepository,
};
use crate::workers::{CombatWorker, Command, SnapshotWorker, queue_snapshot};

struct CombatHandle {
    command_tx: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

/// Hosts combats, serializing the commands of each one.
///
/// Must be created inside a Tokio runtime; worker tasks are spawned on it.
pub struct SessionManager {
    config: SessionConfig,
    events: EventBus,
    repository: Arc<dyn SnapshotRepository>,
    snapshot_tx: mpsc::Sender<Snapshot>,
    snapshot_task: JoinHandle<()>,
    combats: RwLock<HashMap<CombatId, CombatHandle>>,
}

impl SessionManager {
    /// Creates a manager persisting snapshots to `config.snapshot_dir`, or
    /// in memory when no directory is configured.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let repository: Arc<dyn SnapshotRepository> = match &config.snapshot_dir {
            Some(dir) => Arc::new(FileSnapshotRepository::new(dir)?),
            None => Arc::new(InMemorySnapshotRepository::new()),
        };
        Ok(Self::with_repository(config, repository))
    }

    pub fn with_repository(config: SessionConfig, repository: Arc<dyn SnapshotRepository>) -> Self {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.snapshot_buffer.max(1));
        let snapshot_task =
            tokio::spawn(SnapshotWorker::new(Arc::clone(&repository), snapshot_rx).run());

        Self {
            events: EventBus::with_capacity(config.event_buffer),
            config,
            repository,
            snapshot_tx,
            snapshot_task,
            combats: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a combat from its setup and starts its worker.
    ///
    /// The initial state is snapshotted so the combat can be restored even
    /// before its first command.
    pub async fn open(&self, combat_id: impl Into<CombatId>, setup: CombatSetup) -> Result<()> {
        let combat_id = combat_id.into();
        let mut combats = self.combats.write().await;
        if combats.contains_key(&combat_id) {
            return Err(SessionError::AlreadyOpen(combat_id));
        }

        let state = setup.build().map_err(SessionError::Setup)?;
        let nonce = state.nonce();
        queue_snapshot(
            &self.snapshot_tx,
            Snapshot::new(combat_id.clone(), state.clone()),
        );
        combats.insert(combat_id.clone(), self.spawn_worker(combat_id.clone(), state));
        drop(combats);

        info!(
            target: "combat_session::manager",
            combat = %combat_id,
            seed = setup.seed,
            tokens = setup.tokens.len(),
            "Combat opened"
        );
        self.events.publish(Event::Opened { combat_id, nonce });
        Ok(())
    }

    /// Reopens a combat from the newest stored snapshot.
    ///
    /// Command ids applied before the snapshot are not remembered, so
    /// resubmitting one after a restore executes it again.
    pub async fn restore(&self, combat_id: impl Into<CombatId>) -> Result<u64> {
        let combat_id = combat_id.into();
        let mut combats = self.combats.write().await;
        if combats.contains_key(&combat_id) {
            return Err(SessionError::AlreadyOpen(combat_id));
        }

        let snapshot = self
            .repository
            .load_latest(&combat_id)?
            .ok_or_else(|| SessionError::NoSnapshot(combat_id.clone()))?;
        let nonce = snapshot.nonce;
        combats.insert(
            combat_id.clone(),
            self.spawn_worker(combat_id.clone(), snapshot.state),
        );
        drop(combats);

        info!(
            target: "combat_session::manager",
            combat = %combat_id,
            nonce,
            "Combat restored from snapshot"
        );
        self.events.publish(Event::Restored { combat_id, nonce });
        Ok(nonce)
    }

    /// Submits a command and returns the delta it produced.
    ///
    /// Resubmitting a command id that was already applied returns the
    /// recorded delta without executing anything. A rejected command leaves
    /// the combat unchanged and publishes no event.
    pub async fn submit(
        &self,
        combat_id: &CombatId,
        command: combat_core::Command,
    ) -> Result<StateDelta> {
        self.execute(combat_id, command)
            .await
            .map(|outcome| outcome.delta)
    }

    /// Like [`submit`](Self::submit), also returning the action report
    /// (rolls, hits, saves) alongside the delta.
    pub async fn execute(
        &self,
        combat_id: &CombatId,
        command: combat_core::Command,
    ) -> Result<ExecutionOutcome> {
        let result = self
            .request(combat_id, |reply| Command::Execute { command, reply })
            .await?;
        result.map_err(SessionError::Rejected)
    }

    /// Current state of a combat (a copy).
    pub async fn state(&self, combat_id: &CombatId) -> Result<CombatState> {
        self.request(combat_id, |reply| Command::QueryState { reply })
            .await
    }

    /// Previews the cheapest path for `token` to `goal` within its remaining
    /// movement. `None` when the goal cannot be reached.
    pub async fn find_path(
        &self,
        combat_id: &CombatId,
        token: TokenId,
        goal: Coord,
    ) -> Result<Option<Path>> {
        let result = self
            .request(combat_id, |reply| Command::FindPath { token, goal, reply })
            .await?;
        result.map_err(SessionError::Rejected)
    }

    /// Stops a combat's worker and returns its final state.
    ///
    /// Commands queued before the close are still applied.
    pub async fn close(&self, combat_id: &CombatId) -> Result<CombatState> {
        let handle = self
            .combats
            .write()
            .await
            .remove(combat_id)
            .ok_or_else(|| SessionError::UnknownCombat(combat_id.clone()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .command_tx
            .send(Command::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;
        let state = reply_rx.await.map_err(SessionError::ReplyChannelClosed)?;
        handle.task.await.map_err(SessionError::WorkerJoin)?;

        info!(
            target: "combat_session::manager",
            combat = %combat_id,
            nonce = state.nonce(),
            "Combat closed"
        );
        self.events.publish(Event::Closed {
            combat_id: combat_id.clone(),
        });
        Ok(state)
    }

    /// Closes every combat and waits for queued snapshots to be written.
    pub async fn shutdown(self) -> Result<()> {
        for combat_id in self.combat_ids().await {
            self.close(&combat_id).await?;
        }

        let SessionManager {
            snapshot_tx,
            snapshot_task,
            ..
        } = self;
        drop(snapshot_tx);
        snapshot_task.await.map_err(SessionError::WorkerJoin)
    }

    /// Ids of the open combats, sorted.
    pub async fn combat_ids(&self) -> Vec<CombatId> {
        let mut ids: Vec<CombatId> = self.combats.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn repository(&self) -> &Arc<dyn SnapshotRepository> {
        &self.repository
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn spawn_worker(&self, combat_id: CombatId, state: CombatState) -> CombatHandle {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let worker = CombatWorker::new(
            combat_id,
            state,
            self.config.idempotency_window,
            self.config.path_cache_capacity,
            command_rx,
            self.events.clone(),
            self.snapshot_tx.clone(),
        );
        CombatHandle {
            command_tx,
            task: tokio::spawn(worker.run()),
        }
    }

    /// Sends a request to a combat's worker and waits for the reply.
    ///
    /// A worker that can no longer answer is unregistered, so the combat can
    /// be restored from its last snapshot.
    async fn request<T>(
        &self,
        combat_id: &CombatId,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let command_tx = self
            .combats
            .read()
            .await
            .get(combat_id)
            .map(|handle| handle.command_tx.clone())
            .ok_or_else(|| SessionError::UnknownCombat(combat_id.clone()))?;

        let (reply_tx, reply_rx) = oneshot::channel();
        if command_tx.send(command(reply_tx)).await.is_err() {
            return Err(self.retire(combat_id, &command_tx).await);
        }
        match reply_rx.await {
            Ok(reply) => Ok(reply),
            Err(_) => Err(self.retire(combat_id, &command_tx).await),
        }
    }

    /// Drops the handle of a worker that stopped without being closed and
    /// announces the combat as closed.
    async fn retire(
        &self,
        combat_id: &CombatId,
        command_tx: &mpsc::Sender<Command>,
    ) -> SessionError {
        let handle = {
            let mut combats = self.combats.write().await;
            let current = combats
                .get(combat_id)
                .is_some_and(|handle| handle.command_tx.same_channel(command_tx));
            if current { combats.remove(combat_id) } else { None }
        };

        let Some(handle) = handle else {
            // Closed or retired by someone else in the meantime.
            return SessionError::UnknownCombat(combat_id.clone());
        };
        drop(handle.command_tx);
        match handle.task.await {
            Err(join) if join.is_panic() => error!(
                target: "combat_session::manager",
                combat = %combat_id,
                "Combat worker panicked"
            ),
            Err(_) => warn!(
                target: "combat_session::manager",
                combat = %combat_id,
                "Combat worker was cancelled"
            ),
            Ok(()) => warn!(
                target: "combat_session::manager",
                combat = %combat_id,
                "Combat worker exited without being closed"
            ),
        }
        self.events.publish(Event::Closed {
            combat_id: combat_id.clone(),
        });
        SessionError::WorkerStopped(combat_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{
        Actor, CombatConfig, Controller, Creature, EndTurnAction, RollInitiativeAction, SideId,
        Size, StartAction, Token,
    };
    use dice_resolution::AbilityScores;
    use grid_math::Grid;

    use super::*;

    fn setup() -> CombatSetup {
        let token = |id: u32, x: i32| Token {
            id: TokenId(id),
            creature_ref: format!("creature-{id}"),
            name: format!("Token {id}"),
            side: SideId(id),
            controller: Controller::GameMaster,
            position: Coord::new(x, 0),
            size: Size::Medium,
            creature: Creature::new(AbilityScores::AVERAGE, 10, 12, 30),
        };
        CombatSetup::new(3, CombatConfig::default(), Grid::square(6, 6))
            .with_token(token(1, 0))
            .with_token(token(2, 4))
    }

    fn gm(id: u64, kind: impl Into<combat_core::CommandKind>) -> combat_core::Command {
        combat_core::Command::new(id, Actor::GameMaster, kind)
    }

    #[tokio::test]
    async fn dead_worker_is_unregistered_and_restorable() {
        let manager = SessionManager::new(SessionConfig::default()).unwrap();
        let id = CombatId::from("vault");
        manager.open(id.clone(), setup()).await.unwrap();
        for (n, token) in [1, 2].into_iter().enumerate() {
            let roll = RollInitiativeAction {
                token: TokenId(token),
                natural: 15 - token,
            };
            manager.submit(&id, gm(n as u64 + 1, roll)).await.unwrap();
        }
        manager.submit(&id, gm(3, StartAction)).await.unwrap();
        let mut lifecycle = manager.subscribe(Topic::Lifecycle);

        manager.combats.read().await[&id].task.abort();

        let err = manager.submit(&id, gm(4, EndTurnAction)).await.unwrap_err();
        assert!(matches!(err, SessionError::WorkerStopped(ref stopped) if *stopped == id));
        assert!(manager.combat_ids().await.is_empty());
        assert!(matches!(lifecycle.try_recv(), Ok(Event::Closed { .. })));

        let err = manager.state(&id).await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownCombat(_)));

        // The snapshot worker runs separately; wait for the last write.
        let nonce = loop {
            match manager.repository().load_latest(&id).unwrap() {
                Some(snapshot) if snapshot.nonce == 3 => break snapshot.nonce,
                _ => tokio::task::yield_now().await,
            }
        };
        assert_eq!(manager.restore(id.clone()).await.unwrap(), nonce);
        let delta = manager.submit(&id, gm(4, EndTurnAction)).await.unwrap();
        assert_eq!(delta.nonce, 4);
    }
}
