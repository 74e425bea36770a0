//! Worker that owns the authoritative [`CombatState`] of one combat.
//!
//! Receives commands from the [`SessionManager`](crate::SessionManager),
//! executes them through [`CombatEngine`], publishes [`Event`]s and queues
//! snapshots. Commands for one combat are applied strictly in arrival order.

use std::collections::{HashMap, VecDeque};
use std::ops::ControlFlow;

use combat_core::{
    CombatEngine, CombatError, CombatState, CommandId, ExecutionOutcome, GeometryError, Phase,
    TokenId, ValidationError,
};
use dice_resolution::movement_multiplier;
use grid_math::{Coord, Path, PathCache, PathQuery, find_path};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::events::{Event, EventBus};
use crate::id::CombatId;
use super::snapshot::queue_snapshot;
use crate::repository::Snapshot;

/// Commands that can be sent to a combat worker
pub(crate) enum Command {
    /// Apply a combat command, or return the recorded outcome of an id that
    /// was already applied.
    Execute {
        command: combat_core::Command,
        reply: oneshot::Sender<Result<ExecutionOutcome, CombatError>>,
    },
    /// Query the current combat state (read-only).
    QueryState { reply: oneshot::Sender<CombatState> },
    /// Preview the cheapest path a token could move along right now.
    FindPath {
        token: TokenId,
        goal: Coord,
        reply: oneshot::Sender<Result<Option<Path>, CombatError>>,
    },
    /// Stop the worker, returning the final state.
    Shutdown { reply: oneshot::Sender<CombatState> },
}

/// Outcomes of the most recently applied command ids. Once full, the oldest
/// id is forgotten and resubmitting it executes it again.
#[derive(Debug)]
struct AppliedCommands {
    capacity: usize,
    outcomes: HashMap<CommandId, ExecutionOutcome>,
    order: VecDeque<CommandId>,
}

impl AppliedCommands {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            outcomes: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, id: &CommandId) -> Option<&ExecutionOutcome> {
        self.outcomes.get(id)
    }

    fn record(&mut self, id: CommandId, outcome: ExecutionOutcome) {
        if self.outcomes.insert(id, outcome).is_some() {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.outcomes.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }
}

pub(crate) struct CombatWorker {
    combat_id: CombatId,
    state: CombatState,
    applied: AppliedCommands,
    paths: PathCache,
    command_rx: mpsc::Receiver<Command>,
    events: EventBus,
    snapshots: mpsc::Sender<Snapshot>,
}

impl CombatWorker {
    pub(crate) fn new(
        combat_id: CombatId,
        state: CombatState,
        idempotency_window: usize,
        path_cache_capacity: usize,
        command_rx: mpsc::Receiver<Command>,
        events: EventBus,
        snapshots: mpsc::Sender<Snapshot>,
    ) -> Self {
        Self {
            combat_id,
            state,
            applied: AppliedCommands::with_capacity(idempotency_window),
            paths: PathCache::with_capacity(path_cache_capacity),
            command_rx,
            events,
            snapshots,
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                else => break,
            }
        }
        debug!(
            target: "combat_session::worker",
            combat = %self.combat_id,
            nonce = self.state.nonce(),
            remembered = self.applied.len(),
            "Combat worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Execute { command, reply } => {
                let result = self.execute(command);
                let _ = reply.send(result);
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::FindPath { token, goal, reply } => {
                let result = self.find_path(token, goal);
                let _ = reply.send(result);
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(self.state.clone());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn execute(&mut self, command: combat_core::Command) -> Result<ExecutionOutcome, CombatError> {
        if let Some(outcome) = self.applied.get(&command.id) {
            debug!(
                target: "combat_session::worker",
                combat = %self.combat_id,
                command = %command.id,
                "Duplicate command id, returning recorded delta"
            );
            return Ok(outcome.clone());
        }

        let outcome = match CombatEngine::new(&mut self.state).execute(&command) {
            Ok(outcome) => outcome,
            Err(error) => {
                debug!(
                    target: "combat_session::worker",
                    combat = %self.combat_id,
                    command = %command.id,
                    actor = %command.actor,
                    error = %error,
                    "Command rejected"
                );
                return Err(error);
            }
        };

        self.applied.record(command.id, outcome.clone());
        self.publish(&outcome);
        self.enqueue_snapshot();
        Ok(outcome)
    }

    fn publish(&self, outcome: &ExecutionOutcome) {
        let turn = self.state.phase().turn();
        self.events.publish(Event::Delta {
            combat_id: self.combat_id.clone(),
            round: turn.map(|(round, _)| round),
            turn_index: turn.map(|(_, index)| index),
            delta: Box::new(outcome.delta.clone()),
        });

        if let Some(Phase::Completed { reason }) = outcome.delta.phase {
            info!(
                target: "combat_session::worker",
                combat = %self.combat_id,
                reason = ?reason,
                "Combat completed"
            );
            self.events.publish(Event::Completed {
                combat_id: self.combat_id.clone(),
                reason,
            });
        }
    }

    fn enqueue_snapshot(&self) {
        queue_snapshot(
            &self.snapshots,
            Snapshot::new(self.combat_id.clone(), self.state.clone()),
        );
    }

    /// Cheapest path within the token's remaining movement.
    ///
    /// The returned cost includes condition multipliers, so it matches what
    /// a move along the path would spend. Results are memoized until the
    /// board revision changes.
    fn find_path(&mut self, token: TokenId, goal: Coord) -> Result<Option<Path>, CombatError> {
        let state = &self.state;
        let mover = state
            .token(token)
            .ok_or(ValidationError::UnknownToken(token))?;
        if !state.grid().contains(goal) {
            return Err(GeometryError::OutOfBounds(goal).into());
        }

        let on_turn = state.active_token() == Some(token);
        let available = state
            .economy(token)
            .map(|e| e.available_movement(on_turn))
            .unwrap_or(0);
        let multiplier = movement_multiplier(&mover.creature.conditions.kinds()).max(1);
        let query = PathQuery {
            start: mover.position,
            goal,
            footprint: mover.footprint(),
            budget: available / multiplier,
        };

        let occupied = state.occupied_except(&[token]);
        let path = self
            .paths
            .get_or_compute(state.board_revision(), query, |q| {
                find_path(state.grid(), q.start, q.goal, q.footprint, q.budget, &occupied)
            });

        Ok(path.map(|mut path| {
            path.cost = path.cost.saturating_mul(multiplier);
            path
        }))
    }
}
