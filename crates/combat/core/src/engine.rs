//! Command execution pipeline.
//!
//! The [`CombatEngine`] is the authoritative reducer for [`CombatState`].
//! Every command runs against a staged clone of the state; the clone is
//! committed only when the whole transition succeeded, so a rejected command
//! leaves the caller's state untouched.

use dice_resolution::SeededDice;

use crate::command::Command;
use crate::delta::StateDelta;
use crate::error::CombatError;
use crate::result::ActionResult;
use crate::state::CombatState;
use crate::transition::execute_transition;

/// What a successful command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionOutcome {
    pub delta: StateDelta,
    pub result: ActionResult,
}

/// Combat engine that validates and applies commands.
///
/// Dice come from the state's seed, its nonce and the issuing actor, so
/// replaying the same commands against the same initial state reproduces
/// every roll.
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    /// Executes one command.
    ///
    /// On success the state advances its nonce and the returned delta
    /// describes every observable change. On failure nothing is modified.
    pub fn execute(&mut self, command: &Command) -> Result<ExecutionOutcome, CombatError> {
        let before = &*self.state;
        let mut staged = before.clone();
        let mut dice = SeededDice::new(before.seed(), before.nonce(), command.actor.seed_id());
        let previous_active = before.active_token();

        let result = execute_transition(&command.kind, command.actor, &mut staged, &mut dice)?;

        // Turn bookkeeping runs after every command: a kill can end the
        // combat or leave a downed token at the head of the order.
        staged.settle_turn(previous_active);
        staged.verify_occupancy()?;
        staged.bump_nonce();

        let delta = StateDelta::from_states(command.clone(), before, &staged);
        *self.state = staged;
        Ok(ExecutionOutcome { delta, result })
    }
}

/// Executes `command` against `state`; shorthand for a one-off engine.
pub fn execute(state: &mut CombatState, command: &Command) -> Result<ExecutionOutcome, CombatError> {
    CombatEngine::new(state).execute(command)
}
