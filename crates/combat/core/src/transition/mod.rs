//! State transitions, one per command kind.
//!
//! Every command payload implements [`Transition`]. The engine drives each
//! through `pre_validate → apply → post_validate` on a staged copy of the
//! state.

mod ability;
mod attack;
mod condition;
mod effects;
mod initiative;
mod movement;
mod saving_throw;
mod setup;
mod targeting;
mod turn;

use dice_resolution::Dice;

use crate::command::{Actor, CommandKind};
use crate::error::{CombatError, TransitionError, ValidationError};
use crate::result::ActionResult;
use crate::state::{CombatState, Phase, PhaseKind, TokenId};

pub use targeting::sight_between;

/// A command that knows how to validate and apply itself.
pub trait Transition {
    type Output;

    /// Checks preconditions against the unmodified state.
    fn pre_validate(&self, _actor: Actor, _state: &CombatState) -> Result<(), CombatError> {
        Ok(())
    }

    /// Mutates the (staged) state.
    fn apply(
        &self,
        actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<Self::Output, CombatError>;

    /// Checks postconditions. The default verifies the occupancy index.
    fn post_validate(&self, state: &CombatState) -> Result<(), CombatError> {
        state.verify_occupancy()?;
        Ok(())
    }
}

#[inline]
fn drive_transition<T>(
    transition: &T,
    actor: Actor,
    state: &mut CombatState,
    dice: &mut dyn Dice,
) -> Result<T::Output, CombatError>
where
    T: Transition,
{
    transition.pre_validate(actor, state)?;
    let output = transition.apply(actor, state, dice)?;
    transition.post_validate(state)?;
    Ok(output)
}

/// Routes a command to its transition.
pub(crate) fn execute_transition(
    kind: &CommandKind,
    actor: Actor,
    state: &mut CombatState,
    dice: &mut dyn Dice,
) -> Result<ActionResult, CombatError> {
    match kind {
        CommandKind::PlaceToken(t) => drive_transition(t, actor, state, dice),
        CommandKind::RollInitiative(t) => drive_transition(t, actor, state, dice),
        CommandKind::Start(t) => drive_transition(t, actor, state, dice),
        CommandKind::Move(t) => drive_transition(t, actor, state, dice),
        CommandKind::Attack(t) => drive_transition(t.as_ref(), actor, state, dice),
        CommandKind::SavingThrow(t) => drive_transition(t, actor, state, dice),
        CommandKind::UseAbility(t) => drive_transition(t.as_ref(), actor, state, dice),
        CommandKind::ApplyCondition(t) => drive_transition(t, actor, state, dice),
        CommandKind::RemoveCondition(t) => drive_transition(t, actor, state, dice),
        CommandKind::SetTerrain(t) => drive_transition(t, actor, state, dice),
        CommandKind::EndTurn(t) => drive_transition(t, actor, state, dice),
        CommandKind::RemoveToken(t) => drive_transition(t, actor, state, dice),
        CommandKind::EndCombat(t) => drive_transition(t, actor, state, dice),
    }
}

// ===== shared preconditions =====

pub(crate) fn require_game_master(actor: Actor) -> Result<(), ValidationError> {
    if actor.is_game_master() {
        Ok(())
    } else {
        Err(ValidationError::NotGameMaster)
    }
}

/// The game master controls every token; a token controls only itself.
pub(crate) fn require_control(actor: Actor, token: TokenId) -> Result<(), ValidationError> {
    match actor {
        Actor::GameMaster => Ok(()),
        Actor::Token(id) if id == token => Ok(()),
        Actor::Token(_) => Err(ValidationError::NotController(token)),
    }
}

pub(crate) fn require_in_progress(state: &CombatState) -> Result<(), TransitionError> {
    match state.phase() {
        Phase::InProgress { .. } => Ok(()),
        Phase::Completed { .. } => Err(TransitionError::CombatOver),
        other => Err(TransitionError::WrongPhase {
            expected: PhaseKind::InProgress,
            actual: other.kind(),
        }),
    }
}

pub(crate) fn require_not_completed(state: &CombatState) -> Result<(), TransitionError> {
    match state.phase() {
        Phase::Completed { .. } => Err(TransitionError::CombatOver),
        _ => Ok(()),
    }
}
