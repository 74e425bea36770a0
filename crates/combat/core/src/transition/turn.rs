//! Turn flow and leaving the combat.

use dice_resolution::Dice;

use crate::command::{Actor, EndCombatAction, EndTurnAction, RemoveTokenAction};
use crate::error::{CombatError, TransitionError};
use crate::result::{ActionResult, TurnEndReport};
use crate::state::{CombatState, CompletionReason, Phase};

use super::effects::roll_save;
use super::{
    Transition, require_control, require_game_master, require_in_progress, require_not_completed,
};

impl Transition for EndTurnAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_in_progress(state)?;
        if let Actor::Token(id) = actor
            && state.active_token() != Some(id)
        {
            return Err(TransitionError::NotTurn { token: id }.into());
        }
        Ok(())
    }

    /// Ends the active token's turn: round-based conditions count down, each
    /// save-ended condition gets its save, and the turn passes on. The
    /// engine then skips downed tokens and refreshes the next economy.
    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let Some(token) = state.active_token() else {
            return Err(TransitionError::CombatOver.into());
        };

        let expired = state.token_mut(token)?.creature.conditions.tick_rounds();

        let pending = state.token_ref(token)?.creature.conditions.save_ended();
        let mut saves = Vec::with_capacity(pending.len());
        for (kind, ability, dc) in pending {
            let save = roll_save(state, token, ability, dc, None, dice)?;
            if save.outcome.is_success() {
                state.token_mut(token)?.creature.conditions.remove(kind);
            }
            saves.push((kind, save));
        }

        state.advance_turn();
        Ok(ActionResult::TurnEnded(TurnEndReport {
            token,
            expired,
            saves,
        }))
    }
}

impl Transition for RemoveTokenAction {
    type Output = ActionResult;

    /// The game master may dismiss anyone; a token may only flee itself.
    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_not_completed(state)?;
        require_control(actor, self.token)?;
        state.token_ref(self.token)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        state.clear_from_board(self.token);
        state.tokens.remove(&self.token);
        Ok(ActionResult::TokenRemoved(self.token))
    }
}

impl Transition for EndCombatAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_not_completed(state)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        state.phase = Phase::Completed {
            reason: CompletionReason::EndedByGameMaster,
        };
        Ok(ActionResult::CombatEnded)
    }
}
