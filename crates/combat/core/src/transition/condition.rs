use dice_resolution::Dice;

use crate::command::{Actor, ApplyConditionAction, RemoveConditionAction, check_duration};
use crate::error::CombatError;
use crate::result::ActionResult;
use crate::state::CombatState;

use super::effects::add_condition;
use super::targeting::living_target;
use super::{Transition, require_game_master, require_not_completed};

impl Transition for ApplyConditionAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_not_completed(state)?;
        living_target(state, self.target)?;
        if let Some(source) = self.condition.source {
            state.token_ref(source)?;
        }
        check_duration(self.condition.duration)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let update = add_condition(state, self.target, self.condition)?;
        Ok(ActionResult::ConditionApplied {
            target: self.target,
            kind: self.condition.kind,
            update,
        })
    }
}

impl Transition for RemoveConditionAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_not_completed(state)?;
        state.token_ref(self.target)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let removed = state
            .token_mut(self.target)?
            .creature
            .conditions
            .remove(self.kind);
        Ok(ActionResult::ConditionRemoved {
            target: self.target,
            kind: self.kind,
            removed,
        })
    }
}
