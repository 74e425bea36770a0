use dice_resolution::Dice;

use crate::command::{Actor, PlaceTokenAction, SetTerrainAction};
use crate::error::{CombatError, GeometryError};
use crate::result::ActionResult;
use crate::state::CombatState;

use super::{Transition, require_game_master, require_not_completed};

impl Transition for PlaceTokenAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, _state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        state.place_token(self.token.as_ref().clone())?;
        Ok(ActionResult::Setup)
    }
}

impl Transition for SetTerrainAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_not_completed(state)?;
        if !state.grid().contains(self.cell) {
            return Err(GeometryError::OutOfBounds(self.cell).into());
        }
        // A token may not end up standing inside impassable terrain.
        if !self.terrain.walkable && state.occupant(self.cell).is_some() {
            return Err(GeometryError::Blocked(self.cell).into());
        }
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        if state.grid.cell(self.cell) != Some(self.terrain) {
            state.grid.set_cell(self.cell, self.terrain);
            state.bump_board();
        }
        Ok(ActionResult::Setup)
    }
}
