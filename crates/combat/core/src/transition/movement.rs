use dice_resolution::{Dice, movement_multiplier, speed_is_zero};
use grid_math::{Path, find_path};

use crate::command::{Actor, MoveAction, MoveTarget};
use crate::error::{CombatError, GeometryError, TransitionError, ValidationError};
use crate::result::ActionResult;
use crate::state::CombatState;

use super::{Transition, require_control, require_in_progress};

impl MoveAction {
    /// Validates the requested movement and prices it, without mutating.
    ///
    /// The returned cost already includes condition multipliers (crawling
    /// while prone doubles every step).
    fn plan(&self, state: &CombatState) -> Result<(Path, u32), CombatError> {
        let token = state.token_ref(self.token)?;
        let kinds = token.creature.conditions.kinds();
        let multiplier = movement_multiplier(&kinds).max(1);
        let on_turn = state.active_token() == Some(self.token);
        let available = state
            .economy(self.token)
            .map(|e| e.available_movement(on_turn))
            .unwrap_or(0);
        let occupied = state.occupied_except(&[self.token]);
        let footprint = token.footprint();

        let path = match &self.target {
            MoveTarget::Path(cells) => {
                let mut cells = cells.clone();
                if cells.first() != Some(&token.position) {
                    cells.insert(0, token.position);
                }
                if let Some(&outside) = cells.iter().find(|&&c| !state.grid().contains(c)) {
                    return Err(GeometryError::OutOfBounds(outside).into());
                }
                let cost = state
                    .grid()
                    .path_cost(&cells, footprint, &occupied)
                    .ok_or(GeometryError::InvalidPath)?;
                Path { cells, cost }
            }
            MoveTarget::Destination(goal) => {
                if !state.grid().contains(*goal) {
                    return Err(GeometryError::OutOfBounds(*goal).into());
                }
                find_path(
                    state.grid(),
                    token.position,
                    *goal,
                    footprint,
                    available / multiplier,
                    &occupied,
                )
                .ok_or(GeometryError::Unreachable {
                    from: token.position,
                    to: *goal,
                })?
            }
        };

        let cost = path.cost.saturating_mul(multiplier);
        if cost > available {
            return Err(TransitionError::InsufficientMovement {
                required: cost,
                available,
            }
            .into());
        }
        Ok((path, cost))
    }
}

impl Transition for MoveAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_in_progress(state)?;
        require_control(actor, self.token)?;
        let token = state.token_ref(self.token)?;
        if !token.is_standing() {
            return Err(ValidationError::NotStanding(self.token).into());
        }
        if speed_is_zero(&token.creature.conditions.kinds()) {
            return Err(TransitionError::SpeedZero(self.token).into());
        }
        // Off-turn movement is only possible with movement granted by an
        // effect.
        let on_turn = state.active_token() == Some(self.token);
        let granted = state
            .economy(self.token)
            .is_some_and(|e| e.granted_movement > 0);
        if !on_turn && !granted {
            return Err(TransitionError::NotTurn { token: self.token }.into());
        }
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let (path, cost) = self.plan(state)?;
        let on_turn = state.active_token() == Some(self.token);
        state
            .economy_mut(self.token)
            .spend_movement(cost, on_turn)?;
        if let Some(destination) = path.destination()
            && path.steps() > 0
        {
            state.relocate(self.token, destination)?;
        }
        Ok(ActionResult::Moved {
            token: self.token,
            path,
        })
    }
}
