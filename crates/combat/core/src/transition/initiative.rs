use dice_resolution::{Ability, Dice};

use crate::command::{Actor, RollInitiativeAction, StartAction};
use crate::error::{CombatError, TransitionError, ValidationError};
use crate::result::ActionResult;
use crate::state::{ActionEconomy, CombatState, InitiativeEntry, Phase, PhaseKind};

use super::{Transition, require_control, require_game_master};

fn require_setup(state: &CombatState) -> Result<(), TransitionError> {
    if state.phase().is_setup() {
        Ok(())
    } else {
        Err(TransitionError::WrongPhase {
            expected: PhaseKind::RollingInitiative,
            actual: state.phase().kind(),
        })
    }
}

impl Transition for RollInitiativeAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_setup(state)?;
        require_control(actor, self.token)?;
        state.token_ref(self.token)?;
        if !(1..=20).contains(&self.natural) {
            return Err(ValidationError::InvalidRoll(self.natural).into());
        }
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        _dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let creature = &state.token_ref(self.token)?.creature;
        let entry = InitiativeEntry {
            token: self.token,
            total: (self.natural as i32).saturating_add(creature.initiative_modifier()),
            dex_modifier: creature.abilities.modifier(Ability::Dexterity),
            order: state.placement_order(self.token),
        };
        state.initiative.retain(|e| e.token != self.token);
        state.initiative.push(entry);
        state.phase = Phase::RollingInitiative;
        Ok(ActionResult::InitiativeRecorded(entry))
    }
}

impl Transition for StartAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_setup(state)?;
        if state.tokens().all(|t| t.creature.is_dead()) {
            return Err(TransitionError::NoCombatants.into());
        }
        Ok(())
    }

    /// Rolls d20 + DEX modifier + initiative bonus for every token without a
    /// recorded roll, then fixes the order: highest total first, ties by
    /// DEX modifier, then by placement.
    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let missing: Vec<_> = state
            .tokens()
            .filter(|t| !t.creature.is_dead())
            .filter(|t| !state.initiative.iter().any(|e| e.token == t.id))
            .map(|t| {
                (
                    t.id,
                    t.creature.initiative_modifier(),
                    t.creature.abilities.modifier(Ability::Dexterity),
                )
            })
            .collect();

        for (token, modifier, dex_modifier) in missing {
            let natural = dice.roll(20) as i32;
            let order = state.placement_order(token);
            state.initiative.push(InitiativeEntry {
                token,
                total: natural.saturating_add(modifier),
                dex_modifier,
                order,
            });
        }
        state.initiative.sort_by_key(InitiativeEntry::sort_key);

        let waiting: Vec<_> = state.initiative.iter().map(|e| e.token).collect();
        for token in waiting {
            state.economy.insert(token, ActionEconomy::waiting());
        }
        state.phase = Phase::InProgress {
            round: 1,
            turn_index: 0,
        };
        Ok(ActionResult::Started {
            order: state.initiative.clone(),
        })
    }
}
