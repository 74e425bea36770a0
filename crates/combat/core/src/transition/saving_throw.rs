use dice_resolution::{DamageType, Dice, DiceExpr, ScriptedDice};

use crate::command::{AbilityEffect, Actor, SavingThrowAction, check_effects, check_modifier};
use crate::error::{CombatError, ValidationError};
use crate::result::{ActionResult, TargetReport};
use crate::state::CombatState;

use super::attack::roll_damage_terms;
use super::effects::{EffectContext, apply_effects, roll_save};
use super::targeting::living_target;
use super::{Transition, require_game_master, require_in_progress};

/// Damage terms of an effect list, in order.
pub(super) fn damage_terms(
    effects: &[AbilityEffect],
) -> impl Iterator<Item = (DiceExpr, DamageType)> + '_ {
    effects.iter().filter_map(|effect| match *effect {
        AbilityEffect::Damage {
            dice, damage_type, ..
        } => Some((dice, damage_type)),
        _ => None,
    })
}

impl Transition for SavingThrowAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_game_master(actor)?;
        require_in_progress(state)?;
        if self.targets.is_empty() {
            return Err(ValidationError::NoTargets.into());
        }
        check_modifier(self.dc)?;
        check_effects(&self.on_fail)?;
        check_effects(&self.on_success)?;
        for &target in &self.targets {
            living_target(state, target)?;
        }
        if let Some(source) = self.source {
            state.token_ref(source)?;
        }
        Ok(())
    }

    /// Every target saves; damage in each effect list is rolled once and
    /// shared by all targets with that outcome.
    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let mut saves = Vec::with_capacity(self.targets.len());
        for (index, &target) in self.targets.iter().enumerate() {
            let supplied = self.rolls.get(index).copied();
            saves.push(roll_save(state, target, self.ability, self.dc, supplied, dice)?);
        }

        let critical_rule = state.rules().critical;
        let mut table_dice = ScriptedDice::with_fallback(
            self.rolls.iter().skip(self.targets.len()).copied(),
            &mut *dice,
        );
        let fail_damage =
            roll_damage_terms(damage_terms(&self.on_fail), false, critical_rule, &mut table_dice);
        let success_damage = roll_damage_terms(
            damage_terms(&self.on_success),
            false,
            critical_rule,
            &mut table_dice,
        );

        let mut reports = Vec::with_capacity(saves.len());
        for save in saves {
            let target = save.target;
            let (effects, damage) = if save.outcome.is_success() {
                (&self.on_success, &success_damage)
            } else {
                (&self.on_fail, &fail_damage)
            };
            let mut report = TargetReport::new(target);
            report.save = Some(save);
            let context = EffectContext {
                source: self.source,
                damage,
                halve: false,
            };
            apply_effects(state, target, effects, &context, &mut table_dice, &mut report)?;
            reports.push(report);
        }
        Ok(ActionResult::SavingThrow(reports))
    }
}
