//! Abilities: cost, reach, area resolution and per-target effects.

use std::collections::BTreeSet;

use dice_resolution::{AdvantageState, Dice, ScriptedDice};
use grid_math::{AreaShape, Coord, calculate_aoe_within, check_line_of_sight};

use crate::command::{AbilityEffect, Actor, Resolution, TargetSelection, UseAbilityAction};
use crate::error::{CombatError, GeometryError, TargetingError, ValidationError};
use crate::result::{AbilityReport, ActionResult, TargetReport};
use crate::state::{CombatState, TokenId};

use super::attack::{check_resource, prepare_attack, roll_attack, roll_damage_terms};
use super::effects::{EffectContext, apply_effects, footprint_cells, roll_save};
use super::saving_throw::damage_terms;
use super::targeting::{
    able_actor, cell_distance, check_charm, living_target, sees_cell, sight_between,
    token_distance,
};
use super::{Transition, require_control, require_in_progress};

impl UseAbilityAction {
    fn range_cells(&self, state: &CombatState) -> u32 {
        state.grid().config().feet_to_cells(self.ability.range).max(1)
    }

    /// Resolves the target selection to the affected tokens, in a stable
    /// order.
    fn resolve_targets(&self, state: &CombatState) -> Result<Vec<TokenId>, CombatError> {
        let caster = state.token_ref(self.caster)?;
        let range = self.range_cells(state);

        match &self.targets {
            TargetSelection::Tokens(ids) => {
                if ids.is_empty() {
                    return Err(ValidationError::NoTargets.into());
                }
                let mut seen = BTreeSet::new();
                let mut targets = Vec::with_capacity(ids.len());
                for &id in ids {
                    if !seen.insert(id) {
                        continue;
                    }
                    let target = living_target(state, id)?;
                    if id != self.caster {
                        check_charm(caster, id)?;
                        let distance = token_distance(state, caster, target);
                        if distance > range {
                            return Err(TargetingError::OutOfRange { distance, range }.into());
                        }
                        if self.ability.requires_sight
                            && sight_between(state, self.caster, id).blocked
                        {
                            return Err(TargetingError::NoLineOfSight {
                                from: self.caster,
                                to: id,
                            }
                            .into());
                        }
                    }
                    targets.push(id);
                }
                Ok(targets)
            }
            TargetSelection::Area { origin, direction } => {
                let origin = *origin;
                if !state.grid().contains(origin) {
                    return Err(GeometryError::OutOfBounds(origin).into());
                }
                let distance = cell_distance(state, caster, origin);
                if distance > range {
                    return Err(TargetingError::OutOfRange { distance, range }.into());
                }
                if self.ability.requires_sight && !sees_cell(state, caster, origin) {
                    return Err(TargetingError::CellNotVisible {
                        from: self.caster,
                        to: origin,
                    }
                    .into());
                }

                // Without an area the ability affects the origin cell only.
                let shape = self.ability.area.unwrap_or(AreaShape::Burst { radius: 0 });
                let directional = matches!(shape, AreaShape::Cone { .. } | AreaShape::Line { .. });
                if directional && direction.is_none_or(|d| d.is_zero()) {
                    return Err(TargetingError::MissingDirection.into());
                }
                let cells = calculate_aoe_within(
                    state.grid().config(),
                    state.grid().dimensions(),
                    shape,
                    origin,
                    *direction,
                );
                Ok(tokens_in_area(state, origin, &cells))
            }
        }
    }
}

/// Tokens with a footprint cell inside `cells` that the area's origin can
/// reach. Terrain shields a cell; creatures do not.
fn tokens_in_area(state: &CombatState, origin: Coord, cells: &BTreeSet<Coord>) -> Vec<TokenId> {
    state
        .tokens()
        .filter(|t| !t.creature.is_dead())
        .filter(|t| {
            footprint_cells(state, t.id).into_iter().any(|c| {
                cells.contains(&c) && !check_line_of_sight(state.grid(), origin, c, |_| false).blocked
            })
        })
        .map(|t| t.id)
        .collect()
}

impl Transition for UseAbilityAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_in_progress(state)?;
        require_control(actor, self.caster)?;
        able_actor(state, self.caster)?;
        check_resource(state, self.caster, self.ability.cost)?;
        self.ability.validate()?;
        self.resolve_targets(state)?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let targets = self.resolve_targets(state)?;
        state.economy_mut(self.caster).spend(self.ability.cost)?;

        let critical_rule = state.rules().critical;
        let effects = &self.ability.effects;
        let mut table_dice = ScriptedDice::with_fallback(self.rolls.iter().copied(), &mut *dice);
        let mut reports = Vec::with_capacity(targets.len());

        match self.ability.resolution {
            Resolution::Automatic => {
                let damage =
                    roll_damage_terms(damage_terms(effects), false, critical_rule, &mut table_dice);
                for target in targets {
                    let mut report = TargetReport::new(target);
                    let context = EffectContext {
                        source: Some(self.caster),
                        damage: &damage,
                        halve: false,
                    };
                    let dice = &mut table_dice;
                    apply_effects(state, target, effects, &context, dice, &mut report)?;
                    reports.push(report);
                }
            }
            Resolution::Save { ability, dc } => {
                let damage =
                    roll_damage_terms(damage_terms(effects), false, critical_rule, &mut table_dice);
                // On a success only damage marked half-on-save still lands.
                let (half_effects, half_damage): (Vec<_>, Vec<_>) = effects
                    .iter()
                    .filter(|e| matches!(e, AbilityEffect::Damage { .. }))
                    .zip(damage.iter())
                    .filter(|(e, _)| {
                        matches!(e, AbilityEffect::Damage { half_on_save: true, .. })
                    })
                    .map(|(e, d)| (*e, d.clone()))
                    .unzip();

                for target in targets {
                    let save = roll_save(state, target, ability, dc, None, &mut table_dice)?;
                    let saved = save.outcome.is_success();
                    let mut report = TargetReport::new(target);
                    report.save = Some(save);
                    if saved {
                        let context = EffectContext {
                            source: Some(self.caster),
                            damage: &half_damage,
                            halve: true,
                        };
                        apply_effects(
                            state,
                            target,
                            &half_effects,
                            &context,
                            &mut table_dice,
                            &mut report,
                        )?;
                    } else {
                        let context = EffectContext {
                            source: Some(self.caster),
                            damage: &damage,
                            halve: false,
                        };
                        let dice = &mut table_dice;
                        apply_effects(state, target, effects, &context, dice, &mut report)?;
                    }
                    reports.push(report);
                }
            }
            Resolution::SpellAttack { bonus, range } => {
                for target in targets.into_iter().filter(|&t| t != self.caster) {
                    let setup = prepare_attack(
                        state,
                        self.caster,
                        target,
                        range,
                        self.ability.range,
                        self.ability.range,
                        AdvantageState::Normal,
                    )?;
                    let (roll, outcome) = roll_attack(&setup, bonus, None, &mut table_dice);
                    let mut report = TargetReport::new(target);
                    report.attack = Some((roll, outcome));
                    if outcome.is_hit() {
                        let damage = roll_damage_terms(
                            damage_terms(effects),
                            outcome.is_critical(),
                            critical_rule,
                            &mut table_dice,
                        );
                        let context = EffectContext {
                            source: Some(self.caster),
                            damage: &damage,
                            halve: false,
                        };
                        let dice = &mut table_dice;
                        apply_effects(state, target, effects, &context, dice, &mut report)?;
                    }
                    reports.push(report);
                }
            }
        }

        Ok(ActionResult::Ability(AbilityReport {
            caster: self.caster,
            name: self.ability.name.clone(),
            targets: reports,
        }))
    }
}
