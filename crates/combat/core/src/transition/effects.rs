//! Effects shared by attacks, saves and abilities.

use dice_resolution::{
    Ability, ConditionKind, D20Roll, DamageInstance, Dice, SaveOutcome, apply_damage, heal,
    resolve_saving_throw, roll_d20, save_adjustment,
};
use grid_math::{Coord, Footprint};

use crate::command::{AbilityEffect, ForcedMovementKind};
use crate::config::CombatConfig;
use crate::error::{CombatError, ValidationError};
use crate::result::{DamageReport, SaveReport, TargetReport};
use crate::state::{
    CombatState, ConditionDuration, ConditionInstance, ConditionUpdate, TokenId, Vitality,
};

/// Rolls a saving throw for `target`, honouring condition adjustments.
/// A supplied face replaces the first d20.
pub(crate) fn roll_save(
    state: &CombatState,
    target: TokenId,
    ability: Ability,
    dc: i32,
    supplied: Option<u32>,
    dice: &mut dyn Dice,
) -> Result<SaveReport, CombatError> {
    let token = state.token_ref(target)?;
    let adjustment = save_adjustment(&token.creature.conditions.kinds(), ability);
    if adjustment.auto_fail {
        return Ok(SaveReport {
            target,
            ability,
            dc,
            roll: None,
            outcome: SaveOutcome::Failure,
        });
    }

    let modifier = token.creature.save_modifier(ability);
    let roll = match supplied {
        Some(first) => {
            let second = (adjustment.advantage.dice() > 1).then(|| dice.roll(20));
            D20Roll::from_naturals(first, second, modifier, adjustment.advantage)
        }
        None => roll_d20(dice, modifier, adjustment.advantage),
    };
    Ok(SaveReport {
        target,
        ability,
        dc,
        outcome: resolve_saving_throw(&roll, dc, state.rules().save_extremes),
        roll: Some(roll),
    })
}

/// Applies damage and resolves dropping to 0 HP.
///
/// With instant death enabled, damage left over after reaching 0 HP that is
/// at least the creature's maximum kills it outright. Otherwise a creature
/// at 0 HP falls unconscious and prone. Dead tokens leave the board.
pub(crate) fn deal_damage(
    state: &mut CombatState,
    target: TokenId,
    instances: Vec<DamageInstance>,
    rolls: Vec<u32>,
) -> Result<DamageReport, CombatError> {
    let instant_death = state.rules().instant_death;
    let token = state.token_mut(target)?;
    let creature = &mut token.creature;
    let result = apply_damage(creature.hit_points, &creature.damage_profile, &instances);
    creature.hit_points = result.hit_points;

    let mut killed = false;
    if result.hit_points.is_zero() && !creature.is_dead() {
        if instant_death && result.overflow >= result.hit_points.max {
            creature.vitality = Vitality::Dead;
            killed = true;
        } else if creature.vitality == Vitality::Alive {
            creature.vitality = Vitality::Unconscious;
            for kind in [ConditionKind::Unconscious, ConditionKind::Prone] {
                creature
                    .conditions
                    .apply(ConditionInstance::new(kind, ConditionDuration::Permanent));
            }
        }
    }
    let report = DamageReport {
        target,
        rolls,
        instances,
        taken: result.taken,
        hit_points: result.hit_points,
        vitality: creature.vitality,
    };

    if killed {
        state.clear_from_board(target);
    }
    Ok(report)
}

/// Restores hit points. Dead creatures stay dead; an unconscious creature
/// brought above 0 HP wakes up (still prone).
pub(crate) fn restore_hit_points(
    state: &mut CombatState,
    target: TokenId,
    amount: u32,
) -> Result<u32, CombatError> {
    let creature = &mut state.token_mut(target)?.creature;
    if creature.is_dead() {
        return Ok(0);
    }
    let before = creature.hit_points.current;
    creature.hit_points = heal(creature.hit_points, amount);
    if creature.hit_points.current > 0 && creature.vitality == Vitality::Unconscious {
        creature.vitality = Vitality::Alive;
        creature.conditions.remove(ConditionKind::Unconscious);
    }
    Ok(creature.hit_points.current - before)
}

pub(crate) fn add_condition(
    state: &mut CombatState,
    target: TokenId,
    instance: ConditionInstance,
) -> Result<ConditionUpdate, CombatError> {
    let token = state.token_mut(target)?;
    match token.creature.conditions.apply(instance) {
        ConditionUpdate::Full => Err(ValidationError::ConditionLimit {
            token: target,
            kind: instance.kind,
        }
        .into()),
        update => Ok(update),
    }
}

/// Pushes or pulls a token one cell at a time relative to `source`, ending
/// early at the first step that cannot improve the distance. Movement cost
/// and budget are ignored. Returns the cells moved.
pub(crate) fn force_move(
    state: &mut CombatState,
    source: TokenId,
    target: TokenId,
    distance: u32,
    kind: ForcedMovementKind,
) -> Result<u32, CombatError> {
    if source == target {
        return Ok(0);
    }
    let config = *state.grid().config();
    let (Some(from), Some(mover)) = (state.token(source), state.token(target)) else {
        return Ok(0);
    };
    if mover.creature.is_dead() {
        return Ok(0);
    }
    let source_place = from.placement();
    let footprint = mover.footprint();
    let source_center = config.center(source_place.0);
    let mut anchor = mover.position;

    let steps = distance.min(CombatConfig::MAX_FORCED_MOVEMENT);
    let mut moved = 0;
    for _ in 0..steps {
        let current = Footprint::distance_between(&config, source_place, (anchor, footprint));
        let occupied = state.occupied_except(&[target]);
        let candidates = config.neighbors(anchor).filter_map(|next| {
            if !state.grid().footprint_fits(next, footprint, &occupied) {
                return None;
            }
            let d = Footprint::distance_between(&config, source_place, (next, footprint));
            let improves = match kind {
                ForcedMovementKind::Push => d > current,
                ForcedMovementKind::Pull => d < current && d >= 1,
            };
            let off_course = deviation(source_center, config.center(anchor), config.center(next));
            improves.then_some((next, d, off_course))
        });
        let best = candidates.min_by(|a, b| {
            let by_distance = match kind {
                ForcedMovementKind::Push => b.1.cmp(&a.1),
                ForcedMovementKind::Pull => a.1.cmp(&b.1),
            };
            by_distance
                .then(a.2.total_cmp(&b.2))
                .then(a.0.cmp(&b.0))
        });
        let Some((next, _, _)) = best else {
            break;
        };
        anchor = next;
        moved += 1;
    }

    if moved > 0 {
        state.relocate(target, anchor)?;
    }
    Ok(moved)
}

/// Distance of `next` from the line through the source and the current
/// position, so forced movement stays on course.
fn deviation(source: (f64, f64), current: (f64, f64), next: (f64, f64)) -> f64 {
    let (dx, dy) = (current.0 - source.0, current.1 - source.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return 0.0;
    }
    ((next.0 - source.0) * dy - (next.1 - source.1) * dx).abs() / length
}

/// Inputs shared by every target of one effect list. Damage is rolled once
/// per command: `damage` holds one rolled instance per damage effect, in
/// order, and `halve` halves them for this target.
pub(crate) struct EffectContext<'a> {
    pub source: Option<TokenId>,
    pub damage: &'a [(DamageInstance, Vec<u32>)],
    pub halve: bool,
}

/// Applies a list of ability effects to one target.
pub(crate) fn apply_effects(
    state: &mut CombatState,
    target: TokenId,
    effects: &[AbilityEffect],
    context: &EffectContext<'_>,
    dice: &mut dyn Dice,
    report: &mut TargetReport,
) -> Result<(), CombatError> {
    let mut damage = Vec::new();
    let mut damage_rolls = Vec::new();
    let mut rolled = context.damage.iter();

    for effect in effects {
        match *effect {
            AbilityEffect::Damage { .. } => {
                if let Some((instance, rolls)) = rolled.next() {
                    let amount = if context.halve {
                        instance.amount / 2
                    } else {
                        instance.amount
                    };
                    damage.push(DamageInstance::new(amount, instance.damage_type));
                    damage_rolls.extend_from_slice(rolls);
                }
            }
            AbilityEffect::Heal { dice: expr } => {
                let total: i64 = dice
                    .roll_many(expr.count, expr.sides)
                    .into_iter()
                    .map(i64::from)
                    .sum::<i64>()
                    + i64::from(expr.bonus);
                let amount = total.clamp(0, i64::from(u32::MAX)) as u32;
                report.healed = report
                    .healed
                    .saturating_add(restore_hit_points(state, target, amount)?);
            }
            AbilityEffect::ApplyCondition {
                condition,
                duration,
            } => {
                if matches!(duration, ConditionDuration::Rounds(0)) {
                    return Err(ValidationError::ZeroDuration.into());
                }
                let mut instance = ConditionInstance::new(condition, duration);
                if let Some(source) = context.source {
                    instance = instance.from_source(source);
                }
                if state.token_ref(target)?.creature.is_dead() {
                    continue;
                }
                add_condition(state, target, instance)?;
                report.conditions_applied.push(condition);
            }
            AbilityEffect::RemoveCondition { condition } => {
                if state.token_mut(target)?.creature.conditions.remove(condition) {
                    report.conditions_removed.push(condition);
                }
            }
            AbilityEffect::ForcedMovement { distance, kind } => {
                if let Some(source) = context.source {
                    report.moved += force_move(state, source, target, distance, kind)?;
                }
            }
            AbilityEffect::GrantMovement { cells } => {
                if !state.token_ref(target)?.creature.is_dead() {
                    let economy = state.economy_mut(target);
                    economy.granted_movement = economy.granted_movement.saturating_add(cells);
                    report.movement_granted = report.movement_granted.saturating_add(cells);
                }
            }
        }
    }

    if !damage.is_empty() {
        report.damage = Some(deal_damage(state, target, damage, damage_rolls)?);
    }
    Ok(())
}

/// Cells a token's footprint covers, empty for unknown tokens.
pub(crate) fn footprint_cells(state: &CombatState, target: TokenId) -> Vec<Coord> {
    state
        .token(target)
        .map(|t| t.cells(state.grid().config()))
        .unwrap_or_default()
}
