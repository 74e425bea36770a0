//! Weapon attacks.
//!
//! Range is measured footprint to footprint. Cover comes from the best line
//! between the two footprints; full cover forbids the attack and partial
//! cover raises the target's armor class.

use dice_resolution::{
    AdvantageState, AttackOutcome, AttackRange, ConditionKind, CriticalRule, D20Roll,
    DamageInstance, DamageType, Dice, DiceExpr, Proximity, ScriptedDice, attack_advantage,
    auto_critical, resolve_attack, roll_d20, roll_damage,
};
use grid_math::CoverType;

use crate::command::{Actor, AttackAction, OnHitCondition};
use crate::error::{CombatError, TargetingError, TransitionError};
use crate::result::{ActionResult, AttackReport, DamageReport};
use crate::state::{CombatState, ConditionInstance, Resource, TokenId};

use super::effects::{add_condition, deal_damage, roll_save};
use super::targeting::{
    able_actor, check_charm, hostile_adjacent, living_target, sight_between, token_distance,
};
use super::{Transition, require_control, require_in_progress};

/// Checks that `token` may spend `resource` right now. Off-turn only the
/// reaction is available.
pub(super) fn check_resource(
    state: &CombatState,
    token: TokenId,
    resource: Resource,
) -> Result<(), TransitionError> {
    let on_turn = state.active_token() == Some(token);
    if !on_turn && !matches!(resource, Resource::Reaction | Resource::Free) {
        return Err(TransitionError::NotTurn { token });
    }
    let available = state.economy(token).is_some_and(|e| e.has(resource));
    if !available {
        return Err(TransitionError::ResourceSpent(resource));
    }
    Ok(())
}

/// Armor-class bonus for a cover category under the table rules.
pub(super) fn cover_bonus(state: &CombatState, cover: CoverType) -> i32 {
    let bonuses = state.rules().cover;
    match cover {
        CoverType::Half => bonuses.half,
        CoverType::ThreeQuarters => bonuses.three_quarters,
        CoverType::None | CoverType::Full => 0,
    }
}

/// Everything decided before the dice are rolled.
pub(super) struct AttackSetup {
    pub advantage: AdvantageState,
    pub cover: CoverType,
    pub effective_ac: i32,
    pub auto_critical: bool,
}

/// Range, sight, cover and advantage for an attack roll by `attacker`
/// against `target`.
///
/// `normal_range` and `long_range` are in feet. Ranged attacks beyond normal
/// range, or with a hostile creature adjacent, roll with disadvantage.
/// Conditions on the target apply by distance, so a ranged shot from an
/// adjacent cell counts as close.
pub(super) fn prepare_attack(
    state: &CombatState,
    attacker: TokenId,
    target: TokenId,
    range: AttackRange,
    normal_range: u32,
    long_range: u32,
    declared: AdvantageState,
) -> Result<AttackSetup, CombatError> {
    if attacker == target {
        return Err(TargetingError::SelfTarget(attacker).into());
    }
    let attacking = state.token_ref(attacker)?;
    let defending = living_target(state, target)?;
    check_charm(attacking, target)?;

    let config = state.grid().config();
    let distance = token_distance(state, attacking, defending);
    let normal = config.feet_to_cells(normal_range).max(1);
    let long = match range {
        AttackRange::Melee => normal,
        AttackRange::Ranged => config.feet_to_cells(long_range).max(normal),
    };
    if distance > long {
        return Err(TargetingError::OutOfRange {
            distance,
            range: long,
        }
        .into());
    }

    let sight = sight_between(state, attacker, target);
    if sight.blocked {
        return Err(TargetingError::NoLineOfSight {
            from: attacker,
            to: target,
        }
        .into());
    }

    let attacker_kinds = attacking.creature.conditions.kinds();
    let target_kinds = defending.creature.conditions.kinds();
    let proximity = Proximity::from_cells(distance);
    let mut sources = vec![
        declared,
        attack_advantage(&attacker_kinds, &target_kinds, proximity),
    ];
    if range == AttackRange::Ranged {
        if distance > normal {
            sources.push(AdvantageState::Disadvantage);
        }
        if hostile_adjacent(state, attacking) {
            sources.push(AdvantageState::Disadvantage);
        }
    }

    Ok(AttackSetup {
        advantage: AdvantageState::combine(sources),
        cover: sight.cover,
        effective_ac: defending
            .creature
            .armor_class
            .saturating_add(cover_bonus(state, sight.cover)),
        auto_critical: auto_critical(&target_kinds, proximity),
    })
}

/// Resolves the d20 against the prepared armor class.
pub(super) fn roll_attack(
    setup: &AttackSetup,
    bonus: i32,
    supplied: Option<(u32, Option<u32>)>,
    dice: &mut dyn Dice,
) -> (D20Roll, AttackOutcome) {
    let roll = match supplied {
        Some((first, second)) => {
            let second = match (setup.advantage.dice() > 1, second) {
                (true, None) => Some(dice.roll(20)),
                (_, second) => second,
            };
            D20Roll::from_naturals(first, second, bonus, setup.advantage)
        }
        None => roll_d20(dice, bonus, setup.advantage),
    };
    let mut outcome = resolve_attack(&roll, setup.effective_ac, 0);
    if outcome.is_hit() && setup.auto_critical {
        outcome = outcome.promote();
    }
    (roll, outcome)
}

/// Rolls every damage term; critical hits follow the table's rule.
pub(super) fn roll_damage_terms(
    terms: impl IntoIterator<Item = (DiceExpr, DamageType)>,
    critical: bool,
    rule: CriticalRule,
    dice: &mut dyn Dice,
) -> Vec<(DamageInstance, Vec<u32>)> {
    terms
        .into_iter()
        .map(|(expr, damage_type)| {
            let rolled = roll_damage(dice, expr, damage_type, critical, rule);
            (rolled.instance, rolled.rolls)
        })
        .collect()
}

impl Transition for AttackAction {
    type Output = ActionResult;

    fn pre_validate(&self, actor: Actor, state: &CombatState) -> Result<(), CombatError> {
        require_in_progress(state)?;
        require_control(actor, self.attacker)?;
        self.attack.validate()?;
        able_actor(state, self.attacker)?;
        check_resource(state, self.attacker, self.resource)?;
        prepare_attack(
            state,
            self.attacker,
            self.target,
            self.attack.range,
            self.attack.normal_range,
            self.attack.long_range,
            self.advantage,
        )?;
        Ok(())
    }

    fn apply(
        &self,
        _actor: Actor,
        state: &mut CombatState,
        dice: &mut dyn Dice,
    ) -> Result<ActionResult, CombatError> {
        let setup = prepare_attack(
            state,
            self.attacker,
            self.target,
            self.attack.range,
            self.attack.normal_range,
            self.attack.long_range,
            self.advantage,
        )?;
        state.economy_mut(self.attacker).spend(self.resource)?;

        let supplied = self.roll.map(|r| (r.first, r.second));
        let (roll, outcome) = roll_attack(&setup, self.attack.attack_bonus, supplied, dice);

        let mut report = AttackReport {
            attacker: self.attacker,
            target: self.target,
            roll,
            advantage: setup.advantage,
            cover: setup.cover,
            effective_ac: setup.effective_ac,
            outcome,
            damage: None,
            on_hit_save: None,
            condition: None,
        };
        if !outcome.is_hit() {
            return Ok(ActionResult::Attack(report));
        }

        let critical_rule = state.rules().critical;
        let mut damage_dice =
            ScriptedDice::with_fallback(self.damage_rolls.iter().copied(), &mut *dice);
        let rolled = roll_damage_terms(
            self.attack
                .damage
                .iter()
                .map(|term| (term.dice, term.damage_type)),
            outcome.is_critical(),
            critical_rule,
            &mut damage_dice,
        );
        if !rolled.is_empty() {
            report.damage = Some(apply_rolled_damage(state, self.target, rolled)?);
        }

        if let Some(on_hit) = self.attack.on_hit {
            let condition = apply_on_hit(state, self, on_hit, dice, &mut report)?;
            report.condition = condition;
        }
        Ok(ActionResult::Attack(report))
    }
}

pub(super) fn apply_rolled_damage(
    state: &mut CombatState,
    target: TokenId,
    rolled: Vec<(DamageInstance, Vec<u32>)>,
) -> Result<DamageReport, CombatError> {
    let (instances, rolls): (Vec<_>, Vec<_>) = rolled.into_iter().unzip();
    deal_damage(state, target, instances, rolls.concat())
}

/// Imposes an attack's rider condition, offering the save if it has one.
fn apply_on_hit(
    state: &mut CombatState,
    action: &AttackAction,
    on_hit: OnHitCondition,
    dice: &mut dyn Dice,
    report: &mut AttackReport,
) -> Result<Option<ConditionKind>, CombatError> {
    if state.token_ref(action.target)?.creature.is_dead() {
        return Ok(None);
    }
    if let Some(save) = on_hit.save {
        let result = roll_save(state, action.target, save.ability, save.dc, None, dice)?;
        let resisted = result.outcome.is_success();
        report.on_hit_save = Some(result);
        if resisted {
            return Ok(None);
        }
    }
    let instance =
        ConditionInstance::new(on_hit.condition, on_hit.duration).from_source(action.attacker);
    add_condition(state, action.target, instance)?;
    Ok(Some(on_hit.condition))
}
