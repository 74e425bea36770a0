//! Range checks on numbers carried by commands.
//!
//! Bonuses, DCs and dice come straight from clients, so every transition
//! checks them before any arithmetic or dice rolling happens.

use dice_resolution::DiceExpr;

use crate::config::CombatConfig;
use crate::error::ValidationError;
use crate::state::ConditionDuration;

use super::{AbilityDefinition, AbilityEffect, AttackProfile, Resolution};

pub(crate) fn check_modifier(value: i32) -> Result<(), ValidationError> {
    let max = CombatConfig::MAX_MODIFIER;
    if value.unsigned_abs() > max.unsigned_abs() {
        return Err(ValidationError::ModifierOutOfRange { value, max });
    }
    Ok(())
}

pub(crate) fn check_dice(expr: DiceExpr) -> Result<(), ValidationError> {
    if !expr.is_within_limits() {
        return Err(ValidationError::DiceOutOfRange(expr));
    }
    Ok(())
}

pub(crate) fn check_duration(duration: ConditionDuration) -> Result<(), ValidationError> {
    match duration {
        ConditionDuration::Rounds(0) => Err(ValidationError::ZeroDuration),
        ConditionDuration::UntilSave { dc, .. } => check_modifier(dc),
        ConditionDuration::Rounds(_) | ConditionDuration::Permanent => Ok(()),
    }
}

pub(crate) fn check_effects(effects: &[AbilityEffect]) -> Result<(), ValidationError> {
    effects.iter().try_for_each(AbilityEffect::validate)
}

impl AbilityEffect {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            AbilityEffect::Damage { dice, .. } | AbilityEffect::Heal { dice } => check_dice(dice),
            AbilityEffect::ApplyCondition { duration, .. } => check_duration(duration),
            AbilityEffect::GrantMovement { cells } => {
                let max = CombatConfig::MAX_GRANTED_MOVEMENT;
                if cells > max {
                    return Err(ValidationError::MovementOutOfRange { cells, max });
                }
                Ok(())
            }
            AbilityEffect::RemoveCondition { .. } | AbilityEffect::ForcedMovement { .. } => Ok(()),
        }
    }
}

impl AttackProfile {
    /// Checks the attack bonus, damage dice and on-hit save against the
    /// engine's limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_modifier(self.attack_bonus)?;
        for term in &self.damage {
            check_dice(term.dice)?;
        }
        if let Some(on_hit) = self.on_hit {
            check_duration(on_hit.duration)?;
            if let Some(save) = on_hit.save {
                check_modifier(save.dc)?;
            }
        }
        Ok(())
    }
}

impl AbilityDefinition {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.resolution {
            Resolution::Automatic => {}
            Resolution::Save { dc, .. } => check_modifier(dc)?,
            Resolution::SpellAttack { bonus, .. } => check_modifier(bonus)?,
        }
        check_effects(&self.effects)
    }
}

#[cfg(test)]
mod tests {
    use dice_resolution::{Ability, ConditionKind, DamageType};

    use super::*;
    use crate::command::DamageDice;
    use crate::state::Resource;

    fn damage(dice: DiceExpr) -> AbilityEffect {
        AbilityEffect::Damage {
            dice,
            damage_type: DamageType::Fire,
            half_on_save: true,
        }
    }

    #[test]
    fn modifiers_are_bounded_both_ways() {
        let max = CombatConfig::MAX_MODIFIER;
        assert_eq!(check_modifier(max), Ok(()));
        assert_eq!(check_modifier(-max), Ok(()));
        assert_eq!(
            check_modifier(i32::MIN),
            Err(ValidationError::ModifierOutOfRange { value: i32::MIN, max })
        );
    }

    #[test]
    fn attack_profiles_reject_oversized_numbers() {
        let sword = DamageDice::new(DiceExpr::new(1, 8, 0), DamageType::Slashing);
        assert_eq!(AttackProfile::melee("sword", 5, vec![sword]).validate(), Ok(()));
        assert!(matches!(
            AttackProfile::melee("sword", i32::MAX, vec![sword]).validate(),
            Err(ValidationError::ModifierOutOfRange { .. })
        ));

        let huge = DamageDice::new(DiceExpr::new(u32::MAX, 6, 0), DamageType::Slashing);
        assert_eq!(
            AttackProfile::melee("maul", 5, vec![huge]).validate(),
            Err(ValidationError::DiceOutOfRange(huge.dice))
        );
    }

    #[test]
    fn ability_definitions_check_every_effect() {
        let mut ability = AbilityDefinition {
            name: "fireball".into(),
            cost: Resource::Action,
            range: 150,
            area: None,
            resolution: Resolution::Save {
                ability: Ability::Dexterity,
                dc: 15,
            },
            effects: vec![damage(DiceExpr::new(8, 6, 0))],
            requires_sight: true,
        };
        assert_eq!(ability.validate(), Ok(()));

        ability.effects.push(AbilityEffect::Heal {
            dice: DiceExpr::new(2_000_000_000, 8, 0),
        });
        assert!(matches!(ability.validate(), Err(ValidationError::DiceOutOfRange(_))));

        ability.effects.pop();
        ability.effects.push(AbilityEffect::ApplyCondition {
            condition: ConditionKind::Frightened,
            duration: ConditionDuration::UntilSave {
                ability: Ability::Wisdom,
                dc: i32::MAX,
            },
        });
        assert!(matches!(ability.validate(), Err(ValidationError::ModifierOutOfRange { .. })));

        ability.effects.pop();
        ability.effects.push(AbilityEffect::GrantMovement { cells: u32::MAX });
        assert!(matches!(ability.validate(), Err(ValidationError::MovementOutOfRange { .. })));
    }
}
