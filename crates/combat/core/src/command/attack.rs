use dice_resolution::{Ability, AdvantageState, AttackRange, ConditionKind, DamageType, DiceExpr};

use crate::state::{ConditionDuration, Resource, TokenId};

/// One damage term of an attack, e.g. `1d8+3 slashing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageDice {
    pub dice: DiceExpr,
    pub damage_type: DamageType,
}

impl DamageDice {
    pub const fn new(dice: DiceExpr, damage_type: DamageType) -> Self {
        Self { dice, damage_type }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveDc {
    pub ability: Ability,
    pub dc: i32,
}

/// Condition imposed by a hit, optionally resisted with a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnHitCondition {
    pub condition: ConditionKind,
    pub duration: ConditionDuration,
    pub save: Option<SaveDc>,
}

/// Weapon or natural attack statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackProfile {
    pub name: String,
    pub range: AttackRange,
    /// Reach for melee attacks, normal range for ranged ones (feet).
    pub normal_range: u32,
    /// Ranged attacks beyond normal range and up to this distance roll with
    /// disadvantage. Ignored for melee.
    pub long_range: u32,
    pub attack_bonus: i32,
    pub damage: Vec<DamageDice>,
    pub on_hit: Option<OnHitCondition>,
}

impl AttackProfile {
    pub fn melee(name: impl Into<String>, attack_bonus: i32, damage: Vec<DamageDice>) -> Self {
        Self {
            name: name.into(),
            range: AttackRange::Melee,
            normal_range: 5,
            long_range: 5,
            attack_bonus,
            damage,
            on_hit: None,
        }
    }

    pub fn ranged(
        name: impl Into<String>,
        attack_bonus: i32,
        normal_range: u32,
        long_range: u32,
        damage: Vec<DamageDice>,
    ) -> Self {
        Self {
            name: name.into(),
            range: AttackRange::Ranged,
            normal_range,
            long_range: long_range.max(normal_range),
            attack_bonus,
            damage,
            on_hit: None,
        }
    }

    /// Greatest reach in feet.
    pub fn max_range(&self) -> u32 {
        match self.range {
            AttackRange::Melee => self.normal_range,
            AttackRange::Ranged => self.long_range.max(self.normal_range),
        }
    }
}

/// d20 faces rolled at the table. `second` is read only under advantage or
/// disadvantage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuppliedD20 {
    pub first: u32,
    pub second: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackAction {
    pub attacker: TokenId,
    pub target: TokenId,
    pub attack: AttackProfile,
    /// Action, bonus action or reaction. Only reactions work off-turn.
    pub resource: Resource,
    /// Physical attack roll; rolled by the engine when absent.
    pub roll: Option<SuppliedD20>,
    /// Physical damage dice in roll order; missing dice are rolled.
    pub damage_rolls: Vec<u32>,
    /// Advantage declared by the command, folded with condition effects.
    pub advantage: AdvantageState,
}

impl AttackAction {
    pub fn new(attacker: TokenId, target: TokenId, attack: AttackProfile) -> Self {
        Self {
            attacker,
            target,
            attack,
            resource: Resource::Action,
            roll: None,
            damage_rolls: Vec::new(),
            advantage: AdvantageState::Normal,
        }
    }

    pub fn with_roll(mut self, first: u32) -> Self {
        self.roll = Some(SuppliedD20 {
            first,
            second: None,
        });
        self
    }

    pub fn with_damage_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.damage_rolls = rolls.into_iter().collect();
        self
    }
}
