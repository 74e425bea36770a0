//! Parameterized abilities: spells, breath weapons, class features.
//!
//! The engine knows nothing about specific abilities. A definition names its
//! cost, reach, optional area, how targets resist, and a closed list of
//! effects.

use dice_resolution::{Ability, AttackRange, ConditionKind, DamageType, DiceExpr};
use grid_math::{AreaShape, Coord, Direction};

use crate::state::{ConditionDuration, Resource, TokenId};

/// How each target resists an ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Resolution {
    /// Effects always apply.
    #[default]
    Automatic,
    /// Each target saves; effects apply on a failure.
    Save { ability: Ability, dc: i32 },
    /// The caster makes an attack roll against each target.
    SpellAttack { bonus: i32, range: AttackRange },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ForcedMovementKind {
    /// Away from the source.
    Push,
    /// Toward the source.
    Pull,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityEffect {
    Damage {
        dice: DiceExpr,
        damage_type: DamageType,
        /// Targets that succeed on the save still take half.
        half_on_save: bool,
    },
    Heal {
        dice: DiceExpr,
    },
    ApplyCondition {
        condition: ConditionKind,
        duration: ConditionDuration,
    },
    RemoveCondition {
        condition: ConditionKind,
    },
    /// Moves the target in cells, ignoring movement cost and budget.
    ForcedMovement {
        distance: u32,
        kind: ForcedMovementKind,
    },
    /// Extra movement for the target, usable on or off its turn.
    GrantMovement {
        cells: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub name: String,
    pub cost: Resource,
    /// Reach to targets or to the area origin in feet. Zero means self or
    /// adjacent cells only.
    pub range: u32,
    pub area: Option<AreaShape>,
    pub resolution: Resolution,
    pub effects: Vec<AbilityEffect>,
    /// Whether targets (or the area origin) must be in sight of the caster.
    #[cfg_attr(feature = "serde", serde(default = "default_requires_sight"))]
    pub requires_sight: bool,
}

#[cfg(feature = "serde")]
fn default_requires_sight() -> bool {
    true
}

/// Who an ability is aimed at.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetSelection {
    Tokens(Vec<TokenId>),
    /// Every token caught by the ability's area placed at `origin`.
    Area {
        origin: Coord,
        direction: Option<Direction>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseAbilityAction {
    pub caster: TokenId,
    pub ability: AbilityDefinition,
    pub targets: TargetSelection,
    /// Physical dice in roll order; missing dice are rolled.
    pub rolls: Vec<u32>,
}

impl UseAbilityAction {
    pub fn new(caster: TokenId, ability: AbilityDefinition, targets: TargetSelection) -> Self {
        Self {
            caster,
            ability,
            targets,
            rolls: Vec::new(),
        }
    }
}
