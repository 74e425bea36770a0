//! Typed outcomes returned alongside the state delta.

use dice_resolution::{
    Ability, AdvantageState, AttackOutcome, ConditionKind, D20Roll, DamageInstance, HitPoints,
    SaveOutcome,
};
use grid_math::{CoverType, Path};

use crate::state::{ConditionUpdate, InitiativeEntry, TokenId, Vitality};

/// Command-specific result of a successful execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionResult {
    /// Token placement or terrain edit.
    Setup,
    InitiativeRecorded(InitiativeEntry),
    Started { order: Vec<InitiativeEntry> },
    Moved { token: TokenId, path: Path },
    Attack(AttackReport),
    SavingThrow(Vec<TargetReport>),
    Ability(AbilityReport),
    ConditionApplied {
        target: TokenId,
        kind: ConditionKind,
        update: ConditionUpdate,
    },
    ConditionRemoved {
        target: TokenId,
        kind: ConditionKind,
        removed: bool,
    },
    TurnEnded(TurnEndReport),
    TokenRemoved(TokenId),
    CombatEnded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveReport {
    pub target: TokenId,
    pub ability: Ability,
    pub dc: i32,
    /// `None` when a condition made the save fail automatically.
    pub roll: Option<D20Roll>,
    pub outcome: SaveOutcome,
}

/// Damage dealt to one token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub target: TokenId,
    /// Dice rolled for this damage, including critical extras.
    pub rolls: Vec<u32>,
    pub instances: Vec<DamageInstance>,
    /// After resistances, vulnerabilities and immunities.
    pub taken: u32,
    pub hit_points: HitPoints,
    pub vitality: Vitality,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub attacker: TokenId,
    pub target: TokenId,
    pub roll: D20Roll,
    pub advantage: AdvantageState,
    pub cover: CoverType,
    /// Armor class including the cover bonus.
    pub effective_ac: i32,
    pub outcome: AttackOutcome,
    pub damage: Option<DamageReport>,
    pub on_hit_save: Option<SaveReport>,
    pub condition: Option<ConditionKind>,
}

/// What happened to one target of a save or ability.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetReport {
    pub target: TokenId,
    pub save: Option<SaveReport>,
    pub attack: Option<(D20Roll, AttackOutcome)>,
    pub damage: Option<DamageReport>,
    pub healed: u32,
    pub conditions_applied: Vec<ConditionKind>,
    pub conditions_removed: Vec<ConditionKind>,
    /// Cells moved by forced movement.
    pub moved: u32,
    pub movement_granted: u32,
}

impl TargetReport {
    pub fn new(target: TokenId) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityReport {
    pub caster: TokenId,
    pub name: String,
    pub targets: Vec<TargetReport>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnEndReport {
    pub token: TokenId,
    /// Round-based conditions that ran out.
    pub expired: Vec<ConditionKind>,
    /// Saves rolled against save-ended conditions.
    pub saves: Vec<(ConditionKind, SaveReport)>,
}
