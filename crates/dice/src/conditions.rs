//! Condition table.
//!
//! Each condition kind maps to a static row of mechanical effects. Roll
//! helpers fold the rows of every condition on the actor and on the target,
//! so the state machine never special-cases a condition by name.

use crate::ability::Ability;
use crate::roll::AdvantageState;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ConditionKind {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

/// Whether an attack is made in melee or at range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AttackRange {
    #[default]
    Melee,
    Ranged,
}

/// Where the attacker stands relative to its target. Conditions such as
/// prone care about distance, not about the weapon used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Proximity {
    /// Within 5 feet: one cell or less between footprints.
    Adjacent,
    Distant,
}

impl Proximity {
    pub const fn from_cells(distance: u32) -> Self {
        if distance <= 1 {
            Proximity::Adjacent
        } else {
            Proximity::Distant
        }
    }
}

/// Mechanical effects of one condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionEffects {
    /// Applied to the affected creature's own attack rolls.
    pub own_attacks: AdvantageState,
    /// Applied to attack rolls against the affected creature from an
    /// adjacent attacker, whatever the weapon.
    pub attacked_adjacent: AdvantageState,
    /// Applied to attack rolls against the affected creature from further
    /// away.
    pub attacked_from_afar: AdvantageState,
    /// Hits from an adjacent attacker are critical hits.
    pub auto_critical_adjacent: bool,
    /// No actions, bonus actions or reactions.
    pub incapacitated: bool,
    pub speed_zero: bool,
    /// Movement cost multiplier while affected (crawling doubles cost).
    pub movement_multiplier: u32,
    pub auto_fail_str_dex_saves: bool,
    pub dex_save_disadvantage: bool,
    /// May not attack or target the creature that imposed the condition.
    pub cannot_target_source: bool,
}

impl ConditionEffects {
    const NONE: Self = Self {
        own_attacks: AdvantageState::Normal,
        attacked_adjacent: AdvantageState::Normal,
        attacked_from_afar: AdvantageState::Normal,
        auto_critical_adjacent: false,
        incapacitated: false,
        speed_zero: false,
        movement_multiplier: 1,
        auto_fail_str_dex_saves: false,
        dex_save_disadvantage: false,
        cannot_target_source: false,
    };

    /// Paralyzed, petrified, stunned and unconscious share this core.
    const HELPLESS: Self = Self {
        attacked_adjacent: AdvantageState::Advantage,
        attacked_from_afar: AdvantageState::Advantage,
        incapacitated: true,
        speed_zero: true,
        auto_fail_str_dex_saves: true,
        ..Self::NONE
    };
}

const BLINDED: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Disadvantage,
    attacked_adjacent: AdvantageState::Advantage,
    attacked_from_afar: AdvantageState::Advantage,
    ..ConditionEffects::NONE
};

const CHARMED: ConditionEffects = ConditionEffects {
    cannot_target_source: true,
    ..ConditionEffects::NONE
};

const FRIGHTENED: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Disadvantage,
    ..ConditionEffects::NONE
};

const GRAPPLED: ConditionEffects = ConditionEffects {
    speed_zero: true,
    ..ConditionEffects::NONE
};

const INCAPACITATED: ConditionEffects = ConditionEffects {
    incapacitated: true,
    ..ConditionEffects::NONE
};

const INVISIBLE: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Advantage,
    attacked_adjacent: AdvantageState::Disadvantage,
    attacked_from_afar: AdvantageState::Disadvantage,
    ..ConditionEffects::NONE
};

const PARALYZED: ConditionEffects = ConditionEffects {
    auto_critical_adjacent: true,
    ..ConditionEffects::HELPLESS
};

const POISONED: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Disadvantage,
    ..ConditionEffects::NONE
};

const PRONE: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Disadvantage,
    attacked_adjacent: AdvantageState::Advantage,
    attacked_from_afar: AdvantageState::Disadvantage,
    movement_multiplier: 2,
    ..ConditionEffects::NONE
};

const RESTRAINED: ConditionEffects = ConditionEffects {
    own_attacks: AdvantageState::Disadvantage,
    attacked_adjacent: AdvantageState::Advantage,
    attacked_from_afar: AdvantageState::Advantage,
    speed_zero: true,
    dex_save_disadvantage: true,
    ..ConditionEffects::NONE
};

const UNCONSCIOUS: ConditionEffects = ConditionEffects {
    auto_critical_adjacent: true,
    ..ConditionEffects::HELPLESS
};

impl ConditionKind {
    pub const fn effects(self) -> &'static ConditionEffects {
        match self {
            ConditionKind::Blinded => &BLINDED,
            ConditionKind::Charmed => &CHARMED,
            ConditionKind::Deafened => &ConditionEffects::NONE,
            ConditionKind::Frightened => &FRIGHTENED,
            ConditionKind::Grappled => &GRAPPLED,
            ConditionKind::Incapacitated => &INCAPACITATED,
            ConditionKind::Invisible => &INVISIBLE,
            ConditionKind::Paralyzed => &PARALYZED,
            ConditionKind::Petrified => &ConditionEffects::HELPLESS,
            ConditionKind::Poisoned => &POISONED,
            ConditionKind::Prone => &PRONE,
            ConditionKind::Restrained => &RESTRAINED,
            ConditionKind::Stunned => &ConditionEffects::HELPLESS,
            ConditionKind::Unconscious => &UNCONSCIOUS,
        }
    }
}

/// Advantage state of an attack roll given the conditions on both sides.
pub fn attack_advantage(
    attacker: &[ConditionKind],
    target: &[ConditionKind],
    proximity: Proximity,
) -> AdvantageState {
    let own = attacker.iter().map(|c| c.effects().own_attacks);
    let against = target.iter().map(|c| {
        let effects = c.effects();
        match proximity {
            Proximity::Adjacent => effects.attacked_adjacent,
            Proximity::Distant => effects.attacked_from_afar,
        }
    });
    AdvantageState::combine(own.chain(against))
}

/// Whether a hit from `proximity` is automatically critical.
pub fn auto_critical(target: &[ConditionKind], proximity: Proximity) -> bool {
    proximity == Proximity::Adjacent && target.iter().any(|c| c.effects().auto_critical_adjacent)
}

/// Condition-driven adjustment of one saving throw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveAdjustment {
    pub advantage: AdvantageState,
    pub auto_fail: bool,
}

pub fn save_adjustment(conditions: &[ConditionKind], ability: Ability) -> SaveAdjustment {
    let physical = matches!(ability, Ability::Strength | Ability::Dexterity);
    let auto_fail = physical && conditions.iter().any(|c| c.effects().auto_fail_str_dex_saves);
    let disadvantage = ability == Ability::Dexterity
        && conditions.iter().any(|c| c.effects().dex_save_disadvantage);
    SaveAdjustment {
        advantage: AdvantageState::from_flags(false, disadvantage),
        auto_fail,
    }
}

pub fn is_incapacitated(conditions: &[ConditionKind]) -> bool {
    conditions.iter().any(|c| c.effects().incapacitated)
}

pub fn speed_is_zero(conditions: &[ConditionKind]) -> bool {
    conditions.iter().any(|c| c.effects().speed_zero)
}

/// Largest movement cost multiplier among the conditions.
pub fn movement_multiplier(conditions: &[ConditionKind]) -> u32 {
    conditions
        .iter()
        .map(|c| c.effects().movement_multiplier)
        .max()
        .unwrap_or(1)
}
