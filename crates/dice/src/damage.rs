//! Damage rolls, damage profiles and hit point bookkeeping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::rng::Dice;
use crate::rules::CriticalRule;

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
pub enum DamageType {
    Acid,
    Bludgeoning,
    Cold,
    Fire,
    Force,
    Lightning,
    Necrotic,
    Piercing,
    Poison,
    Psychic,
    Radiant,
    Slashing,
    Thunder,
}

/// How a creature takes one damage type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageModifier {
    #[default]
    Normal,
    /// Half damage, rounded down.
    Resistant,
    /// Double damage.
    Vulnerable,
    Immune,
}

impl DamageModifier {
    pub const fn apply(self, amount: u32) -> u32 {
        match self {
            DamageModifier::Normal => amount,
            DamageModifier::Resistant => amount / 2,
            DamageModifier::Vulnerable => amount.saturating_mul(2),
            DamageModifier::Immune => 0,
        }
    }
}

/// Per-type resistances, vulnerabilities and immunities. Unlisted types
/// are taken normally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DamageProfile {
    modifiers: BTreeMap<DamageType, DamageModifier>,
}

impl DamageProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, damage_type: DamageType, modifier: DamageModifier) -> Self {
        self.set(damage_type, modifier);
        self
    }

    pub fn set(&mut self, damage_type: DamageType, modifier: DamageModifier) {
        if modifier == DamageModifier::Normal {
            self.modifiers.remove(&damage_type);
        } else {
            self.modifiers.insert(damage_type, modifier);
        }
    }

    pub fn modifier(&self, damage_type: DamageType) -> DamageModifier {
        self.modifiers.get(&damage_type).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DamageType, DamageModifier)> + '_ {
        self.modifiers.iter().map(|(&t, &m)| (t, m))
    }
}

impl FromIterator<(DamageType, DamageModifier)> for DamageProfile {
    fn from_iter<I: IntoIterator<Item = (DamageType, DamageModifier)>>(iter: I) -> Self {
        let mut profile = Self::new();
        for (damage_type, modifier) in iter {
            profile.set(damage_type, modifier);
        }
        profile
    }
}

/// Rolled damage of a single type, before the target's profile applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageInstance {
    pub amount: u32,
    pub damage_type: DamageType,
}

impl DamageInstance {
    pub const fn new(amount: u32, damage_type: DamageType) -> Self {
        Self {
            amount,
            damage_type,
        }
    }
}

/// Dice expression such as `2d6+3`. Serialized in that notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceExpr {
    /// Most dice a single expression may roll.
    pub const MAX_COUNT: u32 = 100;
    /// Largest die an expression may name.
    pub const MAX_SIDES: u32 = 1000;
    /// Largest flat bonus either way.
    pub const MAX_BONUS: i32 = 1000;

    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// A flat amount with no dice.
    pub const fn flat(bonus: i32) -> Self {
        Self::new(0, 0, bonus)
    }

    pub const fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Whether the expression stays inside [`MAX_COUNT`](Self::MAX_COUNT),
    /// [`MAX_SIDES`](Self::MAX_SIDES) and [`MAX_BONUS`](Self::MAX_BONUS).
    pub const fn is_within_limits(&self) -> bool {
        self.count <= Self::MAX_COUNT
            && self.sides <= Self::MAX_SIDES
            && self.bonus.unsigned_abs() <= Self::MAX_BONUS as u32
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("empty dice expression")]
    Empty,

    #[error("invalid dice count '{0}'")]
    Count(String),

    #[error("invalid die size '{0}'")]
    Sides(String),

    #[error("invalid modifier '{0}'")]
    Modifier(String),
}

impl FromStr for DiceExpr {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let notation = notation.to_ascii_lowercase();
        if notation.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let Some(d_pos) = notation.find('d') else {
            return notation
                .parse::<i32>()
                .ok()
                .filter(|b| b.unsigned_abs() <= DiceExpr::MAX_BONUS as u32)
                .map(DiceExpr::flat)
                .ok_or_else(|| DiceParseError::Modifier(notation.clone()));
        };

        let count_str = &notation[..d_pos];
        let count = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse::<u32>()
                .ok()
                .filter(|&count| count <= DiceExpr::MAX_COUNT)
                .ok_or_else(|| DiceParseError::Count(count_str.to_string()))?
        };

        let rest = &notation[d_pos + 1..];
        let split = rest.find(['+', '-']).unwrap_or(rest.len());
        let (sides_str, bonus_str) = rest.split_at(split);
        let sides = sides_str
            .parse::<u32>()
            .ok()
            .filter(|&sides| (1..=DiceExpr::MAX_SIDES).contains(&sides))
            .ok_or_else(|| DiceParseError::Sides(sides_str.to_string()))?;
        let bonus = if bonus_str.is_empty() {
            0
        } else {
            bonus_str
                .trim_start_matches('+')
                .parse::<i32>()
                .ok()
                .filter(|b| b.unsigned_abs() <= DiceExpr::MAX_BONUS as u32)
                .ok_or_else(|| DiceParseError::Modifier(bonus_str.to_string()))?
        };

        Ok(DiceExpr::new(count, sides, bonus))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

/// Outcome of rolling a damage expression.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    /// Every die rolled, including the extra dice of a critical hit.
    pub rolls: Vec<u32>,
    pub instance: DamageInstance,
}

/// Rolls damage. Totals below zero count as zero.
pub fn roll_damage<D: Dice + ?Sized>(
    dice: &mut D,
    expr: DiceExpr,
    damage_type: DamageType,
    critical: bool,
    rule: CriticalRule,
) -> DamageRoll {
    let count = match (critical, rule) {
        (true, CriticalRule::DoubleDice) => expr.count.saturating_mul(2),
        _ => expr.count,
    };
    let rolls = dice.roll_many(count, expr.sides);
    let sum: i64 = rolls.iter().map(|&r| r as i64).sum::<i64>() + expr.bonus as i64;
    let mut amount = sum.clamp(0, u32::MAX as i64) as u32;
    if critical && rule == CriticalRule::DoubleTotal {
        amount = amount.saturating_mul(2);
    }
    DamageRoll {
        rolls,
        instance: DamageInstance::new(amount, damage_type),
    }
}

/// Current and maximum hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
}

impl HitPoints {
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub const fn is_zero(&self) -> bool {
        self.current == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageResult {
    pub hit_points: HitPoints,
    /// Damage after resistances, vulnerabilities and immunities.
    pub taken: u32,
    /// Damage beyond what was needed to reach 0 HP.
    pub overflow: u32,
    /// True if this damage took the creature from above 0 HP to 0.
    pub dropped_to_zero: bool,
}

/// Applies damage instances through a profile. Hit points never drop below
/// zero.
pub fn apply_damage(
    hit_points: HitPoints,
    profile: &DamageProfile,
    instances: &[DamageInstance],
) -> DamageResult {
    let taken = instances
        .iter()
        .map(|i| profile.modifier(i.damage_type).apply(i.amount))
        .fold(0u32, u32::saturating_add);
    let current = hit_points.current.saturating_sub(taken);
    DamageResult {
        hit_points: HitPoints {
            current,
            max: hit_points.max,
        },
        taken,
        overflow: taken.saturating_sub(hit_points.current),
        dropped_to_zero: hit_points.current > 0 && current == 0,
    }
}

/// Restores hit points up to the maximum.
pub fn heal(hit_points: HitPoints, amount: u32) -> HitPoints {
    HitPoints {
        current: hit_points.current.saturating_add(amount).min(hit_points.max),
        max: hit_points.max,
    }
}
