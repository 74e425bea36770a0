//! Attack rolls against armor class.

use crate::roll::D20Roll;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackOutcome {
    Miss,
    Hit,
    /// Natural 20, or a hit against a target that suffers critical hits
    /// automatically.
    Critical,
}

impl AttackOutcome {
    pub const fn is_hit(self) -> bool {
        !matches!(self, AttackOutcome::Miss)
    }

    pub const fn is_critical(self) -> bool {
        matches!(self, AttackOutcome::Critical)
    }

    /// Promotes a hit to a critical hit; misses stay misses.
    pub const fn promote(self) -> Self {
        match self {
            AttackOutcome::Miss => AttackOutcome::Miss,
            _ => AttackOutcome::Critical,
        }
    }
}

/// Resolves an attack roll.
///
/// A natural 20 always hits as a critical and a natural 1 always misses.
/// Otherwise the attack hits when the total meets the target's armor class
/// raised by cover.
pub fn resolve_attack(roll: &D20Roll, target_ac: i32, cover_bonus: i32) -> AttackOutcome {
    if roll.is_critical() {
        return AttackOutcome::Critical;
    }
    if roll.is_fumble() {
        return AttackOutcome::Miss;
    }
    if roll.total() >= target_ac.saturating_add(cover_bonus) {
        AttackOutcome::Hit
    } else {
        AttackOutcome::Miss
    }
}
