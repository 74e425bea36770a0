//! d20 rolls with advantage and disadvantage.

use crate::rng::Dice;

/// How many d20s to roll and which one to keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AdvantageState {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl AdvantageState {
    /// Folds several sources together. Any advantage and any disadvantage
    /// cancel out to a normal roll, however many of each there are.
    pub fn combine(sources: impl IntoIterator<Item = AdvantageState>) -> Self {
        let (mut advantage, mut disadvantage) = (false, false);
        for source in sources {
            match source {
                AdvantageState::Advantage => advantage = true,
                AdvantageState::Disadvantage => disadvantage = true,
                AdvantageState::Normal => {}
            }
        }
        Self::from_flags(advantage, disadvantage)
    }

    pub const fn from_flags(advantage: bool, disadvantage: bool) -> Self {
        match (advantage, disadvantage) {
            (true, false) => AdvantageState::Advantage,
            (false, true) => AdvantageState::Disadvantage,
            _ => AdvantageState::Normal,
        }
    }

    pub fn and(self, other: AdvantageState) -> Self {
        Self::combine([self, other])
    }

    /// Number of d20s this state rolls.
    pub const fn dice(self) -> usize {
        match self {
            AdvantageState::Normal => 1,
            _ => 2,
        }
    }
}

/// A resolved d20 roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct D20Roll {
    /// Faces rolled; the second is present only with advantage or
    /// disadvantage.
    pub rolls: (u32, Option<u32>),
    pub advantage: AdvantageState,
    pub modifier: i32,
}

impl D20Roll {
    /// Builds a roll from faces already rolled (for example at the table).
    /// Faces are clamped to 1..=20. A missing second face under advantage or
    /// disadvantage reuses the first.
    pub fn from_naturals(
        first: u32,
        second: Option<u32>,
        modifier: i32,
        advantage: AdvantageState,
    ) -> Self {
        let first = first.clamp(1, 20);
        let second = match advantage {
            AdvantageState::Normal => None,
            _ => Some(second.unwrap_or(first).clamp(1, 20)),
        };
        Self {
            rolls: (first, second),
            advantage,
            modifier,
        }
    }

    /// The face that counts.
    pub fn natural(&self) -> u32 {
        let (first, second) = self.rolls;
        match (self.advantage, second) {
            (AdvantageState::Advantage, Some(second)) => first.max(second),
            (AdvantageState::Disadvantage, Some(second)) => first.min(second),
            _ => first,
        }
    }

    pub fn total(&self) -> i32 {
        (self.natural() as i32).saturating_add(self.modifier)
    }

    pub fn is_critical(&self) -> bool {
        self.natural() == 20
    }

    pub fn is_fumble(&self) -> bool {
        self.natural() == 1
    }
}

/// Rolls a d20 (or two, under advantage or disadvantage).
pub fn roll_d20<D: Dice + ?Sized>(dice: &mut D, modifier: i32, advantage: AdvantageState) -> D20Roll {
    let first = dice.roll(20);
    let second = match advantage {
        AdvantageState::Normal => None,
        _ => Some(dice.roll(20)),
    };
    D20Roll::from_naturals(first, second, modifier, advantage)
}
