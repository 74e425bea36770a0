//! Ability scores and modifiers.

/// The six abilities.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Ability {
    #[strum(to_string = "strength", serialize = "str")]
    Strength,
    #[strum(to_string = "dexterity", serialize = "dex")]
    Dexterity,
    #[strum(to_string = "constitution", serialize = "con")]
    Constitution,
    #[strum(to_string = "intelligence", serialize = "int")]
    Intelligence,
    #[strum(to_string = "wisdom", serialize = "wis")]
    Wisdom,
    #[strum(to_string = "charisma", serialize = "cha")]
    Charisma,
}

/// Modifier for an ability score: `floor((score - 10) / 2)`.
pub const fn modifier(score: u8) -> i32 {
    (score as i32 - 10).div_euclid(2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    /// All scores set to 10.
    pub const AVERAGE: Self = Self::uniform(10);

    pub const fn uniform(score: u8) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub const fn score(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub const fn modifier(&self, ability: Ability) -> i32 {
        modifier(self.score(ability))
    }

    pub fn with(mut self, ability: Ability, score: u8) -> Self {
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
        self
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::AVERAGE
    }
}
