//! Rule variants that tables disagree on.

/// How a critical hit increases damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CriticalRule {
    /// Roll every damage die twice; flat bonuses apply once.
    #[default]
    DoubleDice,
    /// Roll normally and double the final total.
    DoubleTotal,
}

/// Whether natural 1s and 20s matter on saving throws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SaveExtremes {
    /// Only the total counts.
    #[default]
    None,
    /// A natural 20 always succeeds and a natural 1 always fails.
    NaturalOneAndTwenty,
}

/// Armor-class bonus granted by partial cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoverBonuses {
    pub half: i32,
    pub three_quarters: i32,
}

impl Default for CoverBonuses {
    fn default() -> Self {
        Self {
            half: 2,
            three_quarters: 5,
        }
    }
}

/// Table rules applied during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    pub critical: CriticalRule,
    pub save_extremes: SaveExtremes,
    /// Kill outright when damage left over after reaching 0 HP is at least
    /// the creature's maximum.
    pub instant_death: bool,
    pub cover: CoverBonuses,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            critical: CriticalRule::DoubleDice,
            save_extremes: SaveExtremes::None,
            instant_death: true,
            cover: CoverBonuses::default(),
        }
    }
}
