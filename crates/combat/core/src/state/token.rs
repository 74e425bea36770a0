use std::fmt;

use grid_math::{Coord, Footprint, GridConfig};

use super::creature::Creature;

/// Unique identifier of a token within one combat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// Faction a token fights for. Combat ends when fewer than two sides have
/// a token standing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideId(pub u32);

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "side#{}", self.0)
    }
}

/// Who issues commands for a token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    #[default]
    GameMaster,
    Player(String),
}

/// Creature size category.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl Size {
    /// Cells per side occupied on the grid.
    pub const fn footprint(self) -> Footprint {
        match self {
            Size::Tiny | Size::Small | Size::Medium => Footprint::new(1),
            Size::Large => Footprint::new(2),
            Size::Huge => Footprint::new(3),
            Size::Gargantuan => Footprint::new(4),
        }
    }
}

/// A combatant placed on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub id: TokenId,
    /// Reference into the external creature definition store.
    pub creature_ref: String,
    pub name: String,
    pub side: SideId,
    pub controller: Controller,
    /// Anchor cell of the footprint.
    pub position: Coord,
    pub size: Size,
    pub creature: Creature,
}

impl Token {
    pub fn footprint(&self) -> Footprint {
        self.size.footprint()
    }

    pub fn cells(&self, config: &GridConfig) -> Vec<Coord> {
        self.footprint().cells(config, self.position)
    }

    /// Placement and footprint as taken by grid distance helpers.
    pub fn placement(&self) -> (Coord, Footprint) {
        (self.position, self.footprint())
    }

    /// Standing: above 0 HP and not dead.
    pub fn is_standing(&self) -> bool {
        self.creature.is_standing()
    }
}
