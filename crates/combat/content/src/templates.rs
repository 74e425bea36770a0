//! Definition types read from content files.
//!
//! Templates describe creatures and boards independently of any combat; the
//! loaders turn them into tokens and grids when an encounter is assembled.

use std::collections::BTreeMap;

use combat_core::{
    AbilityDefinition, AttackProfile, Controller, Creature, SideId, Size, Token, TokenId,
};
use dice_resolution::{Ability, AbilityScores, DamageProfile};
use grid_math::{Cell, Coord, CoverType, GridConfig};

#[cfg(feature = "serde")]
fn default_proficiency() -> i32 {
    2
}

/// Statistics shared by every token created from one creature entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureTemplate {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Size,
    pub abilities: AbilityScores,
    pub max_hp: u32,
    pub armor_class: i32,
    /// Walking speed in feet.
    pub speed: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initiative_bonus: i32,
    #[cfg_attr(feature = "serde", serde(default = "default_proficiency"))]
    pub proficiency_bonus: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save_proficiencies: Vec<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_profile: DamageProfile,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attacks: Vec<AttackProfile>,
}

impl CreatureTemplate {
    /// Fresh combat statistics at full hit points.
    pub fn creature(&self) -> Creature {
        let mut creature = Creature::new(self.abilities, self.max_hp, self.armor_class, self.speed);
        creature.initiative_bonus = self.initiative_bonus;
        creature.proficiency_bonus = self.proficiency_bonus;
        creature.save_proficiencies = self.save_proficiencies.clone();
        creature.damage_profile = self.damage_profile.clone();
        creature
    }

    pub fn attack(&self, name: &str) -> Option<&AttackProfile> {
        self.attacks.iter().find(|a| a.name == name)
    }
}

/// Creature templates keyed by reference id.
pub type CreatureCatalog = BTreeMap<String, CreatureTemplate>;

/// Ability definitions keyed by id.
pub type AbilityCatalog = BTreeMap<String, AbilityDefinition>;

/// Shorthand terrain used in encounter files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainSpec {
    Floor,
    Wall,
    Difficult,
    /// Impassable terrain granting the given cover.
    Obstacle(CoverType),
    /// Open floor raised to the given elevation.
    Raised(i16),
    Custom(Cell),
}

impl TerrainSpec {
    pub fn cell(self) -> Cell {
        match self {
            TerrainSpec::Floor => Cell::FLOOR,
            TerrainSpec::Wall => Cell::WALL,
            TerrainSpec::Difficult => Cell::difficult(),
            TerrainSpec::Obstacle(cover) => Cell::obstacle(cover),
            TerrainSpec::Raised(elevation) => Cell::FLOOR.with_elevation(elevation),
            TerrainSpec::Custom(cell) => cell,
        }
    }
}

/// One token to place when the encounter opens.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSpec {
    pub id: u32,
    /// Key into the creature catalog.
    pub creature: String,
    /// Display name; the template name when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    pub side: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub controller: Controller,
    pub position: (i32, i32),
}

impl TokenSpec {
    pub fn token(&self, template: &CreatureTemplate) -> Token {
        Token {
            id: TokenId(self.id),
            creature_ref: self.creature.clone(),
            name: self.name.clone().unwrap_or_else(|| template.name.clone()),
            side: SideId(self.side),
            controller: self.controller.clone(),
            position: Coord::new(self.position.0, self.position.1),
            size: template.size,
            creature: template.creature(),
        }
    }
}

/// A board plus the tokens placed on it before initiative.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSpec {
    pub name: String,
    pub seed: u64,
    #[cfg_attr(feature = "serde", serde(default = "GridConfig::square"))]
    pub grid: GridConfig,
    pub dimensions: (u32, u32),
    /// (x, y, terrain) overrides; every other cell is open floor.
    #[cfg_attr(feature = "serde", serde(default))]
    pub terrain: Vec<(i32, i32, TerrainSpec)>,
    pub tokens: Vec<TokenSpec>,
}
