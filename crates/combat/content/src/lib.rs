//! Data-driven combat content and its loaders.
//!
//! This crate reads the definitions a combat is parameterized with:
//! - creature templates (RON)
//! - ability definitions (RON)
//! - encounters: board, terrain and token placement (RON)
//! - table rules (TOML)
//!
//! Content never appears in combat state directly; encounters are turned
//! into a [`combat_core::CombatSetup`] before a session opens them.

pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use templates::{
    AbilityCatalog, CreatureCatalog, CreatureTemplate, EncounterSpec, TerrainSpec, TokenSpec,
};

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ContentFactory, CreatureLoader, EncounterLoader, LoadResult, RulesLoader,
};
