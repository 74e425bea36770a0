//! Content factory reading a whole data directory.

use std::path::{Path, PathBuf};

use combat_core::CombatSetup;
use dice_resolution::RulesConfig;

use crate::loaders::{AbilityLoader, CreatureLoader, EncounterLoader, LoadResult, RulesLoader};
use crate::templates::{AbilityCatalog, CreatureCatalog, EncounterSpec};

/// Loads combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── rules.toml        (optional)
/// ├── creatures.ron
/// ├── abilities.ron     (optional)
/// └── encounters/
///     └── ambush.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Table rules from `rules.toml`, or the defaults when the file is absent.
    pub fn load_rules(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join("rules.toml");
        if !path.exists() {
            return Ok(RulesConfig::default());
        }
        RulesLoader::load(&path)
    }

    pub fn load_creatures(&self) -> LoadResult<CreatureCatalog> {
        CreatureLoader::load(&self.data_dir.join("creatures.ron"))
    }

    /// Ability catalog from `abilities.ron`, empty when the file is absent.
    pub fn load_abilities(&self) -> LoadResult<AbilityCatalog> {
        let path = self.data_dir.join("abilities.ron");
        if !path.exists() {
            return Ok(AbilityCatalog::new());
        }
        AbilityLoader::load(&path)
    }

    /// Encounter from `encounters/{name}.ron`.
    pub fn load_encounter(&self, name: &str) -> LoadResult<EncounterSpec> {
        let path = self.data_dir.join("encounters").join(format!("{name}.ron"));
        EncounterLoader::load(&path)
    }

    /// Loads rules, creatures and the named encounter and assembles them.
    pub fn build_setup(&self, encounter: &str) -> LoadResult<CombatSetup> {
        let rules = self.load_rules()?;
        let creatures = self.load_creatures()?;
        let spec = self.load_encounter(encounter)?;
        EncounterLoader::assemble(&spec, &creatures, rules)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
