//! Encounter loader and assembly.

use std::path::Path;

use anyhow::{Context, anyhow, bail};
use combat_core::{CombatConfig, CombatSetup};
use dice_resolution::RulesConfig;
use grid_math::{Coord, Dimensions, Grid};

use crate::loaders::{LoadResult, read_file};
use crate::templates::{CreatureCatalog, EncounterSpec};

/// Loads an [`EncounterSpec`] from RON and assembles it into a
/// [`CombatSetup`].
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<EncounterSpec> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<EncounterSpec> {
        ron::from_str(content).context("failed to parse encounter RON")
    }

    /// Resolves creature references and builds the board.
    ///
    /// The setup is checked by building it once, so placement conflicts
    /// surface here with the encounter's name attached.
    pub fn assemble(
        spec: &EncounterSpec,
        creatures: &CreatureCatalog,
        rules: RulesConfig,
    ) -> LoadResult<CombatSetup> {
        let (width, height) = spec.dimensions;
        if width == 0 || height == 0 {
            bail!("encounter '{}' has an empty board", spec.name);
        }
        let mut grid = Grid::new(spec.grid, Dimensions::new(width, height));
        for &(x, y, terrain) in &spec.terrain {
            if !grid.set_cell(Coord::new(x, y), terrain.cell()) {
                bail!("encounter '{}': terrain at ({x}, {y}) is off the board", spec.name);
            }
        }

        let mut setup = CombatSetup::new(spec.seed, CombatConfig::new(rules), grid);
        for token in &spec.tokens {
            let template = creatures.get(&token.creature).ok_or_else(|| {
                anyhow!(
                    "encounter '{}': token {} references unknown creature '{}'",
                    spec.name,
                    token.id,
                    token.creature
                )
            })?;
            setup.tokens.push(token.token(template));
        }

        setup
            .build()
            .map_err(|e| anyhow!("encounter '{}' cannot be placed: {e}", spec.name))?;
        Ok(setup)
    }
}
