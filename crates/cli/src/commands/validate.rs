//! Check that a content directory loads and every encounter assembles.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::{ContentFactory, EncounterLoader};
use tracing::info;

/// Load and cross-check a content directory
#[derive(Parser)]
pub struct Validate {
    /// Content directory with creatures, abilities, rules and encounters
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(&self.data_dir);
        let rules = factory.load_rules()?;
        let creatures = factory.load_creatures()?;
        let abilities = factory.load_abilities()?;
        info!(
            creatures = creatures.len(),
            abilities = abilities.len(),
            critical = ?rules.critical,
            "Catalogs loaded"
        );

        let encounters_dir = self.data_dir.join("encounters");
        let mut names: Vec<String> = fs::read_dir(&encounters_dir)
            .with_context(|| format!("failed to list {}", encounters_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != "ron" {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_owned)
            })
            .collect();
        names.sort();

        for name in &names {
            let spec = factory.load_encounter(name)?;
            let setup = EncounterLoader::assemble(&spec, &creatures, rules)
                .with_context(|| format!("encounter '{name}' does not assemble"))?;
            info!(
                encounter = %name,
                tokens = setup.tokens.len(),
                "Encounter assembles"
            );
        }

        println!(
            "{} creatures, {} abilities, {} encounters OK",
            creatures.len(),
            abilities.len(),
            names.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_content_validates() {
        let validate = Validate {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data")),
        };
        validate.execute().unwrap();
    }

    #[test]
    fn missing_encounters_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("creatures.ron"), "[]").unwrap();
        let err = Validate {
            data_dir: dir.path().to_path_buf(),
        }
        .execute()
        .unwrap_err();
        assert!(format!("{err:#}").contains("encounters"));
    }
}
