//! Creature catalog loader.

use std::path::Path;

use anyhow::{Context, bail};

use crate::loaders::{LoadResult, read_file};
use crate::templates::{CreatureCatalog, CreatureTemplate};

/// Loads creature templates from RON.
///
/// RON format: `Vec<(String, CreatureTemplate)>`, keyed by reference id.
/// Duplicate ids are rejected.
pub struct CreatureLoader;

impl CreatureLoader {
    pub fn load(path: &Path) -> LoadResult<CreatureCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<CreatureCatalog> {
        let entries: Vec<(String, CreatureTemplate)> =
            ron::from_str(content).context("failed to parse creature catalog RON")?;

        let mut catalog = CreatureCatalog::new();
        for (id, template) in entries {
            if template.max_hp == 0 {
                bail!("creature '{id}' has no hit points");
            }
            if catalog.insert(id.clone(), template).is_some() {
                bail!("duplicate creature id '{id}'");
            }
        }
        Ok(catalog)
    }
}
