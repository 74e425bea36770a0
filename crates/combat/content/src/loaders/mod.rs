//! Loaders that read content files from disk.

pub mod abilities;
pub mod creatures;
pub mod encounter;
pub mod factory;
pub mod rules;

pub use abilities::AbilityLoader;
pub use creatures::CreatureLoader;
pub use encounter::EncounterLoader;
pub use factory::ContentFactory;
pub use rules::RulesLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
