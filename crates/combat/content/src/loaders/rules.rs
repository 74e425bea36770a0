//! Table rules loader.

use std::path::Path;

use anyhow::Context;
use dice_resolution::RulesConfig;

use crate::loaders::{LoadResult, read_file};

/// Loads [`RulesConfig`] from TOML. Missing keys keep their defaults.
///
/// ```toml
/// critical = "double_total"
/// save_extremes = "natural_one_and_twenty"
/// instant_death = false
///
/// [cover]
/// half = 2
/// three_quarters = 5
/// ```
pub struct RulesLoader;

impl RulesLoader {
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<RulesConfig> {
        toml::from_str(content).context("failed to parse rules TOML")
    }
}

#[cfg(test)]
mod tests {
    use dice_resolution::{CriticalRule, SaveExtremes};

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(RulesLoader::parse("").unwrap(), RulesConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let rules = RulesLoader::parse(
            r#"
            critical = "double_total"
            save_extremes = "natural_one_and_twenty"
            instant_death = false

            [cover]
            three_quarters = 4
            "#,
        )
        .unwrap();
        assert_eq!(rules.critical, CriticalRule::DoubleTotal);
        assert_eq!(rules.save_extremes, SaveExtremes::NaturalOneAndTwenty);
        assert!(!rules.instant_death);
        assert_eq!(rules.cover.half, 2);
        assert_eq!(rules.cover.three_quarters, 4);
    }

    #[test]
    fn unknown_rule_is_rejected() {
        assert!(RulesLoader::parse(r#"critical = "triple""#).is_err());
    }
}
