//! Ability catalog loader.

use std::path::Path;

use anyhow::{Context, bail};
use combat_core::{AbilityDefinition, AbilityEffect, ConditionDuration};

use crate::loaders::{LoadResult, read_file};
use crate::templates::AbilityCatalog;

/// Loads ability definitions from RON.
///
/// RON format: `Vec<(String, AbilityDefinition)>`. Definitions that the
/// engine would always reject (zero-round conditions, effect-less
/// abilities) fail here instead of at the table.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path) -> LoadResult<AbilityCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<AbilityCatalog> {
        let entries: Vec<(String, AbilityDefinition)> =
            ron::from_str(content).context("failed to parse ability catalog RON")?;

        let mut catalog = AbilityCatalog::new();
        for (id, definition) in entries {
            validate(&id, &definition)?;
            if catalog.insert(id.clone(), definition).is_some() {
                bail!("duplicate ability id '{id}'");
            }
        }
        Ok(catalog)
    }
}

fn validate(id: &str, definition: &AbilityDefinition) -> LoadResult<()> {
    if definition.effects.is_empty() {
        bail!("ability '{id}' has no effects");
    }
    for effect in &definition.effects {
        if let AbilityEffect::ApplyCondition {
            duration: ConditionDuration::Rounds(0),
            condition,
        } = effect
        {
            bail!("ability '{id}' applies {condition} for zero rounds");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use combat_core::Resolution;
    use dice_resolution::Ability;
    use grid_math::AreaShape;

    use super::*;

    #[test]
    fn parses_area_save_ability() {
        let catalog = AbilityLoader::parse(
            r#"[
                ("fireball", (
                    name: "Fireball",
                    cost: action,
                    range: 150,
                    area: Some(Burst(radius: 4)),
                    resolution: save(ability: Dexterity, dc: 15),
                    effects: [damage(dice: "8d6", damage_type: fire, half_on_save: true)],
                )),
            ]"#,
        )
        .unwrap();
        let fireball = &catalog["fireball"];
        assert_eq!(fireball.area, Some(AreaShape::Burst { radius: 4 }));
        assert_eq!(
            fireball.resolution,
            Resolution::Save {
                ability: Ability::Dexterity,
                dc: 15
            }
        );
        assert!(fireball.requires_sight);
    }

    #[test]
    fn zero_round_conditions_are_rejected() {
        let err = AbilityLoader::parse(
            r#"[
                ("blink", (
                    name: "Blink",
                    cost: bonus_action,
                    range: 30,
                    area: None,
                    resolution: automatic,
                    effects: [apply_condition(condition: blinded, duration: rounds(0))],
                )),
            ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("zero rounds"));
    }
}
