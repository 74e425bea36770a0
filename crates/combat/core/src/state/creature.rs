use dice_resolution::{Ability, AbilityScores, DamageProfile, HitPoints};

use super::condition::Conditions;

/// Whether a creature is up, down or gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Vitality {
    #[default]
    Alive,
    /// At 0 HP but not dead.
    Unconscious,
    Dead,
}

/// Mechanical statistics of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    pub abilities: AbilityScores,
    pub hit_points: HitPoints,
    pub armor_class: i32,
    /// Walking speed in feet.
    pub speed: u32,
    pub initiative_bonus: i32,
    pub proficiency_bonus: i32,
    pub save_proficiencies: Vec<Ability>,
    pub damage_profile: DamageProfile,
    pub conditions: Conditions,
    pub vitality: Vitality,
}

impl Creature {
    pub fn new(abilities: AbilityScores, max_hp: u32, armor_class: i32, speed: u32) -> Self {
        Self {
            abilities,
            hit_points: HitPoints::full(max_hp),
            armor_class,
            speed,
            initiative_bonus: 0,
            proficiency_bonus: 2,
            save_proficiencies: Vec::new(),
            damage_profile: DamageProfile::new(),
            conditions: Conditions::new(),
            vitality: Vitality::Alive,
        }
    }

    pub fn is_standing(&self) -> bool {
        self.vitality == Vitality::Alive && self.hit_points.current > 0
    }

    pub fn is_dead(&self) -> bool {
        self.vitality == Vitality::Dead
    }

    pub fn initiative_modifier(&self) -> i32 {
        self.abilities
            .modifier(Ability::Dexterity)
            .saturating_add(self.initiative_bonus)
    }

    pub fn save_modifier(&self, ability: Ability) -> i32 {
        let proficiency = if self.save_proficiencies.contains(&ability) {
            self.proficiency_bonus
        } else {
            0
        };
        self.abilities.modifier(ability).saturating_add(proficiency)
    }
}
