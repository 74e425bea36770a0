//! Resolution primitives for d20 combat.
//!
//! Everything here is a pure function of its inputs plus a [`Dice`] source:
//! d20 rolls with advantage, attack and saving-throw resolution, damage rolls
//! and profiles, and the condition table consulted before rolling.
pub mod ability;
pub mod attack;
pub mod conditions;
pub mod damage;
pub mod rng;
pub mod roll;
pub mod rules;
pub mod save;

pub use ability::{Ability, AbilityScores, modifier};
pub use attack::{AttackOutcome, resolve_attack};
pub use conditions::{
    AttackRange, ConditionEffects, ConditionKind, Proximity, SaveAdjustment, attack_advantage,
    auto_critical, is_incapacitated, movement_multiplier, save_adjustment, speed_is_zero,
};
pub use damage::{
    DamageInstance, DamageModifier, DamageProfile, DamageResult, DamageRoll, DamageType,
    DiceExpr, DiceParseError, HitPoints, apply_damage, heal, roll_damage,
};
pub use rng::{Dice, FixedDice, PcgRng, RngOracle, ScriptedDice, SeededDice, compute_seed};
pub use roll::{AdvantageState, D20Roll, roll_d20};
pub use rules::{CoverBonuses, CriticalRule, RulesConfig, SaveExtremes};
pub use save::{SaveOutcome, resolve_saving_throw};
