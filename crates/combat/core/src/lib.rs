//! Deterministic combat rules over a tactical grid.
//!
//! `combat-core` defines the combat state machine: tokens on a board, the
//! initiative order, the commands players and the game master issue, and the
//! transitions that validate and apply them. All state mutation flows through
//! [`engine::CombatEngine`]; the session crate and offline tools depend on
//! the types re-exported here.
pub mod command;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod result;
mod root;
pub mod setup;
pub mod state;
pub mod transition;

pub use command::{
    AbilityDefinition, AbilityEffect, Actor, ApplyConditionAction, AttackAction, AttackProfile,
    Command, CommandId, CommandKind, DamageDice, EndCombatAction, EndTurnAction,
    ForcedMovementKind, MoveAction, MoveTarget, OnHitCondition, PlaceTokenAction, RemovalReason,
    RemoveConditionAction, RemoveTokenAction, Resolution, RollInitiativeAction, SaveDc,
    SavingThrowAction, SetTerrainAction, StartAction, SuppliedD20, TargetSelection,
    UseAbilityAction,
};
pub use config::CombatConfig;
pub use delta::{InitiativeChanges, StateDelta, TokenChanges, TokenCollectionChanges, TokenFields};
pub use engine::{CombatEngine, ExecutionOutcome, execute};
pub use error::{
    CombatError, CombatResult, GeometryError, TargetingError, TransitionError, ValidationError,
};
pub use result::{
    AbilityReport, ActionResult, AttackReport, DamageReport, SaveReport, TargetReport,
    TurnEndReport,
};
pub use setup::CombatSetup;
pub use state::{
    ActionEconomy, CombatState, CompletionReason, ConditionDuration, ConditionInstance,
    ConditionUpdate, Conditions, Controller, Creature, InitiativeEntry, Phase, PhaseKind,
    Resource, SideId, Size, Token, TokenId, Vitality,
};
pub use transition::{Transition, sight_between};
