//! Client intents accepted by the engine.

mod ability;
mod attack;
mod limits;

use std::fmt;

use dice_resolution::{Ability, ConditionKind};
use grid_math::{Cell, Coord};

pub use ability::{
    AbilityDefinition, AbilityEffect, ForcedMovementKind, Resolution, TargetSelection,
    UseAbilityAction,
};
pub use attack::{AttackAction, AttackProfile, DamageDice, OnHitCondition, SaveDc, SuppliedD20};

use crate::state::{ConditionInstance, Token, TokenId};

pub(crate) use limits::{check_duration, check_effects, check_modifier};

/// Unique identifier of a command, chosen by the client. Resubmitting an id
/// returns the original delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandId(pub u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

/// Party issuing a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Actor {
    GameMaster,
    Token(TokenId),
}

impl Actor {
    /// Actor component of the dice seed. Token ids are shifted by one so
    /// they never collide with the game master.
    pub fn seed_id(&self) -> u32 {
        match self {
            Actor::GameMaster => 0,
            Actor::Token(id) => id.0.wrapping_add(1),
        }
    }

    pub fn is_game_master(&self) -> bool {
        matches!(self, Actor::GameMaster)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::GameMaster => f.write_str("gm"),
            Actor::Token(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub id: CommandId,
    pub actor: Actor,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(id: u64, actor: Actor, kind: impl Into<CommandKind>) -> Self {
        Self {
            id: CommandId(id),
            actor,
            kind: kind.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    PlaceToken(PlaceTokenAction),
    RollInitiative(RollInitiativeAction),
    Start(StartAction),
    Move(MoveAction),
    Attack(Box<AttackAction>),
    SavingThrow(SavingThrowAction),
    UseAbility(Box<UseAbilityAction>),
    ApplyCondition(ApplyConditionAction),
    RemoveCondition(RemoveConditionAction),
    SetTerrain(SetTerrainAction),
    EndTurn(EndTurnAction),
    RemoveToken(RemoveTokenAction),
    EndCombat(EndCombatAction),
}

macro_rules! command_kind_from {
    ($($variant:ident($action:ty)),* $(,)?) => {
        $(
            impl From<$action> for CommandKind {
                fn from(action: $action) -> Self {
                    CommandKind::$variant(action)
                }
            }
        )*
    };
}

command_kind_from!(
    PlaceToken(PlaceTokenAction),
    RollInitiative(RollInitiativeAction),
    Start(StartAction),
    Move(MoveAction),
    SavingThrow(SavingThrowAction),
    ApplyCondition(ApplyConditionAction),
    RemoveCondition(RemoveConditionAction),
    SetTerrain(SetTerrainAction),
    EndTurn(EndTurnAction),
    RemoveToken(RemoveTokenAction),
    EndCombat(EndCombatAction),
);

impl From<AttackAction> for CommandKind {
    fn from(action: AttackAction) -> Self {
        CommandKind::Attack(Box::new(action))
    }
}

impl From<UseAbilityAction> for CommandKind {
    fn from(action: UseAbilityAction) -> Self {
        CommandKind::UseAbility(Box::new(action))
    }
}

// ===== setup =====

/// Places a token during setup (game master only).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceTokenAction {
    pub token: Box<Token>,
}

/// Records a physical initiative die for a token before combat starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollInitiativeAction {
    pub token: TokenId,
    /// Face shown on the d20.
    pub natural: u32,
}

/// Rolls the missing initiative and begins round one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartAction;

/// Replaces the terrain of one cell (game master only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetTerrainAction {
    pub cell: Coord,
    pub terrain: Cell,
}

// ===== turn actions =====

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveTarget {
    /// Explicit anchor positions, optionally starting with the current one.
    Path(Vec<Coord>),
    /// Let the engine find the cheapest path.
    Destination(Coord),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub token: TokenId,
    pub target: MoveTarget,
}

/// Saving throw called for by the game master, with effects for each
/// outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavingThrowAction {
    pub targets: Vec<TokenId>,
    pub ability: Ability,
    pub dc: i32,
    /// Token the effects originate from, if any. Forced movement needs one.
    pub source: Option<TokenId>,
    pub on_fail: Vec<AbilityEffect>,
    pub on_success: Vec<AbilityEffect>,
    /// Physical d20 faces, one per target in order. Missing faces are rolled.
    pub rolls: Vec<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnAction;

// ===== game master interventions =====

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyConditionAction {
    pub target: TokenId,
    pub condition: ConditionInstance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoveConditionAction {
    pub target: TokenId,
    pub kind: ConditionKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum RemovalReason {
    #[default]
    Fled,
    Dismissed,
}

/// Takes a token out of the combat entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoveTokenAction {
    pub token: TokenId,
    pub reason: RemovalReason,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCombatAction;
