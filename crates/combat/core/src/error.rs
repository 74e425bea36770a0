//! Typed rejections raised while validating and applying commands.
//!
//! A rejected command never changes state: the engine stages every
//! transition on a clone and discards it on error.

use dice_resolution::{ConditionKind, DiceExpr};
use grid_math::Coord;

use crate::state::{PhaseKind, Resource, TokenId};

/// Top-level error returned by [`CombatEngine::execute`](crate::CombatEngine::execute).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("illegal transition: {0}")]
    IllegalTransition(#[from] TransitionError),

    #[error("targeting failed: {0}")]
    Targeting(#[from] TargetingError),

    #[error("geometry check failed: {0}")]
    Geometry(#[from] GeometryError),
}

/// The command is malformed or names something that does not exist.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("unknown token {0}")]
    UnknownToken(TokenId),

    #[error("token {0} is already placed")]
    DuplicateToken(TokenId),

    #[error("combat already holds the maximum of {max} tokens")]
    TokenLimit { max: usize },

    #[error("only the game master may issue this command")]
    NotGameMaster,

    #[error("actor does not control token {0}")]
    NotController(TokenId),

    #[error("token {0} is not standing")]
    NotStanding(TokenId),

    #[error("token {0} is incapacitated")]
    Incapacitated(TokenId),

    #[error("natural roll {0} is not a d20 face")]
    InvalidRoll(u32),

    #[error("condition durations must last at least one round")]
    ZeroDuration,

    #[error("token {token} cannot hold another condition ({kind})")]
    ConditionLimit { token: TokenId, kind: ConditionKind },

    #[error("no targets given")]
    NoTargets,

    #[error("modifier {value} is outside the allowed range of ±{max}")]
    ModifierOutOfRange { value: i32, max: i32 },

    #[error("dice expression {0} exceeds the dice limits")]
    DiceOutOfRange(DiceExpr),

    #[error("granting {cells} cells of movement exceeds the limit of {max}")]
    MovementOutOfRange { cells: u32, max: u32 },
}

/// The command is well formed but not allowed in the current phase or turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionError {
    #[error("expected phase {expected}, combat is {actual}")]
    WrongPhase {
        expected: PhaseKind,
        actual: PhaseKind,
    },

    #[error("combat has ended")]
    CombatOver,

    #[error("no tokens placed")]
    NoCombatants,

    #[error("it is not {token}'s turn")]
    NotTurn { token: TokenId },

    #[error("{0} already spent this turn")]
    ResourceSpent(Resource),

    #[error("movement of {required} cells exceeds the {available} remaining")]
    InsufficientMovement { required: u32, available: u32 },

    #[error("token {0} cannot move (speed 0)")]
    SpeedZero(TokenId),

    #[error("occupancy index disagrees with token positions")]
    OccupancyCorrupted,
}

/// The chosen target cannot be affected from here.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingError {
    #[error("no line of sight from {from} to {to}")]
    NoLineOfSight { from: TokenId, to: TokenId },

    #[error("no line of sight from {from} to cell {to}")]
    CellNotVisible { from: TokenId, to: Coord },

    #[error("target at {distance} cells is beyond range {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("{0} cannot target itself")]
    SelfTarget(TokenId),

    #[error("token {0} is dead")]
    TargetDead(TokenId),

    #[error("{attacker} is charmed by {target}")]
    Charmed { attacker: TokenId, target: TokenId },

    #[error("directional area needs a direction")]
    MissingDirection,
}

/// Movement or placement violates the board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(Coord),

    #[error("cell {0} is blocked or occupied")]
    Blocked(Coord),

    #[error("path is not a connected walk from the token's position")]
    InvalidPath,

    #[error("no path from {from} to {to} within the movement budget")]
    Unreachable { from: Coord, to: Coord },
}

pub type CombatResult<T> = Result<T, CombatError>;
