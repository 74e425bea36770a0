//! Error types surfaced by the session manager.
//!
//! A rejected command is reported as [`SessionError::Rejected`] carrying the
//! engine's [`CombatError`]; every other variant is an infrastructure
//! failure.

use combat_core::CombatError;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::id::CombatId;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown combat {0}")]
    UnknownCombat(CombatId),

    #[error("combat {0} is already open")]
    AlreadyOpen(CombatId),

    #[error("no snapshot stored for combat {0}")]
    NoSnapshot(CombatId),

    #[error("invalid combat setup: {0}")]
    Setup(#[source] CombatError),

    #[error("command rejected: {0}")]
    Rejected(#[source] CombatError),

    #[error("combat worker command channel closed")]
    CommandChannelClosed,

    #[error("combat worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker for combat {0} stopped unexpectedly; restore it from its snapshot")]
    WorkerStopped(CombatId),

    #[error("combat worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SessionError {
    /// The engine rejection, when the command itself was refused.
    pub fn rejection(&self) -> Option<&CombatError> {
        match self {
            SessionError::Rejected(error) => Some(error),
            _ => None,
        }
    }
}
