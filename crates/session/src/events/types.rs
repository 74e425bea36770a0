//! Events published by combat workers.

use combat_core::{CompletionReason, StateDelta};
use serde::{Deserialize, Serialize};

use super::bus::Topic;
use crate::id::CombatId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A command was applied. `round` and `turn_index` describe the state
    /// after the command and are absent outside the in-progress phase.
    Delta {
        combat_id: CombatId,
        round: Option<u32>,
        turn_index: Option<u32>,
        delta: Box<StateDelta>,
    },
    Opened {
        combat_id: CombatId,
        nonce: u64,
    },
    /// Reopened from a stored snapshot.
    Restored {
        combat_id: CombatId,
        nonce: u64,
    },
    Completed {
        combat_id: CombatId,
        reason: CompletionReason,
    },
    Closed {
        combat_id: CombatId,
    },
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Delta { .. } => Topic::Combat,
            Event::Opened { .. }
            | Event::Restored { .. }
            | Event::Completed { .. }
            | Event::Closed { .. } => Topic::Lifecycle,
        }
    }

    pub fn combat_id(&self) -> &CombatId {
        match self {
            Event::Delta { combat_id, .. }
            | Event::Opened { combat_id, .. }
            | Event::Restored { combat_id, .. }
            | Event::Completed { combat_id, .. }
            | Event::Closed { combat_id } => combat_id,
        }
    }
}
