//! Phases, initiative and the per-turn action economy.

use crate::error::TransitionError;

use super::token::{SideId, TokenId};

/// Lifecycle phase of a combat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    #[default]
    NotStarted,
    /// Physical initiative rolls are being collected.
    RollingInitiative,
    InProgress {
        round: u32,
        turn_index: u32,
    },
    Completed {
        reason: CompletionReason,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::NotStarted => PhaseKind::NotStarted,
            Phase::RollingInitiative => PhaseKind::RollingInitiative,
            Phase::InProgress { .. } => PhaseKind::InProgress,
            Phase::Completed { .. } => PhaseKind::Completed,
        }
    }

    /// Round and turn index while in progress.
    pub fn turn(&self) -> Option<(u32, u32)> {
        match *self {
            Phase::InProgress { round, turn_index } => Some((round, turn_index)),
            _ => None,
        }
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, Phase::NotStarted | Phase::RollingInitiative)
    }
}

/// Phase tag without payload, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PhaseKind {
    NotStarted,
    RollingInitiative,
    InProgress,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompletionReason {
    /// Fewer than two sides have a token standing. `winner` is the side
    /// still standing, if any.
    SideDefeated { winner: Option<SideId> },
    EndedByGameMaster,
}

/// A token's place in the initiative order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeEntry {
    pub token: TokenId,
    pub total: i32,
    pub dex_modifier: i32,
    /// Insertion order, the final tie-break.
    pub order: u32,
}

impl InitiativeEntry {
    /// Sort key: highest total first, then highest dexterity, then earliest
    /// insertion.
    pub fn sort_key(&self) -> (std::cmp::Reverse<i32>, std::cmp::Reverse<i32>, u32) {
        (
            std::cmp::Reverse(self.total),
            std::cmp::Reverse(self.dex_modifier),
            self.order,
        )
    }
}

/// Per-turn resource that a command spends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    #[default]
    Action,
    BonusAction,
    /// Usable outside the token's own turn.
    Reaction,
    /// Costs nothing from the economy.
    Free,
}

/// What a token may still do this round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionEconomy {
    pub action: bool,
    pub bonus_action: bool,
    pub reaction: bool,
    /// Movement left this turn, in cells.
    pub movement: u32,
    /// Extra movement granted by effects, usable on or off turn.
    pub granted_movement: u32,
    pub free_interaction: bool,
}

impl ActionEconomy {
    /// Full budget at the start of a turn.
    pub const fn fresh(movement: u32) -> Self {
        Self {
            action: true,
            bonus_action: true,
            reaction: true,
            movement,
            granted_movement: 0,
            free_interaction: true,
        }
    }

    /// Budget before a token's first turn: only the reaction is ready.
    pub const fn waiting() -> Self {
        Self {
            action: false,
            bonus_action: false,
            reaction: true,
            movement: 0,
            granted_movement: 0,
            free_interaction: false,
        }
    }

    pub const fn has(&self, resource: Resource) -> bool {
        match resource {
            Resource::Action => self.action,
            Resource::BonusAction => self.bonus_action,
            Resource::Reaction => self.reaction,
            Resource::Free => true,
        }
    }

    pub fn spend(&mut self, resource: Resource) -> Result<(), TransitionError> {
        let slot = match resource {
            Resource::Action => &mut self.action,
            Resource::BonusAction => &mut self.bonus_action,
            Resource::Reaction => &mut self.reaction,
            Resource::Free => return Ok(()),
        };
        if !*slot {
            return Err(TransitionError::ResourceSpent(resource));
        }
        *slot = false;
        Ok(())
    }

    /// Movement available; off-turn only granted movement counts.
    pub const fn available_movement(&self, on_turn: bool) -> u32 {
        if on_turn {
            self.movement.saturating_add(self.granted_movement)
        } else {
            self.granted_movement
        }
    }

    /// Spends movement, drawing on the turn budget before granted movement.
    pub fn spend_movement(&mut self, cells: u32, on_turn: bool) -> Result<(), TransitionError> {
        let available = self.available_movement(on_turn);
        if cells > available {
            return Err(TransitionError::InsufficientMovement {
                required: cells,
                available,
            });
        }
        let from_turn = if on_turn { cells.min(self.movement) } else { 0 };
        self.movement -= from_turn;
        self.granted_movement -= cells - from_turn;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_spend_once() {
        let mut economy = ActionEconomy::fresh(6);
        assert!(economy.spend(Resource::Action).is_ok());
        assert_eq!(
            economy.spend(Resource::Action),
            Err(TransitionError::ResourceSpent(Resource::Action))
        );
        assert!(economy.spend(Resource::Free).is_ok());
        assert!(economy.has(Resource::BonusAction));
    }

    #[test]
    fn movement_draws_turn_budget_first() {
        let mut economy = ActionEconomy::fresh(4);
        economy.granted_movement = 3;
        economy.spend_movement(5, true).unwrap();
        assert_eq!((economy.movement, economy.granted_movement), (0, 2));
        assert!(economy.spend_movement(3, true).is_err());
        assert_eq!((economy.movement, economy.granted_movement), (0, 2));
    }

    #[test]
    fn off_turn_movement_uses_only_granted_cells() {
        let mut economy = ActionEconomy::fresh(6);
        assert_eq!(economy.available_movement(false), 0);
        economy.granted_movement = 2;
        economy.spend_movement(2, false).unwrap();
        assert_eq!(economy.movement, 6);
    }

    #[test]
    fn initiative_sorts_by_total_then_dex_then_order() {
        let mut entries = vec![
            InitiativeEntry { token: TokenId(1), total: 12, dex_modifier: 1, order: 0 },
            InitiativeEntry { token: TokenId(2), total: 15, dex_modifier: 0, order: 1 },
            InitiativeEntry { token: TokenId(3), total: 12, dex_modifier: 3, order: 2 },
            InitiativeEntry { token: TokenId(4), total: 12, dex_modifier: 1, order: 3 },
        ];
        entries.sort_by_key(InitiativeEntry::sort_key);
        let order: Vec<u32> = entries.iter().map(|e| e.token.0).collect();
        assert_eq!(order, vec![2, 3, 1, 4]);
    }
}
