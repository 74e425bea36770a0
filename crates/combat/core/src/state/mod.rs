//! Authoritative combat state.
//!
//! [`CombatState`] owns the grid, the placed tokens, the initiative order and
//! every token's action economy. Tokens and the occupancy index are only
//! reachable mutably from inside the crate, so a token's position and the
//! cells it occupies always change in the same transition.

mod condition;
mod creature;
mod token;
mod turn;

use std::collections::{BTreeMap, BTreeSet};

use dice_resolution::{ConditionKind, RulesConfig, speed_is_zero};
use grid_math::{Coord, Grid};

pub use condition::{ConditionDuration, ConditionInstance, ConditionUpdate, Conditions};
pub use creature::{Creature, Vitality};
pub use token::{Controller, SideId, Size, Token, TokenId};
pub use turn::{
    ActionEconomy, CompletionReason, InitiativeEntry, Phase, PhaseKind, Resource,
};

use crate::config::CombatConfig;
use crate::error::{CombatError, GeometryError, TransitionError, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    seed: u64,
    nonce: u64,
    config: CombatConfig,
    pub(crate) grid: Grid,
    pub(crate) phase: Phase,
    pub(crate) initiative: Vec<InitiativeEntry>,
    pub(crate) tokens: BTreeMap<TokenId, Token>,
    pub(crate) economy: BTreeMap<TokenId, ActionEconomy>,
    /// Cell to token index over every non-dead token footprint.
    occupancy: BTreeMap<Coord, TokenId>,
    /// Tokens in placement order; the final initiative tie-break.
    placement: Vec<TokenId>,
    /// Bumped whenever terrain or any footprint moves.
    board_revision: u64,
}

impl CombatState {
    pub fn new(seed: u64, config: CombatConfig, grid: Grid) -> Self {
        Self {
            seed,
            nonce: 0,
            config,
            grid,
            phase: Phase::NotStarted,
            initiative: Vec::new(),
            tokens: BTreeMap::new(),
            economy: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            placement: Vec::new(),
            board_revision: 0,
        }
    }

    // ===== read access =====

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of commands applied so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.config.rules
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<u32> {
        self.phase.turn().map(|(round, _)| round)
    }

    pub fn initiative(&self) -> &[InitiativeEntry] {
        &self.initiative
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn economy(&self, id: TokenId) -> Option<&ActionEconomy> {
        self.economy.get(&id)
    }

    /// Token whose footprint covers `c`.
    pub fn occupant(&self, c: Coord) -> Option<TokenId> {
        self.occupancy.get(&c).copied()
    }

    pub fn board_revision(&self) -> u64 {
        self.board_revision
    }

    /// Token whose turn it is, while the combat is in progress.
    pub fn active_token(&self) -> Option<TokenId> {
        let (_, turn_index) = self.phase.turn()?;
        self.initiative.get(turn_index as usize).map(|e| e.token)
    }

    /// Predicate for grid queries: occupied by anything except `ignored`.
    pub fn occupied_except(&self, ignored: &[TokenId]) -> impl Fn(Coord) -> bool + '_ {
        let ignored = ignored.to_vec();
        move |c| self.occupant(c).is_some_and(|id| !ignored.contains(&id))
    }

    /// Sides that still have a standing token.
    pub fn standing_sides(&self) -> BTreeSet<SideId> {
        self.tokens
            .values()
            .filter(|t| t.is_standing())
            .map(|t| t.side)
            .collect()
    }

    // ===== setup =====

    /// Places a token on the board before combat starts.
    pub fn place_token(&mut self, token: Token) -> Result<(), CombatError> {
        if self.phase != Phase::NotStarted {
            return Err(TransitionError::WrongPhase {
                expected: PhaseKind::NotStarted,
                actual: self.phase.kind(),
            }
            .into());
        }
        if self.tokens.contains_key(&token.id) {
            return Err(ValidationError::DuplicateToken(token.id).into());
        }
        if self.tokens.len() >= CombatConfig::MAX_TOKENS {
            return Err(ValidationError::TokenLimit {
                max: CombatConfig::MAX_TOKENS,
            }
            .into());
        }

        let cells = token.cells(self.grid.config());
        if !token.creature.is_dead() {
            for &c in &cells {
                if !self.grid.contains(c) {
                    return Err(GeometryError::OutOfBounds(c).into());
                }
                if !self.grid.is_walkable(c) || self.occupancy.contains_key(&c) {
                    return Err(GeometryError::Blocked(c).into());
                }
            }
            for c in cells {
                self.occupancy.insert(c, token.id);
            }
        }

        self.placement.push(token.id);
        self.tokens.insert(token.id, token);
        self.board_revision += 1;
        Ok(())
    }

    // ===== crate-internal mutation =====

    pub(crate) fn token_ref(&self, id: TokenId) -> Result<&Token, ValidationError> {
        self.tokens.get(&id).ok_or(ValidationError::UnknownToken(id))
    }

    pub(crate) fn token_mut(&mut self, id: TokenId) -> Result<&mut Token, ValidationError> {
        self.tokens
            .get_mut(&id)
            .ok_or(ValidationError::UnknownToken(id))
    }

    pub(crate) fn economy_mut(&mut self, id: TokenId) -> &mut ActionEconomy {
        self.economy.entry(id).or_default()
    }

    pub(crate) fn placement_order(&self, id: TokenId) -> u32 {
        self.placement
            .iter()
            .position(|&placed| placed == id)
            .unwrap_or(self.placement.len()) as u32
    }

    pub(crate) fn bump_board(&mut self) {
        self.board_revision += 1;
    }

    /// Moves a token's footprint, keeping the occupancy index in step.
    pub(crate) fn relocate(&mut self, id: TokenId, anchor: Coord) -> Result<(), CombatError> {
        let config = *self.grid.config();
        let token = self.token_mut(id)?;
        let old_cells = token.cells(&config);
        token.position = anchor;
        let new_cells = token.cells(&config);

        for c in old_cells {
            if self.occupancy.get(&c) == Some(&id) {
                self.occupancy.remove(&c);
            }
        }
        for c in new_cells {
            if self.occupancy.insert(c, id).is_some_and(|other| other != id) {
                return Err(GeometryError::Blocked(c).into());
            }
        }
        self.board_revision += 1;
        Ok(())
    }

    /// Takes a token off the board: it stops occupying cells and leaves the
    /// initiative order.
    pub(crate) fn clear_from_board(&mut self, id: TokenId) {
        let before = self.occupancy.len();
        self.occupancy.retain(|_, occupant| *occupant != id);
        if self.occupancy.len() != before {
            self.board_revision += 1;
        }
        self.leave_initiative(id);
        self.economy.remove(&id);
    }

    /// Removes a token from the initiative order. Entries before the active
    /// one shift the turn index down; removing the last entry of the round
    /// wraps to the next round.
    pub(crate) fn leave_initiative(&mut self, id: TokenId) {
        let Some(index) = self.initiative.iter().position(|e| e.token == id) else {
            return;
        };
        self.initiative.remove(index);
        if let Phase::InProgress { round, turn_index } = &mut self.phase {
            if (index as u32) < *turn_index {
                *turn_index -= 1;
            }
            if *turn_index as usize >= self.initiative.len() {
                *turn_index = 0;
                *round += 1;
            }
        }
    }

    /// Moves the turn to the next initiative entry.
    pub(crate) fn advance_turn(&mut self) {
        let len = self.initiative.len() as u32;
        if let Phase::InProgress { round, turn_index } = &mut self.phase {
            *turn_index += 1;
            if *turn_index >= len {
                *turn_index = 0;
                *round += 1;
            }
        }
    }

    /// Brings the turn pointer to a consistent place after a transition.
    ///
    /// Completes the combat when fewer than two sides stand, skips tokens
    /// that are down, and refreshes the economy of a newly active token.
    pub(crate) fn settle_turn(&mut self, previous_active: Option<TokenId>) {
        if !matches!(self.phase, Phase::InProgress { .. }) {
            return;
        }

        let sides = self.standing_sides();
        if sides.len() < 2 {
            self.phase = Phase::Completed {
                reason: CompletionReason::SideDefeated {
                    winner: sides.into_iter().next(),
                },
            };
            return;
        }

        // At least one standing token is in the order, so this terminates
        // within one lap.
        for _ in 0..self.initiative.len() {
            let standing = self
                .active_token()
                .and_then(|id| self.tokens.get(&id))
                .is_some_and(Token::is_standing);
            if standing {
                break;
            }
            self.advance_turn();
        }

        let active = self.active_token();
        if active != previous_active
            && let Some(id) = active
        {
            self.start_turn(id);
        }
    }

    /// Gives a token its full economy for the turn it is starting.
    fn start_turn(&mut self, id: TokenId) {
        let cells_per_speed = |token: &Token| {
            let kinds = token.creature.conditions.kinds();
            if speed_is_zero(&kinds) {
                0
            } else {
                self.grid.config().feet_to_cells(token.creature.speed)
            }
        };
        let movement = self.tokens.get(&id).map(cells_per_speed).unwrap_or(0);
        self.economy.insert(id, ActionEconomy::fresh(movement));
    }

    pub(crate) fn bump_nonce(&mut self) {
        self.nonce += 1;
    }

    /// Checks that the occupancy index is exactly the union of the
    /// non-dead footprints and that no two footprints overlap.
    pub fn verify_occupancy(&self) -> Result<(), TransitionError> {
        let config = self.grid.config();
        let mut rebuilt = BTreeMap::new();
        for token in self.tokens.values().filter(|t| !t.creature.is_dead()) {
            for c in token.cells(config) {
                if rebuilt.insert(c, token.id).is_some() {
                    return Err(TransitionError::OccupancyCorrupted);
                }
            }
        }
        if rebuilt != self.occupancy {
            return Err(TransitionError::OccupancyCorrupted);
        }
        Ok(())
    }

    /// Condition kinds active on a token, empty for unknown tokens.
    pub fn condition_kinds(&self, id: TokenId) -> Vec<ConditionKind> {
        self.tokens
            .get(&id)
            .map(|t| t.creature.conditions.kinds())
            .unwrap_or_default()
    }
}
