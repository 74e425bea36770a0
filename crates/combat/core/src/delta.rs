//! State deltas: what one command changed.
//!
//! Token changes use a field bitmask plus the new value of every flagged
//! field, so observers can patch their copy of the board without asking for
//! the full state.

use std::collections::BTreeMap;

use bitflags::bitflags;
use dice_resolution::HitPoints;
use grid_math::{Cell, Coord};

use crate::command::Command;
use crate::state::{
    ActionEconomy, CombatState, ConditionInstance, InitiativeEntry, Phase, Token, TokenId,
    Vitality,
};

bitflags! {
    /// Which fields of a token changed during a transition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TokenFields: u8 {
        const POSITION   = 1 << 0;
        const HIT_POINTS = 1 << 1;
        const CONDITIONS = 1 << 2;
        const ECONOMY    = 1 << 3;
        const VITALITY   = 1 << 4;
    }
}

/// Changed fields of one token with their new values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenChanges {
    pub id: TokenId,
    pub fields: TokenFields,
    pub position: Option<Coord>,
    pub hit_points: Option<HitPoints>,
    pub conditions: Option<Vec<ConditionInstance>>,
    /// New economy; `None` inside a flagged change means the token no
    /// longer has one (it left the initiative).
    pub economy: Option<ActionEconomy>,
    pub vitality: Option<Vitality>,
}

impl TokenChanges {
    fn from_states(
        before: (&Token, Option<&ActionEconomy>),
        after: (&Token, Option<&ActionEconomy>),
    ) -> Option<Self> {
        let (old, old_economy) = before;
        let (new, new_economy) = after;
        let mut changes = Self {
            id: new.id,
            fields: TokenFields::empty(),
            position: None,
            hit_points: None,
            conditions: None,
            economy: None,
            vitality: None,
        };

        if old.position != new.position {
            changes.fields |= TokenFields::POSITION;
            changes.position = Some(new.position);
        }
        if old.creature.hit_points != new.creature.hit_points {
            changes.fields |= TokenFields::HIT_POINTS;
            changes.hit_points = Some(new.creature.hit_points);
        }
        if old.creature.conditions != new.creature.conditions {
            changes.fields |= TokenFields::CONDITIONS;
            changes.conditions = Some(new.creature.conditions.iter().copied().collect());
        }
        if old_economy != new_economy {
            changes.fields |= TokenFields::ECONOMY;
            changes.economy = new_economy.copied();
        }
        if old.creature.vitality != new.creature.vitality {
            changes.fields |= TokenFields::VITALITY;
            changes.vitality = Some(new.creature.vitality);
        }

        (!changes.fields.is_empty()).then_some(changes)
    }
}

/// Token additions, removals and updates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenCollectionChanges {
    pub added: Vec<Token>,
    pub removed: Vec<TokenId>,
    pub updated: Vec<TokenChanges>,
}

impl TokenCollectionChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Changes to the initiative order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeChanges {
    /// Tokens that left the order.
    pub removed: Vec<TokenId>,
    /// The full order, when entries were added or reordered.
    pub order: Option<Vec<InitiativeEntry>>,
}

impl InitiativeChanges {
    fn from_states(before: &[InitiativeEntry], after: &[InitiativeEntry]) -> Self {
        let removed: Vec<_> = before
            .iter()
            .filter(|e| !after.iter().any(|a| a.token == e.token))
            .map(|e| e.token)
            .collect();
        let mut remaining: Vec<_> = before
            .iter()
            .filter(|e| !removed.contains(&e.token))
            .copied()
            .collect();
        remaining.dedup();
        let order = (remaining != after).then(|| after.to_vec());
        Self { removed, order }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.order.is_none()
    }
}

/// Everything one executed command changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDelta {
    /// The command that caused this transition.
    pub command: Command,
    /// Nonce after the command was applied.
    pub nonce: u64,
    /// New phase, if it changed (including round or turn index).
    pub phase: Option<Phase>,
    pub tokens: TokenCollectionChanges,
    pub initiative: InitiativeChanges,
    /// Cells whose terrain changed, with the new terrain.
    pub terrain: Vec<(Coord, Cell)>,
}

impl StateDelta {
    pub fn from_states(command: Command, before: &CombatState, after: &CombatState) -> Self {
        Self {
            command,
            nonce: after.nonce(),
            phase: (before.phase() != after.phase()).then(|| after.phase()),
            tokens: diff_tokens(before, after),
            initiative: InitiativeChanges::from_states(before.initiative(), after.initiative()),
            terrain: diff_terrain(before, after),
        }
    }

    /// True when the command left every observable field untouched.
    pub fn is_empty(&self) -> bool {
        self.phase.is_none()
            && self.tokens.is_empty()
            && self.initiative.is_empty()
            && self.terrain.is_empty()
    }
}

fn diff_tokens(before: &CombatState, after: &CombatState) -> TokenCollectionChanges {
    let mut changes = TokenCollectionChanges::default();
    for token in after.tokens() {
        match before.token(token.id) {
            Some(old) => {
                let patch = TokenChanges::from_states(
                    (old, before.economy(old.id)),
                    (token, after.economy(token.id)),
                );
                changes.updated.extend(patch);
            }
            None => changes.added.push(token.clone()),
        }
    }
    changes.removed = before
        .tokens()
        .filter(|t| after.token(t.id).is_none())
        .map(|t| t.id)
        .collect();
    changes
}

fn diff_terrain(before: &CombatState, after: &CombatState) -> Vec<(Coord, Cell)> {
    let old: BTreeMap<_, _> = before.grid().terrain().collect();
    let new: BTreeMap<_, _> = after.grid().terrain().collect();
    let mut changed: Vec<_> = new
        .iter()
        .filter(|(c, cell)| old.get(c) != Some(cell))
        .map(|(&c, &cell)| (c, cell))
        .collect();
    changed.extend(
        old.keys()
            .filter(|c| !new.contains_key(c))
            .map(|&c| (c, Cell::FLOOR)),
    );
    changed.sort_by_key(|(c, _)| *c);
    changed
}

#[cfg(test)]
mod tests {
    use dice_resolution::AbilityScores;
    use grid_math::Grid;

    use super::*;
    use crate::command::{Actor, EndCombatAction};
    use crate::config::CombatConfig;
    use crate::state::{Controller, Creature, SideId, Size};

    fn command() -> Command {
        Command::new(1, Actor::GameMaster, EndCombatAction)
    }

    fn token(id: u32) -> Token {
        Token {
            id: TokenId(id),
            creature_ref: "goblin".into(),
            name: "Goblin".into(),
            side: SideId(1),
            controller: Controller::GameMaster,
            position: Coord::new(id as i32, 0),
            size: Size::Small,
            creature: Creature::new(AbilityScores::AVERAGE, 7, 15, 30),
        }
    }

    #[test]
    fn unchanged_state_yields_empty_delta() {
        let state = CombatState::new(3, CombatConfig::default(), Grid::square(4, 4));
        assert!(StateDelta::from_states(command(), &state, &state).is_empty());
    }

    #[test]
    fn token_changes_carry_new_values() {
        let mut before = CombatState::new(3, CombatConfig::default(), Grid::square(4, 4));
        before.place_token(token(1)).unwrap();
        let mut after = before.clone();
        after.relocate(TokenId(1), Coord::new(2, 2)).unwrap();
        after.token_mut(TokenId(1)).unwrap().creature.hit_points.current = 3;

        let delta = StateDelta::from_states(command(), &before, &after);
        let [change] = delta.tokens.updated.as_slice() else {
            panic!("expected exactly one token change");
        };
        assert_eq!(change.fields, TokenFields::POSITION | TokenFields::HIT_POINTS);
        assert_eq!(change.position, Some(Coord::new(2, 2)));
        assert_eq!(change.hit_points.map(|hp| hp.current), Some(3));
        assert!(change.conditions.is_none());
    }

    #[test]
    fn terrain_edits_are_listed() {
        let before = CombatState::new(3, CombatConfig::default(), Grid::square(4, 4));
        let mut after = before.clone();
        after.grid.set_cell(Coord::new(1, 1), Cell::WALL);
        let delta = StateDelta::from_states(command(), &before, &after);
        assert_eq!(delta.terrain, vec![(Coord::new(1, 1), Cell::WALL)]);
    }
}
