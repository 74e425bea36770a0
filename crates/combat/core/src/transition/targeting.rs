//! Range, sight and cover between tokens.

use dice_resolution::{ConditionKind, is_incapacitated};
use grid_math::{Coord, CoverType, Footprint, LineOfSight, check_line_of_sight};

use crate::error::{CombatError, TargetingError, ValidationError};
use crate::state::{CombatState, Token, TokenId};

/// Line of sight from one token to another.
///
/// Every cell of the viewer's footprint is tried against every cell of the
/// target's, and the least obstructed line wins. Neither token obstructs
/// its own line.
pub fn sight_between(state: &CombatState, from: TokenId, to: TokenId) -> LineOfSight {
    let (Some(viewer), Some(target)) = (state.token(from), state.token(to)) else {
        return LineOfSight::BLOCKED;
    };
    let config = state.grid().config();
    let occupied = state.occupied_except(&[from, to]);
    let target_cells = target.cells(config);

    let mut best = LineOfSight::BLOCKED;
    for a in viewer.cells(config) {
        for &b in &target_cells {
            let los = check_line_of_sight(state.grid(), a, b, &occupied);
            if los.cover < best.cover {
                best = los;
            }
            if best.cover == CoverType::None {
                return best;
            }
        }
    }
    best
}

/// Whether `cell` can be seen from any cell of the viewer's footprint.
/// Creatures never block this check.
pub(crate) fn sees_cell(state: &CombatState, viewer: &Token, cell: Coord) -> bool {
    viewer
        .cells(state.grid().config())
        .into_iter()
        .any(|from| !check_line_of_sight(state.grid(), from, cell, |_| false).blocked)
}

/// Footprint-to-footprint distance in cells.
pub(crate) fn token_distance(state: &CombatState, a: &Token, b: &Token) -> u32 {
    Footprint::distance_between(state.grid().config(), a.placement(), b.placement())
}

/// Distance from a token's footprint to a single cell.
pub(crate) fn cell_distance(state: &CombatState, token: &Token, cell: Coord) -> u32 {
    Footprint::distance_between(
        state.grid().config(),
        token.placement(),
        (cell, Footprint::SINGLE),
    )
}

/// A charmed creature cannot target whoever charmed it.
pub(crate) fn check_charm(attacker: &Token, target: TokenId) -> Result<(), TargetingError> {
    let charmed_by_target = attacker
        .creature
        .conditions
        .iter()
        .any(|c| c.kind == ConditionKind::Charmed && c.source == Some(target));
    if charmed_by_target {
        return Err(TargetingError::Charmed {
            attacker: attacker.id,
            target,
        });
    }
    Ok(())
}

/// A target that can be affected: known and not dead.
pub(crate) fn living_target(state: &CombatState, id: TokenId) -> Result<&Token, CombatError> {
    let token = state.token_ref(id)?;
    if token.creature.is_dead() {
        return Err(TargetingError::TargetDead(id).into());
    }
    Ok(token)
}

/// An acting token: standing and able to take actions.
pub(crate) fn able_actor(state: &CombatState, id: TokenId) -> Result<&Token, ValidationError> {
    let token = state.token_ref(id)?;
    if !token.is_standing() {
        return Err(ValidationError::NotStanding(id));
    }
    if is_incapacitated(&token.creature.conditions.kinds()) {
        return Err(ValidationError::Incapacitated(id));
    }
    Ok(token)
}

/// Whether a standing enemy that can still act is next to `token`.
pub(crate) fn hostile_adjacent(state: &CombatState, token: &Token) -> bool {
    state.tokens().any(|other| {
        other.side != token.side
            && other.is_standing()
            && !is_incapacitated(&other.creature.conditions.kinds())
            && token_distance(state, token, other) <= 1
    })
}
