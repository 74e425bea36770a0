//! Line of sight and cover.

use crate::cell::CoverType;
use crate::coord::{Coord, GridConfig, GridKind};
use crate::grid::Grid;

/// Result of a line-of-sight check between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineOfSight {
    pub blocked: bool,
    /// Highest cover crossed between the two cells.
    pub cover: CoverType,
}

impl LineOfSight {
    pub const CLEAR: Self = Self {
        blocked: false,
        cover: CoverType::None,
    };

    pub const BLOCKED: Self = Self {
        blocked: true,
        cover: CoverType::Full,
    };

    pub const fn from_cover(cover: CoverType) -> Self {
        Self {
            blocked: cover.blocks(),
            cover,
        }
    }
}

/// A cell crossed by a sight line, or a corner squeezed between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    Cell(Coord),
    /// The line passes exactly between two cells; the lesser obstruction
    /// applies.
    Corner(Coord, Coord),
}

/// Traces the line between cell centers and reports the highest cover
/// crossed by any intervening cell.
///
/// Intervening terrain contributes its cover category, a cell rising above
/// both endpoints blocks outright, and a cell for which `is_occupied` holds
/// grants at least half cover. The endpoints themselves never obstruct.
/// Out-of-bounds endpoints are reported as blocked.
pub fn check_line_of_sight<F>(grid: &Grid, from: Coord, to: Coord, is_occupied: F) -> LineOfSight
where
    F: Fn(Coord) -> bool,
{
    let (Some(start), Some(end)) = (grid.cell(from), grid.cell(to)) else {
        return LineOfSight::BLOCKED;
    };
    let eye_level = start.elevation.max(end.elevation);

    let obstruction = |c: Coord| -> CoverType {
        let Some(cell) = grid.cell(c) else {
            return CoverType::Full;
        };
        if cell.elevation > eye_level {
            return CoverType::Full;
        }
        if is_occupied(c) {
            cell.cover.max(CoverType::Half)
        } else {
            cell.cover
        }
    };

    let cover = trace(grid.config(), from, to)
        .into_iter()
        .map(|crossing| match crossing {
            Crossing::Cell(c) => obstruction(c),
            Crossing::Corner(a, b) => obstruction(a).min(obstruction(b)),
        })
        .max()
        .unwrap_or(CoverType::None);

    LineOfSight::from_cover(cover)
}

/// Intervening crossings between two cell centers, endpoints excluded.
pub fn trace(config: &GridConfig, from: Coord, to: Coord) -> Vec<Crossing> {
    match config.kind {
        GridKind::Square => trace_square(from, to),
        GridKind::Hex => trace_hex(from, to),
    }
}

fn trace_square(from: Coord, to: Coord) -> Vec<Crossing> {
    let (dx, dy) = ((to.x - from.x).abs() as i64, (to.y - from.y).abs() as i64);
    let (sx, sy) = ((to.x - from.x).signum(), (to.y - from.y).signum());
    let (mut ix, mut iy) = (0i64, 0i64);
    let mut at = from;
    let mut crossings = Vec::new();

    while ix < dx || iy < dy {
        // Compare the parameters at which the line crosses the next vertical
        // and horizontal cell boundaries, scaled to stay in integers.
        let decision = (1 + 2 * ix) * dy - (1 + 2 * iy) * dx;
        if decision == 0 {
            crossings.push(Crossing::Corner(at.offset(sx, 0), at.offset(0, sy)));
            at = at.offset(sx, sy);
            ix += 1;
            iy += 1;
        } else if decision < 0 {
            at = at.offset(sx, 0);
            ix += 1;
        } else {
            at = at.offset(0, sy);
            iy += 1;
        }
        if at != to {
            crossings.push(Crossing::Cell(at));
        }
    }
    crossings
}

fn trace_hex(from: Coord, to: Coord) -> Vec<Crossing> {
    const NUDGE: (f64, f64) = (1e-6, 2e-6);

    let steps = GridConfig::hex().distance(from, to);
    let mut crossings = Vec::new();
    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let lerp = |nudge: f64| {
            let q = from.x as f64 + NUDGE.0 * nudge + (to.x - from.x) as f64 * t;
            let r = from.y as f64 + NUDGE.1 * nudge + (to.y - from.y) as f64 * t;
            hex_round(q, r)
        };
        let (above, below) = (lerp(1.0), lerp(-1.0));
        if above == below {
            crossings.push(Crossing::Cell(above));
        } else {
            crossings.push(Crossing::Corner(above, below));
        }
    }
    crossings
}

fn hex_round(q: f64, r: f64) -> Coord {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    Coord::new(rq as i32, rr as i32)
}
